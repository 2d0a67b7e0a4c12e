// src/models/enrollment.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'enrollments' table: one row per (user, course),
/// enforced by a unique constraint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for enrolling the current user into a course.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub course_id: i64,
}

/// Enrollment joined with course info, for listing a user's enrollments.
#[derive(Debug, Serialize, FromRow)]
pub struct EnrollmentWithCourse {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
