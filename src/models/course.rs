// src/models/course.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'courses' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,

    pub title: String,

    pub description: String,

    /// Owning instructor. Only the owner (or an admin) may mutate the
    /// course.
    pub instructor_id: i64,

    pub category_id: i64,

    /// Price in the platform currency; 0 for free courses.
    pub price: f64,

    pub published: bool,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 20000))]
    pub description: String,
    pub category_id: i64,
    #[validate(range(min = 0.0))]
    pub price: f64,
}

/// DTO for updating a course. Fields are optional; an absent field keeps
/// the stored value, and only present fields are written. This is an
/// explicit per-field merge, never a blind struct copy.
#[derive(Debug, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub price: Option<f64>,
    pub published: Option<bool>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category_id.is_none()
            && self.price.is_none()
            && self.published.is_none()
    }
}

/// Query parameters for listing courses.
#[derive(Debug, Deserialize)]
pub struct CourseListParams {
    /// Cursor for pagination: the created_at timestamp of the last course
    /// in the previous page.
    pub cursor: Option<chrono::DateTime<chrono::Utc>>,

    /// Number of items to return (default: 20, max: 100).
    pub limit: Option<i64>,

    /// Restrict to one category.
    pub category_id: Option<i64>,
}
