// src/models/course_module.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'modules' table in the database: an ordered section
/// within a course that groups lessons.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CourseModule {
    pub id: i64,

    pub course_id: i64,

    pub title: String,

    /// Ordering of the module within its course (ascending).
    pub position: i32,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a new module.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    pub course_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 0))]
    pub position: i32,
}

/// DTO for updating a module. Fields are optional.
#[derive(Debug, Deserialize)]
pub struct UpdateModuleRequest {
    pub title: Option<String>,
    pub position: Option<i32>,
}
