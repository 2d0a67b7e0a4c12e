// src/models/progress.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Lesson progress states.
pub const STATUS_NOT_STARTED: &str = "not_started";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";

pub fn is_valid_status(status: &str) -> bool {
    matches!(
        status,
        STATUS_NOT_STARTED | STATUS_IN_PROGRESS | STATUS_COMPLETED
    )
}

/// Represents the 'course_progress' table: one row per (enrollment,
/// lesson), enforced by a unique constraint. Status is overwritten in
/// place, not appended.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CourseProgress {
    pub id: i64,
    pub enrollment_id: i64,
    pub lesson_id: i64,
    /// One of the STATUS_* constants.
    pub status: String,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for the progress-update endpoint.
#[derive(Debug, Deserialize)]
pub struct UpdateProgressRequest {
    pub enrollment_id: i64,
    pub lesson_id: i64,
    pub status: String,
}

/// DTO for an enrollment's completion rate.
#[derive(Debug, Serialize)]
pub struct CompletionRateResponse {
    pub completed: i64,
    pub total: i64,
    /// Percentage rounded to the nearest integer.
    #[serde(rename = "completionRate")]
    pub completion_rate: i64,
}

/// DTO for the system-wide analytics overview.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub completed: i64,
    pub total: i64,
    /// Unrounded percentage across all progress rows.
    #[serde(rename = "completionRate")]
    pub completion_rate: f64,
}
