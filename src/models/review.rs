// src/models/review.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'reviews' table: one review per (user, course),
/// enforced by a unique constraint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub course_id: i64,
    /// Rating from 1 to 5.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for creating a review.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub course_id: i64,
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 5000))]
    pub comment: Option<String>,
}

/// Review joined with the author's username.
#[derive(Debug, Serialize, FromRow)]
pub struct ReviewWithAuthor {
    pub id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub author_username: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for a course's review list plus its average rating.
#[derive(Debug, Serialize)]
pub struct CourseReviewsResponse {
    pub course_id: i64,
    pub average_rating: Option<f64>,
    pub reviews: Vec<ReviewWithAuthor>,
}
