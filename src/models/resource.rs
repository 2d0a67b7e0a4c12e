// src/models/resource.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use validator::Validate;

/// Represents the 'resources' table: metadata for a file attached to a
/// lesson. Storage upload/delete mechanics live elsewhere; only the
/// metadata rows are managed here.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub lesson_id: i64,
    pub name: String,
    pub url: String,
    pub mime_type: String,
    /// Size in bytes as reported at upload time.
    pub size_bytes: i64,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// DTO for registering a resource.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateResourceRequest {
    pub lesson_id: i64,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 500), custom(function = validate_url_string))]
    pub url: String,
    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,
    #[validate(range(min = 0))]
    pub size_bytes: i64,
}

/// Validates that a string is a correctly formatted URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
