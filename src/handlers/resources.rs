// src/handlers/resources.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::lessons::lesson_course_owner,
    models::resource::{CreateResourceRequest, Resource},
    utils::jwt::Claims,
};

/// Registers a file resource for a lesson. Only metadata is stored here;
/// the file itself lives in external storage.
/// Requires: Login + (Course owner OR Admin).
pub async fn create_resource(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let owner_id = lesson_course_owner(&pool, payload.lesson_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let resource = sqlx::query_as::<_, Resource>(
        r#"
        INSERT INTO resources (lesson_id, name, url, mime_type, size_bytes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, lesson_id, name, url, mime_type, size_bytes, created_at
        "#,
    )
    .bind(payload.lesson_id)
    .bind(&payload.name)
    .bind(&payload.url)
    .bind(&payload.mime_type)
    .bind(payload.size_bytes)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create resource: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(resource)))
}

/// Lists a lesson's resources.
pub async fn list_lesson_resources(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    lesson_course_owner(&pool, lesson_id).await?;

    let resources = sqlx::query_as::<_, Resource>(
        r#"
        SELECT id, lesson_id, name, url, mime_type, size_bytes, created_at
        FROM resources
        WHERE lesson_id = $1
        ORDER BY id
        "#,
    )
    .bind(lesson_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(resources))
}

/// Deletes a resource's metadata row.
/// Requires: Login + (Course owner OR Admin).
pub async fn delete_resource(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson_id = sqlx::query_scalar::<_, i64>("SELECT lesson_id FROM resources WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Resource not found".to_string()))?;

    let owner_id = lesson_course_owner(&pool, lesson_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    sqlx::query("DELETE FROM resources WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
