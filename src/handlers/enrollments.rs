// src/handlers/enrollments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::enrollment::{CreateEnrollmentRequest, Enrollment, EnrollmentWithCourse},
    utils::jwt::Claims,
};

/// Enrolls the current user into a course.
/// One enrollment per (user, course); a duplicate is a 409.
pub async fn enroll(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let published = sqlx::query_scalar::<_, bool>("SELECT published FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    if !published {
        return Err(AppError::BadRequest(
            "Cannot enroll in an unpublished course".to_string(),
        ));
    }

    let enrollment = sqlx::query_as::<_, Enrollment>(
        r#"
        INSERT INTO enrollments (user_id, course_id)
        VALUES ($1, $2)
        RETURNING id, user_id, course_id, created_at
        "#,
    )
    .bind(claims.user_id())
    .bind(payload.course_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("Already enrolled in this course".to_string())
        }
        other => {
            tracing::error!("Failed to enroll: {}", other);
            other
        }
    })?;

    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// Lists a user's enrollments with course titles.
pub async fn list_user_enrollments(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let enrollments = sqlx::query_as::<_, EnrollmentWithCourse>(
        r#"
        SELECT e.id, e.course_id, c.title AS course_title, e.created_at
        FROM enrollments e
        JOIN courses c ON e.course_id = c.id
        WHERE e.user_id = $1
        ORDER BY e.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(enrollments))
}

/// Get a single enrollment by ID.
pub async fn get_enrollment(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let enrollment = sqlx::query_as::<_, Enrollment>(
        "SELECT id, user_id, course_id, created_at FROM enrollments WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Enrollment not found".to_string()))?;

    Ok(Json(enrollment))
}
