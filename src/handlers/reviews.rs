// src/handlers/reviews.rs

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
    models::review::{CourseReviewsResponse, CreateReviewRequest, Review, ReviewWithAuthor},
    utils::{jwt::Claims, sanitize::clean_html},
};

/// Creates a review for a course the user is enrolled in.
/// One review per (user, course); a duplicate is a 409.
pub async fn create_review(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user_id = claims.user_id();

    sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
        .bind(payload.course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    // Only enrolled learners may review
    let enrolled = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM enrollments WHERE user_id = $1 AND course_id = $2",
    )
    .bind(user_id)
    .bind(payload.course_id)
    .fetch_optional(&pool)
    .await?;

    if enrolled.is_none() {
        return Err(AppError::Forbidden(
            "You must be enrolled in a course to review it".to_string(),
        ));
    }

    let comment = payload.comment.map(|c| clean_html(&c));

    let review = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (user_id, course_id, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, course_id, rating, comment, created_at
        "#,
    )
    .bind(user_id)
    .bind(payload.course_id)
    .bind(payload.rating)
    .bind(comment)
    .fetch_one(&pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict("You have already reviewed this course".to_string())
        }
        other => {
            tracing::error!("Failed to create review: {}", other);
            other
        }
    })?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// Lists a course's reviews with the average rating.
pub async fn list_course_reviews(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    let reviews = sqlx::query_as::<_, ReviewWithAuthor>(
        r#"
        SELECT r.id, r.rating, r.comment, u.username AS author_username, r.created_at
        FROM reviews r
        JOIN users u ON r.user_id = u.id
        WHERE r.course_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    let average_rating = sqlx::query_scalar::<_, Option<f64>>(
        "SELECT AVG(rating)::FLOAT8 FROM reviews WHERE course_id = $1",
    )
    .bind(course_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(CourseReviewsResponse {
        course_id,
        average_rating,
        reviews,
    }))
}
