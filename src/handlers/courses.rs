// src/handlers/courses.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::course::{Course, CourseListParams, CreateCourseRequest, UpdateCourseRequest},
    utils::jwt::Claims,
};

const COURSE_COLUMNS: &str = "id, title, description, instructor_id, category_id, \
     price, published, created_at, updated_at";

/// List published courses (recent first).
/// Supports cursor-based pagination and an optional category filter.
pub async fn list_courses(
    State(pool): State<PgPool>,
    Query(params): Query<CourseListParams>,
) -> Result<impl IntoResponse, AppError> {
    let limit = params.limit.unwrap_or(20).min(100); // Default 20, max 100

    let courses = sqlx::query_as::<_, Course>(&format!(
        r#"
        SELECT {COURSE_COLUMNS}
        FROM courses
        WHERE published = TRUE
          AND ($1::TIMESTAMPTZ IS NULL OR created_at < $1)
          AND ($2::BIGINT IS NULL OR category_id = $2)
        ORDER BY created_at DESC
        LIMIT $3
        "#
    ))
    .bind(params.cursor)
    .bind(params.category_id)
    .bind(limit)
    .fetch_all(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(courses))
}

/// Get a single course by ID.
pub async fn get_course(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    Ok(Json(course))
}

/// Create a new course owned by the calling instructor.
/// Requires: Login + (Instructor OR Admin role).
pub async fn create_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if claims.role != "instructor" && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "Only instructors can create courses".to_string(),
        ));
    }

    // Category must exist up front so the client gets a clear 400
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
        .bind(payload.category_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::BadRequest("Category does not exist".to_string()))?;

    let course = sqlx::query_as::<_, Course>(&format!(
        r#"
        INSERT INTO courses (title, description, instructor_id, category_id, price)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {COURSE_COLUMNS}
        "#
    ))
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(claims.user_id())
    .bind(payload.category_id)
    .bind(payload.price)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create course: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(course)))
}

/// Update a course with an explicit per-field merge.
/// Requires: Login + (Owner OR Admin).
pub async fn update_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Course not found".to_string()))?;

    if course.instructor_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    if payload.is_empty() {
        return Ok(Json(course));
    }

    if let Some(category_id) = payload.category_id {
        sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
            .bind(category_id)
            .fetch_optional(&pool)
            .await?
            .ok_or(AppError::BadRequest("Category does not exist".to_string()))?;
    }

    // COALESCE keeps the stored value for every absent field
    let updated = sqlx::query_as::<_, Course>(&format!(
        r#"
        UPDATE courses SET
            title = COALESCE($1, title),
            description = COALESCE($2, description),
            category_id = COALESCE($3, category_id),
            price = COALESCE($4, price),
            published = COALESCE($5, published),
            updated_at = NOW()
        WHERE id = $6
        RETURNING {COURSE_COLUMNS}
        "#
    ))
    .bind(payload.title)
    .bind(payload.description)
    .bind(payload.category_id)
    .bind(payload.price)
    .bind(payload.published)
    .bind(id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to update course: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(updated))
}

/// Delete a course.
/// Requires: Login + (Owner OR Admin).
pub async fn delete_course(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = sqlx::query_scalar::<_, i64>("SELECT instructor_id FROM courses WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))?;

    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this course".to_string(),
        ));
    }

    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete course: {:?}", e);
            AppError::from(e)
        })?;

    Ok(StatusCode::NO_CONTENT)
}
