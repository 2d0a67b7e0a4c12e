// src/handlers/lessons.rs

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
    handlers::modules::module_course_owner,
    models::lesson::{CreateLessonRequest, Lesson, UpdateLessonRequest},
    utils::{jwt::Claims, sanitize::clean_html},
};

/// Looks up the owning instructor of a lesson's course, or 404.
pub(crate) async fn lesson_course_owner(pool: &PgPool, lesson_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT c.instructor_id
        FROM lessons l
        JOIN modules m ON l.module_id = m.id
        JOIN courses c ON m.course_id = c.id
        WHERE l.id = $1
        "#,
    )
    .bind(lesson_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Lesson not found".to_string()))
}

/// List a module's lessons in position order.
pub async fn list_module_lessons(
    State(pool): State<PgPool>,
    Path(module_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    module_course_owner(&pool, module_id).await?;

    let lessons = sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, module_id, title, content, position, created_at
        FROM lessons
        WHERE module_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(module_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(lessons))
}

/// Get a single lesson by ID.
pub async fn get_lesson(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let lesson = sqlx::query_as::<_, Lesson>(
        r#"
        SELECT id, module_id, title, content, position, created_at
        FROM lessons
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    Ok(Json(lesson))
}

/// Create a lesson inside a module. The HTML content is sanitized before
/// it is stored.
/// Requires: Login + (Course owner OR Admin).
pub async fn create_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let owner_id = module_course_owner(&pool, payload.module_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let content = clean_html(&payload.content);

    let lesson = sqlx::query_as::<_, Lesson>(
        r#"
        INSERT INTO lessons (module_id, title, content, position)
        VALUES ($1, $2, $3, $4)
        RETURNING id, module_id, title, content, position, created_at
        "#,
    )
    .bind(payload.module_id)
    .bind(&payload.title)
    .bind(&content)
    .bind(payload.position)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create lesson: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

/// Update a lesson.
/// Requires: Login + (Course owner OR Admin).
pub async fn update_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateLessonRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = lesson_course_owner(&pool, id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let content = payload.content.map(|c| clean_html(&c));

    let lesson = sqlx::query_as::<_, Lesson>(
        r#"
        UPDATE lessons SET
            title = COALESCE($1, title),
            content = COALESCE($2, content),
            position = COALESCE($3, position)
        WHERE id = $4
        RETURNING id, module_id, title, content, position, created_at
        "#,
    )
    .bind(payload.title)
    .bind(content)
    .bind(payload.position)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(lesson))
}

/// Delete a lesson.
/// Requires: Login + (Course owner OR Admin).
pub async fn delete_lesson(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = lesson_course_owner(&pool, id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    sqlx::query("DELETE FROM lessons WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
