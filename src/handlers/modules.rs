// src/handlers/modules.rs

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
    models::course_module::{CourseModule, CreateModuleRequest, UpdateModuleRequest},
    utils::jwt::Claims,
};

/// Looks up the owning instructor of a course, or 404.
pub(crate) async fn course_owner(pool: &PgPool, course_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT instructor_id FROM courses WHERE id = $1")
        .bind(course_id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("Course not found".to_string()))
}

/// Looks up the owning instructor of a module's course, or 404.
pub(crate) async fn module_course_owner(pool: &PgPool, module_id: i64) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT c.instructor_id
        FROM modules m
        JOIN courses c ON m.course_id = c.id
        WHERE m.id = $1
        "#,
    )
    .bind(module_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::NotFound("Module not found".to_string()))
}

/// List a course's modules in position order.
pub async fn list_course_modules(
    State(pool): State<PgPool>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    course_owner(&pool, course_id).await?;

    let modules = sqlx::query_as::<_, CourseModule>(
        r#"
        SELECT id, course_id, title, position, created_at
        FROM modules
        WHERE course_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(course_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(modules))
}

/// Create a module inside a course.
/// Requires: Login + (Course owner OR Admin).
pub async fn create_module(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let owner_id = course_owner(&pool, payload.course_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let module = sqlx::query_as::<_, CourseModule>(
        r#"
        INSERT INTO modules (course_id, title, position)
        VALUES ($1, $2, $3)
        RETURNING id, course_id, title, position, created_at
        "#,
    )
    .bind(payload.course_id)
    .bind(&payload.title)
    .bind(payload.position)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create module: {:?}", e);
        AppError::from(e)
    })?;

    Ok((StatusCode::CREATED, Json(module)))
}

/// Update a module's title or position.
/// Requires: Login + (Course owner OR Admin).
pub async fn update_module(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateModuleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = module_course_owner(&pool, id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let module = sqlx::query_as::<_, CourseModule>(
        r#"
        UPDATE modules SET
            title = COALESCE($1, title),
            position = COALESCE($2, position)
        WHERE id = $3
        RETURNING id, course_id, title, position, created_at
        "#,
    )
    .bind(payload.title)
    .bind(payload.position)
    .bind(id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(module))
}

/// Delete a module and, via cascade, its lessons.
/// Requires: Login + (Course owner OR Admin).
pub async fn delete_module(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = module_course_owner(&pool, id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    sqlx::query("DELETE FROM modules WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
