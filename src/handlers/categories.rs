// src/handlers/categories.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sqlx::PgPool;
use validator::Validate;

use crate::{
    error::AppError,
    models::category::{Category, CreateCategoryRequest, UpdateCategoryRequest},
};

/// List all categories.
pub async fn list_categories(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(categories))
}

/// Get a single category by ID.
pub async fn get_category(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let category = sqlx::query_as::<_, Category>(
        "SELECT id, name, description, created_at FROM categories WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

/// Creates a new category.
/// Admin only. Name must be unique.
pub async fn create_category(
    State(pool): State<PgPool>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name, description)
        VALUES ($1, $2)
        RETURNING id, name, description, created_at
        "#,
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&pool)
    .await
    .map_err(|e| match AppError::from(e) {
        AppError::Conflict(_) => {
            AppError::Conflict(format!("Category '{}' already exists", payload.name))
        }
        other => other,
    })?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Updates a category.
/// Admin only.
pub async fn update_category(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    if let Some(new_name) = payload.name {
        sqlx::query("UPDATE categories SET name = $1 WHERE id = $2")
            .bind(new_name)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    if let Some(new_description) = payload.description {
        sqlx::query("UPDATE categories SET description = $1 WHERE id = $2")
            .bind(new_description)
            .bind(id)
            .execute(&pool)
            .await?;
    }

    Ok(StatusCode::OK)
}

/// Deletes a category.
/// Admin only. Refused while any course still references the category.
pub async fn delete_category(
    State(pool): State<PgPool>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Category not found".to_string()))?;

    let course_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM courses WHERE category_id = $1")
            .bind(id)
            .fetch_one(&pool)
            .await?;

    if course_count > 0 {
        return Err(AppError::BadRequest(format!(
            "Cannot delete category with {} associated course(s)",
            course_count
        )));
    }

    sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}
