// src/handlers/progress.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::progress::{
        AnalyticsResponse, CompletionRateResponse, CourseProgress, STATUS_COMPLETED,
        UpdateProgressRequest, is_valid_status,
    },
};

/// Completion rate as a percentage rounded to the nearest integer.
/// Zero rows means zero percent.
fn completion_percentage(completed: i64, total: i64) -> i64 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as i64
}

/// Updates the progress row for one (enrollment, lesson).
///
/// Quiz gate: the status may only become 'completed' once the enrollment's
/// user has a passing attempt for every quiz attached to the lesson. The
/// first unpassed quiz is named in the error. Lessons without quizzes pass
/// the gate trivially.
pub async fn update_progress(
    State(pool): State<PgPool>,
    Json(payload): Json<UpdateProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !is_valid_status(&payload.status) {
        return Err(AppError::BadRequest(format!(
            "Invalid progress status '{}'",
            payload.status
        )));
    }

    let user_id = sqlx::query_scalar::<_, i64>("SELECT user_id FROM enrollments WHERE id = $1")
        .bind(payload.enrollment_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Enrollment not found".to_string()))?;

    sqlx::query_scalar::<_, i64>("SELECT id FROM lessons WHERE id = $1")
        .bind(payload.lesson_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Lesson not found".to_string()))?;

    if payload.status == STATUS_COMPLETED {
        // First quiz of the lesson without a passing attempt, if any
        let unpassed = sqlx::query_scalar::<_, String>(
            r#"
            SELECT q.title
            FROM quizzes q
            LEFT JOIN quiz_attempts a
                ON a.quiz_id = q.id AND a.user_id = $1
            WHERE q.lesson_id = $2
              AND (a.id IS NULL OR a.passed = FALSE)
            ORDER BY q.id
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(payload.lesson_id)
        .fetch_optional(&pool)
        .await?;

        if let Some(quiz_title) = unpassed {
            return Err(AppError::BadRequest(format!(
                "Cannot complete lesson: quiz '{}' has not been passed",
                quiz_title
            )));
        }
    }

    // Upsert keyed by the (enrollment, lesson) uniqueness constraint
    let progress = sqlx::query_as::<_, CourseProgress>(
        r#"
        INSERT INTO course_progress (enrollment_id, lesson_id, status)
        VALUES ($1, $2, $3)
        ON CONFLICT (enrollment_id, lesson_id) DO UPDATE SET
            status = EXCLUDED.status,
            updated_at = NOW()
        RETURNING id, enrollment_id, lesson_id, status, updated_at
        "#,
    )
    .bind(payload.enrollment_id)
    .bind(payload.lesson_id)
    .bind(&payload.status)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to upsert progress: {:?}", e);
        AppError::from(e)
    })?;

    Ok(Json(progress))
}

/// Lists all progress rows for one enrollment.
pub async fn get_progress(
    State(pool): State<PgPool>,
    Path(enrollment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM enrollments WHERE id = $1")
        .bind(enrollment_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Enrollment not found".to_string()))?;

    let rows = sqlx::query_as::<_, CourseProgress>(
        r#"
        SELECT id, enrollment_id, lesson_id, status, updated_at
        FROM course_progress
        WHERE enrollment_id = $1
        ORDER BY lesson_id
        "#,
    )
    .bind(enrollment_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(rows))
}

/// Completed/total over one enrollment's progress rows, rounded.
pub async fn get_completion_rate(
    State(pool): State<PgPool>,
    Path(enrollment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM enrollments WHERE id = $1")
        .bind(enrollment_id)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("Enrollment not found".to_string()))?;

    let (completed, total) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'completed'),
            COUNT(*)
        FROM course_progress
        WHERE enrollment_id = $1
        "#,
    )
    .bind(enrollment_id)
    .fetch_one(&pool)
    .await?;

    Ok(Json(CompletionRateResponse {
        completed,
        total,
        completion_rate: completion_percentage(completed, total),
    }))
}

/// System-wide completed/total across all progress rows, unrounded.
/// Computed on demand; nothing is cached.
pub async fn get_analytics(State(pool): State<PgPool>) -> Result<impl IntoResponse, AppError> {
    let (completed, total) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT
            COUNT(*) FILTER (WHERE status = 'completed'),
            COUNT(*)
        FROM course_progress
        "#,
    )
    .fetch_one(&pool)
    .await?;

    let completion_rate = if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    };

    Ok(Json(AnalyticsResponse {
        completed,
        total,
        completion_rate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_of_four_is_twenty_five_percent() {
        assert_eq!(completion_percentage(1, 4), 25);
    }

    #[test]
    fn rounds_to_nearest_integer() {
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
    }

    #[test]
    fn empty_enrollment_is_zero() {
        assert_eq!(completion_percentage(0, 0), 0);
    }

    #[test]
    fn all_completed_is_full() {
        assert_eq!(completion_percentage(5, 5), 100);
    }
}
