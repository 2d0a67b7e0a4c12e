// src/models/attempt.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a finished attempt. Scoring is synchronous, so every
/// attempt the API creates is already completed.
pub const STATUS_COMPLETED: &str = "completed";

/// Represents the 'quiz_attempts' table in the database.
/// One attempt per (user, quiz), enforced by a unique constraint.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub user_id: i64,
    pub quiz_id: i64,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub passed: bool,
    /// One of the STATUS_* constants.
    pub status: String,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'question_responses' table: one row per (attempt,
/// question), recording what was submitted and how it was judged.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: i64,
    pub attempt_id: i64,
    pub question_id: i64,
    pub selected_answer_id: Option<i64>,
    pub text_response: Option<String>,
    pub correct: bool,
}

/// One submitted answer within a quiz submission.
#[derive(Debug, Deserialize)]
pub struct SubmittedResponse {
    pub question_id: i64,
    /// For choice questions: the chosen answer id.
    pub selected_answer_id: Option<i64>,
    /// For free-text and boolean questions: the typed response.
    pub text_response: Option<String>,
}

/// DTO for submitting a quiz attempt. The submitting user is taken from
/// the verified JWT claims, not from the body.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: i64,
    pub responses: Vec<SubmittedResponse>,
}

/// Per-question grading outcome returned to the client.
#[derive(Debug, Serialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub correct: bool,
    pub points: i32,
}

/// DTO for the scored submission result.
#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub attempt_id: i64,
    pub quiz_id: i64,
    pub quiz_title: String,
    pub score: i32,
    pub total_questions: i32,
    pub percentage: f64,
    pub passed: bool,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub question_results: Vec<QuestionResult>,
}
