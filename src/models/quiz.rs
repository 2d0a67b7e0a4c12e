// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Recognized question types.
pub const TYPE_SINGLE_CHOICE: &str = "single_choice";
pub const TYPE_MULTIPLE_CHOICE: &str = "multiple_choice";
pub const TYPE_FREE_TEXT: &str = "free_text";
pub const TYPE_BOOLEAN: &str = "boolean";

/// Represents the 'quizzes' table in the database.
/// The question set is immutable after creation; there is no update path
/// for quiz content.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub quiz_id: i64,

    /// One of the TYPE_* constants.
    /// Mapped from the database column 'type' since `type` is a reserved
    /// keyword in Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub question_type: String,

    /// The text of the question.
    pub text: String,

    /// Ordering of the question within its quiz (ascending).
    pub position: i32,
}

/// Represents the 'answers' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub question_id: i64,
    pub text: String,
    pub correct: bool,
}

/// Full quiz with nested questions and answers, for instructors/admins.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<QuestionDetail>,
}

#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// Student-facing answer DTO: hides the `correct` flag.
#[derive(Debug, Serialize)]
pub struct PublicAnswer {
    pub id: i64,
    pub text: String,
}

/// Student-facing question DTO.
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    #[serde(rename = "type")]
    pub question_type: String,
    pub text: String,
    pub answers: Vec<PublicAnswer>,
}

/// Student-facing quiz DTO.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

/// DTO for defining an answer at quiz-creation time.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1, max = 1000))]
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// DTO for defining a question at quiz-creation time.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[serde(rename = "type")]
    pub question_type: String,
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(nested)]
    pub answers: Vec<CreateAnswerRequest>,
}

/// DTO for creating a new quiz with its full question/answer tree.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    pub lesson_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}
