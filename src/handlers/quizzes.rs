// src/handlers/quizzes.rs

use std::collections::{HashMap, HashSet};

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::{PASSING_SCORE_PERCENTAGE, POINTS_PER_QUESTION},
    error::AppError,
    handlers::lessons::lesson_course_owner,
    models::{
        attempt::{
            QuestionResponse, QuestionResult, QuizAttempt, QuizResultResponse, STATUS_COMPLETED,
            SubmitQuizRequest, SubmittedResponse,
        },
        quiz::{
            Answer, CreateQuestionRequest, CreateQuizRequest, PublicAnswer, PublicQuestion,
            PublicQuiz, Question, QuestionDetail, Quiz, QuizDetail, TYPE_BOOLEAN, TYPE_FREE_TEXT,
            TYPE_MULTIPLE_CHOICE, TYPE_SINGLE_CHOICE,
        },
    },
    utils::jwt::Claims,
};

/// Normalizes free-text input for comparison: trimmed, lowercased.
fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Checks that two answer texts form a recognized boolean pair,
/// case-insensitively: {true,false} or {yes,no} in either order.
fn is_boolean_pair(a: &str, b: &str) -> bool {
    let a = normalize_text(a);
    let b = normalize_text(b);
    matches!(
        (a.as_str(), b.as_str()),
        ("true", "false") | ("false", "true") | ("yes", "no") | ("no", "yes")
    )
}

/// Validates a proposed quiz definition's structure before anything is
/// persisted. Pure; question indexes in error messages are 1-based.
fn validate_quiz_definition(questions: &[CreateQuestionRequest]) -> Result<(), AppError> {
    if questions.is_empty() {
        return Err(AppError::BadRequest(
            "Quiz must contain at least one question".to_string(),
        ));
    }

    for (i, question) in questions.iter().enumerate() {
        let idx = i + 1;

        if question.answers.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Question {} has no answers",
                idx
            )));
        }

        let answer_count = question.answers.len();
        let correct_count = question.answers.iter().filter(|a| a.correct).count();

        match question.question_type.as_str() {
            TYPE_SINGLE_CHOICE => {
                if answer_count < 2 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: single-choice questions need at least 2 answers",
                        idx
                    )));
                }
                if correct_count != 1 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: single-choice questions need exactly 1 correct answer, found {}",
                        idx, correct_count
                    )));
                }
            }
            TYPE_MULTIPLE_CHOICE => {
                if answer_count < 2 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: multiple-choice questions need at least 2 answers",
                        idx
                    )));
                }
                if correct_count < 1 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: multiple-choice questions need at least 1 correct answer",
                        idx
                    )));
                }
            }
            TYPE_FREE_TEXT => {
                if answer_count != 1 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: free-text questions need exactly 1 answer, found {}",
                        idx, answer_count
                    )));
                }
                if correct_count != 1 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: the free-text answer must be marked correct",
                        idx
                    )));
                }
            }
            TYPE_BOOLEAN => {
                if answer_count != 2 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: boolean questions need exactly 2 answers, found {}",
                        idx, answer_count
                    )));
                }
                if correct_count != 1 {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: boolean questions need exactly 1 correct answer, found {}",
                        idx, correct_count
                    )));
                }
                if !is_boolean_pair(&question.answers[0].text, &question.answers[1].text) {
                    return Err(AppError::BadRequest(format!(
                        "Question {}: boolean answers must be the pair true/false or yes/no",
                        idx
                    )));
                }
            }
            other => {
                return Err(AppError::BadRequest(format!(
                    "Question {}: unknown question type '{}'",
                    idx, other
                )));
            }
        }
    }

    Ok(())
}

/// Judges one submitted response against a question's answer list.
///
/// Choice questions match the selected answer id against the answers
/// flagged correct. Free-text and boolean questions compare the typed
/// response, trimmed and case-insensitively, with the correct answer's
/// text; a boolean response may also arrive as a selected answer id.
fn judge_response(question_type: &str, answers: &[Answer], response: &SubmittedResponse) -> bool {
    match question_type {
        TYPE_SINGLE_CHOICE | TYPE_MULTIPLE_CHOICE => match response.selected_answer_id {
            Some(selected) => answers.iter().any(|a| a.correct && a.id == selected),
            None => false,
        },
        TYPE_FREE_TEXT | TYPE_BOOLEAN => {
            if let Some(selected) = response.selected_answer_id {
                return answers.iter().any(|a| a.correct && a.id == selected);
            }
            match &response.text_response {
                Some(text) => answers
                    .iter()
                    .any(|a| a.correct && normalize_text(&a.text) == normalize_text(text)),
                None => false,
            }
        }
        _ => false,
    }
}

/// Loads a quiz's questions with their answers, in stable position order.
async fn load_question_tree(
    pool: &PgPool,
    quiz_id: i64,
) -> Result<Vec<QuestionDetail>, AppError> {
    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT id, quiz_id, type, text, position
        FROM questions
        WHERE quiz_id = $1
        ORDER BY position, id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let answers = sqlx::query_as::<_, Answer>(
        r#"
        SELECT a.id, a.question_id, a.text, a.correct
        FROM answers a
        JOIN questions q ON a.question_id = q.id
        WHERE q.quiz_id = $1
        ORDER BY a.id
        "#,
    )
    .bind(quiz_id)
    .fetch_all(pool)
    .await?;

    let mut by_question: HashMap<i64, Vec<Answer>> = HashMap::new();
    for answer in answers {
        by_question.entry(answer.question_id).or_default().push(answer);
    }

    Ok(questions
        .into_iter()
        .map(|question| {
            let answers = by_question.remove(&question.id).unwrap_or_default();
            QuestionDetail { question, answers }
        })
        .collect())
}

/// Creates a quiz with its full question/answer tree.
///
/// The structure is validated first; the quiz, question and answer rows
/// are then inserted inside one transaction, so a failure partway leaves
/// nothing behind.
/// Requires: Login + (Course owner OR Admin).
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    validate_quiz_definition(&payload.questions)?;

    let owner_id = lesson_course_owner(&pool, payload.lesson_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "You are not authorized to modify this course".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    let quiz = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (lesson_id, title)
        VALUES ($1, $2)
        RETURNING id, lesson_id, title, created_at
        "#,
    )
    .bind(payload.lesson_id)
    .bind(&payload.title)
    .fetch_one(&mut *tx)
    .await?;

    let mut questions = Vec::with_capacity(payload.questions.len());

    for (position, question_def) in payload.questions.iter().enumerate() {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (quiz_id, type, text, position)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quiz_id, type, text, position
            "#,
        )
        .bind(quiz.id)
        .bind(&question_def.question_type)
        .bind(&question_def.text)
        .bind(position as i32)
        .fetch_one(&mut *tx)
        .await?;

        let mut answers = Vec::with_capacity(question_def.answers.len());
        for answer_def in &question_def.answers {
            let answer = sqlx::query_as::<_, Answer>(
                r#"
                INSERT INTO answers (question_id, text, correct)
                VALUES ($1, $2, $3)
                RETURNING id, question_id, text, correct
                "#,
            )
            .bind(question.id)
            .bind(&answer_def.text)
            .bind(answer_def.correct)
            .fetch_one(&mut *tx)
            .await?;
            answers.push(answer);
        }

        questions.push(QuestionDetail { question, answers });
    }

    tx.commit().await?;

    tracing::info!("Created quiz {} for lesson {}", quiz.id, quiz.lesson_id);

    Ok((StatusCode::CREATED, Json(QuizDetail { quiz, questions })))
}

/// Get a quiz with questions and answers, including correct flags.
/// Requires: Login + (Course owner OR Admin).
pub async fn get_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, lesson_id, title, created_at FROM quizzes WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let owner_id = lesson_course_owner(&pool, quiz.lesson_id).await?;
    if owner_id != claims.user_id() && claims.role != "admin" {
        return Err(AppError::Forbidden(
            "Answer keys are only visible to the course owner".to_string(),
        ));
    }

    let questions = load_question_tree(&pool, id).await?;

    Ok(Json(QuizDetail { quiz, questions }))
}

/// List a lesson's quizzes for students: correct flags are hidden.
pub async fn list_lesson_quizzes(
    State(pool): State<PgPool>,
    Path(lesson_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    lesson_course_owner(&pool, lesson_id).await?;

    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, lesson_id, title, created_at
        FROM quizzes
        WHERE lesson_id = $1
        ORDER BY id
        "#,
    )
    .bind(lesson_id)
    .fetch_all(&pool)
    .await?;

    let mut public = Vec::with_capacity(quizzes.len());
    for quiz in quizzes {
        let questions = load_question_tree(&pool, quiz.id)
            .await?
            .into_iter()
            .map(|detail| PublicQuestion {
                id: detail.question.id,
                question_type: detail.question.question_type,
                text: detail.question.text,
                answers: detail
                    .answers
                    .into_iter()
                    .map(|a| PublicAnswer {
                        id: a.id,
                        text: a.text,
                    })
                    .collect(),
            })
            .collect();

        public.push(PublicQuiz {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            questions,
        });
    }

    Ok(Json(public))
}

/// Submits a user's quiz answers and records the scored attempt.
///
/// One attempt per (user, quiz): a second submission is rejected with 409.
/// Each question is worth one point; percentage = score / total * 100;
/// passed at 70% or above. The attempt and its response rows are inserted
/// inside one transaction.
pub async fn submit_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.responses.is_empty() {
        return Err(AppError::BadRequest("No answers submitted".to_string()));
    }

    let user_id = claims.user_id();

    let quiz = sqlx::query_as::<_, Quiz>(
        "SELECT id, lesson_id, title, created_at FROM quizzes WHERE id = $1",
    )
    .bind(req.quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let existing = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
    )
    .bind(user_id)
    .bind(quiz.id)
    .fetch_optional(&pool)
    .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(
            "Quiz has already been submitted".to_string(),
        ));
    }

    let questions = load_question_tree(&pool, quiz.id).await?;
    let by_id: HashMap<i64, &QuestionDetail> =
        questions.iter().map(|q| (q.question.id, q)).collect();

    // Every submitted response must target a question of this quiz, once.
    let mut seen = HashSet::new();
    for response in &req.responses {
        if !by_id.contains_key(&response.question_id) {
            return Err(AppError::NotFound(format!(
                "Question {} not found in quiz {}",
                response.question_id, quiz.id
            )));
        }
        if !seen.insert(response.question_id) {
            return Err(AppError::BadRequest(format!(
                "Duplicate response for question {}",
                response.question_id
            )));
        }
    }

    let total_questions = questions.len() as i32;
    let mut score = 0;
    let mut graded = Vec::with_capacity(req.responses.len());

    for response in &req.responses {
        let detail = by_id[&response.question_id];
        let correct = judge_response(&detail.question.question_type, &detail.answers, response);
        if correct {
            score += POINTS_PER_QUESTION;
        }
        graded.push((response, correct));
    }

    let percentage = f64::from(score) / f64::from(total_questions) * 100.0;
    let passed = percentage >= PASSING_SCORE_PERCENTAGE;
    let completed_at = Utc::now();

    let mut tx = pool.begin().await?;

    let attempt_id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO quiz_attempts
            (user_id, quiz_id, score, total_questions, percentage, passed, status, completed_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind(quiz.id)
    .bind(score)
    .bind(total_questions)
    .bind(percentage)
    .bind(passed)
    .bind(STATUS_COMPLETED)
    .bind(completed_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match AppError::from(e) {
        // Concurrent duplicate submission loses to the unique constraint
        AppError::Conflict(_) => {
            AppError::Conflict("Quiz has already been submitted".to_string())
        }
        other => {
            tracing::error!("Failed to insert quiz attempt: {}", other);
            other
        }
    })?;

    for (response, correct) in &graded {
        sqlx::query(
            r#"
            INSERT INTO question_responses
                (attempt_id, question_id, selected_answer_id, text_response, correct)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(attempt_id)
        .bind(response.question_id)
        .bind(response.selected_answer_id)
        .bind(&response.text_response)
        .bind(correct)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "User {} scored {}/{} on quiz {} (passed: {})",
        user_id,
        score,
        total_questions,
        quiz.id,
        passed
    );

    let question_results = graded
        .into_iter()
        .map(|(response, correct)| QuestionResult {
            question_id: response.question_id,
            correct,
            points: if correct { POINTS_PER_QUESTION } else { 0 },
        })
        .collect();

    Ok(Json(QuizResultResponse {
        attempt_id,
        quiz_id: quiz.id,
        quiz_title: quiz.title,
        score,
        total_questions,
        percentage,
        passed,
        completed_at,
        question_results,
    }))
}

/// Returns the unique attempt for (user, quiz), or JSON null.
pub async fn get_attempt(
    State(pool): State<PgPool>,
    Path((user_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = sqlx::query_as::<_, QuizAttempt>(
        r#"
        SELECT id, user_id, quiz_id, score, total_questions, percentage,
               passed, status, completed_at, created_at
        FROM quiz_attempts
        WHERE user_id = $1 AND quiz_id = $2
        "#,
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?;

    Ok(Json(attempt))
}

/// Returns the recorded responses of the unique attempt for (user, quiz),
/// with each question's judged correctness.
pub async fn get_attempt_responses(
    State(pool): State<PgPool>,
    Path((user_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let attempt_id = sqlx::query_scalar::<_, i64>(
        "SELECT id FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .ok_or(AppError::NotFound("Attempt not found".to_string()))?;

    let responses = sqlx::query_as::<_, QuestionResponse>(
        r#"
        SELECT id, attempt_id, question_id, selected_answer_id, text_response, correct
        FROM question_responses
        WHERE attempt_id = $1
        ORDER BY question_id
        "#,
    )
    .bind(attempt_id)
    .fetch_all(&pool)
    .await?;

    Ok(Json(responses))
}

/// Returns whether the user has a passing attempt for the quiz.
pub async fn has_passed(
    State(pool): State<PgPool>,
    Path((user_id, quiz_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    let passed = sqlx::query_scalar::<_, bool>(
        "SELECT passed FROM quiz_attempts WHERE user_id = $1 AND quiz_id = $2",
    )
    .bind(user_id)
    .bind(quiz_id)
    .fetch_optional(&pool)
    .await?
    .unwrap_or(false);

    Ok(Json(serde_json::json!({ "passed": passed })))
}
