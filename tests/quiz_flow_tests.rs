// tests/quiz_flow_tests.rs
//
// End-to-end coverage of the quiz submission and progress-gating flow:
// definition validation, one-attempt scoring, the gate on lesson
// completion, and the completion-rate read path.

mod common;

use common::{create_admin, create_category, create_course_with_lesson, register_and_login, spawn_app};

/// Creates a single-choice Paris/London quiz and returns
/// (quiz_id, correct_answer_id, wrong_answer_id).
async fn create_capital_quiz(
    client: &reqwest::Client,
    address: &str,
    instructor_token: &str,
    lesson_id: i64,
) -> (i64, i64, i64) {
    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(instructor_token)
        .json(&serde_json::json!({
            "lesson_id": lesson_id,
            "title": "Capitals quiz",
            "questions": [{
                "type": "single_choice",
                "text": "What is the capital of France?",
                "answers": [
                    { "text": "Paris", "correct": true },
                    { "text": "London", "correct": false }
                ]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let quiz: serde_json::Value = response.json().await.unwrap();
    let quiz_id = quiz["id"].as_i64().unwrap();
    let answers = quiz["questions"][0]["answers"].as_array().unwrap();
    let correct = answers
        .iter()
        .find(|a| a["correct"] == true)
        .unwrap()["id"]
        .as_i64()
        .unwrap();
    let wrong = answers
        .iter()
        .find(|a| a["correct"] == false)
        .unwrap()["id"]
        .as_i64()
        .unwrap();

    (quiz_id, correct, wrong)
}

#[tokio::test]
async fn malformed_quiz_definitions_rejected() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let admin_token = create_admin(&client, &address, &pool).await;
    let category_id = create_category(&client, &address, &admin_token).await;
    let (_instructor_id, instructor_token) =
        register_and_login(&client, &address, "instructor").await;
    let (_course_id, lesson_id) =
        create_course_with_lesson(&client, &address, &instructor_token, category_id).await;

    // No questions at all
    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(&instructor_token)
        .json(&serde_json::json!({
            "lesson_id": lesson_id,
            "title": "Empty quiz",
            "questions": []
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Single-choice with two correct answers
    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(&instructor_token)
        .json(&serde_json::json!({
            "lesson_id": lesson_id,
            "title": "Broken quiz",
            "questions": [{
                "type": "single_choice",
                "text": "Pick one",
                "answers": [
                    { "text": "A", "correct": true },
                    { "text": "B", "correct": true }
                ]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Boolean whose answers are not a true/false or yes/no pair
    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(&instructor_token)
        .json(&serde_json::json!({
            "lesson_id": lesson_id,
            "title": "Broken boolean",
            "questions": [{
                "type": "boolean",
                "text": "Is water wet?",
                "answers": [
                    { "text": "True", "correct": true },
                    { "text": "Maybe", "correct": false }
                ]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn quiz_submission_scores_and_gates_progress() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let admin_token = create_admin(&client, &address, &pool).await;
    let category_id = create_category(&client, &address, &admin_token).await;
    let (_instructor_id, instructor_token) =
        register_and_login(&client, &address, "instructor").await;
    let (course_id, lesson_id) =
        create_course_with_lesson(&client, &address, &instructor_token, category_id).await;
    let (quiz_id, correct_answer_id, _wrong_answer_id) =
        create_capital_quiz(&client, &address, &instructor_token, lesson_id).await;

    // Student enrolls
    let (student_id, student_token) = register_and_login(&client, &address, "student").await;
    let response = client
        .post(format!("{}/api/enrollments", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({ "course_id": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let enrollment: serde_json::Value = response.json().await.unwrap();
    let enrollment_id = enrollment["id"].as_i64().unwrap();

    // The gate: completing the lesson before passing its quiz fails
    let response = client
        .post(format!("{}/api/course-progress/update", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "enrollment_id": enrollment_id,
            "lesson_id": lesson_id,
            "status": "completed"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(
        body["message"].as_str().unwrap().contains("Capitals quiz"),
        "gate error should name the unpassed quiz"
    );

    // Non-completed statuses pass through the gate
    let response = client
        .post(format!("{}/api/course-progress/update", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "enrollment_id": enrollment_id,
            "lesson_id": lesson_id,
            "status": "in_progress"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    // Submit the quiz, selecting Paris
    let response = client
        .post(format!("{}/api/quizzes/submit", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "responses": [{
                "question_id": serde_json::Value::Null,
                "selected_answer_id": correct_answer_id
            }]
        }))
        .send()
        .await
        .unwrap();
    // question_id must be a real id; malformed body is a 4xx
    assert!(response.status().is_client_error());

    // Fetch the question id from the student-facing lesson quizzes
    let response = client
        .get(format!("{}/api/quizzes/lesson/{}", address, lesson_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let quizzes: serde_json::Value = response.json().await.unwrap();
    let question = &quizzes[0]["questions"][0];
    let question_id = question["id"].as_i64().unwrap();
    // Correct flags are hidden from the student view
    assert!(question["answers"][0].get("correct").is_none());

    let response = client
        .post(format!("{}/api/quizzes/submit", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "responses": [{
                "question_id": question_id,
                "selected_answer_id": correct_answer_id
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let result: serde_json::Value = response.json().await.unwrap();
    assert_eq!(result["score"], 1);
    assert_eq!(result["total_questions"], 1);
    assert_eq!(result["percentage"], 100.0);
    assert_eq!(result["passed"], true);
    assert_eq!(result["question_results"][0]["correct"], true);

    // One attempt per (user, quiz): resubmission conflicts
    let response = client
        .post(format!("{}/api/quizzes/submit", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "responses": [{
                "question_id": question_id,
                "selected_answer_id": correct_answer_id
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Attempt and passed lookups
    let response = client
        .get(format!(
            "{}/api/quizzes/attempt/{}/{}",
            address, student_id, quiz_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let attempt: serde_json::Value = response.json().await.unwrap();
    assert_eq!(attempt["passed"], true);
    assert_eq!(attempt["status"], "completed");

    let response = client
        .get(format!(
            "{}/api/quizzes/passed/{}/{}",
            address, student_id, quiz_id
        ))
        .send()
        .await
        .unwrap();
    let passed: serde_json::Value = response.json().await.unwrap();
    assert_eq!(passed["passed"], true);

    // The recorded responses carry what was submitted and how it was judged
    let response = client
        .get(format!(
            "{}/api/quizzes/attempt/{}/{}/responses",
            address, student_id, quiz_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let responses: serde_json::Value = response.json().await.unwrap();
    let rows = responses.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["question_id"].as_i64().unwrap(), question_id);
    assert_eq!(rows[0]["selected_answer_id"].as_i64().unwrap(), correct_answer_id);
    assert_eq!(rows[0]["correct"], true);

    // No attempt, no responses
    let response = client
        .get(format!(
            "{}/api/quizzes/attempt/999999/{}/responses",
            address, quiz_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    // With the quiz passed, the lesson can be completed
    let response = client
        .post(format!("{}/api/course-progress/update", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({
            "enrollment_id": enrollment_id,
            "lesson_id": lesson_id,
            "status": "completed"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let progress: serde_json::Value = response.json().await.unwrap();
    assert_eq!(progress["status"], "completed");

    // Completion rate over the single tracked lesson
    let response = client
        .get(format!(
            "{}/api/course-progress/{}/completion-rate",
            address, enrollment_id
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let rate: serde_json::Value = response.json().await.unwrap();
    assert_eq!(rate["completed"], 1);
    assert_eq!(rate["total"], 1);
    assert_eq!(rate["completionRate"], 100);

    // Analytics overview aggregates across all enrollments; values depend
    // on database contents, so only the shape is asserted here
    let response = client
        .get(format!(
            "{}/api/course-progress/analytics/overview",
            address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let analytics: serde_json::Value = response.json().await.unwrap();
    assert!(analytics["total"].as_i64().unwrap() >= 1);
    assert!(analytics["completionRate"].is_f64());
}

#[tokio::test]
async fn attempt_lookup_returns_null_when_absent() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/quizzes/attempt/999999/999999", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body.is_null());

    let response = client
        .get(format!("{}/api/quizzes/passed/999999/999999", address))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["passed"], false);
}
