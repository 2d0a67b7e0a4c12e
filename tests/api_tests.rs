// tests/api_tests.rs

mod common;

use common::{create_admin, create_category, create_course_with_lesson, register_and_login, spawn_app};

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": unique_name,
            "email": format!("{}@example.com", unique_name),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn register_fails_validation() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "yo",
            "email": "yo@example.com",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let unique_name = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
    let body = serde_json::json!({
        "username": unique_name,
        "email": format!("{}@example.com", unique_name),
        "password": "password123"
    });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn me_requires_valid_token() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // No token
    let response = client
        .get(format!("{}/api/users/me", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // A token-shaped string with no valid signature is still rejected
    let response = client
        .get(format!("{}/api/users/me", address))
        .bearer_auth("this-is-not-a-real-token-but-is-long")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    // A real login works
    let (user_id, token) = register_and_login(&client, &address, "student").await;
    let response = client
        .get(format!("{}/api/users/me", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let me: serde_json::Value = response.json().await.unwrap();
    assert_eq!(me["id"].as_i64().unwrap(), user_id);
}

#[tokio::test]
async fn category_deletion_blocked_by_courses() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let admin_token = create_admin(&client, &address, &pool).await;
    let category_id = create_category(&client, &address, &admin_token).await;

    let (_instructor_id, instructor_token) =
        register_and_login(&client, &address, "instructor").await;
    let (course_id, _lesson_id) =
        create_course_with_lesson(&client, &address, &instructor_token, category_id).await;

    // Delete blocked while a course references the category
    let response = client
        .delete(format!("{}/api/categories/{}", address, category_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Remove the course, then deletion succeeds
    let response = client
        .delete(format!("{}/api/courses/{}", address, course_id))
        .bearer_auth(&instructor_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    let response = client
        .delete(format!("{}/api/categories/{}", address, category_id))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["deleted"], true);
}

#[tokio::test]
async fn course_mutation_forbidden_for_non_owner() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let admin_token = create_admin(&client, &address, &pool).await;
    let category_id = create_category(&client, &address, &admin_token).await;

    let (_owner_id, owner_token) = register_and_login(&client, &address, "instructor").await;
    let (course_id, _lesson_id) =
        create_course_with_lesson(&client, &address, &owner_token, category_id).await;

    let (_other_id, other_token) = register_and_login(&client, &address, "instructor").await;

    let response = client
        .put(format!("{}/api/courses/{}", address, course_id))
        .bearer_auth(&other_token)
        .json(&serde_json::json!({ "title": "Hijacked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn reviews_require_enrollment_and_are_unique() {
    let Some((address, pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let admin_token = create_admin(&client, &address, &pool).await;
    let category_id = create_category(&client, &address, &admin_token).await;
    let (_instructor_id, instructor_token) =
        register_and_login(&client, &address, "instructor").await;
    let (course_id, _lesson_id) =
        create_course_with_lesson(&client, &address, &instructor_token, category_id).await;

    let (_student_id, student_token) = register_and_login(&client, &address, "student").await;
    let review_body = serde_json::json!({
        "course_id": course_id,
        "rating": 4,
        "comment": "Solid material."
    });

    // Not enrolled yet
    let response = client
        .post(format!("{}/api/reviews", address))
        .bearer_auth(&student_token)
        .json(&review_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);

    let response = client
        .post(format!("{}/api/enrollments", address))
        .bearer_auth(&student_token)
        .json(&serde_json::json!({ "course_id": course_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    let response = client
        .post(format!("{}/api/reviews", address))
        .bearer_auth(&student_token)
        .json(&review_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // One review per (user, course)
    let response = client
        .post(format!("{}/api/reviews", address))
        .bearer_auth(&student_token)
        .json(&review_body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    let response = client
        .get(format!("{}/api/reviews/course/{}", address, course_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["average_rating"], 4.0);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn error_envelope_is_structured() {
    let Some((address, _pool)) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/courses/999999999", address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].is_string());
    assert!(body["timestamp"].is_string());
    assert_eq!(body["path"], "/api/courses/999999999");
    assert_eq!(body["method"], "GET");
}
