// tests/common/mod.rs

use lms_backend::{config::Config, routes, state::AppState, utils::password::hash_password};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Spawns the app on a random port against the DATABASE_URL database.
/// Returns `None` when DATABASE_URL is not set, so tests can skip instead
/// of failing on machines without Postgres.
pub async fn spawn_app() -> Option<(String, PgPool)> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
    };

    let state = AppState::new(pool.clone(), config);

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Some((address, pool))
}

/// Registers a user through the API and returns (user_id, token).
pub async fn register_and_login(
    client: &reqwest::Client,
    address: &str,
    role: &str,
) -> (i64, String) {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let username = format!("u_{}", suffix);
    let email = format!("{}@example.com", username);

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "email": email,
            "password": "password123",
            "role": role
        }))
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(response.status().as_u16(), 201);
    let user: serde_json::Value = response.json().await.unwrap();
    let user_id = user["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to login");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    (user_id, body["token"].as_str().unwrap().to_string())
}

/// Inserts an admin directly (registration never grants 'admin') and logs
/// in through the API.
pub async fn create_admin(client: &reqwest::Client, address: &str, pool: &PgPool) -> String {
    let suffix = &uuid::Uuid::new_v4().to_string()[..8];
    let email = format!("admin_{}@example.com", suffix);
    let hashed = hash_password("password123").unwrap();

    sqlx::query("INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, 'admin')")
        .bind(format!("admin_{}", suffix))
        .bind(&email)
        .bind(hashed)
        .execute(pool)
        .await
        .expect("Failed to seed admin");

    let response = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "email": email,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to login as admin");
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    body["token"].as_str().unwrap().to_string()
}

/// Creates a category as admin and returns its id.
pub async fn create_category(
    client: &reqwest::Client,
    address: &str,
    admin_token: &str,
) -> i64 {
    let response = client
        .post(format!("{}/api/categories", address))
        .bearer_auth(admin_token)
        .json(&serde_json::json!({
            "name": format!("Category {}", uuid::Uuid::new_v4()),
            "description": "test category"
        }))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

/// Builds course -> module -> lesson as the given instructor, publishes
/// the course, and returns (course_id, lesson_id).
pub async fn create_course_with_lesson(
    client: &reqwest::Client,
    address: &str,
    instructor_token: &str,
    category_id: i64,
) -> (i64, i64) {
    let response = client
        .post(format!("{}/api/courses", address))
        .bearer_auth(instructor_token)
        .json(&serde_json::json!({
            "title": "Geography 101",
            "description": "Capitals of the world",
            "category_id": category_id,
            "price": 0.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let course: serde_json::Value = response.json().await.unwrap();
    let course_id = course["id"].as_i64().unwrap();

    let response = client
        .put(format!("{}/api/courses/{}", address, course_id))
        .bearer_auth(instructor_token)
        .json(&serde_json::json!({ "published": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/modules", address))
        .bearer_auth(instructor_token)
        .json(&serde_json::json!({
            "course_id": course_id,
            "title": "Module 1",
            "position": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let module: serde_json::Value = response.json().await.unwrap();
    let module_id = module["id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/api/lessons", address))
        .bearer_auth(instructor_token)
        .json(&serde_json::json!({
            "module_id": module_id,
            "title": "European capitals",
            "content": "<p>Paris is the capital of France.</p>",
            "position": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let lesson: serde_json::Value = response.json().await.unwrap();

    (course_id, lesson["id"].as_i64().unwrap())
}
