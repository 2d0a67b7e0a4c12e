// src/routes.rs

use std::time::Duration;

use axum::{
    Router, http::Method, middleware,
    routing::{delete, get, post, put},
};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    error::error_envelope_middleware,
    handlers::{
        auth, categories, courses, enrollments, lessons, modules, progress, quizzes, resources,
        reviews, users,
    },
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// Every module is wired here explicitly; the route surface is the full
/// dependency graph, visible at compile time.
/// * Merges all sub-routers (auth, catalog, quizzes, progress, ...).
/// * Applies global middleware (Trace, CORS, request timeout).
/// * Injects global state (Database Pool + Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let user_routes = Router::new()
        .route("/me", get(users::get_me))
        .layer(require_auth.clone())
        .merge(
            Router::new()
                .route("/", get(users::list_users))
                .route(
                    "/{id}",
                    put(users::update_user).delete(users::delete_user),
                )
                // Double middleware protection: Auth first, then Admin check
                .layer(middleware::from_fn(admin_middleware))
                .layer(require_auth.clone()),
        );

    let category_routes = Router::new()
        .route("/", get(categories::list_categories))
        .route("/{id}", get(categories::get_category))
        .merge(
            Router::new()
                .route("/", post(categories::create_category))
                .route(
                    "/{id}",
                    put(categories::update_category).delete(categories::delete_category),
                )
                .layer(middleware::from_fn(admin_middleware))
                .layer(require_auth.clone()),
        );

    let course_routes = Router::new()
        .route("/", get(courses::list_courses))
        .route("/{id}", get(courses::get_course))
        .route("/{id}/modules", get(modules::list_course_modules))
        .merge(
            Router::new()
                .route("/", post(courses::create_course))
                .route(
                    "/{id}",
                    put(courses::update_course).delete(courses::delete_course),
                )
                .layer(require_auth.clone()),
        );

    let module_routes = Router::new()
        .route("/{id}/lessons", get(lessons::list_module_lessons))
        .merge(
            Router::new()
                .route("/", post(modules::create_module))
                .route(
                    "/{id}",
                    put(modules::update_module).delete(modules::delete_module),
                )
                .layer(require_auth.clone()),
        );

    let lesson_routes = Router::new()
        .route("/{id}", get(lessons::get_lesson))
        .merge(
            Router::new()
                .route("/", post(lessons::create_lesson))
                .route(
                    "/{id}",
                    put(lessons::update_lesson).delete(lessons::delete_lesson),
                )
                .layer(require_auth.clone()),
        );

    let quiz_routes = Router::new()
        .route("/lesson/{lesson_id}", get(quizzes::list_lesson_quizzes))
        .route("/attempt/{user_id}/{quiz_id}", get(quizzes::get_attempt))
        .route(
            "/attempt/{user_id}/{quiz_id}/responses",
            get(quizzes::get_attempt_responses),
        )
        .route("/passed/{user_id}/{quiz_id}", get(quizzes::has_passed))
        .merge(
            Router::new()
                .route("/", post(quizzes::create_quiz))
                .route("/{id}", get(quizzes::get_quiz))
                .route("/submit", post(quizzes::submit_quiz))
                .layer(require_auth.clone()),
        );

    let enrollment_routes = Router::new()
        .route("/user/{user_id}", get(enrollments::list_user_enrollments))
        .route("/{id}", get(enrollments::get_enrollment))
        .merge(
            Router::new()
                .route("/", post(enrollments::enroll))
                .layer(require_auth.clone()),
        );

    let progress_routes = Router::new()
        .route("/analytics/overview", get(progress::get_analytics))
        .route("/{enrollment_id}", get(progress::get_progress))
        .route(
            "/{enrollment_id}/completion-rate",
            get(progress::get_completion_rate),
        )
        .merge(
            Router::new()
                .route("/update", post(progress::update_progress))
                .layer(require_auth.clone()),
        );

    let review_routes = Router::new()
        .route("/course/{course_id}", get(reviews::list_course_reviews))
        .merge(
            Router::new()
                .route("/", post(reviews::create_review))
                .layer(require_auth.clone()),
        );

    let resource_routes = Router::new()
        .route("/lesson/{lesson_id}", get(resources::list_lesson_resources))
        .merge(
            Router::new()
                .route("/", post(resources::create_resource))
                .route("/{id}", delete(resources::delete_resource))
                .layer(require_auth),
        );

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/modules", module_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/enrollments", enrollment_routes)
        .nest("/api/course-progress", progress_routes)
        .nest("/api/reviews", review_routes)
        .nest("/api/resources", resource_routes)
        // Global Middleware (applied from outside in)
        .layer(middleware::from_fn(error_envelope_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(cors)
        .with_state(state)
}
