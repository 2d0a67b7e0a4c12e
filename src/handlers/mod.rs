// src/handlers/mod.rs

pub mod auth;
pub mod categories;
pub mod courses;
pub mod enrollments;
pub mod lessons;
pub mod modules;
pub mod progress;
pub mod quizzes;
pub mod resources;
pub mod reviews;
pub mod users;
