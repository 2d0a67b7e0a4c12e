// src/models/mod.rs

pub mod attempt;
pub mod category;
pub mod course;
pub mod course_module;
pub mod enrollment;
pub mod lesson;
pub mod progress;
pub mod quiz;
pub mod resource;
pub mod review;
pub mod user;
