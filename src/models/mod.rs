// src/models/mod.rs

pub mod course;
pub mod enrollment;
pub mod user;
