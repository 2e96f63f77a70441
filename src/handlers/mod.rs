// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod courses;
pub mod enrollments;

use crate::{
    error::AppError,
    models::{course::Course, enrollment::Enrollment},
    store::Storage,
    utils::jwt::Session,
};

/// Fetches a course or answers 404.
pub(crate) async fn load_course(storage: &Storage, course_id: i64) -> Result<Course, AppError> {
    storage
        .courses
        .get(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
}

/// Fetches the session's enrollment in `course_id`, or "must enroll first".
pub(crate) async fn load_enrollment(
    storage: &Storage,
    session: &Session,
    course_id: i64,
) -> Result<Enrollment, AppError> {
    storage
        .enrollments
        .get(session.user_id, course_id)
        .await?
        .ok_or_else(|| AppError::NotEnrolled("You must enroll in this course first".to_string()))
}
