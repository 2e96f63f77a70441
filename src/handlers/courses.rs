// src/handlers/courses.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    handlers::load_course,
    models::course::{Course, CourseSummary, DraftCourse, PublicCourse},
    store::Storage,
    utils::jwt::{Claims, Session},
};

fn ensure_manager(session: &Session, course: &Course) -> Result<(), AppError> {
    if session.can_manage(course) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the course instructor or an admin may do this".to_string(),
        ))
    }
}

/// Course catalog. Public.
pub async fn list_courses(State(storage): State<Storage>) -> Result<impl IntoResponse, AppError> {
    let courses = storage.courses.list().await.map_err(|e| {
        tracing::error!("Failed to list courses: {:?}", e);
        AppError::from(e)
    })?;

    let counts = storage.enrollments.count_by_course().await?;
    let summaries: Vec<CourseSummary> = courses
        .iter()
        .map(|course| CourseSummary::new(course, counts.get(&course.id).copied().unwrap_or(0)))
        .collect();

    Ok(Json(summaries))
}

/// Learner view of one course; quiz answers are withheld. Public.
pub async fn get_course(
    State(storage): State<Storage>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let course = load_course(&storage, id).await?;
    Ok(Json(PublicCourse::from(&course)))
}

/// Full course, answers included, for the people who edit it.
pub async fn get_course_full(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, id).await?;
    ensure_manager(&session, &course)?;
    Ok(Json(course))
}

/// Creates a course owned by the calling instructor (or admin).
pub async fn create_course(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Json(draft): Json<DraftCourse>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let author = storage
        .users
        .get(session.user_id)
        .await?
        .ok_or(AppError::AuthError("User no longer exists".to_string()))?;

    let validated = draft.finalize(author.id, author.name)?;
    let course = storage.courses.create(validated).await?;

    tracing::info!(course_id = course.id, title = %course.title, "Course created");
    Ok((StatusCode::CREATED, Json(course)))
}

/// Replaces a course. Ownership stays with the original instructor.
///
/// Enrollments are not touched: completed ids of removed modules simply
/// stop counting.
pub async fn update_course(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(draft): Json<DraftCourse>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let existing = load_course(&storage, id).await?;
    ensure_manager(&session, &existing)?;

    let validated = draft.finalize(existing.instructor_id, existing.instructor_name)?;
    let course = storage.courses.update(id, validated).await?;

    tracing::info!(course_id = id, "Course updated");
    Ok(Json(course))
}

/// Deletes a course. Its enrollments are orphaned, not removed.
pub async fn delete_course(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let existing = load_course(&storage, id).await?;
    ensure_manager(&session, &existing)?;

    storage.courses.delete(id).await?;

    tracing::info!(course_id = id, "Course deleted");
    Ok(StatusCode::NO_CONTENT)
}
