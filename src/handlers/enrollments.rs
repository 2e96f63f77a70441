// src/handlers/enrollments.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    engine::{self, EngineError},
    error::AppError,
    handlers::{load_course, load_enrollment},
    models::enrollment::SubmitQuizRequest,
    store::{StoreError, Storage},
    utils::jwt::Claims,
};

/// Logs data-consistency problems before they turn into a response.
fn log_engine_error(course_id: i64, err: &EngineError) {
    match err {
        EngineError::ModuleNotFound(module_id) => {
            tracing::warn!(course_id, module_id = %module_id, "Module not found in course");
        }
        EngineError::QuizNotFound(quiz_id) | EngineError::UnknownQuiz(quiz_id) => {
            tracing::warn!(course_id, quiz_id = %quiz_id, "Quiz module points at a missing quiz");
        }
        _ => {}
    }
}

/// Enrolls the caller in a course.
///
/// Returns 201 with the fresh enrollment, 409 if already enrolled.
pub async fn enroll(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, course_id).await?;

    let enrollment = storage
        .enrollments
        .create(session.user_id, course.id)
        .await
        .map_err(|e| match e {
            StoreError::Conflict => {
                AppError::Conflict("Already enrolled in this course".to_string())
            }
            other => AppError::from(other),
        })?;

    tracing::info!(user_id = session.user_id, course_id, "Learner enrolled");
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// The caller's enrollments.
pub async fn list_my_enrollments(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let enrollments = storage.enrollments.list_by_user(session.user_id).await?;
    Ok(Json(enrollments))
}

/// Everyone enrolled in a course. Course instructor or admin only.
pub async fn list_course_enrollments(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, course_id).await?;
    if !session.can_manage(&course) {
        return Err(AppError::Forbidden(
            "Only the course instructor or an admin may do this".to_string(),
        ));
    }

    let enrollments = storage.enrollments.list_by_course(course_id).await?;
    Ok(Json(enrollments))
}

/// Where the caller stands in a course and which module to show next.
pub async fn get_progress(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, course_id).await?;
    let mut enrollment = load_enrollment(&storage, &session, course_id).await?;

    // Stored progress goes stale when the course's module list changes.
    enrollment.progress = engine::progress_for(&course, &enrollment.completed_modules);

    let stale = engine::stale_completions(&course, &enrollment);
    if !stale.is_empty() {
        tracing::warn!(
            course_id,
            user_id = session.user_id,
            stale = ?stale,
            "Enrollment references modules the course no longer has"
        );
    }

    let active = engine::select_active_module(&course, &enrollment);
    let state = engine::enrollment_state(&course, &enrollment);

    Ok(Json(json!({
        "enrollment": enrollment,
        "state": state,
        "active": active
    })))
}

/// Marks a video or text module as done and advances.
pub async fn complete_module(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path((course_id, module_id)): Path<(i64, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, course_id).await?;
    let enrollment = load_enrollment(&storage, &session, course_id).await?;

    let completion = engine::complete_viewed_module(&course, &enrollment, &module_id)
        .inspect_err(|e| log_engine_error(course_id, e))?;

    storage.enrollments.update(&completion.enrollment).await?;

    tracing::info!(
        user_id = session.user_id,
        course_id,
        module_id = %module_id,
        progress = completion.enrollment.progress,
        "Module completed"
    );

    Ok(Json(json!({
        "enrollment": completion.enrollment,
        "next": completion.next
    })))
}

/// Grades a quiz attempt for a quiz module.
///
/// The score is stored whatever the outcome; a pass also completes the
/// module. A failing attempt does not advance and may be retried.
pub async fn submit_quiz(
    State(storage): State<Storage>,
    Extension(claims): Extension<Claims>,
    Path((course_id, module_id)): Path<(i64, String)>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let course = load_course(&storage, course_id).await?;
    let enrollment = load_enrollment(&storage, &session, course_id).await?;

    let submission = engine::submit_quiz(&course, &enrollment, &module_id, &req.answers)
        .inspect_err(|e| log_engine_error(course_id, e))?;

    storage.enrollments.update(&submission.enrollment).await?;

    let result = submission.result;
    tracing::info!(
        user_id = session.user_id,
        course_id,
        module_id = %module_id,
        score = result.score,
        passed = result.passed,
        "Quiz submitted"
    );

    Ok(Json(json!({
        "score": result.score,
        "passed": result.passed,
        "questions": result.questions,
        "enrollment": submission.enrollment,
        "next": submission.next,
        "message": if result.passed { "Module completed." } else { "Score too low. Try again to proceed." }
    })))
}
