// src/engine/progress.rs

//! Module traversal and completion percentage.
//!
//! Everything here is a pure function of a `Course` and an `Enrollment`.
//! Nothing is persisted; callers write the returned enrollment back.

use std::collections::BTreeSet;

use serde::Serialize;

use super::{EngineError, percent};
use crate::models::{
    course::{Course, Module},
    enrollment::Enrollment,
};

/// What the learner should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ActiveModule<'a> {
    Module { module: &'a Module },
    /// Terminal: every module is completed.
    CourseComplete,
    /// Terminal: the course has no modules. Not the same as completion.
    EmptyCourse,
}

impl<'a> ActiveModule<'a> {
    pub fn module(&self) -> Option<&'a Module> {
        match self {
            ActiveModule::Module { module } => Some(module),
            _ => None,
        }
    }
}

/// Coarse lifecycle of an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentState {
    NotStarted,
    InProgress,
    Complete,
}

/// Result of completing one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion<'a> {
    pub enrollment: Enrollment,
    /// Sequential advancement: the module right after the completed one,
    /// or `CourseComplete` when the completed module was the last.
    pub next: ActiveModule<'a>,
}

/// `round(100 * |completed ∩ modules| / |modules|)`, half-up.
///
/// Completed ids that are no longer in the course are ignored.
pub fn progress_for(course: &Course, completed: &BTreeSet<String>) -> u8 {
    let done = course
        .modules
        .iter()
        .filter(|m| completed.contains(&m.id))
        .count();
    percent(done, course.modules.len())
}

/// First module in course order that is not completed.
///
/// Routing never trusts the stored `progress` field: when every module is
/// in the completed set the derived progress is 100 by construction, and
/// when one is missing the scan result wins even if the stored field says
/// 100.
pub fn select_active_module<'a>(course: &'a Course, enrollment: &Enrollment) -> ActiveModule<'a> {
    if course.modules.is_empty() {
        return ActiveModule::EmptyCourse;
    }

    match course
        .modules
        .iter()
        .find(|m| !enrollment.has_completed(&m.id))
    {
        Some(module) => ActiveModule::Module { module },
        None => ActiveModule::CourseComplete,
    }
}

pub fn enrollment_state(course: &Course, enrollment: &Enrollment) -> EnrollmentState {
    match progress_for(course, &enrollment.completed_modules) {
        0 => EnrollmentState::NotStarted,
        100 => EnrollmentState::Complete,
        _ => EnrollmentState::InProgress,
    }
}

/// Completed ids the course no longer contains (e.g. after a module was
/// removed). They never block progress but are worth logging.
pub fn stale_completions<'e>(course: &Course, enrollment: &'e Enrollment) -> Vec<&'e str> {
    enrollment
        .completed_modules
        .iter()
        .filter(|id| course.module(id).is_none())
        .map(String::as_str)
        .collect()
}

/// Marks `module_id` completed and recomputes progress.
///
/// Idempotent: completing a module twice yields the same enrollment.
/// The completed set only grows.
pub fn complete_module<'a>(
    course: &'a Course,
    enrollment: &Enrollment,
    module_id: &str,
) -> Result<Completion<'a>, EngineError> {
    let index = course
        .module_index(module_id)
        .ok_or_else(|| EngineError::ModuleNotFound(module_id.to_owned()))?;

    let mut updated = enrollment.clone();
    updated.completed_modules.insert(module_id.to_owned());
    updated.progress = progress_for(course, &updated.completed_modules);

    let next = match course.modules.get(index + 1) {
        Some(module) => ActiveModule::Module { module },
        None => ActiveModule::CourseComplete,
    };

    Ok(Completion {
        enrollment: updated,
        next,
    })
}
