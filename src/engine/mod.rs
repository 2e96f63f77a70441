// src/engine/mod.rs

//! Course-progress and assessment logic.
//!
//! Pure and synchronous: callers load the course and enrollment, call in
//! here, and persist whatever enrollment comes back.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::{
    course::{Course, ModuleKind},
    enrollment::Enrollment,
};

pub mod progress;
pub mod scorer;

pub use progress::{
    ActiveModule, Completion, EnrollmentState, complete_module, enrollment_state, progress_for,
    select_active_module, stale_completions,
};
pub use scorer::{PASS_THRESHOLD, QuestionOutcome, QuizResult, score};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("module '{0}' does not exist in this course")]
    ModuleNotFound(String),

    #[error("quiz '{0}' is unavailable")]
    QuizNotFound(String),

    #[error("module '{0}' is a quiz and completes only by passing it")]
    QuizGated(String),

    #[error("module '{0}' is not a quiz")]
    NotAQuiz(String),

    #[error("quiz '{0}' does not belong to this course")]
    UnknownQuiz(String),
}

/// `round(100 * part / whole)` with half-up rounding; 0 when `whole` is 0.
pub(crate) fn percent(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let rounded = (200 * part + whole) / (2 * whole);
    rounded.min(100) as u8
}

/// Outcome of one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSubmission<'a> {
    pub result: QuizResult,
    /// Carries the recorded score, and the completion when passed.
    pub enrollment: Enrollment,
    /// Set only when the attempt passed.
    pub next: Option<ActiveModule<'a>>,
}

/// Completion path for video and text modules.
///
/// Quiz modules are refused here: they complete only through `submit_quiz`.
pub fn complete_viewed_module<'a>(
    course: &'a Course,
    enrollment: &Enrollment,
    module_id: &str,
) -> Result<Completion<'a>, EngineError> {
    let module = course
        .module(module_id)
        .ok_or_else(|| EngineError::ModuleNotFound(module_id.to_owned()))?;

    if module.kind == ModuleKind::Quiz {
        return Err(EngineError::QuizGated(module_id.to_owned()));
    }

    complete_module(course, enrollment, module_id)
}

/// Grades an attempt at the quiz hosted by `module_id`.
///
/// The score is always recorded. A pass also completes the module. A
/// module pointing at a quiz the course lacks yields `QuizNotFound` and
/// can never be completed until the course is fixed.
pub fn submit_quiz<'a>(
    course: &'a Course,
    enrollment: &Enrollment,
    module_id: &str,
    answers: &HashMap<String, i64>,
) -> Result<QuizSubmission<'a>, EngineError> {
    let module = course
        .module(module_id)
        .ok_or_else(|| EngineError::ModuleNotFound(module_id.to_owned()))?;
    let quiz_id = module
        .quiz_id()
        .ok_or_else(|| EngineError::NotAQuiz(module_id.to_owned()))?;
    let quiz = course
        .quiz(quiz_id)
        .ok_or_else(|| EngineError::QuizNotFound(quiz_id.to_owned()))?;

    let result = score(quiz, answers);

    let mut updated = enrollment.clone();
    updated.quiz_scores.record(course, quiz_id, result.score)?;

    if !result.passed {
        return Ok(QuizSubmission {
            result,
            enrollment: updated,
            next: None,
        });
    }

    let completion = complete_module(course, &updated, module_id)?;
    Ok(QuizSubmission {
        result,
        enrollment: completion.enrollment,
        next: Some(completion.next),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::{CourseMode, Module, Question, Quiz};

    fn module(id: &str, kind: ModuleKind, content: &str) -> Module {
        Module {
            id: id.to_string(),
            title: id.to_string(),
            kind,
            content: content.to_string(),
            duration: None,
        }
    }

    /// m1(text), m2(video), m3(quiz -> q1 with one question).
    fn sample_course() -> Course {
        Course {
            id: 1,
            title: "Web".to_string(),
            description: "Basics".to_string(),
            category: "Development".to_string(),
            mode: CourseMode::SelfPaced,
            thumbnail: None,
            instructor_id: 2,
            instructor_name: "Jane".to_string(),
            modules: vec![
                module("m1", ModuleKind::Text, "Intro"),
                module("m2", ModuleKind::Video, "https://example.com/v"),
                module("m3", ModuleKind::Quiz, "q1"),
            ],
            quizzes: vec![Quiz {
                id: "q1".to_string(),
                title: "Check".to_string(),
                questions: vec![Question {
                    id: "qq1".to_string(),
                    prompt: "What does HTML stand for?".to_string(),
                    options: vec!["Hyper Text Markup Language".into(), "Other".into()],
                    correct_index: 0,
                }],
            }],
            created_at: None,
        }
    }

    fn answers(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_percent_rounding() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 2), 50);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn test_sequential_scenario() {
        let course = sample_course();
        let e = Enrollment::new(10, 1);
        assert_eq!(
            select_active_module(&course, &e).module().map(|m| m.id.as_str()),
            Some("m1")
        );

        let c1 = complete_viewed_module(&course, &e, "m1").unwrap();
        assert_eq!(c1.enrollment.progress, 33);
        assert_eq!(c1.next.module().map(|m| m.id.as_str()), Some("m2"));

        let c2 = complete_viewed_module(&course, &c1.enrollment, "m2").unwrap();
        assert_eq!(c2.enrollment.progress, 67);
        assert_eq!(c2.next.module().map(|m| m.id.as_str()), Some("m3"));

        let sub = submit_quiz(&course, &c2.enrollment, "m3", &answers(&[("qq1", 0)])).unwrap();
        assert_eq!(sub.result.score, 100);
        assert!(sub.result.passed);
        assert_eq!(sub.enrollment.progress, 100);
        assert_eq!(sub.enrollment.quiz_scores.get("q1"), Some(100));
        assert_eq!(sub.next, Some(ActiveModule::CourseComplete));
        assert_eq!(
            select_active_module(&course, &sub.enrollment),
            ActiveModule::CourseComplete
        );
    }

    #[test]
    fn test_failed_quiz_records_score_without_completing() {
        let course = sample_course();
        let e = Enrollment::new(10, 1);

        let sub = submit_quiz(&course, &e, "m3", &answers(&[("qq1", 1)])).unwrap();
        assert_eq!(sub.result.score, 0);
        assert!(!sub.result.passed);
        assert_eq!(sub.next, None);
        assert!(!sub.enrollment.has_completed("m3"));
        assert_eq!(sub.enrollment.progress, 0);
        assert_eq!(sub.enrollment.quiz_scores.get("q1"), Some(0));

        // Retrying after a fail grades from scratch.
        let retry = submit_quiz(&course, &sub.enrollment, "m3", &answers(&[("qq1", 0)])).unwrap();
        assert!(retry.result.passed);
        assert!(retry.enrollment.has_completed("m3"));
        assert_eq!(retry.enrollment.quiz_scores.get("q1"), Some(100));
    }

    #[test]
    fn test_quiz_module_cannot_be_completed_directly() {
        let course = sample_course();
        let err = complete_viewed_module(&course, &Enrollment::new(1, 1), "m3").unwrap_err();
        assert_eq!(err, EngineError::QuizGated("m3".to_string()));
    }

    #[test]
    fn test_dangling_quiz_reference_never_completes() {
        let mut course = sample_course();
        course.quizzes.clear();
        let e = Enrollment::new(1, 1);

        let err = submit_quiz(&course, &e, "m3", &answers(&[("qq1", 0)])).unwrap_err();
        assert_eq!(err, EngineError::QuizNotFound("q1".to_string()));
        assert_eq!(
            complete_viewed_module(&course, &e, "m3").unwrap_err(),
            EngineError::QuizGated("m3".to_string())
        );
    }

    #[test]
    fn test_submit_on_non_quiz_module() {
        let course = sample_course();
        let e = Enrollment::new(1, 1);
        assert_eq!(
            submit_quiz(&course, &e, "m1", &HashMap::new()).unwrap_err(),
            EngineError::NotAQuiz("m1".to_string())
        );
        assert_eq!(
            submit_quiz(&course, &e, "nope", &HashMap::new()).unwrap_err(),
            EngineError::ModuleNotFound("nope".to_string())
        );
    }
}
