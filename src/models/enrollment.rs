// src/models/enrollment.rs

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{engine::EngineError, models::course::Course};

/// Last achieved score per quiz.
///
/// Keys are only ever written through `record`, which checks them against
/// the owning course's quizzes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuizScores(BTreeMap<String, u8>);

impl QuizScores {
    pub fn get(&self, quiz_id: &str) -> Option<u8> {
        self.0.get(quiz_id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stores `score` as the latest result for `quiz_id`, replacing any
    /// earlier one. Returns the previous score.
    pub fn record(
        &mut self,
        course: &Course,
        quiz_id: &str,
        score: u8,
    ) -> Result<Option<u8>, EngineError> {
        if !course.has_quiz(quiz_id) {
            return Err(EngineError::UnknownQuiz(quiz_id.to_owned()));
        }
        Ok(self.0.insert(quiz_id.to_owned(), score.min(100)))
    }
}

/// One learner's state in one course. Keyed by `(user_id, course_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: i64,
    pub course_id: i64,

    /// Display value in 0..=100, always derived from `completed_modules`.
    pub progress: u8,

    pub completed_modules: BTreeSet<String>,

    #[serde(default)]
    pub quiz_scores: QuizScores,
}

impl Enrollment {
    /// Fresh enrollment: nothing completed, progress 0.
    pub fn new(user_id: i64, course_id: i64) -> Self {
        Self {
            user_id,
            course_id,
            progress: 0,
            completed_modules: BTreeSet::new(),
            quiz_scores: QuizScores::default(),
        }
    }

    pub fn key(&self) -> (i64, i64) {
        (self.user_id, self.course_id)
    }

    pub fn has_completed(&self, module_id: &str) -> bool {
        self.completed_modules.contains(module_id)
    }
}

/// DTO for a quiz attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// Key: question id. Value: chosen option index.
    /// Indices are signed so that any out-of-range pick grades as wrong
    /// instead of failing to parse.
    #[serde(default)]
    pub answers: HashMap<String, i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::{CourseMode, Question, Quiz};

    fn course_with_quiz(quiz_id: &str) -> Course {
        Course {
            id: 1,
            title: "T".to_string(),
            description: "D".to_string(),
            category: "C".to_string(),
            mode: CourseMode::SelfPaced,
            thumbnail: None,
            instructor_id: 1,
            instructor_name: "I".to_string(),
            modules: vec![],
            quizzes: vec![Quiz {
                id: quiz_id.to_string(),
                title: String::new(),
                questions: vec![Question {
                    id: "a".to_string(),
                    prompt: "?".to_string(),
                    options: vec!["x".to_string()],
                    correct_index: 0,
                }],
            }],
            created_at: None,
        }
    }

    #[test]
    fn test_new_enrollment_is_not_started() {
        let e = Enrollment::new(4, 9);
        assert_eq!(e.key(), (4, 9));
        assert_eq!(e.progress, 0);
        assert!(e.completed_modules.is_empty());
        assert!(e.quiz_scores.is_empty());
    }

    #[test]
    fn test_record_keeps_last_score() {
        let course = course_with_quiz("q1");
        let mut scores = QuizScores::default();

        assert_eq!(scores.record(&course, "q1", 100).unwrap(), None);
        assert_eq!(scores.record(&course, "q1", 0).unwrap(), Some(100));
        assert_eq!(scores.get("q1"), Some(0));
    }

    #[test]
    fn test_record_rejects_unknown_quiz() {
        let course = course_with_quiz("q1");
        let mut scores = QuizScores::default();

        let err = scores.record(&course, "q9", 50).unwrap_err();
        assert_eq!(err, EngineError::UnknownQuiz("q9".to_string()));
        assert!(scores.is_empty());
    }

    #[test]
    fn test_enrollment_json_shape() {
        let course = course_with_quiz("q1");
        let mut e = Enrollment::new(1, 2);
        e.completed_modules.insert("m1".to_string());
        e.quiz_scores.record(&course, "q1", 50).unwrap();

        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["completed_modules"], serde_json::json!(["m1"]));
        assert_eq!(json["quiz_scores"]["q1"], 50);
    }
}
