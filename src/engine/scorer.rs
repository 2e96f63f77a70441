// src/engine/scorer.rs

use std::collections::HashMap;

use serde::Serialize;

use super::percent;
use crate::models::course::Quiz;

/// Minimum score (inclusive) that passes a quiz.
pub const PASS_THRESHOLD: u8 = 50;

/// How one question was answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    /// `None` when the question was left unanswered.
    pub selected: Option<i64>,
    pub correct_index: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    /// Percentage in 0..=100.
    pub score: u8,
    pub passed: bool,
    /// One entry per question, in quiz order.
    pub questions: Vec<QuestionOutcome>,
}

/// Grades `answers` (question id -> chosen option index) against `quiz`.
///
/// Missing answers and indices outside the options count as wrong. A quiz
/// without questions scores 0 and fails. Every call grades from scratch.
pub fn score(quiz: &Quiz, answers: &HashMap<String, i64>) -> QuizResult {
    let questions: Vec<QuestionOutcome> = quiz
        .questions
        .iter()
        .map(|q| {
            let selected = answers.get(&q.id).copied();
            let correct = selected
                .and_then(|idx| usize::try_from(idx).ok())
                .is_some_and(|idx| idx == q.correct_index);
            QuestionOutcome {
                question_id: q.id.clone(),
                selected,
                correct_index: q.correct_index,
                correct,
            }
        })
        .collect();

    if questions.is_empty() {
        return QuizResult {
            score: 0,
            passed: false,
            questions,
        };
    }

    let correct_count = questions.iter().filter(|o| o.correct).count();
    let score = percent(correct_count, questions.len());

    QuizResult {
        score,
        passed: score >= PASS_THRESHOLD,
        questions,
    }
}
