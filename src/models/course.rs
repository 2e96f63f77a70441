// src/models/course.rs

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;
use validator::{Validate, ValidationErrors};

use crate::utils::html::clean_html;

/// Module, quiz and question identifiers share one shape.
static IDENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("identifier pattern is valid")
});

/// Kind of content a module carries. Decides how `Module::content` is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// `content` is an embeddable video URL.
    Video,
    /// `content` is the text body.
    Text,
    /// `content` is the id of a quiz in the same course.
    Quiz,
}

/// One step of a course. Order inside `Course::modules` is the traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,

    #[serde(rename = "type")]
    pub kind: ModuleKind,

    pub content: String,

    /// Display label such as "12 min".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl Module {
    /// The quiz this module hosts, if it is a quiz module.
    pub fn quiz_id(&self) -> Option<&str> {
        (self.kind == ModuleKind::Quiz).then_some(self.content.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,

    #[serde(alias = "question")]
    pub prompt: String,

    pub options: Vec<String>,

    /// Zero-based index into `options`.
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CourseMode {
    #[default]
    SelfPaced,
    InstructorLed,
}

impl CourseMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CourseMode::SelfPaced => "SELF_PACED",
            CourseMode::InstructorLed => "INSTRUCTOR_LED",
        }
    }
}

impl fmt::Display for CourseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SELF_PACED" => Ok(CourseMode::SelfPaced),
            "INSTRUCTOR_LED" => Ok(CourseMode::InstructorLed),
            other => Err(format!("unknown course mode '{other}'")),
        }
    }
}

/// A stored course. Modules are ordered, quizzes are looked up by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub mode: CourseMode,
    pub thumbnail: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub modules: Vec<Module>,
    pub quizzes: Vec<Quiz>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Course {
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub fn module_index(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    pub fn quiz(&self, id: &str) -> Option<&Quiz> {
        self.quizzes.iter().find(|q| q.id == id)
    }

    pub fn has_quiz(&self, id: &str) -> bool {
        self.quiz(id).is_some()
    }
}

/// Catalog entry returned by the course listing.
#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub mode: CourseMode,
    pub thumbnail: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub module_count: usize,
    pub enrolled_count: usize,
}

impl CourseSummary {
    pub fn new(course: &Course, enrolled_count: usize) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            mode: course.mode,
            thumbnail: course.thumbnail.clone(),
            instructor_id: course.instructor_id,
            instructor_name: course.instructor_name.clone(),
            module_count: course.modules.len(),
            enrolled_count,
        }
    }
}

/// DTO for sending a question to learners (excludes the correct index).
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    pub id: String,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

/// Learner-facing course view.
#[derive(Debug, Serialize)]
pub struct PublicCourse {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub category: String,
    pub mode: CourseMode,
    pub thumbnail: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub modules: Vec<Module>,
    pub quizzes: Vec<PublicQuiz>,
}

impl From<&Course> for PublicCourse {
    fn from(course: &Course) -> Self {
        let quizzes = course
            .quizzes
            .iter()
            .map(|quiz| PublicQuiz {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                questions: quiz
                    .questions
                    .iter()
                    .map(|q| PublicQuestion {
                        id: q.id.clone(),
                        prompt: q.prompt.clone(),
                        options: q.options.clone(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            category: course.category.clone(),
            mode: course.mode,
            thumbnail: course.thumbnail.clone(),
            instructor_id: course.instructor_id,
            instructor_name: course.instructor_name.clone(),
            modules: course.modules.clone(),
            quizzes,
        }
    }
}

/// Reasons a draft is refused at the authoring boundary.
#[derive(Debug, Error)]
pub enum CourseValidationError {
    #[error(transparent)]
    Fields(#[from] ValidationErrors),

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("module '{0}' needs a title")]
    UntitledModule(String),

    #[error("duplicate module id '{0}'")]
    DuplicateModule(String),

    #[error("duplicate quiz id '{0}'")]
    DuplicateQuiz(String),

    #[error("duplicate question id '{question}' in quiz '{quiz}'")]
    DuplicateQuestion { quiz: String, question: String },

    #[error("module '{module}' references unknown quiz '{quiz}'")]
    DanglingQuiz { module: String, quiz: String },

    #[error("module '{0}' has an invalid video url")]
    InvalidVideoUrl(String),

    #[error("invalid thumbnail url")]
    InvalidThumbnail,

    #[error("question '{question}' in quiz '{quiz}' has no options")]
    NoOptions { quiz: String, question: String },

    #[error("question '{question}' in quiz '{quiz}' marks option {index} correct but has {len} options")]
    CorrectIndexOutOfRange {
        quiz: String,
        question: String,
        index: usize,
        len: usize,
    },
}

/// Course body as sent by an instructor. Nothing here is trusted until
/// `finalize` turns it into a `ValidatedCourse`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DraftCourse {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    #[serde(default)]
    pub mode: CourseMode,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default)]
    pub quizzes: Vec<Quiz>,
}

/// A course body that passed every authoring check. Stores assign the id.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub mode: CourseMode,
    pub thumbnail: Option<String>,
    pub instructor_id: i64,
    pub instructor_name: String,
    pub modules: Vec<Module>,
    pub quizzes: Vec<Quiz>,
}

impl ValidatedCourse {
    pub fn into_course(
        self,
        id: i64,
        created_at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            category: self.category,
            mode: self.mode,
            thumbnail: self.thumbnail,
            instructor_id: self.instructor_id,
            instructor_name: self.instructor_name,
            modules: self.modules,
            quizzes: self.quizzes,
            created_at,
        }
    }
}

fn check_ident(id: &str) -> Result<(), CourseValidationError> {
    if IDENT_RE.is_match(id) {
        Ok(())
    } else {
        Err(CourseValidationError::InvalidIdentifier(id.to_owned()))
    }
}

impl DraftCourse {
    /// Checks the draft and binds it to its owning instructor.
    ///
    /// Text bodies and the description are sanitised; everything else is
    /// rejected rather than repaired.
    pub fn finalize(
        self,
        instructor_id: i64,
        instructor_name: String,
    ) -> Result<ValidatedCourse, CourseValidationError> {
        self.validate()?;

        if let Some(thumbnail) = &self.thumbnail {
            Url::parse(thumbnail).map_err(|_| CourseValidationError::InvalidThumbnail)?;
        }

        let mut quiz_ids = HashSet::new();
        for quiz in &self.quizzes {
            check_ident(&quiz.id)?;
            if !quiz_ids.insert(quiz.id.as_str()) {
                return Err(CourseValidationError::DuplicateQuiz(quiz.id.clone()));
            }

            let mut question_ids = HashSet::new();
            for question in &quiz.questions {
                check_ident(&question.id)?;
                if !question_ids.insert(question.id.as_str()) {
                    return Err(CourseValidationError::DuplicateQuestion {
                        quiz: quiz.id.clone(),
                        question: question.id.clone(),
                    });
                }
                if question.options.is_empty() {
                    return Err(CourseValidationError::NoOptions {
                        quiz: quiz.id.clone(),
                        question: question.id.clone(),
                    });
                }
                if question.correct_index >= question.options.len() {
                    return Err(CourseValidationError::CorrectIndexOutOfRange {
                        quiz: quiz.id.clone(),
                        question: question.id.clone(),
                        index: question.correct_index,
                        len: question.options.len(),
                    });
                }
            }
        }

        let mut module_ids = HashSet::new();
        let mut modules = Vec::with_capacity(self.modules.len());
        for mut module in self.modules {
            check_ident(&module.id)?;
            if !module_ids.insert(module.id.clone()) {
                return Err(CourseValidationError::DuplicateModule(module.id));
            }
            if module.title.trim().is_empty() {
                return Err(CourseValidationError::UntitledModule(module.id));
            }

            match module.kind {
                ModuleKind::Video => {
                    if Url::parse(&module.content).is_err() {
                        return Err(CourseValidationError::InvalidVideoUrl(module.id));
                    }
                }
                ModuleKind::Text => module.content = clean_html(&module.content),
                ModuleKind::Quiz => {
                    if !quiz_ids.contains(module.content.as_str()) {
                        return Err(CourseValidationError::DanglingQuiz {
                            module: module.id,
                            quiz: module.content,
                        });
                    }
                }
            }
            modules.push(module);
        }

        Ok(ValidatedCourse {
            title: self.title,
            description: clean_html(&self.description),
            category: self.category,
            mode: self.mode,
            thumbnail: self.thumbnail,
            instructor_id,
            instructor_name,
            modules,
            quizzes: self.quizzes,
        })
    }
}
