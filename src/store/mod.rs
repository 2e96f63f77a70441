// src/store/mod.rs

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use crate::models::{
    course::{Course, ValidatedCourse},
    enrollment::Enrollment,
    user::{NewUser, User},
};

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    /// The backend could not be reached. Safe to retry.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Course definitions. Read-mostly; written by instructors and admins.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Course>, StoreError>;

    async fn list(&self) -> Result<Vec<Course>, StoreError>;

    async fn create(&self, course: ValidatedCourse) -> Result<Course, StoreError>;

    /// Full replace.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no course has this id.
    async fn update(&self, id: i64, course: ValidatedCourse) -> Result<Course, StoreError>;

    /// Enrollments pointing at the course are left in place.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no course has this id.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// One record per `(user_id, course_id)`.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    /// Creates a fresh enrollment (progress 0, nothing completed).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the pair is already enrolled.
    async fn create(&self, user_id: i64, course_id: i64) -> Result<Enrollment, StoreError>;

    async fn get(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>, StoreError>;

    /// Full replace of the record keyed by `(user_id, course_id)`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if there is no prior record.
    async fn update(&self, enrollment: &Enrollment) -> Result<(), StoreError>;

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Enrollment>, StoreError>;

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>, StoreError>;

    /// Enrollment count per course id. Courses nobody joined are absent.
    async fn count_by_course(&self) -> Result<HashMap<i64, usize>, StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the email is taken.
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn list(&self) -> Result<Vec<User>, StoreError>;

    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no user has this id.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// Aggregates the stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub courses: Arc<dyn CourseStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub users: Arc<dyn UserStore>,
}

impl Storage {
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            courses: Arc::new(store.clone()),
            enrollments: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = PgStore::new(pool);
        Self {
            courses: Arc::new(store.clone()),
            enrollments: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}
