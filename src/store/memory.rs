// src/store/memory.rs

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{CourseStore, EnrollmentStore, StoreError, UserStore};
use crate::models::{
    course::{Course, ValidatedCourse},
    enrollment::Enrollment,
    user::{NewUser, User},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    courses: BTreeMap<i64, Course>,
    enrollments: BTreeMap<(i64, i64), Enrollment>,
    last_user_id: i64,
    last_course_id: i64,
}

/// In-process store used when no database is configured, and by tests.
/// Ids are handed out sequentially starting at 1.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn get(&self, id: i64) -> Result<Option<Course>, StoreError> {
        Ok(self.lock()?.courses.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Course>, StoreError> {
        Ok(self.lock()?.courses.values().cloned().collect())
    }

    async fn create(&self, course: ValidatedCourse) -> Result<Course, StoreError> {
        let mut guard = self.lock()?;
        guard.last_course_id += 1;
        let course = course.into_course(guard.last_course_id, Some(Utc::now()));
        guard.courses.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update(&self, id: i64, course: ValidatedCourse) -> Result<Course, StoreError> {
        let mut guard = self.lock()?;
        let slot = guard.courses.get_mut(&id).ok_or(StoreError::NotFound)?;
        *slot = course.into_course(id, slot.created_at);
        Ok(slot.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.lock()?
            .courses
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn create(&self, user_id: i64, course_id: i64) -> Result<Enrollment, StoreError> {
        let mut guard = self.lock()?;
        if guard.enrollments.contains_key(&(user_id, course_id)) {
            return Err(StoreError::Conflict);
        }
        let enrollment = Enrollment::new(user_id, course_id);
        guard
            .enrollments
            .insert(enrollment.key(), enrollment.clone());
        Ok(enrollment)
    }

    async fn get(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>, StoreError> {
        Ok(self.lock()?.enrollments.get(&(user_id, course_id)).cloned())
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let slot = guard
            .enrollments
            .get_mut(&enrollment.key())
            .ok_or(StoreError::NotFound)?;
        *slot = enrollment.clone();
        Ok(())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .lock()?
            .enrollments
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>, StoreError> {
        Ok(self
            .lock()?
            .enrollments
            .values()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn count_by_course(&self) -> Result<HashMap<i64, usize>, StoreError> {
        let guard = self.lock()?;
        let mut counts = HashMap::new();
        for (_, course_id) in guard.enrollments.keys() {
            *counts.entry(*course_id).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut guard = self.lock()?;
        if guard
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict);
        }
        guard.last_user_id += 1;
        let user = User {
            id: guard.last_user_id,
            name: user.name,
            email: user.email,
            password: user.password,
            role: user.role,
            bio: user.bio,
            created_at: Some(Utc::now()),
        };
        guard.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock()?.users.values().rev().cloned().collect())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        self.lock()?
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.lock()?.users.len() as i64)
    }
}
