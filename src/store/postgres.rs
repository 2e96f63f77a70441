// src/store/postgres.rs

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, types::Json};

use super::{CourseStore, EnrollmentStore, StoreError, UserStore};
use crate::models::{
    course::{Course, Module, Quiz, ValidatedCourse},
    enrollment::{Enrollment, QuizScores},
    user::{NewUser, User},
};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Postgres error code for unique violation is 23505.
fn map_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => StoreError::Conflict,
        sqlx::Error::RowNotFound => StoreError::NotFound,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Serialization(err.to_string())
        }
        _ => {
            tracing::error!("Database error: {:?}", err);
            StoreError::Unavailable(err.to_string())
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password: String,
    role: String,
    bio: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password: row.password,
            role: row.role.parse().map_err(StoreError::Serialization)?,
            bio: row.bio,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CourseRow {
    id: i64,
    title: String,
    description: String,
    category: String,
    mode: String,
    thumbnail: Option<String>,
    instructor_id: i64,
    instructor_name: String,
    modules: Json<Vec<Module>>,
    quizzes: Json<Vec<Quiz>>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<CourseRow> for Course {
    type Error = StoreError;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Ok(Course {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            mode: row.mode.parse().map_err(StoreError::Serialization)?,
            thumbnail: row.thumbnail,
            instructor_id: row.instructor_id,
            instructor_name: row.instructor_name,
            modules: row.modules.0,
            quizzes: row.quizzes.0,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct EnrollmentRow {
    user_id: i64,
    course_id: i64,
    progress: i16,
    completed_modules: Json<BTreeSet<String>>,
    quiz_scores: Json<QuizScores>,
}

impl From<EnrollmentRow> for Enrollment {
    fn from(row: EnrollmentRow) -> Self {
        Enrollment {
            user_id: row.user_id,
            course_id: row.course_id,
            progress: row.progress.clamp(0, 100) as u8,
            completed_modules: row.completed_modules.0,
            quiz_scores: row.quiz_scores.0,
        }
    }
}

const COURSE_COLUMNS: &str = "id, title, description, category, mode, thumbnail, \
     instructor_id, instructor_name, modules, quizzes, created_at";

const ENROLLMENT_COLUMNS: &str = "user_id, course_id, progress, completed_modules, quiz_scores";

const USER_COLUMNS: &str = "id, name, email, password, role, bio, created_at";

#[async_trait]
impl CourseStore for PgStore {
    async fn get(&self, id: i64) -> Result<Option<Course>, StoreError> {
        let row: Option<CourseRow> =
            sqlx::query_as(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err)?;
        row.map(Course::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Course>, StoreError> {
        let rows: Vec<CourseRow> =
            sqlx::query_as(&format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_err)?;
        rows.into_iter().map(Course::try_from).collect()
    }

    async fn create(&self, course: ValidatedCourse) -> Result<Course, StoreError> {
        let row: CourseRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO courses (title, description, category, mode, thumbnail,
                                 instructor_id, instructor_name, modules, quizzes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category)
        .bind(course.mode.as_str())
        .bind(&course.thumbnail)
        .bind(course.instructor_id)
        .bind(&course.instructor_name)
        .bind(Json(&course.modules))
        .bind(Json(&course.quizzes))
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Course::try_from(row)
    }

    async fn update(&self, id: i64, course: ValidatedCourse) -> Result<Course, StoreError> {
        let row: Option<CourseRow> = sqlx::query_as(&format!(
            r#"
            UPDATE courses SET
                title = $2, description = $3, category = $4, mode = $5, thumbnail = $6,
                instructor_id = $7, instructor_name = $8, modules = $9, quizzes = $10
            WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.category)
        .bind(course.mode.as_str())
        .bind(&course.thumbnail)
        .bind(course.instructor_id)
        .bind(&course.instructor_name)
        .bind(Json(&course.modules))
        .bind(Json(&course.quizzes))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.ok_or(StoreError::NotFound).and_then(Course::try_from)
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn create(&self, user_id: i64, course_id: i64) -> Result<Enrollment, StoreError> {
        let fresh = Enrollment::new(user_id, course_id);
        let row: EnrollmentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO enrollments (user_id, course_id, progress, completed_modules, quiz_scores)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ENROLLMENT_COLUMNS}
            "#
        ))
        .bind(fresh.user_id)
        .bind(fresh.course_id)
        .bind(i16::from(fresh.progress))
        .bind(Json(&fresh.completed_modules))
        .bind(Json(&fresh.quiz_scores))
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(row.into())
    }

    async fn get(&self, user_id: i64, course_id: i64) -> Result<Option<Enrollment>, StoreError> {
        let row: Option<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 AND course_id = $2"
        ))
        .bind(user_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(row.map(Enrollment::from))
    }

    async fn update(&self, enrollment: &Enrollment) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE enrollments SET
                progress = $3,
                completed_modules = $4,
                quiz_scores = $5,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $1 AND course_id = $2
            "#,
        )
        .bind(enrollment.user_id)
        .bind(enrollment.course_id)
        .bind(i16::from(enrollment.progress))
        .bind(Json(&enrollment.completed_modules))
        .bind(Json(&enrollment.quiz_scores))
        .execute(&self.pool)
        .await
        .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Enrollment>, StoreError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE user_id = $1 ORDER BY course_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>, StoreError> {
        let rows: Vec<EnrollmentRow> = sqlx::query_as(&format!(
            "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE course_id = $1 ORDER BY user_id"
        ))
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_err)?;
        Ok(rows.into_iter().map(Enrollment::from).collect())
    }

    async fn count_by_course(&self) -> Result<HashMap<i64, usize>, StoreError> {
        let rows: Vec<(i64, i64)> =
            sqlx::query_as("SELECT course_id, COUNT(*) FROM enrollments GROUP BY course_id")
                .fetch_all(&self.pool)
                .await
                .map_err(map_err)?;
        Ok(rows
            .into_iter()
            .map(|(course_id, count)| (course_id, count.max(0) as usize))
            .collect())
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (name, email, password, role, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.role.as_str())
        .bind(&user.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(map_err)?;
        User::try_from(row)
    }

    async fn get(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_err)?;
        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_err)?;
        row.map(User::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(map_err)?;
        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_err)?;
        Ok(count)
    }
}
