// src/store/seed.rs

//! Startup data: the configured admin account and an optional demo catalog.

use super::{StoreError, Storage};
use crate::{
    config::Config,
    engine,
    error::AppError,
    models::{
        course::{CourseMode, DraftCourse, Module, ModuleKind, Question, Quiz},
        user::{NewUser, Role, User},
    },
    utils::hash::hash_password,
};

const DEMO_PASSWORD: &str = "password";

/// Creates the admin from `ADMIN_EMAIL`/`ADMIN_PASSWORD` unless it exists.
pub async fn seed_admin_user(storage: &Storage, config: &Config) -> Result<(), AppError> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    if storage.users.find_by_email(email).await?.is_some() {
        return Ok(());
    }

    tracing::info!("Seeding admin user: {}", email);
    storage
        .users
        .create(NewUser {
            name: "Admin".to_string(),
            email: email.clone(),
            password: hash_password(password)?,
            role: Role::Admin,
            bio: None,
        })
        .await?;
    tracing::info!("Admin user created successfully.");
    Ok(())
}

/// Runs every startup seed in order: the configured admin, then the demo
/// catalog when `SEED_DEMO` is on. Failures are logged, never fatal.
pub async fn seed_startup(storage: &Storage, config: &Config) {
    if let Err(e) = seed_admin_user(storage, config).await {
        tracing::error!("Failed to seed admin user: {:?}", e);
    }

    if config.seed_demo {
        if let Err(e) = seed_demo(storage).await {
            tracing::error!("Failed to seed demo data: {:?}", e);
        }
    }
}

/// Seeds demo users, three courses and one enrollment.
///
/// Runs whenever the course catalog is empty; existing accounts are reused,
/// so an admin seeded beforehand or a run that stopped partway does not
/// block it. Returns `false` when courses already exist.
pub async fn seed_demo(storage: &Storage) -> Result<bool, AppError> {
    if !storage.courses.list().await?.is_empty() {
        tracing::info!("Store already has courses, skipping demo seed");
        return Ok(false);
    }

    tracing::info!("Course catalog is empty, seeding demo data");
    let password = hash_password(DEMO_PASSWORD)?;

    let demo_user = |name: &str, email: &str, role: Role, bio: &str| NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: password.clone(),
        role,
        bio: Some(bio.to_string()),
    };

    find_or_create_user(
        storage,
        demo_user(
            "Admin User",
            "admin@learnease.com",
            Role::Admin,
            "System Administrator",
        ),
    )
    .await?;
    let instructor = find_or_create_user(
        storage,
        demo_user(
            "Jane Instructor",
            "instructor@learnease.com",
            Role::Instructor,
            "Senior Web Developer & Teacher",
        ),
    )
    .await?;
    let student = find_or_create_user(
        storage,
        demo_user(
            "John Student",
            "student@learnease.com",
            Role::Learner,
            "Aspiring Developer",
        ),
    )
    .await?;

    let mut course_ids = Vec::new();
    for draft in demo_courses() {
        let course = draft.finalize(instructor.id, instructor.name.clone())?;
        let created = storage.courses.create(course).await.inspect_err(|_| {
            tracing::warn!(
                created = course_ids.len(),
                "Demo seed stopped partway; clear the courses table to retry"
            );
        })?;
        course_ids.push(created.id);
    }

    if let Some(&bootcamp) = course_ids.first() {
        enroll_with_progress(storage, &student, bootcamp, &["m1"]).await?;
    }

    tracing::info!(courses = course_ids.len(), "Demo seed complete");
    Ok(true)
}

async fn find_or_create_user(storage: &Storage, user: NewUser) -> Result<User, AppError> {
    if let Some(existing) = storage.users.find_by_email(&user.email).await? {
        return Ok(existing);
    }
    Ok(storage.users.create(user).await?)
}

async fn enroll_with_progress(
    storage: &Storage,
    user: &User,
    course_id: i64,
    completed: &[&str],
) -> Result<(), AppError> {
    let course = storage
        .courses
        .get(course_id)
        .await?
        .ok_or(StoreError::NotFound)?;

    let mut enrollment = storage.enrollments.create(user.id, course.id).await?;
    for module_id in completed {
        enrollment = engine::complete_module(&course, &enrollment, module_id)?.enrollment;
    }
    storage.enrollments.update(&enrollment).await?;
    Ok(())
}

fn module(id: &str, title: &str, kind: ModuleKind, content: &str) -> Module {
    Module {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        content: content.to_string(),
        duration: None,
    }
}

fn question(id: &str, prompt: &str, options: &[&str], correct_index: usize) -> Question {
    Question {
        id: id.to_string(),
        prompt: prompt.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_index,
    }
}

fn demo_courses() -> Vec<DraftCourse> {
    vec![
        DraftCourse {
            title: "Complete Web Development Bootcamp".to_string(),
            description: "Learn HTML, CSS, JavaScript, React, and Node.js from scratch. \
                This comprehensive course takes you from absolute beginner to full-stack developer."
                .to_string(),
            category: "Development".to_string(),
            mode: CourseMode::SelfPaced,
            thumbnail: Some("https://picsum.photos/id/1/400/225".to_string()),
            modules: vec![
                module(
                    "m1",
                    "Introduction to HTML",
                    ModuleKind::Text,
                    "HTML (HyperText Markup Language) is the most basic building block of the Web. \
                     It defines the meaning and structure of web content.",
                ),
                module(
                    "m2",
                    "HTML Structure",
                    ModuleKind::Video,
                    "https://www.youtube.com/embed/k7I429DD-qY",
                ),
                module(
                    "m3",
                    "CSS Basics",
                    ModuleKind::Text,
                    "CSS is the language we use to style an HTML document. \
                     CSS describes how HTML elements should be displayed.",
                ),
                module(
                    "m4",
                    "JavaScript Fundamentals",
                    ModuleKind::Video,
                    "https://www.youtube.com/embed/W6NZfCO5SIk",
                ),
                module("m5", "Web Dev Quiz", ModuleKind::Quiz, "q1"),
            ],
            quizzes: vec![Quiz {
                id: "q1".to_string(),
                title: "HTML & CSS Basics".to_string(),
                questions: vec![
                    question(
                        "qq1",
                        "What does HTML stand for?",
                        &[
                            "Hyper Text Markup Language",
                            "Home Tool Markup Language",
                            "Hyperlinks and Text Markup Language",
                        ],
                        0,
                    ),
                    question(
                        "qq2",
                        "Which character is used to indicate an end tag?",
                        &["<", "/", "*", "^"],
                        1,
                    ),
                ],
            }],
        },
        DraftCourse {
            title: "Advanced React Patterns".to_string(),
            description: "Master higher-order components, hooks, custom hooks, and the Context API \
                to build scalable React applications."
                .to_string(),
            category: "Development".to_string(),
            mode: CourseMode::InstructorLed,
            thumbnail: Some("https://picsum.photos/id/20/400/225".to_string()),
            modules: vec![
                module(
                    "r1",
                    "Understanding Hooks",
                    ModuleKind::Text,
                    "Hooks are functions that let you hook into React state and lifecycle \
                     features from function components.",
                ),
                module(
                    "r2",
                    "useEffect Deep Dive",
                    ModuleKind::Video,
                    "https://www.youtube.com/embed/dH6i3GurZV8",
                ),
                module(
                    "r3",
                    "Custom Hooks",
                    ModuleKind::Text,
                    "Building your own Hooks lets you extract component logic into reusable functions.",
                ),
                module("r4", "React Quiz", ModuleKind::Quiz, "q2"),
            ],
            quizzes: vec![Quiz {
                id: "q2".to_string(),
                title: "React Hooks Assessment".to_string(),
                questions: vec![
                    question(
                        "rq1",
                        "Which hook is used for side effects?",
                        &["useState", "useEffect", "useContext"],
                        1,
                    ),
                    question(
                        "rq2",
                        "Rules of Hooks: Only call Hooks at the...",
                        &["Top Level", "Inside Loops", "Inside Nested Functions"],
                        0,
                    ),
                ],
            }],
        },
        DraftCourse {
            title: "Python for Data Science".to_string(),
            description: "An introduction to Python programming with a focus on data analysis \
                libraries like Pandas and NumPy."
                .to_string(),
            category: "Data Science".to_string(),
            mode: CourseMode::SelfPaced,
            thumbnail: Some("https://picsum.photos/id/2/400/225".to_string()),
            modules: vec![
                module(
                    "p1",
                    "Why Python?",
                    ModuleKind::Text,
                    "Python is a high-level, general-purpose programming language. \
                     Its design philosophy emphasizes code readability.",
                ),
                module(
                    "p2",
                    "Installing Anaconda",
                    ModuleKind::Video,
                    "https://www.youtube.com/embed/5mDYijMfG_s",
                ),
                module(
                    "p3",
                    "Pandas DataFrames",
                    ModuleKind::Text,
                    "A DataFrame is a 2-dimensional labeled data structure with columns of \
                     potentially different types.",
                ),
            ],
            quizzes: vec![],
        },
    ]
}
