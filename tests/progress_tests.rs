// tests/progress_tests.rs

use learnease::{config::Config, routes, state::AppState, store::Storage};
use reqwest::Client;
use serde_json::{Value, json};

async fn spawn_app() -> String {
    let config = Config {
        database_url: None,
        jwt_secret: "test_secret_for_progress_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        admin_email: None,
        admin_password: None,
        seed_demo: false,
        port: 0,
    };

    let app = routes::create_router(AppState {
        storage: Storage::in_memory(),
        config,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

async fn token_for(client: &Client, address: &str, role: &str) -> String {
    let email = format!("{}_{}@example.com", role.to_lowercase(), uuid::Uuid::new_v4());
    let resp = client
        .post(format!("{}/api/auth/register", address))
        .json(&json!({
            "name": format!("{} tester", role),
            "email": email,
            "password": "password123",
            "role": role
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let login: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&json!({ "email": email, "password": "password123" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    login["token"].as_str().unwrap().to_string()
}

/// Three modules: text, video, then a one-question quiz.
async fn create_course(client: &Client, address: &str, token: &str) -> i64 {
    let resp = client
        .post(format!("{}/api/courses", address))
        .bearer_auth(token)
        .json(&json!({
            "title": "Intro",
            "description": "Three step course",
            "category": "Development",
            "mode": "SELF_PACED",
            "modules": [
                { "id": "m1", "title": "Read", "type": "text", "content": "<p>Hello</p>" },
                { "id": "m2", "title": "Watch", "type": "video", "content": "https://www.youtube.com/embed/abc" },
                { "id": "m3", "title": "Check", "type": "quiz", "content": "q1" }
            ],
            "quizzes": [{
                "id": "q1",
                "title": "Check",
                "questions": [
                    { "id": "a", "question": "2 + 2?", "options": ["3", "4"], "correct_index": 1 }
                ]
            }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn learner_walks_course_to_completion() {
    let address = spawn_app().await;
    let client = Client::new();
    let instructor = token_for(&client, &address, "INSTRUCTOR").await;
    let learner = token_for(&client, &address, "LEARNER").await;
    let course_id = create_course(&client, &address, &instructor).await;

    // Not enrolled yet.
    let resp = client
        .get(format!("{}/api/courses/{}/progress", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = client
        .post(format!("{}/api/courses/{}/enroll", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let enrollment: Value = resp.json().await.unwrap();
    assert_eq!(enrollment["progress"], 0);

    let again = client
        .post(format!("{}/api/courses/{}/enroll", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status().as_u16(), 409);

    let progress: Value = client
        .get(format!("{}/api/courses/{}/progress", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["state"], "NOT_STARTED");
    assert_eq!(progress["active"]["state"], "module");
    assert_eq!(progress["active"]["module"]["id"], "m1");

    let step: Value = client
        .post(format!("{}/api/courses/{}/modules/m1/complete", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(step["enrollment"]["progress"], 33);
    assert_eq!(step["next"]["module"]["id"], "m2");

    let step: Value = client
        .post(format!("{}/api/courses/{}/modules/m2/complete", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(step["enrollment"]["progress"], 67);
    assert_eq!(step["next"]["module"]["id"], "m3");

    // Quiz modules only complete through a passing submission.
    let gated = client
        .post(format!("{}/api/courses/{}/modules/m3/complete", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(gated.status().as_u16(), 409);

    let failed: Value = client
        .post(format!("{}/api/courses/{}/modules/m3/quiz", address, course_id))
        .bearer_auth(&learner)
        .json(&json!({ "answers": { "a": 0 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(failed["score"], 0);
    assert_eq!(failed["passed"], false);
    assert_eq!(failed["enrollment"]["progress"], 67);
    assert_eq!(failed["enrollment"]["quiz_scores"]["q1"], 0);

    let passed: Value = client
        .post(format!("{}/api/courses/{}/modules/m3/quiz", address, course_id))
        .bearer_auth(&learner)
        .json(&json!({ "answers": { "a": 1 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(passed["score"], 100);
    assert_eq!(passed["passed"], true);
    assert_eq!(passed["enrollment"]["progress"], 100);
    assert_eq!(passed["enrollment"]["quiz_scores"]["q1"], 100);
    assert_eq!(passed["next"]["state"], "course_complete");

    let progress: Value = client
        .get(format!("{}/api/courses/{}/progress", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["state"], "COMPLETE");
    assert_eq!(progress["active"]["state"], "course_complete");

    let mine: Value = client
        .get(format!("{}/api/enrollments", address))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unknown_module_is_not_found() {
    let address = spawn_app().await;
    let client = Client::new();
    let instructor = token_for(&client, &address, "INSTRUCTOR").await;
    let learner = token_for(&client, &address, "LEARNER").await;
    let course_id = create_course(&client, &address, &instructor).await;

    client
        .post(format!("{}/api/courses/{}/enroll", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();

    let resp = client
        .post(format!("{}/api/courses/{}/modules/nope/complete", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // Submitting answers to a text module is a bad request.
    let resp = client
        .post(format!("{}/api/courses/{}/modules/m1/quiz", address, course_id))
        .bearer_auth(&learner)
        .json(&json!({ "answers": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn public_course_view_hides_answers() {
    let address = spawn_app().await;
    let client = Client::new();
    let instructor = token_for(&client, &address, "INSTRUCTOR").await;
    let course_id = create_course(&client, &address, &instructor).await;

    let public: Value = client
        .get(format!("{}/api/courses/{}", address, course_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question = &public["quizzes"][0]["questions"][0];
    assert_eq!(question["options"][1], "4");
    assert!(question.get("correct_index").is_none());

    let full: Value = client
        .get(format!("{}/api/courses/{}/full", address, course_id))
        .bearer_auth(&instructor)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(full["quizzes"][0]["questions"][0]["correct_index"], 1);

    let catalog: Value = client
        .get(format!("{}/api/courses", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn instructor_sees_course_enrollments() {
    let address = spawn_app().await;
    let client = Client::new();
    let instructor = token_for(&client, &address, "INSTRUCTOR").await;
    let learner = token_for(&client, &address, "LEARNER").await;
    let course_id = create_course(&client, &address, &instructor).await;

    client
        .post(format!("{}/api/courses/{}/enroll", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();

    let roster: Value = client
        .get(format!("{}/api/courses/{}/enrollments", address, course_id))
        .bearer_auth(&instructor)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(roster.as_array().unwrap().len(), 1);

    let catalog: Value = client
        .get(format!("{}/api/courses", address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog[0]["enrolled_count"], 1);
    assert_eq!(catalog[0]["module_count"], 3);

    let denied = client
        .get(format!("{}/api/courses/{}/enrollments", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);
}

#[tokio::test]
async fn progress_follows_course_edits() {
    let address = spawn_app().await;
    let client = Client::new();
    let instructor = token_for(&client, &address, "INSTRUCTOR").await;
    let learner = token_for(&client, &address, "LEARNER").await;

    let text = |id: &str| json!({ "id": id, "title": id, "type": "text", "content": "Read me" });
    let draft = |modules: Vec<Value>| {
        json!({
            "title": "Growing",
            "description": "Modules get added later",
            "category": "Development",
            "modules": modules
        })
    };

    let created: Value = client
        .post(format!("{}/api/courses", address))
        .bearer_auth(&instructor)
        .json(&draft(vec![text("m1"), text("m2")]))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let course_id = created["id"].as_i64().unwrap();

    client
        .post(format!("{}/api/courses/{}/enroll", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap();
    for module_id in ["m1", "m2"] {
        let resp = client
            .post(format!(
                "{}/api/courses/{}/modules/{}/complete",
                address, course_id, module_id
            ))
            .bearer_auth(&learner)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
    }

    let updated = client
        .put(format!("{}/api/courses/{}", address, course_id))
        .bearer_auth(&instructor)
        .json(&draft(vec![text("m1"), text("m2"), text("m3"), text("m4")]))
        .send()
        .await
        .unwrap();
    assert_eq!(updated.status().as_u16(), 200);

    let progress: Value = client
        .get(format!("{}/api/courses/{}/progress", address, course_id))
        .bearer_auth(&learner)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(progress["enrollment"]["progress"], 50);
    assert_eq!(progress["state"], "IN_PROGRESS");
    assert_eq!(progress["active"]["module"]["id"], "m3");
}
