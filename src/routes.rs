// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{delete, get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, courses, enrollments},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware, staff_middleware},
};

/// Assembles the main application router.
///
/// * Public: registration, login, course catalog and learner course view.
/// * Authenticated: enrollment, progress, module completion, quiz submission.
/// * Staff (instructor/admin): course authoring.
/// * Admin: user management.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let authenticated = middleware::from_fn_with_state(state.clone(), auth_middleware);
    let staff = middleware::from_fn(staff_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me).route_layer(authenticated.clone()));

    // Double middleware protection on authoring routes: Auth first, then the
    // role check (layers run outside in).
    let course_routes = Router::new()
        .route(
            "/",
            get(courses::list_courses).merge(
                post(courses::create_course)
                    .route_layer(staff.clone())
                    .route_layer(authenticated.clone()),
            ),
        )
        .route(
            "/{id}",
            get(courses::get_course).merge(
                put(courses::update_course)
                    .merge(delete(courses::delete_course))
                    .route_layer(staff.clone())
                    .route_layer(authenticated.clone()),
            ),
        )
        .route(
            "/{id}/full",
            get(courses::get_course_full)
                .route_layer(staff.clone())
                .route_layer(authenticated.clone()),
        )
        .route(
            "/{id}/enrollments",
            get(enrollments::list_course_enrollments)
                .route_layer(staff)
                .route_layer(authenticated.clone()),
        )
        .merge(
            Router::new()
                .route("/{id}/enroll", post(enrollments::enroll))
                .route("/{id}/progress", get(enrollments::get_progress))
                .route(
                    "/{id}/modules/{module_id}/complete",
                    post(enrollments::complete_module),
                )
                .route(
                    "/{id}/modules/{module_id}/quiz",
                    post(enrollments::submit_quiz),
                )
                .route_layer(authenticated.clone()),
        );

    let enrollment_routes = Router::new()
        .route("/", get(enrollments::list_my_enrollments))
        .route_layer(authenticated.clone());

    let admin_routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(authenticated);

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/courses", course_routes)
        .nest("/api/enrollments", enrollment_routes)
        .nest("/api/admin", admin_routes)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
