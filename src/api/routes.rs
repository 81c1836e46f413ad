use crate::api::handlers::{auth, tasks, users};
use crate::auth::middleware::{authenticate_request, RequestAuthenticator};
use crate::types::{
    CommentResponse, LoginRequest, Priority, RegisterRequest, Status, TaskRequest, TaskResponse,
    TokenResponse, UserResponse,
};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// OpenAPI document for every `/api/v1` endpoint.
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        users::list_users,
        tasks::create_task,
        tasks::update_task,
        tasks::change_status,
        tasks::delete_task,
        tasks::get_task,
        tasks::executable_tasks,
        tasks::created_tasks,
        tasks::add_comment,
    ),
    components(schemas(
        LoginRequest,
        RegisterRequest,
        TokenResponse,
        UserResponse,
        TaskRequest,
        TaskResponse,
        CommentResponse,
        Status,
        Priority,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Login and registration"),
        (name = "users", description = "User directory"),
        (name = "tasks", description = "Tasks, executors and comments")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Routes mounted under `/api/v1`.
///
/// The authenticator runs on every route, including login and registration;
/// it never rejects, so public routes are unaffected by stale tokens.
pub fn create_router(authenticator: Arc<RequestAuthenticator>) -> Router<AppState> {
    Router::new()
        // Public routes (no principal required)
        .route("/auth/login", post(auth::login))
        .route("/auth/registration", post(auth::register))
        // Routes whose handlers require a principal
        .route("/user/list", get(users::list_users))
        .route("/task/create", post(tasks::create_task))
        .route("/task/update/{task_id}", post(tasks::update_task))
        .route("/task/change-status/{task_id}", post(tasks::change_status))
        .route("/task/delete/{task_id}", post(tasks::delete_task))
        .route("/task/executable/{user_id}", get(tasks::executable_tasks))
        .route("/task/created/{user_id}", get(tasks::created_tasks))
        .route("/task/{task_id}", get(tasks::get_task))
        .route("/task/{task_id}/add-comment", post(tasks::add_comment))
        .layer(middleware::from_fn(move |req, next| {
            authenticate_request(authenticator.clone(), req, next)
        }))
}

/// Upper bound on request bodies; task payloads and comments are small.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application: health check, the versioned API and request tracing.
pub fn build_app(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .nest("/api/v1", create_router(state.authenticator.clone()));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
