use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use tasktrack::{
    api::routes::build_app, types::Principal, AppState, PrincipalDirectory, TaskTrackConfig,
    TokenService, TursoClient,
};

const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes-long";
const PASSWORD: &str = "password123";

struct TestApp {
    server: TestServer,
    state: AppState,
}

/// Full application over a fresh in-memory database
async fn create_test_app() -> TestApp {
    let mut config = TaskTrackConfig::default();
    config.database.url = ":memory:".to_string();

    let db = TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database");
    let state = AppState::new(config, Arc::new(db), TEST_SECRET);

    let server = TestServer::new(build_app(state.clone())).expect("Failed to create test server");
    TestApp { server, state }
}

/// Registers `email` and logs in, returning (user id, bearer token)
async fn register_and_login(server: &TestServer, email: &str) -> (i64, String) {
    let response = server
        .post("/api/v1/auth/registration")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    let id = user["id"].as_i64().expect("user id");

    let response = server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": email, "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    (id, body["token"].as_str().expect("token").to_string())
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

fn task_body(author: i64, executors: &[i64]) -> Value {
    json!({
        "name": "Write report",
        "description": "Quarterly numbers",
        "status": "PENDING",
        "priority": "HIGH",
        "author": author,
        "executors": executors,
    })
}

/// Creates a task authored by the caller and returns its id
async fn create_task(server: &TestServer, token: &str, author: i64, executors: &[i64]) -> i64 {
    let response = server
        .post("/api/v1/task/create")
        .add_header("Authorization", bearer(token))
        .json(&task_body(author, executors))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: Value = response.json();
    body["id"].as_i64().expect("task id")
}

// ============= Health Check Tests =============

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

// ============= Authentication Tests =============

#[tokio::test]
async fn test_register_and_login() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/auth/registration")
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["email"], "alice@example.com");
    assert!(body["id"].is_number());
    assert!(body.get("password_hash").is_none());

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["token"].is_string());
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["expires_in"], 18000);
}

#[tokio::test]
async fn test_register_duplicate_user() {
    let app = create_test_app().await;
    register_and_login(&app.server, "dup@example.com").await;

    let response = app
        .server
        .post("/api/v1/auth/registration")
        .json(&json!({ "email": "dup@example.com", "password": "other-password" }))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(
        body["error"],
        "User with this email already exists. Please use a different email address."
    );
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/v1/auth/registration")
        .json(&json!({ "email": "not-an-email", "password": PASSWORD }))
        .await;
    response.assert_status_bad_request();

    let response = app
        .server
        .post("/api/v1/auth/registration")
        .json(&json!({ "email": "blank@example.com", "password": "  " }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_login_failures_do_not_reveal_which_part_was_wrong() {
    let app = create_test_app().await;
    register_and_login(&app.server, "bob@example.com").await;

    let wrong_password = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "wrong" }))
        .await;
    wrong_password.assert_status_unauthorized();

    let unknown_email = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .await;
    unknown_email.assert_status_unauthorized();

    let a: Value = wrong_password.json();
    let b: Value = unknown_email.json();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_login_email_is_case_sensitive() {
    let app = create_test_app().await;
    register_and_login(&app.server, "carol@example.com").await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .json(&json!({ "email": "Carol@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_unauthorized();
}

// ============= Request Authentication Tests =============

#[tokio::test]
async fn test_protected_route_without_token() {
    let app = create_test_app().await;

    let response = app.server.get("/api/v1/user/list").await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_protected_route_with_valid_token() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "dave@example.com").await;
    register_and_login(&app.server, "erin@example.com").await;

    let response = app
        .server
        .get("/api/v1/user/list")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_ok();

    let users: Vec<Value> = response.json();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));
}

#[tokio::test]
async fn test_garbage_and_foreign_tokens_are_anonymous() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "frank@example.com").await;

    let foreign = TokenService::new("a-completely-different-secret-of-32-bytes", 3600);
    let principal = app
        .state
        .directory
        .find_by_email("frank@example.com")
        .await
        .unwrap()
        .unwrap();
    let forged = foreign.issue(&principal).unwrap();

    for header in [
        "Bearer not-a-jwt".to_string(),
        bearer(&forged),
        format!("Token {}", token),
        format!("bearer {}", token),
        format!("Bearer{}", token),
    ] {
        let response = app
            .server
            .get("/api/v1/user/list")
            .add_header("Authorization", header.clone())
            .await;
        response.assert_status_unauthorized();
    }
}

#[tokio::test]
async fn test_expired_token_is_anonymous() {
    let app = create_test_app().await;
    register_and_login(&app.server, "grace@example.com").await;

    let principal = app
        .state
        .directory
        .find_by_email("grace@example.com")
        .await
        .unwrap()
        .unwrap();
    let tokens = TokenService::new(TEST_SECRET, 60);
    let expired = tokens
        .issue_at(&principal, Utc::now() - Duration::hours(1))
        .unwrap();

    let response = app
        .server
        .get("/api/v1/user/list")
        .add_header("Authorization", bearer(&expired))
        .await;
    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_public_routes_ignore_bad_tokens() {
    let app = create_test_app().await;
    register_and_login(&app.server, "heidi@example.com").await;

    let response = app
        .server
        .post("/api/v1/auth/login")
        .add_header("Authorization", "Bearer garbage".to_string())
        .json(&json!({ "email": "heidi@example.com", "password": PASSWORD }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_token_for_deleted_subject_is_anonymous() {
    let app = create_test_app().await;
    let (id, _) = register_and_login(&app.server, "ivan@example.com").await;

    // A well-signed token whose subject was never registered.
    let ghost = Principal {
        id: id + 100,
        email: "ghost@example.com".to_string(),
        password_hash: String::new(),
    };
    let token = TokenService::new(TEST_SECRET, 3600).issue(&ghost).unwrap();

    let response = app
        .server
        .get("/api/v1/user/list")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_unauthorized();
}

// ============= Task Authorization Tests =============

#[tokio::test]
async fn test_task_ownership_rules() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;
    let (b_id, b_token) = register_and_login(&app.server, "b@example.com").await;
    let (_, c_token) = register_and_login(&app.server, "c@example.com").await;

    let task_id = create_task(&app.server, &a_token, a_id, &[b_id]).await;

    // Executor B cannot edit
    let response = app
        .server
        .post(&format!("/api/v1/task/update/{}", task_id))
        .add_header("Authorization", bearer(&b_token))
        .json(&task_body(a_id, &[b_id]))
        .await;
    response.assert_status_forbidden();

    // Author A can edit
    let mut renamed = task_body(a_id, &[b_id]);
    renamed["name"] = json!("Write final report");
    let response = app
        .server
        .post(&format!("/api/v1/task/update/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .json(&renamed)
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["name"], "Write final report");
    assert_eq!(body["author"], a_id);

    // Bystander C cannot change status
    let response = app
        .server
        .post(&format!("/api/v1/task/change-status/{}", task_id))
        .add_header("Authorization", bearer(&c_token))
        .json(&json!("IN_PROGRESS"))
        .await;
    response.assert_status_forbidden();

    // Author A is not an executor either
    let response = app
        .server
        .post(&format!("/api/v1/task/change-status/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .json(&json!("IN_PROGRESS"))
        .await;
    response.assert_status_forbidden();

    // Executor B can change status
    let response = app
        .server
        .post(&format!("/api/v1/task/change-status/{}", task_id))
        .add_header("Authorization", bearer(&b_token))
        .json(&json!("IN_PROGRESS"))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "IN_PROGRESS");

    // Only the author deletes
    let response = app
        .server
        .post(&format!("/api/v1/task/delete/{}", task_id))
        .add_header("Authorization", bearer(&b_token))
        .await;
    response.assert_status_forbidden();

    let response = app
        .server
        .post(&format!("/api/v1/task/delete/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .await;
    response.assert_status_ok();
    response.assert_text(format!("Task with id {} deleted", task_id));

    let response = app
        .server
        .get(&format!("/api/v1/task/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_create_task_for_someone_else_is_forbidden() {
    let app = create_test_app().await;
    let (a_id, _) = register_and_login(&app.server, "a@example.com").await;
    let (_, b_token) = register_and_login(&app.server, "b@example.com").await;

    let response = app
        .server
        .post("/api/v1/task/create")
        .add_header("Authorization", bearer(&b_token))
        .json(&task_body(a_id, &[]))
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn test_create_task_with_unknown_executor() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;

    let response = app
        .server
        .post("/api/v1/task/create")
        .add_header("Authorization", bearer(&a_token))
        .json(&task_body(a_id, &[a_id + 42]))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_missing_task_is_not_found_before_forbidden() {
    let app = create_test_app().await;
    let (_, token) = register_and_login(&app.server, "a@example.com").await;

    let response = app
        .server
        .post("/api/v1/task/update/9999")
        .add_header("Authorization", bearer(&token))
        .json(&task_body(1, &[]))
        .await;
    response.assert_status_not_found();

    let response = app
        .server
        .post("/api/v1/task/change-status/9999")
        .add_header("Authorization", bearer(&token))
        .json(&json!("COMPLETED"))
        .await;
    response.assert_status_not_found();

    let response = app
        .server
        .post("/api/v1/task/delete/9999")
        .add_header("Authorization", bearer(&token))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_task_routes_require_authentication() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;
    let task_id = create_task(&app.server, &a_token, a_id, &[]).await;

    app.server
        .post("/api/v1/task/create")
        .json(&task_body(a_id, &[]))
        .await
        .assert_status_unauthorized();
    app.server
        .post(&format!("/api/v1/task/delete/{}", task_id))
        .await
        .assert_status_unauthorized();
    app.server
        .get(&format!("/api/v1/task/{}", task_id))
        .await
        .assert_status_unauthorized();
    app.server
        .post(&format!("/api/v1/task/{}/add-comment", task_id))
        .text("hello")
        .await
        .assert_status_unauthorized();
}

// ============= Comments and Listings =============

#[tokio::test]
async fn test_any_user_can_comment() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;
    let (c_id, c_token) = register_and_login(&app.server, "c@example.com").await;
    let task_id = create_task(&app.server, &a_token, a_id, &[]).await;

    let response = app
        .server
        .post(&format!("/api/v1/task/{}/add-comment", task_id))
        .add_header("Authorization", bearer(&c_token))
        .text("Looks good to me")
        .await;
    response.assert_status_ok();
    let comment: Value = response.json();
    assert_eq!(comment["user_id"], c_id);
    assert_eq!(comment["task_id"], task_id);

    let response = app
        .server
        .get(&format!("/api/v1/task/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .await;
    response.assert_status_ok();
    let task: Value = response.json();
    let comments = task["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["text"], "Looks good to me");

    let response = app
        .server
        .post("/api/v1/task/9999/add-comment")
        .add_header("Authorization", bearer(&c_token))
        .text("nowhere")
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn test_oversized_comment_is_rejected() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;
    let task_id = create_task(&app.server, &a_token, a_id, &[]).await;

    let response = app
        .server
        .post(&format!("/api/v1/task/{}/add-comment", task_id))
        .add_header("Authorization", bearer(&a_token))
        .text("x".repeat(64 * 1024 + 1))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

    let response = app
        .server
        .get(&format!("/api/v1/task/{}", task_id))
        .add_header("Authorization", bearer(&a_token))
        .await;
    let task: Value = response.json();
    assert!(task["comments"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_created_and_executable_listings() {
    let app = create_test_app().await;
    let (a_id, a_token) = register_and_login(&app.server, "a@example.com").await;
    let (b_id, b_token) = register_and_login(&app.server, "b@example.com").await;

    let first = create_task(&app.server, &a_token, a_id, &[b_id]).await;
    let second = create_task(&app.server, &a_token, a_id, &[]).await;

    let response = app
        .server
        .get(&format!("/api/v1/task/created/{}", a_id))
        .add_header("Authorization", bearer(&b_token))
        .await;
    response.assert_status_ok();
    let created: Vec<Value> = response.json();
    let ids: Vec<i64> = created.iter().filter_map(|t| t["id"].as_i64()).collect();
    assert_eq!(ids, vec![first, second]);

    let response = app
        .server
        .get(&format!("/api/v1/task/executable/{}", b_id))
        .add_header("Authorization", bearer(&a_token))
        .await;
    response.assert_status_ok();
    let executable: Vec<Value> = response.json();
    assert_eq!(executable.len(), 1);
    assert_eq!(executable[0]["id"], first);

    let response = app
        .server
        .get(&format!("/api/v1/task/executable/{}", b_id + 100))
        .add_header("Authorization", bearer(&a_token))
        .await;
    response.assert_status_not_found();
}
