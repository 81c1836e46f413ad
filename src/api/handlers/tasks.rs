//! Task and comment handlers.
//!
//! Handlers only translate HTTP into [`TaskService`](crate::tasks::TaskService)
//! calls; ownership checks happen inside the service.

use crate::{
    auth::AuthUser,
    types::{CommentResponse, Result, Status, TaskRequest, TaskResponse},
    AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

/// Create a new task
#[utoipa::path(
    post,
    path = "/api/v1/task/create",
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created successfully", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Author is not the caller"),
        (status = 404, description = "Executor not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Json(payload): Json<TaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    let task = state.tasks.create(&principal, payload).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update an existing task
#[utoipa::path(
    post,
    path = "/api/v1/task/update/{task_id}",
    params(("task_id" = i64, Path, description = "Task ID")),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated successfully", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(task_id): Path<i64>,
    Json(payload): Json<TaskRequest>,
) -> Result<Json<TaskResponse>> {
    let task = state.tasks.update(&principal, task_id, payload).await?;
    Ok(Json(task))
}

/// Change status of a task
#[utoipa::path(
    post,
    path = "/api/v1/task/change-status/{task_id}",
    params(("task_id" = i64, Path, description = "Task ID")),
    request_body = Status,
    responses(
        (status = 200, description = "Status updated successfully", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an executor"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn change_status(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(task_id): Path<i64>,
    Json(status): Json<Status>,
) -> Result<Json<TaskResponse>> {
    let task = state.tasks.change_status(&principal, task_id, status).await?;
    Ok(Json(task))
}

/// Delete a task by ID
#[utoipa::path(
    post,
    path = "/api/v1/task/delete/{task_id}",
    params(("task_id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted successfully", body = String),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not the author"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<String> {
    state.tasks.delete(&principal, task_id).await?;
    Ok(format!("Task with id {} deleted", task_id))
}

/// Get a task by ID
#[utoipa::path(
    get,
    path = "/api/v1/task/{task_id}",
    params(("task_id" = i64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task retrieved successfully", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Path(task_id): Path<i64>,
) -> Result<Json<TaskResponse>> {
    Ok(Json(state.tasks.get(task_id).await?))
}

/// Get tasks a user is assigned to execute
#[utoipa::path(
    get,
    path = "/api/v1/task/executable/{user_id}",
    params(("user_id" = i64, Path, description = "Executor user ID")),
    responses(
        (status = 200, description = "Executable tasks retrieved successfully", body = Vec<TaskResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn executable_tasks(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TaskResponse>>> {
    Ok(Json(state.tasks.list_by_executor(user_id).await?))
}

/// Get tasks created by a user
#[utoipa::path(
    get,
    path = "/api/v1/task/created/{user_id}",
    params(("user_id" = i64, Path, description = "Author user ID")),
    responses(
        (status = 200, description = "Created tasks retrieved successfully", body = Vec<TaskResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn created_tasks(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<TaskResponse>>> {
    Ok(Json(state.tasks.list_by_author(user_id).await?))
}

/// Add a comment to a task
///
/// The request body is the comment text as plain text.
#[utoipa::path(
    post,
    path = "/api/v1/task/{task_id}/add-comment",
    params(("task_id" = i64, Path, description = "Task ID")),
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 200, description = "Comment added successfully", body = CommentResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found")
    ),
    tag = "tasks",
    security(("bearer" = []))
)]
pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    Path(task_id): Path<i64>,
    text: String,
) -> Result<Json<CommentResponse>> {
    let comment = state.tasks.add_comment(&principal, task_id, &text).await?;
    Ok(Json(comment))
}
