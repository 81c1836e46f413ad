use crate::{
    auth::AuthUser,
    types::{Result, UserResponse},
    AppState,
};
use axum::{extract::State, Json};

/// Get a list of users
#[utoipa::path(
    get,
    path = "/api/v1/user/list",
    responses(
        (status = 200, description = "List of users retrieved successfully", body = Vec<UserResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "users",
    security(("bearer" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(_principal): AuthUser,
) -> Result<Json<Vec<UserResponse>>> {
    let users = state
        .directory
        .list_principals()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(users))
}
