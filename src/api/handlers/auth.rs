use crate::{
    auth::credentials::hash_password,
    types::{AppError, LoginRequest, RegisterRequest, Result, TokenResponse, UserResponse},
    AppState,
};
use axum::{extract::State, Json};
use tracing::info;

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/registration",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid input or user with this email already exists")
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    validate_registration(&payload)?;

    let password_hash = hash_password(&payload.password)?;
    let principal = state
        .directory
        .create_principal(&payload.email, &password_hash)
        .await?;

    info!(user_id = principal.id, "User registered");
    Ok(Json(principal.into()))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successfully authenticated and token generated", body = TokenResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let principal = state
        .credentials
        .verify(&payload.email, &payload.password)
        .await?;

    let token = state.token_service.issue(&principal)?;

    info!(user_id = principal.id, "User logged in");
    Ok(Json(TokenResponse {
        token,
        email: principal.email,
        expires_in: state.token_service.ttl_secs(),
    }))
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::InvalidInput("Email is required".to_string()));
    }
    if payload.password.trim().is_empty() {
        return Err(AppError::InvalidInput("Password can't be empty".to_string()));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a@b"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("a@b@c"));
        assert!(!is_valid_email("al ice@example.com"));
    }

    #[test]
    fn test_blank_password_rejected() {
        let payload = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "   ".to_string(),
        };

        assert!(matches!(
            validate_registration(&payload),
            Err(AppError::InvalidInput(_))
        ));
    }
}
