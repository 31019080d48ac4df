//! Auth API endpoints
//!
//! Provides REST API endpoints for authentication:
//! - POST /api/register - Register a new user
//! - POST /api/login - Login and get a session token

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use std::sync::Arc;

use crate::core::auth::{AuthError, AuthService, LoginRequest, LoginResponse, RegisterRequest};
use crate::core::db::models::UserResponse;

/// Auth API state containing the auth service
#[derive(Clone)]
pub struct AuthApiState {
    pub auth_service: AuthService,
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

/// Convert AuthError to API response
impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AuthError::InvalidInput => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            AuthError::UsernameTooShort => (StatusCode::BAD_REQUEST, "USERNAME_TOO_SHORT"),
            AuthError::PasswordTooShort => (StatusCode::BAD_REQUEST, "PASSWORD_TOO_SHORT"),
            AuthError::InvalidEmail => (StatusCode::BAD_REQUEST, "INVALID_EMAIL"),
            AuthError::UsernameAlreadyExists => (StatusCode::CONFLICT, "USERNAME_EXISTS"),
            AuthError::EmailAlreadyExists => (StatusCode::CONFLICT, "EMAIL_EXISTS"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::HashingError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "HASHING_ERROR"),
            AuthError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            AuthError::InternalError(detail) => {
                tracing::error!("Auth request failed: {}", detail);
                "Internal server error".to_string()
            }
            AuthError::HashingError(e) => {
                tracing::error!("Auth request failed: {}", e);
                self.to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

/// Response for successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Create the auth API router
pub fn auth_api_router(state: AuthApiState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/api/register", post(register_handler))
        .route("/api/login", post(login_handler))
        .with_state(state)
}

/// POST /api/register
/// Register a new user
async fn register_handler(
    State(state): State<Arc<AuthApiState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<RegisterResponse>, AuthError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Invalid registration input: {}", e.body_text());
        AuthError::InvalidInput
    })?;

    tracing::info!("Registration attempt for username: {}", request.username);

    let user = state.auth_service.register(request).await.inspect_err(|e| {
        tracing::warn!("Registration rejected: {}", e);
    })?;

    tracing::info!(
        "User registered successfully: {} (ID: {})",
        user.username,
        user.id
    );

    Ok(Json(RegisterResponse {
        message: "User registered successfully".to_string(),
        user,
    }))
}

/// POST /api/login
/// Login and get a session token
async fn login_handler(
    State(state): State<Arc<AuthApiState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AuthError> {
    let Json(request) = payload.map_err(|e| {
        tracing::warn!("Invalid login input: {}", e.body_text());
        AuthError::InvalidInput
    })?;

    tracing::info!("Login attempt for: {}", request.login);

    let response = state.auth_service.login(request).await?;

    tracing::info!(
        "Login successful: {} (ID: {})",
        response.user.username,
        response.user.id
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::password::HashError;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("Something went wrong", "ERROR_CODE");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["error"], "Something went wrong");
        assert_eq!(json["code"], "ERROR_CODE");
    }

    #[test]
    fn test_auth_error_status_codes() {
        let cases = [
            (AuthError::InvalidInput, StatusCode::BAD_REQUEST),
            (AuthError::UsernameTooShort, StatusCode::BAD_REQUEST),
            (AuthError::PasswordTooShort, StatusCode::BAD_REQUEST),
            (AuthError::InvalidEmail, StatusCode::BAD_REQUEST),
            (AuthError::UsernameAlreadyExists, StatusCode::CONFLICT),
            (AuthError::EmailAlreadyExists, StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                AuthError::HashingError(HashError::MalformedHash),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AuthError::InternalError("db down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_register_response_serialization() {
        let response = RegisterResponse {
            message: "User registered successfully".to_string(),
            user: UserResponse {
                id: 1,
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["message"], "User registered successfully");
        assert_eq!(json["user"]["username"], "alice");
        assert!(json["user"].get("password_hash").is_none());
    }
}
