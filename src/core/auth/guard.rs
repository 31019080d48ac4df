//! Access guard for protected routes
//!
//! [`AuthenticatedUser`] is an axum extractor: a handler that takes it as an
//! argument only runs once a valid `Authorization: Bearer <token>` header has
//! been verified. The guard is purely computational and never touches storage.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use crate::core::auth::api::ApiError;
use crate::core::auth::jwt::{Claims, JwtService};

const BEARER_PREFIX: &str = "Bearer ";

/// Guard rejections. Both map to 401.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    #[error("Missing authorization header")]
    MissingAuthorization,

    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for GuardError {
    fn into_response(self) -> Response {
        let code = match &self {
            GuardError::MissingAuthorization => "MISSING_AUTHORIZATION",
            GuardError::InvalidToken => "INVALID_TOKEN",
        };

        (
            StatusCode::UNAUTHORIZED,
            Json(ApiError::new(self.to_string(), code)),
        )
            .into_response()
    }
}

/// Identity proven by a verified session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
            email: claims.email,
        }
    }
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, GuardError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(GuardError::MissingAuthorization)?
        .to_str()
        .map_err(|_| GuardError::InvalidToken)?;

    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(GuardError::InvalidToken)?
        .trim();

    if token.is_empty() {
        return Err(GuardError::InvalidToken);
    }

    Ok(token)
}

/// Verify the request's bearer token
pub fn authenticate(
    jwt_service: &JwtService,
    headers: &HeaderMap,
) -> Result<AuthenticatedUser, GuardError> {
    let token = extract_bearer_token(headers)?;

    let claims = jwt_service
        .verify(token)
        .map_err(|_| GuardError::InvalidToken)?;

    Ok(claims.into())
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    JwtService: FromRef<S>,
{
    type Rejection = GuardError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jwt_service = JwtService::from_ref(state);

        let result = authenticate(&jwt_service, &parts.headers);
        if let Err(e) = &result {
            tracing::debug!("Rejected {} {}: {}", parts.method, parts.uri.path(), e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::JwtConfig;
    use axum::http::HeaderValue;
    use chrono::{Duration, Utc};

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig::new("guard_test_secret"))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_bearer_token_valid() {
        let headers = headers_with("Bearer my_token_123");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "my_token_123");
    }

    #[test]
    fn test_extract_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        let result = extract_bearer_token(&headers);
        assert_eq!(result, Err(GuardError::MissingAuthorization));
    }

    #[test]
    fn test_extract_bearer_token_invalid_format() {
        for value in ["Basic base64credentials", "my_token_123", "bearer my_token"] {
            assert_eq!(
                extract_bearer_token(&headers_with(value)),
                Err(GuardError::InvalidToken),
                "{value:?}"
            );
        }
    }

    #[test]
    fn test_extract_bearer_token_empty_token() {
        let headers = headers_with("Bearer ");
        let result = extract_bearer_token(&headers);
        assert_eq!(result, Err(GuardError::InvalidToken));
    }

    #[test]
    fn test_authenticate_valid_token() {
        let service = create_test_service();
        let issued = service.issue(3, "carol", "c@x.com").unwrap();

        let user = authenticate(&service, &headers_with(&format!("Bearer {}", issued.token)))
            .unwrap();

        assert_eq!(
            user,
            AuthenticatedUser {
                user_id: 3,
                username: "carol".to_string(),
                email: "c@x.com".to_string(),
            }
        );
    }

    #[test]
    fn test_authenticate_rejects_foreign_and_expired_tokens() {
        let service = create_test_service();

        let foreign = JwtService::new(JwtConfig::new("someone_else"))
            .issue(3, "carol", "c@x.com")
            .unwrap();
        let expired = service
            .issue_at(3, "carol", "c@x.com", Utc::now() - Duration::hours(48))
            .unwrap();

        for token in [foreign.token, expired.token, "garbage".to_string()] {
            assert_eq!(
                authenticate(&service, &headers_with(&format!("Bearer {token}"))),
                Err(GuardError::InvalidToken)
            );
        }
    }

    #[test]
    fn test_guard_error_messages() {
        assert_eq!(
            GuardError::MissingAuthorization.to_string(),
            "Missing authorization header"
        );
        assert_eq!(GuardError::InvalidToken.to_string(), "Invalid or expired token");
    }

    #[test]
    fn test_guard_error_status() {
        assert_eq!(
            GuardError::MissingAuthorization.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GuardError::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
