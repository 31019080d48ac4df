//! JWT utilities for token generation and validation
//!
//! Session tokens are HS256-signed and self-contained: the server keeps no
//! record of issued tokens. A token stays valid for its whole lifetime (24
//! hours) even if the account behind it changes password or is deleted.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session token lifetime (24 hours)
const SESSION_TOKEN_EXPIRATION_HOURS: i64 = 24;

/// Signing secret used when `JWT_SECRET` is unset outside production.
/// Anyone reading this source can forge tokens signed with it.
pub const INSECURE_DEVELOPMENT_SECRET: &str = "notekeeper-insecure-development-secret-do-not-deploy";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Session token lifetime in hours
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Create a new JWT configuration
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours: SESSION_TOKEN_EXPIRATION_HOURS,
        }
    }

    /// Configuration signed with [`INSECURE_DEVELOPMENT_SECRET`]
    pub fn insecure_development() -> Self {
        Self::new(INSECURE_DEVELOPMENT_SECRET)
    }

    /// Whether this config signs with the public development secret
    pub fn is_insecure_default(&self) -> bool {
        self.secret == INSECURE_DEVELOPMENT_SECRET
    }

    /// Set token lifetime
    pub fn expiration(mut self, hours: i64) -> Self {
        self.expiration_hours = hours;
        self
    }
}

/// JWT errors
///
/// Verification failures all collapse into `InvalidToken`; the reason is only logged.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(String),

    #[error("Invalid or expired token")]
    InvalidToken,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// A token is live while `exp` is strictly in the future
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.exp > now.timestamp()
    }
}

/// Issued session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
    /// Expiration (Unix timestamp)
    pub expires_at: i64,
}

/// JWT service for token operations
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn is_insecure_default(&self) -> bool {
        self.config.is_insecure_default()
    }

    /// Issue a session token for an identity
    pub fn issue(&self, user_id: i64, username: &str, email: &str) -> Result<SessionToken, JwtError> {
        self.issue_at(user_id, username, email, Utc::now())
    }

    /// Issue a session token as if the current time were `issued_at`
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<SessionToken, JwtError> {
        let exp = issued_at + Duration::hours(self.config.expiration_hours);

        let claims = Claims {
            user_id,
            username: username.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(SessionToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Validate and decode a token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate and decode a token against an explicit clock reading
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below with a strict comparison against `now`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token rejected: {:?}", e.kind());
                JwtError::InvalidToken
            })?
            .claims;

        if !claims.is_live_at(now) {
            tracing::debug!("Token rejected: expired at {}", claims.exp);
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}
