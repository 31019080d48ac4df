//! Authentication service
//!
//! Registration and login. Coordinates between the credential store, the
//! password hasher and the JWT service.

use std::sync::Arc;

use crate::core::auth::jwt::{JwtError, JwtService};
use crate::core::auth::password::{HashError, PasswordHasher};
use crate::core::db::models::{CreateUser, UserResponse};
use crate::core::db::repositories::{CredentialStore, UserRepositoryError};

/// Minimum username length in characters
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Authentication service error types
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input")]
    InvalidInput,

    #[error("Username must be at least 3 characters")]
    UsernameTooShort,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Username already taken")]
    UsernameAlreadyExists,

    #[error("Email already registered")]
    EmailAlreadyExists,

    /// Covers both an unknown login and a wrong password
    #[error("Invalid login or password")]
    InvalidCredentials,

    #[error("Password hashing failed")]
    HashingError(#[source] HashError),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<UserRepositoryError> for AuthError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::UsernameAlreadyExists => AuthError::UsernameAlreadyExists,
            UserRepositoryError::EmailAlreadyExists => AuthError::EmailAlreadyExists,
            UserRepositoryError::DatabaseError(e) => AuthError::InternalError(e.to_string()),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(err: HashError) -> Self {
        AuthError::HashingError(err)
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

/// Registration request data
#[derive(Clone, serde::Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login request data. `login` is matched against username or email.
#[derive(Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// Successful login: session token plus the public user view
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: UserResponse,
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    jwt_service: JwtService,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        users: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            users,
            hasher,
            jwt_service,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    fn validate_username(username: &str) -> Result<(), AuthError> {
        if username.chars().count() < MIN_USERNAME_LEN {
            return Err(AuthError::UsernameTooShort);
        }
        Ok(())
    }

    fn validate_password(password: &str) -> Result<(), AuthError> {
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(())
    }

    /// An email needs an `@` with a `.` somewhere after it
    fn validate_email(email: &str) -> Result<(), AuthError> {
        match email.find('@') {
            Some(at) if email[at + 1..].contains('.') => Ok(()),
            _ => Err(AuthError::InvalidEmail),
        }
    }

    /// Register a new user.
    ///
    /// Checks run in a fixed order and the first failure wins. Nothing is
    /// written unless every check passes.
    pub async fn register(&self, request: RegisterRequest) -> Result<UserResponse, AuthError> {
        Self::validate_username(&request.username)?;
        Self::validate_password(&request.password)?;
        Self::validate_email(&request.email)?;

        // Fast-path checks; the store's unique constraints settle races
        if self.users.exists_by_username(&request.username).await? {
            return Err(AuthError::UsernameAlreadyExists);
        }
        if self.users.exists_by_email(&request.email).await? {
            return Err(AuthError::EmailAlreadyExists);
        }

        let RegisterRequest {
            username,
            email,
            password,
        } = request;

        let password_hash = self.hasher.hash_blocking(password).await?;

        let user = self
            .users
            .create(&CreateUser {
                username,
                email,
                password_hash,
            })
            .await?;

        Ok(user.into())
    }

    /// Login an existing user by username or email
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let Some(user) = self.users.find_by_username_or_email(&request.login).await? else {
            tracing::warn!("Login failed: no user matches {}", request.login);
            return Err(AuthError::InvalidCredentials);
        };

        let is_valid = self
            .hasher
            .verify_blocking(request.password, user.password_hash.clone())
            .await?;

        if !is_valid {
            tracing::warn!("Login failed: wrong password for user id {}", user.id);
            return Err(AuthError::InvalidCredentials);
        }

        let session = self
            .jwt_service
            .issue(user.id, &user.username, &user.email)?;

        Ok(LoginResponse {
            token: session.token,
            expires_at: session.expires_at,
            user: user.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::jwt::JwtConfig;
    use crate::core::db::repositories::InMemoryUserStore;

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login_request(login: &str, password: &str) -> LoginRequest {
        LoginRequest {
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    fn create_test_service() -> (AuthService, Arc<InMemoryUserStore>) {
        let store = Arc::new(InMemoryUserStore::new());
        let service = AuthService::new(
            store.clone(),
            PasswordHasher::new(4),
            JwtService::new(JwtConfig::new("test_secret")),
        );
        (service, store)
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email() {
        assert!(AuthService::validate_email("a@x.com").is_ok());
        assert!(AuthService::validate_email("user.name@example.co.uk").is_ok());

        assert!(AuthService::validate_email("").is_err());
        assert!(AuthService::validate_email("invalid").is_err());
        assert!(AuthService::validate_email("user@example").is_err());
        assert!(AuthService::validate_email("first.last@example").is_err());
        assert!(AuthService::validate_email("no-at.example.com").is_err());
    }

    #[test]
    fn test_validate_username_counts_characters() {
        assert!(AuthService::validate_username("abc").is_ok());
        assert!(AuthService::validate_username("ab").is_err());
        assert!(AuthService::validate_username("").is_err());
        // Two characters, four bytes
        assert!(AuthService::validate_username("éé").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(AuthService::validate_password("secret").is_ok());
        assert!(matches!(
            AuthService::validate_password("12345"),
            Err(AuthError::PasswordTooShort)
        ));
    }

    // ========================================================================
    // Registration Tests
    // ========================================================================

    #[tokio::test]
    async fn test_register_success_stores_hash_not_plaintext() {
        let (service, store) = create_test_service();

        let user = service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.com");

        let stored = store
            .find_by_username_or_email("alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, user.id);
        assert_ne!(stored.password_hash, "secret1");
        assert!(
            PasswordHasher::new(4)
                .verify("secret1", &stored.password_hash)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let (service, store) = create_test_service();

        // Everything wrong: username is reported first
        let err = service
            .register(register_request("ab", "bad", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameTooShort));

        // Password before email
        let err = service
            .register(register_request("alice", "bad", "123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordTooShort));

        let err = service
            .register(register_request("alice", "bad", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidEmail));

        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_register_duplicate_username_and_email() {
        let (service, store) = create_test_service();
        service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let err = service
            .register(register_request("alice", "other@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameAlreadyExists));

        let err = service
            .register(register_request("alicia", "a@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyExists));

        // Username checked before email when both collide
        let err = service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UsernameAlreadyExists));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registration_creates_one_identity() {
        let (service, store) = create_test_service();

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .register(register_request("alice", &format!("a{i}@x.com"), "secret1"))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(e) => assert!(matches!(e, AuthError::UsernameAlreadyExists), "{e:?}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }

    // ========================================================================
    // Login Tests
    // ========================================================================

    #[tokio::test]
    async fn test_login_by_username_and_email() {
        let (service, _) = create_test_service();
        let registered = service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let by_name = service.login(login_request("alice", "secret1")).await.unwrap();
        assert!(!by_name.token.is_empty());
        assert_eq!(by_name.user, registered);

        let by_email = service
            .login(login_request("a@x.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(by_email.user.id, registered.id);

        let claims = service.jwt_service().verify(&by_name.token).unwrap();
        assert_eq!(claims.user_id, registered.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp, by_name.expires_at);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = create_test_service();
        service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let unknown = service
            .login(login_request("nobody", "secret1"))
            .await
            .unwrap_err();
        let wrong = service
            .login(login_request("alice", "wrong-password"))
            .await
            .unwrap_err();

        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn test_login_is_case_sensitive() {
        let (service, _) = create_test_service();
        service
            .register(register_request("alice", "a@x.com", "secret1"))
            .await
            .unwrap();

        let err = service
            .login(login_request("ALICE", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    // ========================================================================
    // Error / DTO Tests
    // ========================================================================

    #[test]
    fn test_auth_error_from_user_repository_error() {
        let err: AuthError = UserRepositoryError::UsernameAlreadyExists.into();
        assert!(matches!(err, AuthError::UsernameAlreadyExists));

        let err: AuthError = UserRepositoryError::EmailAlreadyExists.into();
        assert!(matches!(err, AuthError::EmailAlreadyExists));

        let err: AuthError = UserRepositoryError::DatabaseError(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, AuthError::InternalError(_)));
    }

    #[test]
    fn test_hashing_error_message_is_generic() {
        let err: AuthError = HashError::Hashing("rng unavailable".to_string()).into();
        assert_eq!(err.to_string(), "Password hashing failed");
    }

    #[test]
    fn test_request_debug_redacts_password() {
        let register = register_request("alice", "a@x.com", "hunter22");
        let login = login_request("alice", "hunter22");

        assert!(!format!("{:?}", register).contains("hunter22"));
        assert!(!format!("{:?}", login).contains("hunter22"));
        assert!(format!("{:?}", login).contains("alice"));
    }

    #[test]
    fn test_login_request_deserialization() {
        let request: LoginRequest =
            serde_json::from_str(r#"{"login": "alice", "password": "secret1"}"#).unwrap();
        assert_eq!(request.login, "alice");
        assert_eq!(request.password, "secret1");
    }
}
