//! User repository for database operations
//!
//! Username and email uniqueness is enforced by the `users_username_key` and
//! `users_email_key` constraints. Callers may pre-check with the `exists_*`
//! methods, but only `create` is authoritative.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::db::models::{CreateUser, Identity};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// User repository error types
#[derive(Debug, thiserror::Error)]
pub enum UserRepositoryError {
    #[error("Username already exists")]
    UsernameAlreadyExists,

    #[error("Email already exists")]
    EmailAlreadyExists,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Persistence of user identities
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find the identity whose username or email equals `login` (case-sensitive).
    /// A username match wins over an email match.
    async fn find_by_username_or_email(
        &self,
        login: &str,
    ) -> Result<Option<Identity>, UserRepositoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserRepositoryError>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserRepositoryError>;

    /// Insert a new identity, rejecting duplicates atomically
    async fn create(&self, new_user: &CreateUser) -> Result<Identity, UserRepositoryError>;
}

/// PostgreSQL-backed credential store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Translate a unique-constraint violation into the matching duplicate error
fn map_insert_error(err: sqlx::Error) -> UserRepositoryError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.is_unique_violation()
    {
        match db_err.constraint() {
            Some(USERNAME_CONSTRAINT) => return UserRepositoryError::UsernameAlreadyExists,
            Some(EMAIL_CONSTRAINT) => return UserRepositoryError::EmailAlreadyExists,
            _ => {}
        }
    }

    UserRepositoryError::DatabaseError(err)
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_username_or_email(
        &self,
        login: &str,
    ) -> Result<Option<Identity>, UserRepositoryError> {
        let user = sqlx::query_as::<_, Identity>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY (username = $1) DESC
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserRepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserRepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create(&self, new_user: &CreateUser) -> Result<Identity, UserRepositoryError> {
        sqlx::query_as::<_, Identity>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }
}
