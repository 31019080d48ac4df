//! Database models
//!
//! This module defines the entity structs that map to PostgreSQL tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// User Model
// ============================================================================

/// Registered user identity
#[derive(Clone, Serialize, Deserialize, FromRow)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// User data for creation (password_hash must already be hashed)
#[derive(Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl std::fmt::Debug for CreateUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// User without sensitive data (for API responses)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<Identity> for UserResponse {
    fn from(user: Identity) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

// ============================================================================
// Note Model
// ============================================================================

/// Note entity. Every note has exactly one owner.
///
/// `owner_username` is read from the owner's identity so listings can show
/// and filter by author. No other identity field is exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Note {
    pub id: i64,
    pub owner_id: i64,
    pub owner_username: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note fields a client may set. The owner always comes from the session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_public: bool,
}

/// Note data for creation
#[derive(Debug, Clone)]
pub struct CreateNote {
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_public: bool,
}

/// Full replacement of a note's editable fields
#[derive(Debug, Clone)]
pub struct UpdateNote {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_public: bool,
}
