//! Note repository for database operations
//!
//! Reads take a [`NoteScope`] and writes take the acting owner id; the owner
//! condition is part of every statement's WHERE clause.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::db::models::{CreateNote, Note, UpdateNote};
use crate::core::notes::policy::NoteScope;

// Selected over `n` (notes, or a CTE of written notes) joined to its owner `u`
const NOTE_COLUMNS: &str = "n.id, n.owner_id, u.username AS owner_username, n.title, n.content, \
     n.image_url, n.is_public, n.created_at, n.updated_at";
const OWNER_JOIN: &str = "JOIN users u ON u.id = n.owner_id";

/// Note repository error types
#[derive(Debug, thiserror::Error)]
pub enum NoteRepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Owner {0} does not exist")]
    OwnerNotFound(i64),
}

/// Persistence of notes, always scoped by owner or visibility
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Notes in scope, newest first
    async fn list(&self, scope: NoteScope) -> Result<Vec<Note>, NoteRepositoryError>;

    async fn find(&self, id: i64, scope: NoteScope) -> Result<Option<Note>, NoteRepositoryError>;

    async fn create(&self, dto: &CreateNote) -> Result<Note, NoteRepositoryError>;

    /// Replace a note's fields if `owner_id` owns it; `None` if nothing matched
    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        dto: &UpdateNote,
    ) -> Result<Option<Note>, NoteRepositoryError>;

    /// Delete a note if `owner_id` owns it; `false` if nothing matched
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, NoteRepositoryError>;
}

/// PostgreSQL-backed note store
#[derive(Clone)]
pub struct NoteRepository {
    pool: PgPool,
}

impl NoteRepository {
    /// Create a new note repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteStore for NoteRepository {
    async fn list(&self, scope: NoteScope) -> Result<Vec<Note>, NoteRepositoryError> {
        let notes = match scope {
            NoteScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, Note>(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes n {OWNER_JOIN} \
                     WHERE n.owner_id = $1 ORDER BY n.created_at DESC, n.id DESC"
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
            NoteScope::Public => {
                sqlx::query_as::<_, Note>(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes n {OWNER_JOIN} \
                     WHERE n.is_public ORDER BY n.created_at DESC, n.id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(notes)
    }

    async fn find(&self, id: i64, scope: NoteScope) -> Result<Option<Note>, NoteRepositoryError> {
        let note = match scope {
            NoteScope::OwnedBy(owner_id) => {
                sqlx::query_as::<_, Note>(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes n {OWNER_JOIN} WHERE n.id = $1 AND n.owner_id = $2"
                ))
                .bind(id)
                .bind(owner_id)
                .fetch_optional(&self.pool)
                .await?
            }
            NoteScope::Public => {
                sqlx::query_as::<_, Note>(&format!(
                    "SELECT {NOTE_COLUMNS} FROM notes n {OWNER_JOIN} WHERE n.id = $1 AND n.is_public"
                ))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
            }
        };

        Ok(note)
    }

    async fn create(&self, dto: &CreateNote) -> Result<Note, NoteRepositoryError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            WITH n AS (
                INSERT INTO notes (owner_id, title, content, image_url, is_public)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT {NOTE_COLUMNS} FROM n {OWNER_JOIN}
            "#
        ))
        .bind(dto.owner_id)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&dto.image_url)
        .bind(dto.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(note)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        dto: &UpdateNote,
    ) -> Result<Option<Note>, NoteRepositoryError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            WITH n AS (
                UPDATE notes
                SET title = $3, content = $4, image_url = $5, is_public = $6
                WHERE id = $1 AND owner_id = $2
                RETURNING *
            )
            SELECT {NOTE_COLUMNS} FROM n {OWNER_JOIN}
            "#
        ))
        .bind(id)
        .bind(owner_id)
        .bind(&dto.title)
        .bind(&dto.content)
        .bind(&dto.image_url)
        .bind(dto.is_public)
        .fetch_optional(&self.pool)
        .await?;

        Ok(note)
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, NoteRepositoryError> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
