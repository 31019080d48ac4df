//! Note service
//!
//! Applies the ownership policy to every note operation. Owner-scoped
//! operations take the [`AuthenticatedUser`] produced by the access guard;
//! the owner of a new note is always that user.

use std::sync::Arc;

use crate::core::auth::AuthenticatedUser;
use crate::core::db::models::{CreateNote, Note, NoteInput, UpdateNote};
use crate::core::db::repositories::{NoteRepositoryError, NoteStore};
use crate::core::notes::policy::NoteScope;

/// Maximum note title length in characters
pub const MAX_TITLE_LEN: usize = 255;

/// Note service error types
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    /// Absent, or not visible to the caller
    #[error("Note not found")]
    NotFound,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<NoteRepositoryError> for NoteError {
    fn from(err: NoteRepositoryError) -> Self {
        match err {
            NoteRepositoryError::DatabaseError(e) => NoteError::InternalError(e.to_string()),
            NoteRepositoryError::OwnerNotFound(id) => {
                NoteError::InternalError(format!("note owner {id} does not exist"))
            }
        }
    }
}

/// Validated, normalized note fields
struct NoteFields {
    title: String,
    content: String,
    image_url: Option<String>,
    is_public: bool,
}

impl TryFrom<NoteInput> for NoteFields {
    type Error = NoteError;

    fn try_from(input: NoteInput) -> Result<Self, Self::Error> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(NoteError::BadRequest("Title cannot be empty".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(NoteError::BadRequest(format!(
                "Title too long (max {MAX_TITLE_LEN} characters)"
            )));
        }

        let image_url = input
            .image_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            title: title.to_string(),
            content: input.content,
            image_url,
            is_public: input.is_public,
        })
    }
}

/// Note service
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteStore>) -> Self {
        Self { notes }
    }

    /// The caller's own notes, newest first
    pub async fn list_own(&self, user: &AuthenticatedUser) -> Result<Vec<Note>, NoteError> {
        Ok(self.notes.list(NoteScope::OwnedBy(user.user_id)).await?)
    }

    /// One of the caller's own notes
    pub async fn get_own(&self, user: &AuthenticatedUser, id: i64) -> Result<Note, NoteError> {
        self.notes
            .find(id, NoteScope::OwnedBy(user.user_id))
            .await?
            .ok_or(NoteError::NotFound)
    }

    /// All public notes, newest first
    pub async fn list_public(&self) -> Result<Vec<Note>, NoteError> {
        Ok(self.notes.list(NoteScope::Public).await?)
    }

    pub async fn get_public(&self, id: i64) -> Result<Note, NoteError> {
        self.notes
            .find(id, NoteScope::Public)
            .await?
            .ok_or(NoteError::NotFound)
    }

    pub async fn create(
        &self,
        user: &AuthenticatedUser,
        input: NoteInput,
    ) -> Result<Note, NoteError> {
        let fields = NoteFields::try_from(input)?;

        let note = self
            .notes
            .create(&CreateNote {
                owner_id: user.user_id,
                title: fields.title,
                content: fields.content,
                image_url: fields.image_url,
                is_public: fields.is_public,
            })
            .await?;

        Ok(note)
    }

    /// Replace the editable fields of one of the caller's notes
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i64,
        input: NoteInput,
    ) -> Result<Note, NoteError> {
        let fields = NoteFields::try_from(input)?;

        self.notes
            .update(
                id,
                user.user_id,
                &UpdateNote {
                    title: fields.title,
                    content: fields.content,
                    image_url: fields.image_url,
                    is_public: fields.is_public,
                },
            )
            .await?
            .ok_or(NoteError::NotFound)
    }

    pub async fn delete(&self, user: &AuthenticatedUser, id: i64) -> Result<(), NoteError> {
        if self.notes.delete(id, user.user_id).await? {
            Ok(())
        } else {
            Err(NoteError::NotFound)
        }
    }
}
