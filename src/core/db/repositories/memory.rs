//! In-process stores
//!
//! Used when no `DATABASE_URL` is configured in development, and by tests.
//! Contents are lost on restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::core::db::models::{CreateNote, CreateUser, Identity, Note, UpdateNote};
use crate::core::db::repositories::{
    CredentialStore, NoteRepositoryError, NoteStore, UserRepositoryError,
};
use crate::core::notes::policy::{NoteAccess, NoteScope};

/// Memory-backed credential store.
///
/// A single lock covers the whole table so the duplicate check and the insert
/// in `create` are one atomic step.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<Identity>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    async fn username_of(&self, id: i64) -> Option<String> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .map(|u| u.username.clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryUserStore {
    async fn find_by_username_or_email(
        &self,
        login: &str,
    ) -> Result<Option<Identity>, UserRepositoryError> {
        let users = self.users.read().await;
        let found = users
            .iter()
            .find(|u| u.username == login)
            .or_else(|| users.iter().find(|u| u.email == login))
            .cloned();

        Ok(found)
    }

    async fn exists_by_username(&self, username: &str) -> Result<bool, UserRepositoryError> {
        Ok(self.users.read().await.iter().any(|u| u.username == username))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, UserRepositoryError> {
        Ok(self.users.read().await.iter().any(|u| u.email == email))
    }

    async fn create(&self, new_user: &CreateUser) -> Result<Identity, UserRepositoryError> {
        let mut users = self.users.write().await;

        if users.iter().any(|u| u.username == new_user.username) {
            return Err(UserRepositoryError::UsernameAlreadyExists);
        }
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(UserRepositoryError::EmailAlreadyExists);
        }

        let now = Utc::now();
        let identity = Identity {
            id: users.last().map_or(1, |u| u.id + 1),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            password_hash: new_user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        users.push(identity.clone());

        Ok(identity)
    }
}

/// Memory-backed note store.
///
/// Owners are resolved against the linked user store. Usernames never change
/// after registration, so the author's name is captured once at creation.
pub struct InMemoryNoteStore {
    users: Arc<InMemoryUserStore>,
    notes: DashMap<i64, Note>,
    next_id: AtomicI64,
}

impl InMemoryNoteStore {
    pub fn new(users: Arc<InMemoryUserStore>) -> Self {
        Self {
            users,
            notes: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn list(&self, scope: NoteScope) -> Result<Vec<Note>, NoteRepositoryError> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|entry| scope.permits(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(notes)
    }

    async fn find(&self, id: i64, scope: NoteScope) -> Result<Option<Note>, NoteRepositoryError> {
        Ok(self
            .notes
            .get(&id)
            .filter(|entry| scope.permits(entry.value()))
            .map(|entry| entry.value().clone()))
    }

    async fn create(&self, dto: &CreateNote) -> Result<Note, NoteRepositoryError> {
        let owner_username = self
            .users
            .username_of(dto.owner_id)
            .await
            .ok_or(NoteRepositoryError::OwnerNotFound(dto.owner_id))?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let now = Utc::now();
        let note = Note {
            id,
            owner_id: dto.owner_id,
            owner_username,
            title: dto.title.clone(),
            content: dto.content.clone(),
            image_url: dto.image_url.clone(),
            is_public: dto.is_public,
            created_at: now,
            updated_at: now,
        };
        self.notes.insert(id, note.clone());

        Ok(note)
    }

    async fn update(
        &self,
        id: i64,
        owner_id: i64,
        dto: &UpdateNote,
    ) -> Result<Option<Note>, NoteRepositoryError> {
        let Some(mut entry) = self.notes.get_mut(&id) else {
            return Ok(None);
        };
        if !NoteAccess::resolve(entry.value(), Some(owner_id)).can_modify() {
            return Ok(None);
        }

        let note = entry.value_mut();
        note.title = dto.title.clone();
        note.content = dto.content.clone();
        note.image_url = dto.image_url.clone();
        note.is_public = dto.is_public;
        note.updated_at = Utc::now();

        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, NoteRepositoryError> {
        let removed = self
            .notes
            .remove_if(&id, |_, note| {
                NoteAccess::resolve(note, Some(owner_id)).can_modify()
            });

        Ok(removed.is_some())
    }
}
