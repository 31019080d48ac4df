//! Database repositories
//!
//! Repositories encapsulate data access behind the [`CredentialStore`] and
//! [`NoteStore`] traits. PostgreSQL implementations back production; the
//! in-memory ones back development without a database, and tests.

pub mod memory;
pub mod note;
pub mod user;

pub use memory::{InMemoryNoteStore, InMemoryUserStore};
pub use note::{NoteRepository, NoteRepositoryError, NoteStore};
pub use user::{CredentialStore, UserRepository, UserRepositoryError};
