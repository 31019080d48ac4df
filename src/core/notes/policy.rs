//! Note ownership policy
//!
//! Every read goes through a [`NoteScope`]; every write is keyed by the owner
//! id. Notes outside the caller's scope are reported as missing, never as
//! forbidden, so the existence of other users' private notes is not disclosed.

use crate::core::db::models::Note;

/// Visibility filter applied to note reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteScope {
    /// Notes owned by this identity, public or not
    OwnedBy(i64),
    /// Public notes of any owner
    Public,
}

impl NoteScope {
    /// Check whether a note falls inside this scope
    pub fn permits(&self, note: &Note) -> bool {
        match self {
            NoteScope::OwnedBy(owner_id) => note.owner_id == *owner_id,
            NoteScope::Public => note.is_public,
        }
    }
}

/// What a viewer may do with a particular note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteAccess {
    Owner,
    /// Public note viewed by someone other than its owner
    Reader,
    None,
}

impl NoteAccess {
    /// Resolve access for an optional authenticated viewer
    pub fn resolve(note: &Note, viewer: Option<i64>) -> Self {
        match viewer {
            Some(id) if id == note.owner_id => NoteAccess::Owner,
            _ if note.is_public => NoteAccess::Reader,
            _ => NoteAccess::None,
        }
    }

    /// Only the owner may update or delete
    pub fn can_modify(&self) -> bool {
        matches!(self, NoteAccess::Owner)
    }
}
