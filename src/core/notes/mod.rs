//! Notes module
//!
//! Note CRUD scoped by the ownership policy, plus the public-read endpoints.

pub mod api;
pub mod policy;
pub mod service;

pub use api::{NoteApiState, note_api_router};
pub use policy::{NoteAccess, NoteScope};
pub use service::{NoteError, NoteService};
