//! Notekeeper - multi-user notes service
//!
//! Users register and log in to receive a signed session token, then manage
//! their own notes over a JSON API. Notes can be shared read-only by marking
//! them public.

pub mod app;
pub mod core;
