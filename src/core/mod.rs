//! Core domain: configuration, authentication, persistence and notes

pub mod auth;
pub mod config;
pub mod db;
pub mod notes;
