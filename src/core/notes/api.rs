//! Note API endpoints
//!
//! Provides REST API endpoints for notes:
//! - GET /api/notes - List the caller's notes (auth required)
//! - POST /api/notes - Create a note owned by the caller (auth required)
//! - GET /api/notes/{id} - Get one of the caller's notes (auth required)
//! - PUT /api/notes/{id} - Replace one of the caller's notes (auth required)
//! - DELETE /api/notes/{id} - Delete one of the caller's notes (auth required)
//! - GET /api/public/notes - List public notes
//! - GET /api/public/notes/{id} - Get a public note

use axum::{
    Json, Router,
    extract::{
        FromRef, Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::core::auth::{ApiError, AuthenticatedUser, JwtService};
use crate::core::db::models::{Note, NoteInput};
use crate::core::notes::service::{NoteError, NoteService};

/// Note API state containing the note service and JWT service
#[derive(Clone)]
pub struct NoteApiState {
    pub note_service: NoteService,
    pub jwt_service: JwtService,
}

impl FromRef<NoteApiState> for JwtService {
    fn from_ref(state: &NoteApiState) -> Self {
        state.jwt_service.clone()
    }
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            NoteError::NotFound => (StatusCode::NOT_FOUND, "NOTE_NOT_FOUND"),
            NoteError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            NoteError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            NoteError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let message = match &self {
            NoteError::InternalError(detail) => {
                tracing::error!("Note request failed: {}", detail);
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(ApiError::new(message, code))).into_response()
    }
}

/// Response for delete operation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

/// Create the note API router
pub fn note_api_router(state: NoteApiState) -> Router {
    Router::new()
        .route("/api/notes", get(list_notes_handler).post(create_note_handler))
        .route(
            "/api/notes/{id}",
            get(get_note_handler)
                .put(update_note_handler)
                .delete(delete_note_handler),
        )
        .route("/api/public/notes", get(list_public_notes_handler))
        .route("/api/public/notes/{id}", get(get_public_note_handler))
        .with_state(state)
}

fn parse_note_input(payload: Result<Json<NoteInput>, JsonRejection>) -> Result<NoteInput, NoteError> {
    payload.map(|Json(input)| input).map_err(|e| {
        tracing::warn!("Invalid note input: {}", e.body_text());
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            NoteError::PayloadTooLarge
        } else {
            NoteError::BadRequest("Invalid input".to_string())
        }
    })
}

fn parse_note_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, NoteError> {
    path.map(|Path(id)| id).map_err(|e| {
        tracing::debug!("Invalid note id: {}", e.body_text());
        NoteError::BadRequest("Invalid note id".to_string())
    })
}

/// GET /api/notes
async fn list_notes_handler(
    State(state): State<NoteApiState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Note>>, NoteError> {
    tracing::debug!("User ID {} fetching all notes", user.user_id);

    let notes = state.note_service.list_own(&user).await?;

    tracing::debug!("Fetched {} notes for user ID {}", notes.len(), user.user_id);
    Ok(Json(notes))
}

/// GET /api/notes/{id}
async fn get_note_handler(
    State(state): State<NoteApiState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Note>, NoteError> {
    let id = parse_note_id(path)?;
    tracing::debug!("User ID {} fetching note ID {}", user.user_id, id);

    let note = state.note_service.get_own(&user, id).await?;
    Ok(Json(note))
}

/// POST /api/notes
async fn create_note_handler(
    State(state): State<NoteApiState>,
    user: AuthenticatedUser,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), NoteError> {
    let input = parse_note_input(payload)?;

    let note = state.note_service.create(&user, input).await?;

    tracing::info!(
        "Note created: ID {} by user ID {}{}",
        note.id,
        user.user_id,
        if note.image_url.is_some() { " with image" } else { "" }
    );

    Ok((StatusCode::CREATED, Json(note)))
}

/// PUT /api/notes/{id}
async fn update_note_handler(
    State(state): State<NoteApiState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<Json<Note>, NoteError> {
    let id = parse_note_id(path)?;
    let input = parse_note_input(payload)?;

    let note = state.note_service.update(&user, id, input).await?;

    tracing::info!("Note updated: ID {} by user ID {}", note.id, user.user_id);
    Ok(Json(note))
}

/// DELETE /api/notes/{id}
async fn delete_note_handler(
    State(state): State<NoteApiState>,
    user: AuthenticatedUser,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeleteResponse>, NoteError> {
    let id = parse_note_id(path)?;
    state.note_service.delete(&user, id).await?;

    tracing::info!("Note deleted: ID {} by user ID {}", id, user.user_id);

    Ok(Json(DeleteResponse {
        message: "Note deleted successfully".to_string(),
        id,
    }))
}

/// GET /api/public/notes
async fn list_public_notes_handler(
    State(state): State<NoteApiState>,
) -> Result<Json<Vec<Note>>, NoteError> {
    let notes = state.note_service.list_public().await?;
    Ok(Json(notes))
}

/// GET /api/public/notes/{id}
async fn get_public_note_handler(
    State(state): State<NoteApiState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Note>, NoteError> {
    let id = parse_note_id(path)?;
    let note = state.note_service.get_public(id).await?;
    Ok(Json(note))
}
