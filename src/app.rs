//! HTTP application assembly
//!
//! Wires configuration into the services and merges the auth and note
//! routers under one CORS + trace stack.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::auth::{
    AuthApiState, AuthService, JwtService, PasswordHasher, auth_api_router,
};
use crate::core::config::{Config, ConfigError};
use crate::core::db::{
    CredentialStore, DbError, InMemoryNoteStore, InMemoryUserStore, NoteRepository, NoteStore,
    PgPool, UserRepository, health_check,
};
use crate::core::notes::{NoteApiState, NoteService, note_api_router};

/// Startup failures
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Invalid CORS origin: {0}")]
    InvalidCorsOrigin(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where credentials and notes live
#[derive(Clone)]
pub enum Storage {
    Postgres(PgPool),
    Memory,
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Storage::Postgres(_) => "postgres",
            Storage::Memory => "memory",
        }
    }
}

/// Fully wired services
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub note_service: NoteService,
    pub jwt_service: JwtService,
    pub storage: Storage,
}

impl AppState {
    /// Build services over the given storage
    pub fn new(config: &Config, storage: Storage) -> Result<Self, StartupError> {
        let jwt_service = JwtService::new(config.jwt_config()?);
        let hasher = PasswordHasher::new(config.bcrypt_cost);

        let (users, notes) = match &storage {
            Storage::Postgres(pool) => (
                Arc::new(UserRepository::new(pool.clone())) as Arc<dyn CredentialStore>,
                Arc::new(NoteRepository::new(pool.clone())) as Arc<dyn NoteStore>,
            ),
            Storage::Memory => {
                let users = Arc::new(InMemoryUserStore::new());
                (
                    users.clone() as Arc<dyn CredentialStore>,
                    Arc::new(InMemoryNoteStore::new(users)) as Arc<dyn NoteStore>,
                )
            }
        };

        Ok(Self {
            auth_service: AuthService::new(users, hasher, jwt_service.clone()),
            note_service: NoteService::new(notes),
            jwt_service,
            storage,
        })
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub storage: &'static str,
}

/// GET /api/health
async fn health_handler(State(storage): State<Storage>) -> (StatusCode, Json<HealthResponse>) {
    let healthy = match &storage {
        Storage::Postgres(pool) => match health_check(pool).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Database health check failed: {}", e);
                false
            }
        },
        Storage::Memory => true,
    };

    let (status_code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            storage: storage.name(),
        }),
    )
}

/// CORS policy for the configured frontend origin
pub fn cors_layer(origin: &str) -> Result<CorsLayer, StartupError> {
    let origin = origin
        .parse::<HeaderValue>()
        .map_err(|_| StartupError::InvalidCorsOrigin(origin.to_string()))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Build the application router
pub fn build_app(state: AppState, config: &Config) -> Result<Router, StartupError> {
    let auth_api = auth_api_router(AuthApiState {
        auth_service: state.auth_service,
    });

    let note_api = note_api_router(NoteApiState {
        note_service: state.note_service,
        jwt_service: state.jwt_service,
    })
    .layer(DefaultBodyLimit::max(config.max_body_bytes));

    let health = Router::new()
        .route("/api/health", get(health_handler))
        .with_state(state.storage);

    Ok(Router::new()
        .merge(health)
        .merge(auth_api)
        .merge(note_api)
        .layer(cors_layer(&config.cors_origin)?)
        .layer(TraceLayer::new_for_http()))
}
