use notekeeper::app::{AppState, StartupError, Storage, build_app};
use notekeeper::core::config::Config;
use notekeeper::core::db::create_pool_with_migrations;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env().inspect_err(|e| tracing::error!("{}", e))?;

    // Log config status (without revealing secrets)
    tracing::info!(
        "Config loaded: env={}, database={}, jwt_secret={}",
        config.environment,
        config.has_database(),
        config.has_jwt_secret()
    );

    let storage = match config.db_config() {
        Some(db_config) => {
            let pool = create_pool_with_migrations(&db_config)
                .await
                .inspect_err(|e| tracing::error!("{}", e))?;
            tracing::info!("Connected to PostgreSQL");
            Storage::Postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (data is lost on restart)");
            Storage::Memory
        }
    };

    let state = AppState::new(&config, storage)?;
    if state.jwt_service.is_insecure_default() {
        tracing::warn!("JWT_SECRET not set, signing tokens with the insecure development secret");
    }

    let app = build_app(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
