// API Server Binary Entry Point
//
// Purpose: Start the Axum API server over the fitted survival model
// Usage: cargo run --features api --bin api_server

use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tree_survival_planner::{create_router, AppState, PlannerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (structured logging)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    // Default log level: info for our crate, warn for others
                    "tree_survival_planner=info,tower_http=debug,axum=debug,warn".into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting API server...");

    let config = PlannerConfig::from_env();

    tracing::info!("Configuration:");
    tracing::info!("  MODEL_DIR: {:?}", config.model_dir);
    tracing::info!("  PORT: {}", config.port);
    tracing::info!("  SESSION_TTL_SECS: {}", config.session_ttl_secs);
    tracing::info!("  MAX_SESSIONS: {}", config.max_sessions);

    // Load artifacts once; shared read-only by every request
    let state = AppState::new(&config)?;
    tracing::info!("Application state initialized successfully");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
