//! Rookery chess relay entry point.

use std::error::Error;
use std::sync::{Arc, Mutex};

use axum::Router;
use rookery_api::config::AppConfig;
use rookery_api::lifecycle::ConnectionLifecycle;
use rookery_api::routes;
use rookery_api::state::AppState;
use rookery_core::clock::{Clock, SystemClock};
use rookery_core::rng::{DeterministicRng, SystemRng};
use rookery_rules::{RulesOracle, ShakmatyOracle};
use rookery_session::domain::aggregates::GameSession;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Rookery chess relay");

    let config = AppConfig::from_env()?;

    let oracle: Arc<dyn RulesOracle> = match config.start_fen.as_deref() {
        Some(fen) => Arc::new(ShakmatyOracle::from_fen(fen)?),
        None => Arc::new(ShakmatyOracle::new()),
    };
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(SystemClock);
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(SystemRng::new()));

    let session = GameSession::new(Uuid::new_v4(), config.session_settings(), oracle.as_ref());
    tracing::info!(
        session_id = %session.id,
        grace_period_secs = config.grace_period_secs,
        disconnect_policy = ?config.disconnect_policy,
        auto_restart = config.auto_restart,
        "game session created"
    );

    let app_state = AppState::new(ConnectionLifecycle::new(session, clock, rng, oracle));

    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .merge(routes::game::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
