//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rookery_core::clock::Clock;
use rookery_core::rng::DeterministicRng;
use rookery_rules::{RulesOracle, ShakmatyOracle};
use rookery_session::domain::aggregates::{GameSession, SessionSettings};
use rookery_session::domain::seats::ConnectionId;
use rookery_test_support::{FixedClock, MockRng};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

use rookery_api::lifecycle::ConnectionLifecycle;
use rookery_api::protocol::ServerMessage;
use rookery_api::routes;
use rookery_api::state::AppState;

/// Build a lifecycle around a fresh session with a fixed clock, the mock RNG
/// and the real chess oracle.
pub fn build_lifecycle(settings: SessionSettings) -> ConnectionLifecycle {
    let oracle: Arc<dyn RulesOracle> = Arc::new(ShakmatyOracle::new());
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(FixedClock::default());
    let rng: Arc<Mutex<dyn DeterministicRng + Send>> = Arc::new(Mutex::new(MockRng));
    let session = GameSession::new(Uuid::new_v4(), settings, oracle.as_ref());
    ConnectionLifecycle::new(session, clock, rng, oracle)
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(lifecycle: ConnectionLifecycle) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::game::router())
        .nest("/api/v1/sessions", routes::sessions::router())
        .with_state(AppState::new(lifecycle))
}

/// A connected test client: its ID and the receiving end of its outbox.
pub struct TestClient {
    pub id: ConnectionId,
    pub inbox: mpsc::UnboundedReceiver<ServerMessage>,
}

impl TestClient {
    /// Every frame delivered so far.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.inbox.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Event names of every frame delivered so far.
    pub fn drain_names(&mut self) -> Vec<&'static str> {
        self.drain().iter().map(ServerMessage::event_name).collect()
    }
}

/// Connect a new client, optionally presenting a resume token.
pub async fn connect(lifecycle: &ConnectionLifecycle, token: Option<Uuid>) -> TestClient {
    let (outbox, inbox) = mpsc::unbounded_channel();
    let id = ConnectionId::new();
    lifecycle.connect(id, token, outbox).await.unwrap();
    TestClient { id, inbox }
}

/// Send a move frame from `client`.
pub async fn play(lifecycle: &ConnectionLifecycle, client: &TestClient, from: &str, to: &str) {
    let frame = serde_json::json!({
        "event": "move",
        "data": { "from": from, "to": to, "promotion": "q" }
    });
    lifecycle.receive(client.id, &frame.to_string()).await;
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}
