//! Rookery: chess session relay server.
//!
//! Hosts one two-player game over WebSocket: the lifecycle manager turns
//! socket events into session commands and the broadcaster fans the
//! resulting events out to every connected client. A small HTTP surface
//! exposes health and read-only session snapshots.

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod routes;
pub mod state;
