//! Rookery: Game Session bounded context.
//!
//! Responsible for seat assignment, turn authority, the draw handshake and
//! disconnect grace windows for the single two-player game the relay hosts.

pub mod application;
pub mod domain;
