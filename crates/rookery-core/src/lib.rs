//! Rookery Core: shared domain abstractions.
//!
//! This crate defines the fundamental traits and types that the rules oracle,
//! the game session and the API server depend on. It contains no
//! infrastructure code.

pub mod aggregate;
pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod rng;
