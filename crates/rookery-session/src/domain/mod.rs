//! Domain model for the Game Session context.

pub mod aggregates;
pub mod commands;
pub mod events;
pub mod rejections;
pub mod seats;
