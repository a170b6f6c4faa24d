//! Rookery: Rules Oracle.
//!
//! The session core never inspects a board. It hands the current
//! [`BoardState`] and a client [`MoveRequest`] to a [`RulesOracle`] and gets
//! back a [`MoveVerdict`]. [`ShakmatyOracle`] is the production implementation.

pub mod chess;
pub mod moves;
pub mod oracle;
pub mod side;

pub use chess::ShakmatyOracle;
pub use moves::MoveRequest;
pub use oracle::{AppliedMove, BoardState, MoveVerdict, RulesOracle};
pub use side::Side;
