//! Reasons a session command is refused.

use thiserror::Error;

/// A command the session refused. Rejections emit no events and never
/// mutate state; only the submitting connection hears about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The game is not in progress.
    #[error("game is not in progress")]
    SessionNotActive,

    /// The submitter does not hold the seat whose turn it is.
    #[error("it is not your turn")]
    NotYourTurn,

    /// The rules oracle refused the move.
    #[error("illegal move")]
    IllegalMove,

    /// The submitter holds no seat.
    #[error("only seated players may do that")]
    NotSeated,

    /// The submitter already has a draw offer pending.
    #[error("draw already offered")]
    DrawAlreadyOffered,
}

impl Rejection {
    /// Machine-readable code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::SessionNotActive => "session_not_active",
            Self::NotYourTurn => "not_your_turn",
            Self::IllegalMove => "illegal_move",
            Self::NotSeated => "not_seated",
            Self::DrawAlreadyOffered => "draw_already_offered",
        }
    }
}
