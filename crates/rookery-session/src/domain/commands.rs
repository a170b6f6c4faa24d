//! Commands for the game session.

use chrono::{DateTime, Utc};
use rookery_core::command::Command;
use rookery_rules::{MoveRequest, Side};
use uuid::Uuid;

use super::seats::ConnectionId;

/// Command to admit a new connection, as a player or a spectator.
#[derive(Debug, Clone)]
pub struct JoinSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The connection being admitted.
    pub connection_id: ConnectionId,
    /// Resume token presented by a returning player, if any.
    pub resume_token: Option<Uuid>,
}

impl Command for JoinSession {
    fn command_type(&self) -> &'static str {
        "session.join"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to release a connection that went away.
#[derive(Debug, Clone)]
pub struct LeaveSession {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The connection that closed.
    pub connection_id: ConnectionId,
}

impl Command for LeaveSession {
    fn command_type(&self) -> &'static str {
        "session.leave"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command fired when a seat's grace window elapses.
#[derive(Debug, Clone)]
pub struct ExpireSeat {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The reserved seat.
    pub side: Side,
    /// The deadline the timer was scheduled for.
    pub deadline: DateTime<Utc>,
}

impl Command for ExpireSeat {
    fn command_type(&self) -> &'static str {
        "session.expire_seat"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to play a move.
#[derive(Debug, Clone)]
pub struct SubmitMove {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The submitting connection.
    pub connection_id: ConnectionId,
    /// The move as the client sent it.
    pub requested: MoveRequest,
}

impl Command for SubmitMove {
    fn command_type(&self) -> &'static str {
        "session.submit_move"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to resign the game.
#[derive(Debug, Clone)]
pub struct Resign {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The resigning connection.
    pub connection_id: ConnectionId,
}

impl Command for Resign {
    fn command_type(&self) -> &'static str {
        "session.resign"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to offer a draw.
#[derive(Debug, Clone)]
pub struct OfferDraw {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The offering connection.
    pub connection_id: ConnectionId,
}

impl Command for OfferDraw {
    fn command_type(&self) -> &'static str {
        "session.offer_draw"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to accept the opponent's draw offer.
#[derive(Debug, Clone)]
pub struct AcceptDraw {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The accepting connection.
    pub connection_id: ConnectionId,
}

impl Command for AcceptDraw {
    fn command_type(&self) -> &'static str {
        "session.accept_draw"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to decline the opponent's draw offer.
#[derive(Debug, Clone)]
pub struct DeclineDraw {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The declining connection.
    pub connection_id: ConnectionId,
}

impl Command for DeclineDraw {
    fn command_type(&self) -> &'static str {
        "session.decline_draw"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
