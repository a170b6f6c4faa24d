//! Query handlers for the game session.
//!
//! Read-only views over the in-memory aggregate.

use rookery_core::error::DomainError;
use rookery_rules::Side;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::aggregates::{GamePhase, GameSession};
use crate::domain::events::Outcome;
use crate::domain::seats::Roster;

/// Read-only view of a game session.
#[derive(Debug, Serialize)]
pub struct SessionSnapshotView {
    /// The session identifier.
    pub session_id: Uuid,
    /// Lifecycle phase.
    pub phase: GamePhase,
    /// Side to move.
    pub turn: Side,
    /// Current position in FEN.
    pub fen: String,
    /// Final result, once ended.
    pub outcome: Option<Outcome>,
    /// Side with an open draw offer.
    pub draw_offer: Option<Side>,
    /// Seat occupancy.
    pub roster: Roster,
    /// Current version (event count).
    pub version: i64,
}

/// Snapshot of the session as it stands.
#[must_use]
pub fn get_session_snapshot(session: &GameSession) -> SessionSnapshotView {
    SessionSnapshotView {
        session_id: session.id,
        phase: session.phase(),
        turn: session.turn(),
        fen: session.board().fen().to_owned(),
        outcome: session.outcome(),
        draw_offer: session.draw_offer(),
        roster: session.seats().roster(),
        version: session.version,
    }
}

/// Retrieves the session by its aggregate ID.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if `session_id` is not the
/// hosted session.
pub fn get_session_by_id(
    session: &GameSession,
    session_id: Uuid,
) -> Result<SessionSnapshotView, DomainError> {
    if session.id != session_id {
        return Err(DomainError::AggregateNotFound(session_id));
    }
    Ok(get_session_snapshot(session))
}
