//! Command handlers for the game session.
//!
//! Each handler runs one command against the in-memory aggregate and drains
//! the events it produced, in commit order, for the broadcaster. Rejected
//! commands produce no events.

use rookery_core::aggregate::AggregateRoot;
use rookery_core::clock::Clock;
use rookery_core::command::Command;
use rookery_core::rng::DeterministicRng;
use rookery_rules::RulesOracle;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::aggregates::{GameSession, JoinOutcome, MoveAccepted, SeatReservation};
use crate::domain::commands::{
    AcceptDraw, DeclineDraw, ExpireSeat, JoinSession, LeaveSession, OfferDraw, Resign, SubmitMove,
};
use crate::domain::events::{Outcome, SessionEvent};
use crate::domain::rejections::Rejection;

/// Result of a successfully handled command.
#[derive(Debug)]
pub struct SessionCommandResult<T> {
    /// The session the command ran against.
    pub session_id: Uuid,
    /// Command-specific output.
    pub output: T,
    /// Events the command committed, in sequence order.
    pub events: Vec<SessionEvent>,
}

fn drain<T>(session: &mut GameSession, output: T) -> SessionCommandResult<T> {
    let events = session.uncommitted_events().to_vec();
    session.clear_uncommitted_events();
    SessionCommandResult {
        session_id: session.id,
        output,
        events,
    }
}

fn rejected(command: &dyn Command, rejection: Rejection) -> Rejection {
    warn!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        code = rejection.code(),
        "command rejected"
    );
    rejection
}

/// Handles the `JoinSession` command: reclaims, seats or adds a spectator.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_join(
    command: &JoinSession,
    session: &mut GameSession,
    clock: &dyn Clock,
    rng: &mut dyn DeterministicRng,
    oracle: &dyn RulesOracle,
) -> SessionCommandResult<JoinOutcome> {
    let outcome = session.join(
        command.connection_id,
        command.resume_token,
        command.correlation_id,
        clock,
        rng,
        oracle,
    );
    info!(
        correlation_id = %command.correlation_id,
        role = ?outcome.role,
        reconnected = outcome.reconnected,
        "connection joined"
    );
    drain(session, outcome)
}

/// Handles the `LeaveSession` command. The output carries the seat
/// reservation whose expiry the caller must schedule, if any.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_leave(
    command: &LeaveSession,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> SessionCommandResult<Option<SeatReservation>> {
    let reservation = session.leave(command.connection_id, command.correlation_id, clock);
    match reservation {
        Some(reservation) => info!(
            correlation_id = %command.correlation_id,
            side = %reservation.side,
            deadline = %reservation.deadline,
            "player disconnected, seat reserved"
        ),
        None => debug!(correlation_id = %command.correlation_id, "connection left"),
    }
    drain(session, reservation)
}

/// Handles the `ExpireSeat` command. The output is `false` when the timer
/// was stale.
#[instrument(skip_all, fields(side = %command.side))]
pub fn handle_expire_seat(
    command: &ExpireSeat,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> SessionCommandResult<bool> {
    let expired = session.expire_seat(
        command.side,
        command.deadline,
        command.correlation_id,
        clock,
    );
    if expired {
        info!(correlation_id = %command.correlation_id, "grace window elapsed, seat vacated");
    } else {
        debug!(correlation_id = %command.correlation_id, "stale seat expiry ignored");
    }
    drain(session, expired)
}

/// Handles the `SubmitMove` command.
///
/// # Errors
///
/// Returns the `Rejection` the session raised; nothing is committed.
#[instrument(skip_all, fields(connection_id = %command.connection_id, requested = %command.requested))]
pub fn handle_submit_move(
    command: &SubmitMove,
    session: &mut GameSession,
    clock: &dyn Clock,
    oracle: &dyn RulesOracle,
) -> Result<SessionCommandResult<MoveAccepted>, Rejection> {
    let accepted = session
        .submit_move(
            command.connection_id,
            &command.requested,
            command.correlation_id,
            clock,
            oracle,
        )
        .map_err(|rejection| rejected(command, rejection))?;
    info!(correlation_id = %command.correlation_id, san = %accepted.san, "move applied");
    Ok(drain(session, accepted))
}

/// Handles the `Resign` command.
///
/// # Errors
///
/// Returns the `Rejection` the session raised; nothing is committed.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_resign(
    command: &Resign,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult<Outcome>, Rejection> {
    let outcome = session
        .resign(command.connection_id, command.correlation_id, clock)
        .map_err(|rejection| rejected(command, rejection))?;
    info!(correlation_id = %command.correlation_id, "player resigned");
    Ok(drain(session, outcome))
}

/// Handles the `OfferDraw` command.
///
/// # Errors
///
/// Returns the `Rejection` the session raised; nothing is committed.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_offer_draw(
    command: &OfferDraw,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult<Option<Outcome>>, Rejection> {
    let outcome = session
        .offer_draw(command.connection_id, command.correlation_id, clock)
        .map_err(|rejection| rejected(command, rejection))?;
    info!(
        correlation_id = %command.correlation_id,
        agreed = outcome.is_some(),
        "draw offered"
    );
    Ok(drain(session, outcome))
}

/// Handles the `AcceptDraw` command.
///
/// # Errors
///
/// Returns the `Rejection` the session raised; nothing is committed.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_accept_draw(
    command: &AcceptDraw,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult<Option<Outcome>>, Rejection> {
    let outcome = session
        .accept_draw(command.connection_id, command.correlation_id, clock)
        .map_err(|rejection| rejected(command, rejection))?;
    if outcome.is_some() {
        info!(correlation_id = %command.correlation_id, "draw agreed");
    } else {
        debug!(correlation_id = %command.correlation_id, "no draw offer to accept");
    }
    Ok(drain(session, outcome))
}

/// Handles the `DeclineDraw` command.
///
/// # Errors
///
/// Returns the `Rejection` the session raised; nothing is committed.
#[instrument(skip_all, fields(connection_id = %command.connection_id))]
pub fn handle_decline_draw(
    command: &DeclineDraw,
    session: &mut GameSession,
    clock: &dyn Clock,
) -> Result<SessionCommandResult<bool>, Rejection> {
    let declined = session
        .decline_draw(command.connection_id, command.correlation_id, clock)
        .map_err(|rejection| rejected(command, rejection))?;
    debug!(correlation_id = %command.correlation_id, declined, "draw decline handled");
    Ok(drain(session, declined))
}
