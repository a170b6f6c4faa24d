//! Session Broadcaster: fans committed session events out to every client.

use std::collections::HashMap;

use rookery_core::event::DomainEvent;
use rookery_session::domain::aggregates::GameSession;
use rookery_session::domain::events::{GameEnded, SessionEvent, SessionEventKind};
use rookery_session::domain::seats::{ConnectionId, Roster};
use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{DrawNotice, GameEndNotice, MoveNotice, ServerMessage};

/// Sending half of a client's outbound frame queue.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// Registry of connected clients and their outbound queues.
///
/// Sends never block: each client drains its own queue on a writer task, so
/// a slow socket cannot stall the room.
#[derive(Debug, Default)]
pub struct SessionBroadcaster {
    clients: HashMap<ConnectionId, Outbox>,
}

impl SessionBroadcaster {
    /// Creates an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts delivering frames to `connection_id`.
    pub fn register(&mut self, connection_id: ConnectionId, outbox: Outbox) {
        self.clients.insert(connection_id, outbox);
    }

    /// Stops delivering frames to `connection_id`.
    pub fn unregister(&mut self, connection_id: ConnectionId) -> bool {
        self.clients.remove(&connection_id).is_some()
    }

    /// Number of registered clients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// No client is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Sends one frame to one client. Returns `false` if the client is gone.
    pub fn send_to(&self, connection_id: ConnectionId, message: ServerMessage) -> bool {
        self.clients
            .get(&connection_id)
            .is_some_and(|outbox| outbox.send(message).is_ok())
    }

    /// Sends one frame to every client.
    pub fn broadcast(&self, message: &ServerMessage) {
        for (connection_id, outbox) in &self.clients {
            if outbox.send(message.clone()).is_err() {
                debug!(%connection_id, "dropping frame for closed connection");
            }
        }
    }

    /// Broadcasts the frames for `events`, in commit order.
    pub fn publish(&self, events: &[SessionEvent], session: &GameSession) {
        let roster = session.seats().roster();
        for event in events {
            debug!(
                event_type = event.event_type(),
                sequence_number = event.metadata().sequence_number,
                payload = %event.to_payload(),
                "publishing session event"
            );
            for message in messages_for(event, &roster) {
                self.broadcast(&message);
            }
        }
    }
}

/// Translates one committed event into the frames every client receives.
///
/// Roster frames carry `roster`, the occupancy at publication time.
#[must_use]
pub fn messages_for(event: &SessionEvent, roster: &Roster) -> Vec<ServerMessage> {
    if event.kind.changes_roster() {
        return vec![ServerMessage::UpdatePlayers(roster.clone())];
    }
    match &event.kind {
        SessionEventKind::GameStarted(e) => vec![
            ServerMessage::BoardPosition(e.board.fen().to_owned()),
            ServerMessage::CurrentTurn(e.turn),
        ],
        SessionEventKind::GameReset(e) => vec![
            ServerMessage::BoardPosition(e.board.fen().to_owned()),
            ServerMessage::CurrentTurn(e.turn),
        ],
        SessionEventKind::GameSuspended(_) => vec![ServerMessage::GameSuspended],
        SessionEventKind::MoveApplied(e) => vec![
            ServerMessage::Move(MoveNotice {
                requested: e.requested.clone(),
                san: e.san.clone(),
                check: e.check,
            }),
            ServerMessage::BoardPosition(e.board.fen().to_owned()),
            ServerMessage::CurrentTurn(e.next_turn),
        ],
        SessionEventKind::DrawOffered(e) => {
            vec![ServerMessage::DrawOffer(DrawNotice { player: e.side })]
        }
        SessionEventKind::DrawDeclined(e) => {
            vec![ServerMessage::DrawDeclined(DrawNotice { player: e.side })]
        }
        SessionEventKind::DrawOfferCancelled(e) => {
            vec![ServerMessage::DrawCancelled(DrawNotice { player: e.side })]
        }
        SessionEventKind::GameEnded(e) => end_messages(e),
        _ => Vec::new(),
    }
}

fn end_messages(ended: &GameEnded) -> Vec<ServerMessage> {
    let mut messages = vec![ServerMessage::GameEnd(GameEndNotice {
        kind: ended.outcome.reason.label(),
        player: ended.initiator,
        winner: ended.outcome.winner,
    })];
    if let Some(winner) = ended.outcome.winner {
        messages.push(ServerMessage::PlayerWon(winner));
    }
    messages
}
