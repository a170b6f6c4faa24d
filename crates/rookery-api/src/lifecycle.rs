//! Connection Lifecycle Manager.
//!
//! Owns the single [`GameRoom`] and drives it from transport events: a socket
//! opening, a text frame arriving, a socket closing and a grace timer firing.
//! The room sits behind one `tokio::sync::Mutex`, so each transport event is
//! applied and fanned out before the next one is looked at.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rookery_core::clock::Clock;
use rookery_core::error::DomainError;
use rookery_core::rng::DeterministicRng;
use rookery_rules::{RulesOracle, Side};
use rookery_session::application::command_handlers;
use rookery_session::application::query_handlers::{self, SessionSnapshotView};
use rookery_session::domain::aggregates::{GameSession, SeatReservation};
use rookery_session::domain::commands::{
    AcceptDraw, DeclineDraw, ExpireSeat, JoinSession, LeaveSession, OfferDraw, Resign, SubmitMove,
};
use rookery_session::domain::rejections::Rejection;
use rookery_session::domain::seats::{ConnectionId, Role};
use serde_json::Value;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::broadcaster::{Outbox, SessionBroadcaster};
use crate::protocol::{ClientMessage, DrawNotice, GameEndNotice, SeatGrant, ServerMessage};

/// The session, its connected clients and the pending grace timers.
#[derive(Debug)]
pub struct GameRoom {
    session: GameSession,
    broadcaster: SessionBroadcaster,
    grace_timers: HashMap<Side, AbortHandle>,
}

/// Cloneable handle to the room plus the injected clock, RNG and oracle.
#[derive(Clone)]
pub struct ConnectionLifecycle {
    room: Arc<Mutex<GameRoom>>,
    session_id: Uuid,
    clock: Arc<dyn Clock + Send + Sync>,
    rng: Arc<StdMutex<dyn DeterministicRng + Send>>,
    oracle: Arc<dyn RulesOracle>,
}

impl std::fmt::Debug for ConnectionLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionLifecycle")
            .field("session_id", &self.session_id)
            .finish_non_exhaustive()
    }
}

impl ConnectionLifecycle {
    /// Wraps `session` in a fresh room.
    #[must_use]
    pub fn new(
        session: GameSession,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<StdMutex<dyn DeterministicRng + Send>>,
        oracle: Arc<dyn RulesOracle>,
    ) -> Self {
        let session_id = session.id;
        Self {
            room: Arc::new(Mutex::new(GameRoom {
                session,
                broadcaster: SessionBroadcaster::new(),
                grace_timers: HashMap::new(),
            })),
            session_id,
            clock,
            rng,
            oracle,
        }
    }

    /// The hosted session's identifier.
    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Read-only view of the hosted session.
    pub async fn snapshot(&self) -> SessionSnapshotView {
        query_handlers::get_session_snapshot(&self.room.lock().await.session)
    }

    /// Read-only view of the session with `session_id`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AggregateNotFound` for any other ID.
    pub async fn snapshot_by_id(&self, session_id: Uuid) -> Result<SessionSnapshotView, DomainError> {
        query_handlers::get_session_by_id(&self.room.lock().await.session, session_id)
    }

    /// Returns true while a grace timer is pending for `side`.
    pub async fn grace_timer_pending(&self, side: Side) -> bool {
        self.room.lock().await.grace_timers.contains_key(&side)
    }

    /// Admits a new connection. The client receives its role privately,
    /// then the board, turn and result; everyone receives the roster change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the RNG mutex is poisoned.
    #[instrument(skip(self, resume_token, outbox), fields(%connection_id))]
    pub async fn connect(
        &self,
        connection_id: ConnectionId,
        resume_token: Option<Uuid>,
        outbox: Outbox,
    ) -> Result<Role, DomainError> {
        let command = JoinSession {
            correlation_id: Uuid::new_v4(),
            connection_id,
            resume_token,
        };

        let mut guard = self.room.lock().await;
        let room = &mut *guard;

        // Lock RNG only for the synchronous domain call.
        let result = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|e| DomainError::Infrastructure(format!("RNG mutex poisoned: {e}")))?;
            command_handlers::handle_join(
                &command,
                &mut room.session,
                self.clock.as_ref(),
                &mut *rng,
                self.oracle.as_ref(),
            )
        };

        let role = result.output.role;
        if let (true, Some(side)) = (result.output.reconnected, role.side()) {
            if let Some(timer) = room.grace_timers.remove(&side) {
                timer.abort();
                debug!(%side, "grace timer cancelled");
            }
        }

        room.broadcaster.register(connection_id, outbox);
        room.broadcaster
            .send_to(connection_id, role_message(&room.session, role));
        for message in snapshot_messages(&room.session) {
            room.broadcaster.send_to(connection_id, message);
        }
        room.broadcaster.publish(&result.events, &room.session);

        info!(
            role = ?role,
            reconnected = result.output.reconnected,
            clients = room.broadcaster.len(),
            "client connected"
        );
        Ok(role)
    }

    /// Handles one inbound text frame. Rejections and unreadable frames are
    /// answered to the sender only; committed events go to everyone.
    #[instrument(skip(self, text), fields(%connection_id))]
    pub async fn receive(&self, connection_id: ConnectionId, text: &str) {
        let mut guard = self.room.lock().await;
        let room = &mut *guard;

        let message = match ClientMessage::parse(text) {
            Ok(message) => message,
            Err(reply) => {
                debug!(reply = reply.event_name(), "unreadable frame");
                room.broadcaster.send_to(connection_id, reply);
                return;
            }
        };

        let clock = self.clock.as_ref();
        let correlation_id = Uuid::new_v4();
        let session = &mut room.session;
        let committed = match message {
            ClientMessage::Move(requested) => {
                let command = SubmitMove {
                    correlation_id,
                    connection_id,
                    requested,
                };
                command_handlers::handle_submit_move(&command, session, clock, self.oracle.as_ref())
                    .map(|result| result.events)
                    .map_err(|rejection| ServerMessage::WrongMove {
                        requested: serde_json::to_value(&command.requested).unwrap_or(Value::Null),
                        reason: rejection.code().to_owned(),
                    })
            }
            ClientMessage::Resign => {
                let command = Resign {
                    correlation_id,
                    connection_id,
                };
                command_handlers::handle_resign(&command, session, clock)
                    .map(|result| result.events)
                    .map_err(invalid_game_state)
            }
            ClientMessage::DrawOffer => {
                let command = OfferDraw {
                    correlation_id,
                    connection_id,
                };
                command_handlers::handle_offer_draw(&command, session, clock)
                    .map(|result| result.events)
                    .map_err(invalid_game_state)
            }
            ClientMessage::DrawAccepted => {
                let command = AcceptDraw {
                    correlation_id,
                    connection_id,
                };
                command_handlers::handle_accept_draw(&command, session, clock)
                    .map(|result| result.events)
                    .map_err(invalid_game_state)
            }
            ClientMessage::DrawDeclined => {
                let command = DeclineDraw {
                    correlation_id,
                    connection_id,
                };
                command_handlers::handle_decline_draw(&command, session, clock)
                    .map(|result| result.events)
                    .map_err(invalid_game_state)
            }
        };

        match committed {
            Ok(events) => room.broadcaster.publish(&events, &room.session),
            Err(reply) => {
                room.broadcaster.send_to(connection_id, reply);
            }
        }
    }

    /// Releases a closed connection and, for a seated player, starts the
    /// grace timer.
    #[instrument(skip(self), fields(%connection_id))]
    pub async fn disconnect(&self, connection_id: ConnectionId) {
        let mut guard = self.room.lock().await;
        let room = &mut *guard;

        room.broadcaster.unregister(connection_id);
        let command = LeaveSession {
            correlation_id: Uuid::new_v4(),
            connection_id,
        };
        let result = command_handlers::handle_leave(&command, &mut room.session, self.clock.as_ref());
        if let Some(reservation) = result.output {
            self.schedule_expiry(room, reservation);
        }
        room.broadcaster.publish(&result.events, &room.session);
        info!(clients = room.broadcaster.len(), "client disconnected");
    }

    fn schedule_expiry(&self, room: &mut GameRoom, reservation: SeatReservation) {
        let wait = (reservation.deadline - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);
        let lifecycle = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            lifecycle
                .expire(reservation.side, reservation.deadline)
                .await;
        });
        if let Some(previous) = room
            .grace_timers
            .insert(reservation.side, timer.abort_handle())
        {
            previous.abort();
        }
    }

    /// Fires the grace expiry for `side`. Returns `false` when the seat was
    /// reclaimed or re-reserved after `deadline` was scheduled.
    #[instrument(skip(self))]
    pub async fn expire(&self, side: Side, deadline: DateTime<Utc>) -> bool {
        let mut guard = self.room.lock().await;
        let room = &mut *guard;

        let command = ExpireSeat {
            correlation_id: Uuid::new_v4(),
            side,
            deadline,
        };
        let result =
            command_handlers::handle_expire_seat(&command, &mut room.session, self.clock.as_ref());
        if result.output {
            room.grace_timers.remove(&side);
        }
        room.broadcaster.publish(&result.events, &room.session);
        result.output
    }
}

fn invalid_game_state(rejection: Rejection) -> ServerMessage {
    ServerMessage::InvalidGameState {
        reason: rejection.code().to_owned(),
    }
}

fn role_message(session: &GameSession, role: Role) -> ServerMessage {
    match role {
        Role::Player(side) => {
            let seat = session.seats().seat(side);
            ServerMessage::CurrentPlayer(SeatGrant {
                role: side,
                display_name: seat.display_name().unwrap_or_default().to_owned(),
                resume_token: seat.resume_token().unwrap_or_default(),
            })
        }
        Role::Spectator => ServerMessage::SpectatorView,
    }
}

/// Frames that bring a newly admitted client up to date.
fn snapshot_messages(session: &GameSession) -> Vec<ServerMessage> {
    let mut messages = vec![
        ServerMessage::BoardPosition(session.board().fen().to_owned()),
        ServerMessage::CurrentTurn(session.turn()),
    ];
    if let Some(side) = session.draw_offer() {
        messages.push(ServerMessage::DrawOffer(DrawNotice { player: side }));
    }
    if let Some(outcome) = session.outcome() {
        messages.push(ServerMessage::GameEnd(GameEndNotice {
            kind: outcome.reason.label(),
            player: None,
            winner: outcome.winner,
        }));
        if let Some(winner) = outcome.winner {
            messages.push(ServerMessage::PlayerWon(winner));
        }
    }
    messages
}
