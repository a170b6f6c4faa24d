//! Aggregate root for the game session.
//!
//! [`GameSession`] owns the board, the turn, both seats and the draw-offer
//! handshake. Every state change goes through [`GameSession::record`], which
//! applies the event immediately and buffers it for the broadcaster, so the
//! session is always the fold of the events it has produced.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use rookery_core::aggregate::AggregateRoot;
use rookery_core::clock::Clock;
use rookery_core::error::DomainError;
use rookery_core::event::EventMetadata;
use rookery_core::rng::DeterministicRng;
use rookery_rules::{BoardState, MoveRequest, MoveVerdict, RulesOracle, Side};
use serde::Serialize;
use uuid::Uuid;

use super::events::{
    DrawDeclined, DrawOfferCancelled, DrawOffered, EndReason, GameEnded, GameReset, GameStarted,
    GameSuspended, MoveApplied, Outcome, PlayerDisconnected, PlayerReconnected, PlayerSeated,
    SeatVacated, SessionEvent, SessionEventKind, SpectatorJoined, SpectatorLeft,
};
use super::rejections::Rejection;
use super::seats::{ConnectionId, Role, SeatRegistry};

/// Lowest generated guest number.
const GUEST_NUMBER_MIN: u32 = 1000;
/// Highest generated guest number.
const GUEST_NUMBER_MAX: u32 = 9999;
/// Occurrences of one position that draw the game.
const REPETITION_LIMIT: u32 = 3;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    /// At least one seat is vacant or disconnected before play began.
    AwaitingPlayers,
    /// Moves are accepted.
    InProgress,
    /// A result has been reached.
    Ended,
}

/// What happens when a seat's grace window lapses mid-game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// The absent side loses by abandonment.
    #[default]
    Forfeit,
    /// The game pauses until the seat is filled again.
    Suspend,
}

impl FromStr for DisconnectPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forfeit" => Ok(Self::Forfeit),
            "suspend" => Ok(Self::Suspend),
            other => Err(DomainError::Validation(format!(
                "unknown disconnect policy '{other}', expected 'forfeit' or 'suspend'"
            ))),
        }
    }
}

/// Tunables fixed at session creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// How long a disconnected player's seat is held.
    pub grace_period: TimeDelta,
    /// Fate of a game whose seat is vacated.
    pub disconnect_policy: DisconnectPolicy,
    /// Reset the board on the first join after a game ended.
    pub auto_restart: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            grace_period: TimeDelta::seconds(30),
            disconnect_policy: DisconnectPolicy::Forfeit,
            auto_restart: false,
        }
    }
}

/// Result of admitting a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// The role the connection now holds.
    pub role: Role,
    /// The connection reclaimed a reserved seat.
    pub reconnected: bool,
}

/// A seat held open for a disconnected player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatReservation {
    /// The reserved seat.
    pub side: Side,
    /// When the seat is released unless reclaimed.
    pub deadline: DateTime<Utc>,
}

/// A move the session committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveAccepted {
    /// The position after the move.
    pub resulting_state: BoardState,
    /// The move in standard algebraic notation.
    pub san: String,
    /// Set when the move ended the game.
    pub outcome: Option<Outcome>,
}

impl MoveAccepted {
    /// Returns true if the move ended the game.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }
}

/// The aggregate root for one game between two seats.
#[derive(Debug)]
pub struct GameSession {
    /// Aggregate identifier.
    pub id: Uuid,
    /// Current version (event count).
    pub version: i64,
    settings: SessionSettings,
    board: BoardState,
    turn: Side,
    phase: GamePhase,
    outcome: Option<Outcome>,
    draw_offer: Option<Side>,
    seats: SeatRegistry,
    /// Occurrences of each position since the board was last set up.
    position_counts: HashMap<String, u32>,
    /// Events applied but not yet broadcast.
    uncommitted_events: Vec<SessionEvent>,
}

impl GameSession {
    /// Creates a session awaiting players at the oracle's initial position.
    #[must_use]
    pub fn new(id: Uuid, settings: SessionSettings, oracle: &dyn RulesOracle) -> Self {
        let board = oracle.initial_state();
        let turn = oracle.current_turn_side(&board);
        let position_counts = HashMap::from([(board.repetition_key().to_owned(), 1)]);
        Self {
            id,
            version: 0,
            settings,
            board,
            turn,
            phase: GamePhase::AwaitingPlayers,
            outcome: None,
            draw_offer: None,
            seats: SeatRegistry::new(),
            position_counts,
            uncommitted_events: Vec::new(),
        }
    }

    /// The settings this session was created with.
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// The current position.
    #[must_use]
    pub const fn board(&self) -> &BoardState {
        &self.board
    }

    /// Side to move.
    #[must_use]
    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// Lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> GamePhase {
        self.phase
    }

    /// The result, once the game has ended.
    #[must_use]
    pub const fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The side with an open draw offer.
    #[must_use]
    pub const fn draw_offer(&self) -> Option<Side> {
        self.draw_offer
    }

    /// Seat occupancy.
    #[must_use]
    pub const fn seats(&self) -> &SeatRegistry {
        &self.seats
    }

    /// How many times `board` has occurred in the current game.
    #[must_use]
    pub fn occurrences(&self, board: &BoardState) -> u32 {
        self.position_counts
            .get(board.repetition_key())
            .copied()
            .unwrap_or(0)
    }

    /// Role the connection currently holds.
    #[must_use]
    pub fn role_of(&self, connection_id: ConnectionId) -> Role {
        self.seats.role_of(connection_id)
    }

    /// Returns the sequence number for the next recorded event.
    ///
    /// Events are applied as they are recorded, so `version` already
    /// includes every buffered event.
    fn next_sequence_number(&self) -> i64 {
        self.version + 1
    }

    fn record(&mut self, kind: SessionEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        // TODO: event_id uses Uuid::new_v4() which breaks replay determinism.
        // Requires extending DeterministicRng to support UUID generation.
        let event = SessionEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id,
                sequence_number: self.next_sequence_number(),
                correlation_id,
                causation_id: correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };

        self.apply(&event);
        self.uncommitted_events.push(event);
    }

    /// Admits a connection: reclaims a reserved seat when `resume_token`
    /// matches, otherwise fills White, then Black, then the spectator set.
    ///
    /// Joining twice with the same connection is a no-op. Starts the game
    /// once both seats are connected.
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        resume_token: Option<Uuid>,
        correlation_id: Uuid,
        clock: &dyn Clock,
        rng: &mut dyn DeterministicRng,
        oracle: &dyn RulesOracle,
    ) -> JoinOutcome {
        let current = self.seats.role_of(connection_id);
        if matches!(current, Role::Player(_)) || self.seats.is_spectator(connection_id) {
            return JoinOutcome {
                role: current,
                reconnected: false,
            };
        }

        if self.settings.auto_restart && self.phase == GamePhase::Ended {
            let board = oracle.initial_state();
            let turn = oracle.current_turn_side(&board);
            self.record(
                SessionEventKind::GameReset(GameReset {
                    session_id: self.id,
                    board,
                    turn,
                }),
                correlation_id,
                clock,
            );
        }

        let reclaimed = resume_token.and_then(|token| self.seats.reserved_for_token(token));
        let outcome = if let Some(side) = reclaimed {
            self.record(
                SessionEventKind::PlayerReconnected(PlayerReconnected {
                    session_id: self.id,
                    connection_id,
                    side,
                }),
                correlation_id,
                clock,
            );
            JoinOutcome {
                role: Role::Player(side),
                reconnected: true,
            }
        } else if let Some(side) = self.seats.next_vacant() {
            let number = rng.next_u32_range(GUEST_NUMBER_MIN, GUEST_NUMBER_MAX);
            self.record(
                SessionEventKind::PlayerSeated(PlayerSeated {
                    session_id: self.id,
                    connection_id,
                    side,
                    display_name: format!("Guest {number}"),
                    resume_token: Uuid::new_v4(),
                }),
                correlation_id,
                clock,
            );
            JoinOutcome {
                role: Role::Player(side),
                reconnected: false,
            }
        } else {
            self.record(
                SessionEventKind::SpectatorJoined(SpectatorJoined {
                    session_id: self.id,
                    connection_id,
                }),
                correlation_id,
                clock,
            );
            JoinOutcome {
                role: Role::Spectator,
                reconnected: false,
            }
        };

        self.start_if_ready(correlation_id, clock);
        outcome
    }

    fn start_if_ready(&mut self, correlation_id: Uuid, clock: &dyn Clock) {
        if self.phase != GamePhase::AwaitingPlayers || !self.seats.both_connected() {
            return;
        }
        self.record(
            SessionEventKind::GameStarted(GameStarted {
                session_id: self.id,
                board: self.board.clone(),
                turn: self.turn,
            }),
            correlation_id,
            clock,
        );
    }

    /// Releases a closed connection. A seated player's seat is held for the
    /// grace period; the returned reservation tells the caller when to fire
    /// [`GameSession::expire_seat`].
    pub fn leave(
        &mut self,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Option<SeatReservation> {
        match self.seats.role_of(connection_id) {
            Role::Player(side) => {
                if !self.seats.seat(side).is_connected() {
                    return None;
                }
                let deadline = clock.deadline_after(self.settings.grace_period);
                self.record(
                    SessionEventKind::PlayerDisconnected(PlayerDisconnected {
                        session_id: self.id,
                        connection_id,
                        side,
                        reconnect_deadline: deadline,
                    }),
                    correlation_id,
                    clock,
                );
                Some(SeatReservation { side, deadline })
            }
            Role::Spectator => {
                if self.seats.is_spectator(connection_id) {
                    self.record(
                        SessionEventKind::SpectatorLeft(SpectatorLeft {
                            session_id: self.id,
                            connection_id,
                        }),
                        correlation_id,
                        clock,
                    );
                }
                None
            }
        }
    }

    /// Vacates a seat whose grace window lapsed and applies the disconnect
    /// policy. Returns `false` without recording anything when the seat was
    /// reclaimed or re-reserved since `deadline` was scheduled.
    pub fn expire_seat(
        &mut self,
        side: Side,
        deadline: DateTime<Utc>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        let seat = self.seats.seat(side);
        if !seat.is_reserved() || seat.reconnect_deadline() != Some(deadline) {
            return false;
        }

        self.record(
            SessionEventKind::SeatVacated(SeatVacated {
                session_id: self.id,
                side,
            }),
            correlation_id,
            clock,
        );

        if self.phase == GamePhase::InProgress {
            match self.settings.disconnect_policy {
                DisconnectPolicy::Forfeit => {
                    let outcome = Outcome::win(side.opposite(), EndReason::Abandonment);
                    self.conclude(outcome, Some(side), correlation_id, clock);
                }
                DisconnectPolicy::Suspend => self.record(
                    SessionEventKind::GameSuspended(GameSuspended {
                        session_id: self.id,
                        vacated: side,
                    }),
                    correlation_id,
                    clock,
                ),
            }
        }
        true
    }

    fn conclude(
        &mut self,
        outcome: Outcome,
        initiator: Option<Side>,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        self.record(
            SessionEventKind::GameEnded(GameEnded {
                session_id: self.id,
                outcome,
                initiator,
            }),
            correlation_id,
            clock,
        );
    }

    /// The seat of a player acting on a game in progress.
    fn acting_side(&self, connection_id: ConnectionId) -> Result<Side, Rejection> {
        if self.phase != GamePhase::InProgress {
            return Err(Rejection::SessionNotActive);
        }
        self.seats
            .role_of(connection_id)
            .side()
            .ok_or(Rejection::NotSeated)
    }

    /// Validates and commits a move.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SessionNotActive` outside play,
    /// `Rejection::NotYourTurn` unless the submitter holds the seat to move,
    /// and `Rejection::IllegalMove` when the oracle refuses the move. A
    /// rejected move records nothing.
    pub fn submit_move(
        &mut self,
        connection_id: ConnectionId,
        requested: &MoveRequest,
        correlation_id: Uuid,
        clock: &dyn Clock,
        oracle: &dyn RulesOracle,
    ) -> Result<MoveAccepted, Rejection> {
        if self.phase != GamePhase::InProgress {
            return Err(Rejection::SessionNotActive);
        }
        let mover = self.turn;
        if self.seats.role_of(connection_id) != Role::Player(mover) {
            return Err(Rejection::NotYourTurn);
        }
        let applied = match oracle.try_apply(&self.board, requested) {
            MoveVerdict::Applied(applied) => applied,
            MoveVerdict::Illegal { .. } => return Err(Rejection::IllegalMove),
        };

        if let Some(offerer) = self.draw_offer {
            self.record(
                SessionEventKind::DrawOfferCancelled(DrawOfferCancelled {
                    session_id: self.id,
                    side: offerer,
                }),
                correlation_id,
                clock,
            );
        }

        self.record(
            SessionEventKind::MoveApplied(MoveApplied {
                session_id: self.id,
                side: mover,
                requested: requested.clone(),
                san: applied.san.clone(),
                board: applied.state.clone(),
                next_turn: mover.opposite(),
                check: applied.is_check,
            }),
            correlation_id,
            clock,
        );

        let outcome = if applied.is_checkmate {
            Some(Outcome::win(mover, EndReason::Checkmate))
        } else if applied.is_stalemate {
            Some(Outcome::draw(EndReason::Stalemate))
        } else if applied.is_insufficient_material {
            Some(Outcome::draw(EndReason::InsufficientMaterial))
        } else if applied.is_fifty_move_draw {
            Some(Outcome::draw(EndReason::FiftyMoveRule))
        } else if self.occurrences(&applied.state) >= REPETITION_LIMIT {
            Some(Outcome::draw(EndReason::ThreefoldRepetition))
        } else {
            None
        };
        if let Some(outcome) = outcome {
            self.conclude(outcome, Some(mover), correlation_id, clock);
        }

        Ok(MoveAccepted {
            resulting_state: applied.state,
            san: applied.san,
            outcome,
        })
    }

    /// Ends the game in the opponent's favour.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SessionNotActive` outside play and
    /// `Rejection::NotSeated` for spectators.
    pub fn resign(
        &mut self,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Outcome, Rejection> {
        let side = self.acting_side(connection_id)?;
        let outcome = Outcome::win(side.opposite(), EndReason::Resignation);
        self.conclude(outcome, Some(side), correlation_id, clock);
        Ok(outcome)
    }

    /// Opens a draw offer. An offer made while the opponent's offer is open
    /// counts as acceptance and returns the drawn outcome.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SessionNotActive` outside play,
    /// `Rejection::NotSeated` for spectators and
    /// `Rejection::DrawAlreadyOffered` when the side already has an offer open.
    pub fn offer_draw(
        &mut self,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Option<Outcome>, Rejection> {
        let side = self.acting_side(connection_id)?;
        match self.draw_offer {
            Some(offerer) if offerer == side => Err(Rejection::DrawAlreadyOffered),
            Some(_) => {
                let outcome = Outcome::draw(EndReason::DrawAgreement);
                self.conclude(outcome, Some(side), correlation_id, clock);
                Ok(Some(outcome))
            }
            None => {
                self.record(
                    SessionEventKind::DrawOffered(DrawOffered {
                        session_id: self.id,
                        side,
                    }),
                    correlation_id,
                    clock,
                );
                Ok(None)
            }
        }
    }

    /// Accepts the opponent's open draw offer. Without one this is a no-op
    /// and returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SessionNotActive` outside play and
    /// `Rejection::NotSeated` for spectators.
    pub fn accept_draw(
        &mut self,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<Option<Outcome>, Rejection> {
        let side = self.acting_side(connection_id)?;
        if self.draw_offer != Some(side.opposite()) {
            return Ok(None);
        }
        let outcome = Outcome::draw(EndReason::DrawAgreement);
        self.conclude(outcome, Some(side), correlation_id, clock);
        Ok(Some(outcome))
    }

    /// Declines the opponent's open draw offer. Returns `false` when there
    /// was none.
    ///
    /// # Errors
    ///
    /// Returns `Rejection::SessionNotActive` outside play and
    /// `Rejection::NotSeated` for spectators.
    pub fn decline_draw(
        &mut self,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<bool, Rejection> {
        let side = self.acting_side(connection_id)?;
        if self.draw_offer != Some(side.opposite()) {
            return Ok(false);
        }
        self.record(
            SessionEventKind::DrawDeclined(DrawDeclined {
                session_id: self.id,
                side,
            }),
            correlation_id,
            clock,
        );
        Ok(true)
    }
}

impl AggregateRoot for GameSession {
    type Event = SessionEvent;

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            SessionEventKind::PlayerSeated(e) => {
                self.seats.bind(
                    e.side,
                    e.connection_id,
                    e.display_name.clone(),
                    e.resume_token,
                );
            }
            SessionEventKind::SpectatorJoined(e) => self.seats.add_spectator(e.connection_id),
            SessionEventKind::SpectatorLeft(e) => self.seats.remove_spectator(e.connection_id),
            SessionEventKind::PlayerDisconnected(e) => {
                self.seats.reserve(e.side, e.reconnect_deadline);
            }
            SessionEventKind::PlayerReconnected(e) => self.seats.rebind(e.side, e.connection_id),
            SessionEventKind::SeatVacated(e) => self.seats.vacate(e.side),
            SessionEventKind::GameStarted(e) => {
                self.board = e.board.clone();
                self.turn = e.turn;
                self.phase = GamePhase::InProgress;
                self.outcome = None;
            }
            SessionEventKind::GameSuspended(_) => {
                self.phase = GamePhase::AwaitingPlayers;
                self.draw_offer = None;
            }
            SessionEventKind::MoveApplied(e) => {
                *self
                    .position_counts
                    .entry(e.board.repetition_key().to_owned())
                    .or_insert(0) += 1;
                self.board = e.board.clone();
                self.turn = e.next_turn;
            }
            SessionEventKind::DrawOffered(e) => self.draw_offer = Some(e.side),
            SessionEventKind::DrawDeclined(_) | SessionEventKind::DrawOfferCancelled(_) => {
                self.draw_offer = None;
            }
            SessionEventKind::GameEnded(e) => {
                self.phase = GamePhase::Ended;
                self.outcome = Some(e.outcome);
                self.draw_offer = None;
            }
            SessionEventKind::GameReset(e) => {
                self.position_counts.clear();
                self.position_counts
                    .insert(e.board.repetition_key().to_owned(), 1);
                self.board = e.board.clone();
                self.turn = e.turn;
                self.phase = GamePhase::AwaitingPlayers;
                self.outcome = None;
                self.draw_offer = None;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rookery_rules::ShakmatyOracle;
    use rookery_test_support::{FixedClock, MockRng, ScriptedOracle, SequenceRng, fixed_now};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    struct Table {
        session: GameSession,
        white: ConnectionId,
        black: ConnectionId,
    }

    fn seated_table(settings: SessionSettings, oracle: &dyn RulesOracle) -> Table {
        let clock = FixedClock::default();
        let mut session = GameSession::new(Uuid::new_v4(), settings, oracle);
        let white = ConnectionId::new();
        let black = ConnectionId::new();
        session.join(white, None, Uuid::new_v4(), &clock, &mut MockRng, oracle);
        session.join(black, None, Uuid::new_v4(), &clock, &mut MockRng, oracle);
        session.clear_uncommitted_events();
        Table {
            session,
            white,
            black,
        }
    }

    fn kinds(session: &GameSession) -> Vec<&'static str> {
        session
            .uncommitted_events()
            .iter()
            .map(|e| e.kind.event_type())
            .collect()
    }

    fn scripted(script: Vec<MoveVerdict>) -> ScriptedOracle {
        ScriptedOracle::new(BoardState::new("start", Side::White), script)
    }

    #[test]
    fn test_new_session_awaits_players_at_initial_position() {
        let oracle = ShakmatyOracle::default();

        let session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);

        assert_eq!(session.phase(), GamePhase::AwaitingPlayers);
        assert_eq!(session.board().fen(), START_FEN);
        assert_eq!(session.turn(), Side::White);
        assert_eq!(session.version, 0);
    }

    #[test]
    fn test_join_fills_white_then_black_then_spectators() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut rng = SequenceRng::new(vec![4821, 1337]);
        let mut session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);
        let (a, b, c) = (ConnectionId::new(), ConnectionId::new(), ConnectionId::new());

        // Act
        let first = session.join(a, None, Uuid::new_v4(), &clock, &mut rng, &oracle);
        let second = session.join(b, None, Uuid::new_v4(), &clock, &mut rng, &oracle);
        let third = session.join(c, None, Uuid::new_v4(), &clock, &mut rng, &oracle);

        // Assert
        assert_eq!(first.role, Role::Player(Side::White));
        assert_eq!(second.role, Role::Player(Side::Black));
        assert_eq!(third.role, Role::Spectator);
        assert_eq!(session.phase(), GamePhase::InProgress);
        assert_eq!(
            session.seats().seat(Side::White).display_name(),
            Some("Guest 4821")
        );
        assert_eq!(
            session.seats().seat(Side::Black).display_name(),
            Some("Guest 1337")
        );
        assert_eq!(
            kinds(&session),
            vec![
                "session.player_seated",
                "session.player_seated",
                "session.game_started",
                "session.spectator_joined",
            ]
        );
    }

    #[test]
    fn test_event_sequence_numbers_increase_monotonically() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);

        session.join(ConnectionId::new(), None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        session.join(ConnectionId::new(), None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        let sequence: Vec<i64> = session
            .uncommitted_events()
            .iter()
            .map(|e| e.metadata.sequence_number)
            .collect();
        assert_eq!(sequence, vec![1, 2, 3]);
        assert_eq!(session.version, 3);
        assert!(
            session
                .uncommitted_events()
                .iter()
                .all(|e| e.metadata.occurred_at == fixed_now())
        );
    }

    #[test]
    fn test_join_twice_with_same_connection_is_a_no_op() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);
        let white = ConnectionId::new();
        session.join(white, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        session.clear_uncommitted_events();

        // Act
        let again = session.join(white, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        // Assert
        assert_eq!(again.role, Role::Player(Side::White));
        assert!(session.uncommitted_events().is_empty());
        assert_eq!(session.seats().next_vacant(), Some(Side::Black));
    }

    #[test]
    fn test_move_before_game_starts_is_rejected() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);
        let white = ConnectionId::new();
        session.join(white, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        let result = session.submit_move(
            white,
            &MoveRequest::new("e2", "e4"),
            Uuid::new_v4(),
            &clock,
            &oracle,
        );

        assert_eq!(result, Err(Rejection::SessionNotActive));
    }

    #[test]
    fn test_legal_move_updates_board_and_flips_turn() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        // Act
        let accepted = table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("e2", "e4"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();

        // Assert
        assert_eq!(accepted.san, "e4");
        assert!(!accepted.is_terminal());
        assert_eq!(table.session.turn(), Side::Black);
        assert_eq!(
            table.session.board().fen(),
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1"
        );
        assert_eq!(kinds(&table.session), vec!["session.move_applied"]);
    }

    #[test]
    fn test_wrong_mover_is_rejected_without_state_change() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let version_before = table.session.version;

        // Act
        let result = table.session.submit_move(
            table.black,
            &MoveRequest::new("e7", "e5"),
            Uuid::new_v4(),
            &clock,
            &oracle,
        );

        // Assert
        assert_eq!(result, Err(Rejection::NotYourTurn));
        assert_eq!(table.session.version, version_before);
        assert_eq!(table.session.board().fen(), START_FEN);
        assert_eq!(table.session.turn(), Side::White);
        assert!(table.session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_spectator_move_is_not_your_turn() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let spectator = ConnectionId::new();
        table
            .session
            .join(spectator, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        let result = table.session.submit_move(
            spectator,
            &MoveRequest::new("e2", "e4"),
            Uuid::new_v4(),
            &clock,
            &oracle,
        );

        assert_eq!(result, Err(Rejection::NotYourTurn));
    }

    #[test]
    fn test_turns_strictly_alternate() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let mut play = |conn, from, to| {
            table.session.submit_move(
                conn,
                &MoveRequest::new(from, to),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
        };

        // Act / Assert
        assert!(play(table.white, "e2", "e4").is_ok());
        assert_eq!(play(table.white, "d2", "d4"), Err(Rejection::NotYourTurn));
        assert!(play(table.black, "e7", "e5").is_ok());
        assert_eq!(play(table.black, "d7", "d5"), Err(Rejection::NotYourTurn));
        assert!(play(table.white, "g1", "f3").is_ok());
    }

    #[test]
    fn test_illegal_move_is_rejected_after_consulting_oracle() {
        // Arrange
        let oracle = scripted(vec![ScriptedOracle::illegal()]);
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let requested = MoveRequest::new("e2", "e5");

        // Act
        let result =
            table
                .session
                .submit_move(table.white, &requested, Uuid::new_v4(), &clock, &oracle);

        // Assert
        assert_eq!(result, Err(Rejection::IllegalMove));
        assert_eq!(oracle.calls(), vec![requested]);
        assert_eq!(table.session.turn(), Side::White);
        assert!(table.session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_checkmate_ends_game_with_mover_as_winner() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let moves = [
            (table.white, "f2", "f3"),
            (table.black, "e7", "e5"),
            (table.white, "g2", "g4"),
        ];
        for (conn, from, to) in moves {
            table
                .session
                .submit_move(conn, &MoveRequest::new(from, to), Uuid::new_v4(), &clock, &oracle)
                .unwrap();
        }

        // Act
        let accepted = table
            .session
            .submit_move(
                table.black,
                &MoveRequest::new("d8", "h4"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();

        // Assert
        let expected = Outcome::win(Side::Black, EndReason::Checkmate);
        assert_eq!(accepted.outcome, Some(expected));
        assert_eq!(table.session.phase(), GamePhase::Ended);
        let mating_move = table
            .session
            .uncommitted_events()
            .iter()
            .rev()
            .find_map(|e| match &e.kind {
                SessionEventKind::MoveApplied(applied) => Some(applied),
                _ => None,
            })
            .unwrap();
        assert_eq!(mating_move.san, "Qh4#");
        assert!(mating_move.check);
        assert_eq!(table.session.outcome(), Some(expected));
        assert_eq!(
            kinds(&table.session).last(),
            Some(&"session.game_ended")
        );
    }

    #[test]
    fn test_hundredth_quiet_halfmove_ends_game_by_fifty_move_rule() {
        // Arrange
        let oracle = ShakmatyOracle::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 99 80").unwrap();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        // Act
        let accepted = table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("a1", "a2"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();

        // Assert
        let expected = Outcome::draw(EndReason::FiftyMoveRule);
        assert_eq!(accepted.outcome, Some(expected));
        assert_eq!(table.session.phase(), GamePhase::Ended);
        assert_eq!(table.session.outcome(), Some(expected));
    }

    #[test]
    fn test_third_occurrence_of_position_ends_game_by_repetition() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let shuffle = [
            (table.white, "g1", "f3"),
            (table.black, "g8", "f6"),
            (table.white, "f3", "g1"),
            (table.black, "f6", "g8"),
        ];
        let mut moves = [shuffle, shuffle].concat();
        let (conn, from, to) = moves.pop().unwrap();
        for (conn, from, to) in moves {
            let accepted = table
                .session
                .submit_move(conn, &MoveRequest::new(from, to), Uuid::new_v4(), &clock, &oracle)
                .unwrap();
            assert!(!accepted.is_terminal(), "{from}{to}");
        }
        assert_eq!(table.session.phase(), GamePhase::InProgress);

        // Act
        let accepted = table
            .session
            .submit_move(conn, &MoveRequest::new(from, to), Uuid::new_v4(), &clock, &oracle)
            .unwrap();

        // Assert
        let expected = Outcome::draw(EndReason::ThreefoldRepetition);
        assert_eq!(accepted.outcome, Some(expected));
        assert_eq!(table.session.outcome(), Some(expected));
        assert_eq!(table.session.occurrences(table.session.board()), 3);
    }

    #[test]
    fn test_position_count_starts_at_one_for_initial_board() {
        let oracle = ShakmatyOracle::default();

        let session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);

        assert_eq!(session.occurrences(session.board()), 1);
        assert_eq!(session.occurrences(&BoardState::new("elsewhere", Side::White)), 0);
    }

    #[test]
    fn test_moves_after_game_end_are_rejected() {
        let oracle = scripted(vec![ScriptedOracle::stalemating("drawn", Side::Black)]);
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("f1", "f7"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();

        let result = table.session.submit_move(
            table.black,
            &MoveRequest::new("h8", "g8"),
            Uuid::new_v4(),
            &clock,
            &oracle,
        );

        assert_eq!(
            table.session.outcome(),
            Some(Outcome::draw(EndReason::Stalemate))
        );
        assert_eq!(result, Err(Rejection::SessionNotActive));
    }

    #[test]
    fn test_resign_awards_game_to_opponent() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        // Act
        let outcome = table
            .session
            .resign(table.black, Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(outcome, Outcome::win(Side::White, EndReason::Resignation));
        assert_eq!(table.session.phase(), GamePhase::Ended);
        let ended = table.session.uncommitted_events().last().unwrap();
        match &ended.kind {
            SessionEventKind::GameEnded(e) => assert_eq!(e.initiator, Some(Side::Black)),
            other => panic!("expected GameEnded, got {other:?}"),
        }
    }

    #[test]
    fn test_spectator_cannot_resign() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        let result = table.session.resign(ConnectionId::new(), Uuid::new_v4(), &clock);

        assert_eq!(result, Err(Rejection::NotSeated));
        assert_eq!(table.session.phase(), GamePhase::InProgress);
    }

    #[test]
    fn test_draw_offer_accepted_by_opponent_ends_in_draw() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        assert_eq!(
            table.session.offer_draw(table.white, Uuid::new_v4(), &clock),
            Ok(None)
        );

        // Act
        let outcome = table
            .session
            .accept_draw(table.black, Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert_eq!(outcome, Some(Outcome::draw(EndReason::DrawAgreement)));
        assert_eq!(table.session.phase(), GamePhase::Ended);
        assert_eq!(table.session.draw_offer(), None);
    }

    #[test]
    fn test_offerer_cannot_accept_own_draw_offer() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .offer_draw(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        let outcome = table
            .session
            .accept_draw(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        assert_eq!(outcome, None);
        assert_eq!(table.session.phase(), GamePhase::InProgress);
        assert_eq!(table.session.draw_offer(), Some(Side::White));
    }

    #[test]
    fn test_accept_without_offer_is_a_no_op() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        let outcome = table
            .session
            .accept_draw(table.black, Uuid::new_v4(), &clock)
            .unwrap();

        assert_eq!(outcome, None);
        assert!(table.session.uncommitted_events().is_empty());
    }

    #[test]
    fn test_repeated_draw_offer_is_rejected() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .offer_draw(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        let result = table.session.offer_draw(table.white, Uuid::new_v4(), &clock);

        assert_eq!(result, Err(Rejection::DrawAlreadyOffered));
    }

    #[test]
    fn test_crossing_draw_offers_count_as_acceptance() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .offer_draw(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        let result = table.session.offer_draw(table.black, Uuid::new_v4(), &clock);

        assert_eq!(result, Ok(Some(Outcome::draw(EndReason::DrawAgreement))));
        assert_eq!(table.session.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_decline_clears_offer() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .offer_draw(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        let declined = table
            .session
            .decline_draw(table.black, Uuid::new_v4(), &clock)
            .unwrap();

        // Assert
        assert!(declined);
        assert_eq!(table.session.draw_offer(), None);
        assert_eq!(table.session.phase(), GamePhase::InProgress);
        assert_eq!(
            table
                .session
                .decline_draw(table.black, Uuid::new_v4(), &clock),
            Ok(false)
        );
    }

    #[test]
    fn test_move_cancels_pending_draw_offer() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .offer_draw(table.black, Uuid::new_v4(), &clock)
            .unwrap();
        table.session.clear_uncommitted_events();

        // Act
        table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("e2", "e4"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();

        // Assert
        assert_eq!(table.session.draw_offer(), None);
        assert_eq!(
            kinds(&table.session),
            vec!["session.draw_offer_cancelled", "session.move_applied"]
        );
    }

    #[test]
    fn test_player_leave_reserves_seat_for_grace_period() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);

        // Act
        let reservation = table.session.leave(table.white, Uuid::new_v4(), &clock);

        // Assert
        let deadline = fixed_now() + TimeDelta::seconds(30);
        assert_eq!(
            reservation,
            Some(SeatReservation {
                side: Side::White,
                deadline,
            })
        );
        let seat = table.session.seats().seat(Side::White);
        assert!(seat.is_reserved());
        assert_eq!(seat.reconnect_deadline(), Some(deadline));
        assert_eq!(table.session.phase(), GamePhase::InProgress);
        assert_eq!(table.session.turn(), Side::White);
    }

    #[test]
    fn test_spectator_leave_emits_spectator_left() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let spectator = ConnectionId::new();
        table
            .session
            .join(spectator, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        table.session.clear_uncommitted_events();

        let reservation = table.session.leave(spectator, Uuid::new_v4(), &clock);

        assert_eq!(reservation, None);
        assert_eq!(table.session.seats().spectator_count(), 0);
        assert_eq!(kinds(&table.session), vec!["session.spectator_left"]);
    }

    #[test]
    fn test_reconnect_with_token_rebinds_seat_without_touching_board() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("e2", "e4"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();
        let token = table.session.seats().seat(Side::Black).resume_token();
        let fen_before = table.session.board().fen().to_owned();
        table.session.leave(table.black, Uuid::new_v4(), &clock);
        table.session.clear_uncommitted_events();
        let returning = ConnectionId::new();

        // Act
        let joined = table
            .session
            .join(returning, token, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        // Assert
        assert_eq!(joined.role, Role::Player(Side::Black));
        assert!(joined.reconnected);
        assert_eq!(table.session.board().fen(), fen_before);
        assert_eq!(table.session.turn(), Side::Black);
        assert!(table.session.seats().seat(Side::Black).is_connected());
        assert_eq!(kinds(&table.session), vec!["session.player_reconnected"]);
    }

    #[test]
    fn test_unknown_token_joins_as_spectator_while_seat_reserved() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table.session.leave(table.white, Uuid::new_v4(), &clock);

        let joined = table.session.join(
            ConnectionId::new(),
            Some(Uuid::new_v4()),
            Uuid::new_v4(),
            &clock,
            &mut MockRng,
            &oracle,
        );

        assert_eq!(joined.role, Role::Spectator);
        assert!(table.session.seats().seat(Side::White).is_reserved());
    }

    #[test]
    fn test_stale_expiry_is_ignored() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let token = table.session.seats().seat(Side::White).resume_token();
        let reservation = table
            .session
            .leave(table.white, Uuid::new_v4(), &clock)
            .unwrap();
        table
            .session
            .join(ConnectionId::new(), token, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        table.session.clear_uncommitted_events();

        // Act
        let expired =
            table
                .session
                .expire_seat(Side::White, reservation.deadline, Uuid::new_v4(), &clock);

        // Assert
        assert!(!expired);
        assert!(table.session.uncommitted_events().is_empty());
        assert_eq!(table.session.phase(), GamePhase::InProgress);
    }

    #[test]
    fn test_expiry_under_forfeit_awards_game_to_opponent() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        let reservation = table
            .session
            .leave(table.black, Uuid::new_v4(), &clock)
            .unwrap();
        table.session.clear_uncommitted_events();

        // Act
        let expired =
            table
                .session
                .expire_seat(Side::Black, reservation.deadline, Uuid::new_v4(), &clock);

        // Assert
        assert!(expired);
        assert!(table.session.seats().seat(Side::Black).is_vacant());
        assert_eq!(
            table.session.outcome(),
            Some(Outcome::win(Side::White, EndReason::Abandonment))
        );
        assert_eq!(
            kinds(&table.session),
            vec!["session.seat_vacated", "session.game_ended"]
        );
    }

    #[test]
    fn test_expiry_under_suspend_pauses_and_next_join_resumes() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let settings = SessionSettings {
            disconnect_policy: DisconnectPolicy::Suspend,
            ..SessionSettings::default()
        };
        let mut table = seated_table(settings, &oracle);
        table
            .session
            .submit_move(
                table.white,
                &MoveRequest::new("d2", "d4"),
                Uuid::new_v4(),
                &clock,
                &oracle,
            )
            .unwrap();
        let fen = table.session.board().fen().to_owned();
        let reservation = table
            .session
            .leave(table.black, Uuid::new_v4(), &clock)
            .unwrap();

        // Act
        table
            .session
            .expire_seat(Side::Black, reservation.deadline, Uuid::new_v4(), &clock);

        // Assert
        assert_eq!(table.session.phase(), GamePhase::AwaitingPlayers);
        assert_eq!(table.session.board().fen(), fen);
        assert_eq!(table.session.turn(), Side::Black);

        let replacement = ConnectionId::new();
        let joined = table
            .session
            .join(replacement, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        assert_eq!(joined.role, Role::Player(Side::Black));
        assert_eq!(table.session.phase(), GamePhase::InProgress);
        assert_eq!(table.session.board().fen(), fen);
        assert_eq!(table.session.turn(), Side::Black);
    }

    #[test]
    fn test_expiry_before_game_starts_only_vacates() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut session = GameSession::new(Uuid::new_v4(), SessionSettings::default(), &oracle);
        let white = ConnectionId::new();
        session.join(white, None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);
        let reservation = session.leave(white, Uuid::new_v4(), &clock).unwrap();
        session.clear_uncommitted_events();

        session.expire_seat(Side::White, reservation.deadline, Uuid::new_v4(), &clock);

        assert_eq!(session.phase(), GamePhase::AwaitingPlayers);
        assert_eq!(session.outcome(), None);
        assert_eq!(kinds(&session), vec!["session.seat_vacated"]);
    }

    #[test]
    fn test_auto_restart_resets_board_on_next_join() {
        // Arrange
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let settings = SessionSettings {
            auto_restart: true,
            ..SessionSettings::default()
        };
        let mut table = seated_table(settings, &oracle);
        let shuffle = [
            (table.white, "g1", "f3"),
            (table.black, "g8", "f6"),
            (table.white, "f3", "g1"),
            (table.black, "f6", "g8"),
        ];
        for (conn, from, to) in shuffle {
            table
                .session
                .submit_move(conn, &MoveRequest::new(from, to), Uuid::new_v4(), &clock, &oracle)
                .unwrap();
        }
        assert_eq!(table.session.occurrences(table.session.board()), 2);
        table
            .session
            .resign(table.white, Uuid::new_v4(), &clock)
            .unwrap();
        table.session.clear_uncommitted_events();

        // Act
        let joined = table
            .session
            .join(ConnectionId::new(), None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        // Assert
        assert_eq!(joined.role, Role::Spectator);
        assert_eq!(table.session.phase(), GamePhase::InProgress);
        assert_eq!(table.session.outcome(), None);
        assert_eq!(table.session.board().fen(), START_FEN);
        assert_eq!(table.session.role_of(table.white), Role::Player(Side::White));
        assert_eq!(table.session.occurrences(table.session.board()), 1);
        assert_eq!(
            kinds(&table.session),
            vec![
                "session.game_reset",
                "session.spectator_joined",
                "session.game_started",
            ]
        );
    }

    #[test]
    fn test_without_auto_restart_ended_game_stays_ended() {
        let oracle = ShakmatyOracle::default();
        let clock = FixedClock::default();
        let mut table = seated_table(SessionSettings::default(), &oracle);
        table
            .session
            .resign(table.white, Uuid::new_v4(), &clock)
            .unwrap();

        table
            .session
            .join(ConnectionId::new(), None, Uuid::new_v4(), &clock, &mut MockRng, &oracle);

        assert_eq!(table.session.phase(), GamePhase::Ended);
    }

    #[test]
    fn test_disconnect_policy_parses_case_insensitively() {
        assert_eq!(
            "Suspend".parse::<DisconnectPolicy>().unwrap(),
            DisconnectPolicy::Suspend
        );
        assert_eq!(
            "forfeit".parse::<DisconnectPolicy>().unwrap(),
            DisconnectPolicy::Forfeit
        );
        assert!(matches!(
            "abandon".parse::<DisconnectPolicy>(),
            Err(DomainError::Validation(_))
        ));
    }
}
