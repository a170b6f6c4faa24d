//! Domain events for the game session.

use chrono::{DateTime, Utc};
use rookery_core::event::{DomainEvent, EventMetadata};
use rookery_rules::{BoardState, MoveRequest, Side};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::seats::ConnectionId;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The side to move is mated.
    Checkmate,
    /// The side to move has no legal move and is not in check.
    Stalemate,
    /// Neither side can mate.
    InsufficientMaterial,
    /// A player resigned.
    Resignation,
    /// Both players agreed to a draw.
    DrawAgreement,
    /// A player's seat was vacated mid-game.
    Abandonment,
    /// A hundred half-moves passed without a capture or pawn move.
    FiftyMoveRule,
    /// The same position occurred for the third time.
    ThreefoldRepetition,
}

impl EndReason {
    /// Wire label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
            Self::InsufficientMaterial => "insufficient_material",
            Self::Resignation => "resignation",
            Self::DrawAgreement => "draw_agreement",
            Self::Abandonment => "abandonment",
            Self::FiftyMoveRule => "fifty_move_rule",
            Self::ThreefoldRepetition => "threefold_repetition",
        }
    }
}

/// Final result of a game. `winner` is `None` for a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// The winning side, absent on a draw.
    pub winner: Option<Side>,
    /// How the game ended.
    pub reason: EndReason,
}

impl Outcome {
    /// A decisive result.
    #[must_use]
    pub const fn win(winner: Side, reason: EndReason) -> Self {
        Self {
            winner: Some(winner),
            reason,
        }
    }

    /// A drawn result.
    #[must_use]
    pub const fn draw(reason: EndReason) -> Self {
        Self {
            winner: None,
            reason,
        }
    }
}

/// A connection was bound to a vacant seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSeated {
    /// The session identifier.
    pub session_id: Uuid,
    /// The connection now occupying the seat.
    pub connection_id: ConnectionId,
    /// The seat.
    pub side: Side,
    /// Generated display name.
    pub display_name: String,
    /// Token for reclaiming the seat after a disconnect.
    pub resume_token: Uuid,
}

/// A connection joined as an observer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectatorJoined {
    /// The session identifier.
    pub session_id: Uuid,
    /// The spectator's connection.
    pub connection_id: ConnectionId,
}

/// An observer disconnected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectatorLeft {
    /// The session identifier.
    pub session_id: Uuid,
    /// The spectator's connection.
    pub connection_id: ConnectionId,
}

/// A seated player's connection dropped; the seat is held until the deadline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDisconnected {
    /// The session identifier.
    pub session_id: Uuid,
    /// The dropped connection.
    pub connection_id: ConnectionId,
    /// The reserved seat.
    pub side: Side,
    /// End of the grace window.
    pub reconnect_deadline: DateTime<Utc>,
}

/// A returning client reclaimed its reserved seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerReconnected {
    /// The session identifier.
    pub session_id: Uuid,
    /// The new connection bound to the seat.
    pub connection_id: ConnectionId,
    /// The reclaimed seat.
    pub side: Side,
}

/// A reserved seat's grace window lapsed and the seat is vacant again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatVacated {
    /// The session identifier.
    pub session_id: Uuid,
    /// The vacated seat.
    pub side: Side,
}

/// Both seats are occupied and connected; moves are accepted from now on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStarted {
    /// The session identifier.
    pub session_id: Uuid,
    /// Position the game starts from.
    pub board: BoardState,
    /// Side to move.
    pub turn: Side,
}

/// Play paused because a seat was vacated mid-game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSuspended {
    /// The session identifier.
    pub session_id: Uuid,
    /// The seat that was vacated.
    pub vacated: Side,
}

/// A legal move was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveApplied {
    /// The session identifier.
    pub session_id: Uuid,
    /// The side that moved.
    pub side: Side,
    /// The move exactly as the client sent it.
    pub requested: MoveRequest,
    /// The move in standard algebraic notation.
    pub san: String,
    /// The resulting position.
    pub board: BoardState,
    /// Side to move next.
    pub next_turn: Side,
    /// The side to move next is in check.
    pub check: bool,
}

/// A player offered a draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOffered {
    /// The session identifier.
    pub session_id: Uuid,
    /// The offering side.
    pub side: Side,
}

/// The opponent declined a pending draw offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawDeclined {
    /// The session identifier.
    pub session_id: Uuid,
    /// The declining side.
    pub side: Side,
}

/// A pending draw offer lapsed because a move was played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOfferCancelled {
    /// The session identifier.
    pub session_id: Uuid,
    /// The side whose offer lapsed.
    pub side: Side,
}

/// The game reached a final result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEnded {
    /// The session identifier.
    pub session_id: Uuid,
    /// The result.
    pub outcome: Outcome,
    /// The side whose action ended the game, if a player action did.
    pub initiator: Option<Side>,
}

/// A finished game was reset to the initial position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameReset {
    /// The session identifier.
    pub session_id: Uuid,
    /// The initial position.
    pub board: BoardState,
    /// Side to move.
    pub turn: Side,
}

/// Event type identifier for [`PlayerSeated`].
pub const PLAYER_SEATED_EVENT_TYPE: &str = "session.player_seated";

/// Event type identifier for [`SpectatorJoined`].
pub const SPECTATOR_JOINED_EVENT_TYPE: &str = "session.spectator_joined";

/// Event type identifier for [`SpectatorLeft`].
pub const SPECTATOR_LEFT_EVENT_TYPE: &str = "session.spectator_left";

/// Event type identifier for [`PlayerDisconnected`].
pub const PLAYER_DISCONNECTED_EVENT_TYPE: &str = "session.player_disconnected";

/// Event type identifier for [`PlayerReconnected`].
pub const PLAYER_RECONNECTED_EVENT_TYPE: &str = "session.player_reconnected";

/// Event type identifier for [`SeatVacated`].
pub const SEAT_VACATED_EVENT_TYPE: &str = "session.seat_vacated";

/// Event type identifier for [`GameStarted`].
pub const GAME_STARTED_EVENT_TYPE: &str = "session.game_started";

/// Event type identifier for [`GameSuspended`].
pub const GAME_SUSPENDED_EVENT_TYPE: &str = "session.game_suspended";

/// Event type identifier for [`MoveApplied`].
pub const MOVE_APPLIED_EVENT_TYPE: &str = "session.move_applied";

/// Event type identifier for [`DrawOffered`].
pub const DRAW_OFFERED_EVENT_TYPE: &str = "session.draw_offered";

/// Event type identifier for [`DrawDeclined`].
pub const DRAW_DECLINED_EVENT_TYPE: &str = "session.draw_declined";

/// Event type identifier for [`DrawOfferCancelled`].
pub const DRAW_OFFER_CANCELLED_EVENT_TYPE: &str = "session.draw_offer_cancelled";

/// Event type identifier for [`GameEnded`].
pub const GAME_ENDED_EVENT_TYPE: &str = "session.game_ended";

/// Event type identifier for [`GameReset`].
pub const GAME_RESET_EVENT_TYPE: &str = "session.game_reset";

/// Event payload variants for the game session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEventKind {
    /// A player took a seat.
    PlayerSeated(PlayerSeated),
    /// An observer joined.
    SpectatorJoined(SpectatorJoined),
    /// An observer left.
    SpectatorLeft(SpectatorLeft),
    /// A player's connection dropped.
    PlayerDisconnected(PlayerDisconnected),
    /// A player reclaimed its seat.
    PlayerReconnected(PlayerReconnected),
    /// A reserved seat was released.
    SeatVacated(SeatVacated),
    /// Play began.
    GameStarted(GameStarted),
    /// Play paused.
    GameSuspended(GameSuspended),
    /// A move was played.
    MoveApplied(MoveApplied),
    /// A draw was offered.
    DrawOffered(DrawOffered),
    /// A draw offer was declined.
    DrawDeclined(DrawDeclined),
    /// A draw offer lapsed.
    DrawOfferCancelled(DrawOfferCancelled),
    /// The game ended.
    GameEnded(GameEnded),
    /// The board was reset for a new game.
    GameReset(GameReset),
}

impl SessionEventKind {
    /// Event type identifier for this payload.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::PlayerSeated(_) => PLAYER_SEATED_EVENT_TYPE,
            Self::SpectatorJoined(_) => SPECTATOR_JOINED_EVENT_TYPE,
            Self::SpectatorLeft(_) => SPECTATOR_LEFT_EVENT_TYPE,
            Self::PlayerDisconnected(_) => PLAYER_DISCONNECTED_EVENT_TYPE,
            Self::PlayerReconnected(_) => PLAYER_RECONNECTED_EVENT_TYPE,
            Self::SeatVacated(_) => SEAT_VACATED_EVENT_TYPE,
            Self::GameStarted(_) => GAME_STARTED_EVENT_TYPE,
            Self::GameSuspended(_) => GAME_SUSPENDED_EVENT_TYPE,
            Self::MoveApplied(_) => MOVE_APPLIED_EVENT_TYPE,
            Self::DrawOffered(_) => DRAW_OFFERED_EVENT_TYPE,
            Self::DrawDeclined(_) => DRAW_DECLINED_EVENT_TYPE,
            Self::DrawOfferCancelled(_) => DRAW_OFFER_CANCELLED_EVENT_TYPE,
            Self::GameEnded(_) => GAME_ENDED_EVENT_TYPE,
            Self::GameReset(_) => GAME_RESET_EVENT_TYPE,
        }
    }

    /// Returns true if the event changes who is at the board.
    #[must_use]
    pub const fn changes_roster(&self) -> bool {
        matches!(
            self,
            Self::PlayerSeated(_)
                | Self::SpectatorJoined(_)
                | Self::SpectatorLeft(_)
                | Self::PlayerDisconnected(_)
                | Self::PlayerReconnected(_)
                | Self::SeatVacated(_)
        )
    }
}

/// Domain event envelope for the game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: SessionEventKind,
}

impl DomainEvent for SessionEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        serde_json::to_value(&self.kind).unwrap_or_default()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
