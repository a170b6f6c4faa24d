//! WebSocket wire protocol.
//!
//! Every frame is a JSON text message `{"event": "<name>", "data": <payload>}`.

use rookery_rules::{MoveRequest, Side};
use rookery_session::domain::seats::Roster;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Reason sent when a `move` frame carries an unreadable payload.
pub const MALFORMED_MOVE: &str = "malformed_move";
/// Reason sent when a frame cannot be read at all.
pub const MALFORMED_MESSAGE: &str = "malformed_message";

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Play a move.
    Move(MoveRequest),
    /// Resign the game.
    Resign,
    /// Offer a draw.
    DrawOffer,
    /// Accept the opponent's draw offer.
    DrawAccepted,
    /// Decline the opponent's draw offer.
    DrawDeclined,
}

impl ClientMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    ///
    /// Returns the reply owed to the sender: `wrongMove` when the frame names
    /// the `move` event but its payload does not parse, `invalidGameState`
    /// for anything else unreadable.
    pub fn parse(text: &str) -> Result<Self, ServerMessage> {
        serde_json::from_str(text).map_err(|_| {
            let raw: Value = serde_json::from_str(text).unwrap_or(Value::Null);
            if raw.get("event").and_then(Value::as_str) == Some("move") {
                ServerMessage::WrongMove {
                    requested: raw.get("data").cloned().unwrap_or(Value::Null),
                    reason: MALFORMED_MOVE.to_owned(),
                }
            } else {
                ServerMessage::InvalidGameState {
                    reason: MALFORMED_MESSAGE.to_owned(),
                }
            }
        })
    }
}

/// Private seat assignment sent to a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatGrant {
    /// The side the player controls.
    pub role: Side,
    /// Generated display name.
    pub display_name: String,
    /// Token to present as `?token=` when reconnecting.
    pub resume_token: Uuid,
}

/// A committed move as clients see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveNotice {
    /// The move as its sender submitted it.
    #[serde(flatten)]
    pub requested: MoveRequest,
    /// The move in standard algebraic notation.
    pub san: String,
    /// The side to move is in check.
    pub check: bool,
}

/// End-of-game details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEndNotice {
    /// How the game ended.
    #[serde(rename = "type")]
    pub kind: &'static str,
    /// The side whose action ended the game, if any.
    pub player: Option<Side>,
    /// The winning side, absent on a draw.
    pub winner: Option<Side>,
}

/// Names the side behind a draw-handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DrawNotice {
    /// The acting side.
    pub player: Side,
}

/// Frames the server sends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Unicast: the connection holds a seat.
    CurrentPlayer(SeatGrant),
    /// Unicast: the connection is a spectator.
    SpectatorView,
    /// Who is at the board.
    UpdatePlayers(Roster),
    /// The move just played.
    Move(MoveNotice),
    /// Current position in FEN.
    BoardPosition(String),
    /// Side to move.
    CurrentTurn(Side),
    /// Unicast: the submitted move was refused.
    WrongMove {
        /// The move payload as received.
        #[serde(rename = "move")]
        requested: Value,
        /// Rejection code.
        reason: String,
    },
    /// Unicast: the frame or command was refused.
    InvalidGameState {
        /// Rejection code.
        reason: String,
    },
    /// The winning side.
    PlayerWon(Side),
    /// The game ended.
    GameEnd(GameEndNotice),
    /// A draw was offered.
    DrawOffer(DrawNotice),
    /// A draw offer was declined.
    DrawDeclined(DrawNotice),
    /// A draw offer lapsed.
    DrawCancelled(DrawNotice),
    /// Play paused waiting for a vacated seat.
    GameSuspended,
}

impl ServerMessage {
    /// The frame's event name.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::CurrentPlayer(_) => "currentPlayer",
            Self::SpectatorView => "spectatorView",
            Self::UpdatePlayers(_) => "updatePlayers",
            Self::Move(_) => "move",
            Self::BoardPosition(_) => "boardPosition",
            Self::CurrentTurn(_) => "currentTurn",
            Self::WrongMove { .. } => "wrongMove",
            Self::InvalidGameState { .. } => "invalidGameState",
            Self::PlayerWon(_) => "playerWon",
            Self::GameEnd(_) => "gameEnd",
            Self::DrawOffer(_) => "drawOffer",
            Self::DrawDeclined(_) => "drawDeclined",
            Self::DrawCancelled(_) => "drawCancelled",
            Self::GameSuspended => "gameSuspended",
        }
    }

    /// Renders the frame as JSON text.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
