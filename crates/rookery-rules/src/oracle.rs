//! The rules-oracle boundary consumed by the session core.

use serde::{Deserialize, Serialize};

use crate::moves::MoveRequest;
use crate::side::Side;

/// Opaque, oracle-owned board snapshot.
///
/// The session core stores and broadcasts it but never interprets it; only
/// the oracle that produced it reads the position back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    fen: String,
    turn: Side,
}

impl BoardState {
    /// Builds a snapshot. Intended for [`RulesOracle`] implementations.
    #[must_use]
    pub fn new(fen: impl Into<String>, turn: Side) -> Self {
        Self {
            fen: fen.into(),
            turn,
        }
    }

    /// The position in Forsyth–Edwards Notation, as shipped to clients.
    #[must_use]
    pub fn fen(&self) -> &str {
        &self.fen
    }

    /// Side to move in this position.
    #[must_use]
    pub const fn turn(&self) -> Side {
        self.turn
    }

    /// Identity of the position for repetition counting.
    ///
    /// Two states share a key when placement, side to move, castling rights
    /// and en passant square agree; the move counters are ignored.
    #[must_use]
    pub fn repetition_key(&self) -> &str {
        match self.fen.match_indices(' ').nth(3) {
            Some((end, _)) => &self.fen[..end],
            None => &self.fen,
        }
    }
}

/// A legal move after it has been played.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// The resulting position.
    pub state: BoardState,
    /// The move in standard algebraic notation.
    pub san: String,
    /// The side now to move is in check.
    pub is_check: bool,
    /// The side now to move is checkmated.
    pub is_checkmate: bool,
    /// The side now to move has no legal move and is not in check.
    pub is_stalemate: bool,
    /// Neither side can deliver mate.
    pub is_insufficient_material: bool,
    /// A hundred half-moves have passed without a capture or pawn move.
    pub is_fifty_move_draw: bool,
}

impl AppliedMove {
    /// Returns true if the resulting position ends the game on its own.
    /// Repetition needs the game history and is judged by the caller.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.is_checkmate
            || self.is_stalemate
            || self.is_insufficient_material
            || self.is_fifty_move_draw
    }
}

/// Outcome of [`RulesOracle::try_apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveVerdict {
    /// The move was legal and has been played on a copy of the state.
    Applied(AppliedMove),
    /// The move was illegal or could not be parsed.
    Illegal {
        /// Diagnostic for logs; never sent to clients verbatim.
        reason: String,
    },
}

/// External rules engine. The only calls the session core makes into chess
/// rules go through this trait.
pub trait RulesOracle: Send + Sync {
    /// The position a fresh game starts from.
    fn initial_state(&self) -> BoardState;

    /// Checks `mv` against `state` and returns the resulting position if it
    /// is legal. Malformed input yields [`MoveVerdict::Illegal`]; this never
    /// panics.
    fn try_apply(&self, state: &BoardState, mv: &MoveRequest) -> MoveVerdict;

    /// Side to move in `state`.
    fn current_turn_side(&self, state: &BoardState) -> Side {
        state.turn()
    }
}
