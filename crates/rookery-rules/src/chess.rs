//! Chess rules backed by shakmaty.

use rookery_core::error::DomainError;
use shakmaty::{
    CastlingMode, Chess, EnPassantMode, Move, Position, fen::Fen, san::San, uci::UciMove,
};
use tracing::{debug, error};

use crate::moves::MoveRequest;
use crate::oracle::{AppliedMove, BoardState, MoveVerdict, RulesOracle};

/// Half-moves without a capture or pawn move that draw the game.
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Standard chess via shakmaty.
///
/// Positions travel as FEN inside [`BoardState`] and are re-parsed on every
/// call, so the oracle itself holds nothing but the starting position.
#[derive(Debug, Clone)]
pub struct ShakmatyOracle {
    start: Chess,
}

impl ShakmatyOracle {
    /// An oracle whose games start from the standard initial position.
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Chess::default(),
        }
    }

    /// An oracle whose games start from a custom position.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the FEN does not parse or does not
    /// describe a legal standard-chess position.
    pub fn from_fen(fen: &str) -> Result<Self, DomainError> {
        Ok(Self {
            start: parse_position(fen)?,
        })
    }
}

impl Default for ShakmatyOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesOracle for ShakmatyOracle {
    fn initial_state(&self) -> BoardState {
        snapshot(&self.start)
    }

    fn try_apply(&self, state: &BoardState, mv: &MoveRequest) -> MoveVerdict {
        let position = match parse_position(state.fen()) {
            Ok(position) => position,
            Err(e) => {
                error!(fen = state.fen(), error = %e, "board state is not a valid position");
                return MoveVerdict::Illegal {
                    reason: e.to_string(),
                };
            }
        };

        let Some(m) = resolve_move(&position, mv) else {
            debug!(%mv, "move rejected by rules");
            return MoveVerdict::Illegal {
                reason: format!("illegal move: {mv}"),
            };
        };

        // SAN depends on the position before the move.
        let san = San::from_move(&position, &m).to_string();

        let next = match position.play(&m) {
            Ok(next) => next,
            Err(_) => {
                return MoveVerdict::Illegal {
                    reason: format!("illegal move: {mv}"),
                };
            }
        };

        MoveVerdict::Applied(AppliedMove {
            state: snapshot(&next),
            san,
            is_check: next.is_check(),
            is_checkmate: next.is_checkmate(),
            is_stalemate: next.is_stalemate(),
            is_insufficient_material: next.is_insufficient_material(),
            is_fifty_move_draw: next.halfmoves() >= FIFTY_MOVE_HALFMOVES,
        })
    }
}

fn parse_position(fen: &str) -> Result<Chess, DomainError> {
    let fen: Fen = fen
        .parse()
        .map_err(|e| DomainError::Validation(format!("invalid FEN: {e}")))?;
    fen.into_position(CastlingMode::Standard)
        .map_err(|e| DomainError::Validation(format!("invalid position: {e}")))
}

fn snapshot(position: &Chess) -> BoardState {
    let fen = Fen::from_position(position.clone(), EnPassantMode::Legal).to_string();
    BoardState::new(fen, position.turn().into())
}

/// Maps a client move onto a legal move.
///
/// Browser clients attach a promotion letter to every drag, so a promotion on
/// a non-promoting move is ignored; a pawn reaching the last rank without one
/// promotes to a queen.
fn resolve_move(position: &Chess, mv: &MoveRequest) -> Option<Move> {
    if let Some(m) = legal_from_uci(position, &mv.to_uci()) {
        return Some(m);
    }

    let fallback = match mv.promotion {
        Some(_) => MoveRequest {
            promotion: None,
            ..mv.clone()
        },
        None => mv.clone().with_promotion("q"),
    };
    legal_from_uci(position, &fallback.to_uci())
}

fn legal_from_uci(position: &Chess, uci: &str) -> Option<Move> {
    let parsed: UciMove = uci.parse().ok()?;
    let m = parsed.to_move(position).ok()?;
    position.is_legal(&m).then_some(m)
}
