//! Scripted rules oracle: replays canned verdicts.

use std::collections::VecDeque;
use std::sync::Mutex;

use rookery_rules::{AppliedMove, BoardState, MoveRequest, MoveVerdict, RulesOracle, Side};

/// A `RulesOracle` that ignores chess entirely.
///
/// Each `try_apply` call pops the next scripted verdict; once the script is
/// exhausted every move is illegal. Lets session tests drive terminal flags
/// without constructing real positions.
#[derive(Debug)]
pub struct ScriptedOracle {
    initial: BoardState,
    script: Mutex<VecDeque<MoveVerdict>>,
    calls: Mutex<Vec<MoveRequest>>,
}

impl ScriptedOracle {
    /// Creates an oracle starting from `initial` that answers with `script`
    /// in order.
    #[must_use]
    pub fn new(initial: BoardState, script: Vec<MoveVerdict>) -> Self {
        Self {
            initial,
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A legal, non-terminal move producing a position labelled `label`
    /// with `next` to move.
    #[must_use]
    pub fn quiet(label: &str, next: Side) -> MoveVerdict {
        MoveVerdict::Applied(AppliedMove {
            state: BoardState::new(label, next),
            san: label.to_owned(),
            is_check: false,
            is_checkmate: false,
            is_stalemate: false,
            is_insufficient_material: false,
            is_fifty_move_draw: false,
        })
    }

    /// A legal move that stalemates `next`.
    #[must_use]
    pub fn stalemating(label: &str, next: Side) -> MoveVerdict {
        match Self::quiet(label, next) {
            MoveVerdict::Applied(mut applied) => {
                applied.is_stalemate = true;
                MoveVerdict::Applied(applied)
            }
            illegal @ MoveVerdict::Illegal { .. } => illegal,
        }
    }

    /// An illegal-move verdict.
    #[must_use]
    pub fn illegal() -> MoveVerdict {
        MoveVerdict::Illegal {
            reason: "scripted".to_owned(),
        }
    }

    /// Every move the oracle has been asked about, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<MoveRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl RulesOracle for ScriptedOracle {
    fn initial_state(&self) -> BoardState {
        self.initial.clone()
    }

    fn try_apply(&self, _state: &BoardState, mv: &MoveRequest) -> MoveVerdict {
        self.calls.lock().unwrap().push(mv.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(Self::illegal)
    }
}
