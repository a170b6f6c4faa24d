//! Client move payloads.

use serde::{Deserialize, Serialize};

/// A move as submitted by a client: origin and target squares in algebraic
/// notation plus an optional promotion piece letter.
///
/// The payload is deliberately loose; the oracle decides what is a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Origin square, e.g. `"e2"`.
    pub from: String,
    /// Target square, e.g. `"e4"`.
    pub to: String,
    /// Promotion piece letter (`q`, `r`, `b`, `n`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

impl MoveRequest {
    /// Creates a move request without a promotion piece.
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            promotion: None,
        }
    }

    /// Sets the promotion piece letter.
    #[must_use]
    pub fn with_promotion(mut self, piece: impl Into<String>) -> Self {
        self.promotion = Some(piece.into());
        self
    }

    /// Renders the move in UCI long algebraic form, e.g. `e7e8q`.
    ///
    /// Squares and promotion are normalized to lowercase; an empty promotion
    /// is dropped.
    #[must_use]
    pub fn to_uci(&self) -> String {
        let mut uci = format!(
            "{}{}",
            self.from.trim().to_ascii_lowercase(),
            self.to.trim().to_ascii_lowercase()
        );
        if let Some(piece) = self.promotion.as_deref().map(str::trim) {
            uci.push_str(&piece.to_ascii_lowercase());
        }
        uci
    }
}

impl std::fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_uci())
    }
}
