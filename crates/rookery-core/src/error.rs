//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An aggregate was not found.
    #[error("aggregate not found: {0}")]
    AggregateNotFound(Uuid),

    /// A validation error in domain logic or configuration input.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/transport error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
