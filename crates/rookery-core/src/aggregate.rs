//! Aggregate root abstraction.

use uuid::Uuid;

use crate::event::DomainEvent;

/// Trait for aggregate roots whose state is the fold of their event stream.
///
/// Aggregates in Rookery live in memory for the lifetime of the process, so
/// command methods apply each event as soon as it is recorded and keep it in
/// the uncommitted buffer until the caller drains it for broadcasting.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> Uuid;

    /// Returns the current version (number of events applied).
    fn version(&self) -> i64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events recorded since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after they have been published.
    fn clear_uncommitted_events(&mut self);
}
