//! Shared test doubles for the Rookery chess relay.

mod clock;
mod oracle;
mod rng;

pub use clock::{FixedClock, fixed_now};
pub use oracle::ScriptedOracle;
pub use rng::{MockRng, SequenceRng};
