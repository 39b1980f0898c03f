//! Producer/consumer handoff primitives.

pub mod slot;

pub use slot::{LatestSlot, PutOutcome};
