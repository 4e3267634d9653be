//! Cycle module - Per-entity outcome cycles with an exact win ratio.
//!
//! A cycle is N outcome slots of which exactly W are wins. Each tracked
//! entity owns one [`CycleRecord`]: a shuffled pattern, a position, and
//! the history of realized outcomes.
//!
//! - `pattern` - shuffled pattern generation with fail-closed fallback
//! - `record` - the record itself and its snapshots
//! - `validator` - structural checks and reset-on-corruption repair
//! - `resolver` - candidate-plus-overrides decision for the next slot
//! - `events` - typed events for observability subscribers

mod errors;
mod events;
mod outcome;
pub mod pattern;
mod record;
pub mod resolver;
pub mod validator;

pub use errors::CommitError;
pub use events::{CycleEvent, CycleEventKind, ResetReason};
pub use outcome::{CycleQuota, Outcome};
pub use record::{Adherence, AppendOutcome, CycleRecord, CycleState, CycleSummary, Remaining};
pub use resolver::{Override, Resolution};
pub use validator::Corruption;
