//! Application layer - Services and command handlers.
//!
//! This layer wires the cycle domain to its ports:
//!
//! - `cycle_store` - Per-entity record ownership and locking
//! - `eviction` - Idle and capacity victim selection
//! - `engine` - The caller-facing `OutcomeEngine`
//! - `sweeper` - Background periodic eviction
//! - `round_locks` - Per-entity serialization of play rounds
//! - `handlers` - Play round command handler

pub mod cycle_store;
pub mod engine;
pub mod eviction;
pub mod handlers;
pub mod round_locks;
pub mod sweeper;

pub use cycle_store::{CycleStore, StoreStats};
pub use engine::{CommitReceipt, EngineStats, OutcomeEngine};
pub use eviction::{ActivityEntry, EvictionPlan, EvictionPolicy, SweepReport};
pub use handlers::{PlayCommand, PlayError, PlayHandler, PlayResult};
pub use round_locks::{RoundLocks, RoundTurn};
pub use sweeper::{EvictionSweeper, SweeperHandle};
