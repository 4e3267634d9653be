//! Adapters - Implementations of port interfaces.
//!
//! - `random` - Thread-local and scripted random sources
//! - `clock` - System and manual clocks
//! - `events` - Cycle event sinks (tracing, in-memory, fan-out, counting)
//! - `ledger` - In-memory account store

pub mod clock;
pub mod events;
pub mod ledger;
pub mod random;

pub use clock::{ManualClock, SystemClock};
pub use events::{
    CountingEventSink, EventCounts, FanoutEventSink, InMemoryEventSink, TracingEventSink,
};
pub use ledger::InMemoryLedger;
pub use random::{ScriptedRandom, ThreadRandom};
