//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the engine and the outside world. Adapters implement these ports.
//!
//! ## Engine Ports
//!
//! - `RandomSource` - Injectable randomness (pattern shuffle, presentation draws)
//! - `Clock` - Injectable time (eviction bookkeeping)
//! - `CycleEventSink` - Subscriber for typed engine events
//!
//! ## Collaborator Ports
//!
//! - `Ledger` - External account balances adjusted by play results

mod clock;
mod event_sink;
mod ledger;
mod random_source;

pub use clock::Clock;
pub use event_sink::CycleEventSink;
pub use ledger::{Balance, Ledger};
pub use random_source::RandomSource;
