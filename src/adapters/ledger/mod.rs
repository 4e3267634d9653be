//! Ledger adapters.
//!
//! - `InMemoryLedger` - Process-local accounts for tests and the soak binary

mod in_memory;

pub use in_memory::InMemoryLedger;
