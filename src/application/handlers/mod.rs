//! Application handlers.
//!
//! Command handlers that orchestrate the engine and the ledger.

mod play;

pub use play::{PlayCommand, PlayError, PlayHandler, PlayResult};
