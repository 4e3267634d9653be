//! Randomness adapters.
//!
//! - `ThreadRandom` - Thread-local generator from `rand`, used in production
//! - `ScriptedRandom` - Replays a fixed sequence for deterministic tests

mod scripted;
mod thread;

pub use scripted::ScriptedRandom;
pub use thread::ThreadRandom;
