//! Domain layer containing the outcome-cycle logic and shared primitives.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `cycle` - Pattern generation, cycle records, validation and resolution
//! - `play` - Coin presentation for play rounds

pub mod cycle;
pub mod foundation;
pub mod play;
