//! Outcome Cycle - Per-entity win/lose cycles with an exact ratio.
//!
//! Every tracked entity plays through cycles of N rounds of which exactly
//! W are wins, in an order that looks random locally. The engine repairs
//! corrupted state in place and bounds its memory with idle and capacity
//! eviction.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
