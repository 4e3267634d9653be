//! Clock port - Injectable wall clock.
//!
//! Eviction decisions compare activity timestamps against "now"; routing
//! that through a port lets idle-expiry be tested without sleeping.

use crate::domain::foundation::Timestamp;

/// Port for reading the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}
