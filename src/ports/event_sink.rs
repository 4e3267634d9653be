//! CycleEventSink port - Observability hook for engine activity.
//!
//! The engine emits discrete, typed events (`cycle_created`,
//! `cycle_reset`, `corruption_detected`, `cycle_completed`,
//! `deviation_recorded`). Callers subscribe by providing a sink, or ignore
//! them entirely.
//!
//! Emission is synchronous and happens after the per-entity lock has been
//! released, so a slow sink delays only the calling request.

use crate::domain::cycle::CycleEvent;

/// Port for receiving engine events.
///
/// Implementations must not panic and must not call back into the engine
/// for the same entity from inside `emit`.
pub trait CycleEventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: &CycleEvent);

    /// Deliver several events in order.
    fn emit_all(&self, events: &[CycleEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
