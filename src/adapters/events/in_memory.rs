//! In-memory event sink for testing.
//!
//! Captures every emitted event so tests can assert on what the engine
//! reported, in emission order.

use parking_lot::RwLock;

use crate::domain::cycle::CycleEvent;
use crate::domain::foundation::EntityId;
use crate::ports::CycleEventSink;

/// Event sink that records everything it receives.
///
/// # Example
///
/// ```ignore
/// let sink = Arc::new(InMemoryEventSink::new());
/// let engine = OutcomeEngine::new(quota, policy).with_event_sink(sink.clone());
///
/// engine.next_outcome(&id);
///
/// assert_eq!(sink.count(), 1);
/// assert!(sink.has_event("cycle_created"));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryEventSink {
    events: RwLock<Vec<CycleEvent>>,
}

impl InMemoryEventSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Returns all captured events.
    pub fn events(&self) -> Vec<CycleEvent> {
        self.events.read().clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<CycleEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type() == event_type)
            .cloned()
            .collect()
    }

    /// Returns events about one entity.
    pub fn events_for(&self, entity_id: &EntityId) -> Vec<CycleEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| &e.entity_id == entity_id)
            .cloned()
            .collect()
    }

    /// Checks if a specific event type was emitted.
    pub fn has_event(&self, event_type: &str) -> bool {
        self.events
            .read()
            .iter()
            .any(|e| e.event_type() == event_type)
    }

    /// Returns count of captured events.
    pub fn count(&self) -> usize {
        self.events.read().len()
    }

    /// Clears captured events (for test isolation).
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

impl CycleEventSink for InMemoryEventSink {
    fn emit(&self, event: &CycleEvent) {
        self.events.write().push(event.clone());
    }
}
