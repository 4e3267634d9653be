//! Fan-out sink delivering each event to several subscribers.

use std::sync::Arc;

use crate::domain::cycle::CycleEvent;
use crate::ports::CycleEventSink;

/// Delivers every event to each registered sink, in registration order.
#[derive(Default, Clone)]
pub struct FanoutEventSink {
    sinks: Vec<Arc<dyn CycleEventSink>>,
}

impl FanoutEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subscriber.
    pub fn with(mut self, sink: Arc<dyn CycleEventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Number of subscribers.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutEventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutEventSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl CycleEventSink for FanoutEventSink {
    fn emit(&self, event: &CycleEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
