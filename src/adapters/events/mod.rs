//! Cycle event sinks.
//!
//! - `TracingEventSink` - Structured log lines, the default subscriber
//! - `InMemoryEventSink` - Captures events for test assertions
//! - `FanoutEventSink` - Delivers each event to several sinks
//! - `CountingEventSink` - Running totals for long runs

mod counting;
mod fanout;
mod in_memory;
mod tracing_sink;

pub use counting::{CountingEventSink, EventCounts};
pub use fanout::FanoutEventSink;
pub use in_memory::InMemoryEventSink;
pub use tracing_sink::TracingEventSink;
