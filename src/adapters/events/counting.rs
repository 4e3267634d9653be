//! Event sink that keeps running totals instead of the events themselves.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::domain::cycle::{CycleEvent, CycleEventKind, ResetReason};
use crate::ports::CycleEventSink;

/// Totals observed by a [`CountingEventSink`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub cycles_created: u64,
    pub cycles_completed: u64,
    pub broken_ratios: u64,
    pub corruptions: u64,
    pub administrative_resets: u64,
    pub deviations: u64,
}

/// Constant-memory sink for long runs.
#[derive(Debug, Default)]
pub struct CountingEventSink {
    cycles_created: AtomicU64,
    cycles_completed: AtomicU64,
    broken_ratios: AtomicU64,
    corruptions: AtomicU64,
    administrative_resets: AtomicU64,
    deviations: AtomicU64,
}

impl CountingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> EventCounts {
        EventCounts {
            cycles_created: self.cycles_created.load(Ordering::Relaxed),
            cycles_completed: self.cycles_completed.load(Ordering::Relaxed),
            broken_ratios: self.broken_ratios.load(Ordering::Relaxed),
            corruptions: self.corruptions.load(Ordering::Relaxed),
            administrative_resets: self.administrative_resets.load(Ordering::Relaxed),
            deviations: self.deviations.load(Ordering::Relaxed),
        }
    }
}

impl CycleEventSink for CountingEventSink {
    fn emit(&self, event: &CycleEvent) {
        let counter = match &event.kind {
            CycleEventKind::CycleCreated { .. } => &self.cycles_created,
            CycleEventKind::CycleCompleted { ratio_held, .. } => {
                if !ratio_held {
                    self.broken_ratios.fetch_add(1, Ordering::Relaxed);
                }
                &self.cycles_completed
            }
            CycleEventKind::CorruptionDetected { .. } => &self.corruptions,
            CycleEventKind::CycleReset {
                reason: ResetReason::Administrative,
            } => &self.administrative_resets,
            // Rollover and corruption resets are counted through their causes.
            CycleEventKind::CycleReset { .. } => return,
            CycleEventKind::DeviationRecorded { .. } => &self.deviations,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}
