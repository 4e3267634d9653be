//! Cycle events emitted to observability subscribers.

use serde::Serialize;

use crate::domain::foundation::{EntityId, EventId, Timestamp};

use super::Outcome;

/// Why a record's cycle was restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetReason {
    /// The previous cycle was complete and the next outcome was requested.
    Rollover,
    /// A structural check failed and the record was recreated.
    Corruption,
    /// An operator reset the entity.
    Administrative,
}

/// What happened, with the data specific to each event type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CycleEventKind {
    /// A record was created for a previously untracked entity.
    CycleCreated {
        cycle_length: usize,
        target_wins: usize,
    },

    /// A record started over.
    CycleReset { reason: ResetReason },

    /// A record failed a structural check.
    CorruptionDetected { corruption: String, detail: String },

    /// The last slot of a cycle was recorded.
    CycleCompleted {
        cycle_number: u64,
        wins: usize,
        losses: usize,
        deviations: usize,
        ratio_held: bool,
    },

    /// A recorded outcome differed from the pattern slot.
    DeviationRecorded {
        slot: usize,
        expected: Option<Outcome>,
        realized: Outcome,
    },
}

/// One event about one entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleEvent {
    pub event_id: EventId,
    pub entity_id: EntityId,
    pub occurred_at: Timestamp,
    #[serde(flatten)]
    pub kind: CycleEventKind,
}

impl CycleEvent {
    /// Creates an event with a fresh id.
    pub fn new(entity_id: EntityId, occurred_at: Timestamp, kind: CycleEventKind) -> Self {
        Self {
            event_id: EventId::new(),
            entity_id,
            occurred_at,
            kind,
        }
    }

    /// Returns the event type string used for routing and filtering.
    pub fn event_type(&self) -> &'static str {
        match self.kind {
            CycleEventKind::CycleCreated { .. } => "cycle_created",
            CycleEventKind::CycleReset { .. } => "cycle_reset",
            CycleEventKind::CorruptionDetected { .. } => "corruption_detected",
            CycleEventKind::CycleCompleted { .. } => "cycle_completed",
            CycleEventKind::DeviationRecorded { .. } => "deviation_recorded",
        }
    }
}
