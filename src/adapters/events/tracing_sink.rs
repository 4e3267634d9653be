//! Event sink that turns cycle events into structured log lines.

use crate::domain::cycle::{CycleEvent, CycleEventKind, ResetReason};
use crate::ports::CycleEventSink;

/// Default subscriber: one `tracing` event per cycle event.
///
/// Severity follows the event: corruption and ratio mismatches are
/// errors, non-rollover resets are warnings, deviations are debug noise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl TracingEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl CycleEventSink for TracingEventSink {
    fn emit(&self, event: &CycleEvent) {
        let entity_id = &event.entity_id;
        let event_id = &event.event_id;

        match &event.kind {
            CycleEventKind::CycleCreated {
                cycle_length,
                target_wins,
            } => {
                tracing::debug!(
                    %entity_id,
                    %event_id,
                    cycle_length,
                    target_wins,
                    "cycle_created"
                );
            }
            CycleEventKind::CycleReset { reason } => match reason {
                ResetReason::Rollover => {
                    tracing::debug!(%entity_id, %event_id, ?reason, "cycle_reset");
                }
                ResetReason::Corruption | ResetReason::Administrative => {
                    tracing::warn!(%entity_id, %event_id, ?reason, "cycle_reset");
                }
            },
            CycleEventKind::CorruptionDetected { corruption, detail } => {
                tracing::error!(
                    %entity_id,
                    %event_id,
                    corruption = %corruption,
                    detail = %detail,
                    "corruption_detected"
                );
            }
            CycleEventKind::CycleCompleted {
                cycle_number,
                wins,
                losses,
                deviations,
                ratio_held,
            } => {
                if *ratio_held {
                    tracing::info!(
                        %entity_id,
                        %event_id,
                        cycle_number,
                        wins,
                        losses,
                        deviations,
                        "cycle_completed"
                    );
                } else {
                    tracing::error!(
                        %entity_id,
                        %event_id,
                        cycle_number,
                        wins,
                        losses,
                        deviations,
                        "cycle_completed with broken ratio"
                    );
                }
            }
            CycleEventKind::DeviationRecorded {
                slot,
                expected,
                realized,
            } => {
                tracing::debug!(
                    %entity_id,
                    %event_id,
                    slot,
                    expected = ?expected,
                    realized = %realized,
                    "deviation_recorded"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::Outcome;
    use crate::domain::foundation::{EntityId, Timestamp};

    #[test]
    fn emits_every_kind_without_a_subscriber() {
        let sink = TracingEventSink::new();
        let entity = EntityId::new("user-1").unwrap();
        let kinds = vec![
            CycleEventKind::CycleCreated {
                cycle_length: 12,
                target_wins: 5,
            },
            CycleEventKind::CycleReset {
                reason: ResetReason::Corruption,
            },
            CycleEventKind::CorruptionDetected {
                corruption: "too_many_wins".to_string(),
                detail: "Realized wins 6 exceed target 5".to_string(),
            },
            CycleEventKind::CycleCompleted {
                cycle_number: 1,
                wins: 5,
                losses: 7,
                deviations: 0,
                ratio_held: true,
            },
            CycleEventKind::DeviationRecorded {
                slot: 0,
                expected: Some(Outcome::Win),
                realized: Outcome::Lose,
            },
        ];

        for kind in kinds {
            sink.emit(&CycleEvent::new(
                entity.clone(),
                Timestamp::from_unix_millis(0),
                kind,
            ));
        }
    }
}
