use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::guard::ContestGuard;
use crate::domain::OutputUnit;
use crate::services::TrackerMetrics;
use crate::traits::ContentSink;

/// How a unit sequence ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    Completed { emitted: usize },
    /// Contest switched; `skipped` units were never handed to the sink
    Aborted { emitted: usize, skipped: usize },
}

impl EmitOutcome {
    pub fn emitted(&self) -> usize {
        match *self {
            EmitOutcome::Completed { emitted } | EmitOutcome::Aborted { emitted, .. } => emitted,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, EmitOutcome::Aborted { .. })
    }
}

/// Writes units through the sink, pausing and re-checking the contest
/// pointer between units.
///
/// A unit already handed to the sink is never recalled; only the next
/// scheduled unit can be skipped.
pub struct SequenceEmitter {
    sink: Arc<dyn ContentSink>,
    metrics: Arc<TrackerMetrics>,
}

impl SequenceEmitter {
    pub fn new(sink: Arc<dyn ContentSink>, metrics: Arc<TrackerMetrics>) -> Self {
        Self { sink, metrics }
    }

    /// Hand one unit to the sink. Failures are logged and absorbed.
    pub async fn emit_one(&self, unit: &OutputUnit, contest_id: &str) -> bool {
        self.metrics.inc_units_emitted();
        match self.sink.deliver(unit).await {
            Ok(()) => {
                debug!(contest_id, unit = %unit, "unit delivered");
                true
            }
            Err(e) => {
                self.metrics.inc_sink_failures();
                warn!(contest_id, kind = %e.kind(), error = %e, "unit delivery failed");
                false
            }
        }
    }

    /// Sleep for `pause`, then confirm the contest is still selected
    pub async fn checkpoint(&self, guard: &ContestGuard, pause: Duration) -> bool {
        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
        guard.still_active().await
    }

    /// Emit `units` in order with a checkpoint between consecutive units
    pub async fn emit_sequence(
        &self,
        units: &[OutputUnit],
        guard: &ContestGuard,
        pause: Duration,
    ) -> EmitOutcome {
        let contest_id = guard.contest_id().as_str();

        for (idx, unit) in units.iter().enumerate() {
            if idx > 0 && !self.checkpoint(guard, pause).await {
                let skipped = units.len() - idx;
                self.metrics.inc_sequences_aborted();
                info!(contest_id, emitted = idx, skipped, "sequence aborted");
                return EmitOutcome::Aborted {
                    emitted: idx,
                    skipped,
                };
            }
            self.emit_one(unit, contest_id).await;
        }

        EmitOutcome::Completed {
            emitted: units.len(),
        }
    }
}
