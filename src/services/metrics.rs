use crate::domain::GamePhase;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::info;

/// Counters for the poll loop
pub struct TrackerMetrics {
    /// Poll cycles started
    pub cycles: AtomicU64,
    /// Units handed to the sink
    pub units_emitted: AtomicU64,
    /// Units the sink rejected
    pub sink_failures: AtomicU64,
    /// Sequences cut short by a contest switch
    pub sequences_aborted: AtomicU64,
    /// Polls that produced no snapshot
    pub fetch_failures: AtomicU64,
    /// New scoring events detected
    pub scoring_events: AtomicU64,
    /// Contest pointer changes observed
    pub contest_switches: AtomicU64,
    /// Current phase
    current_phase: RwLock<String>,
    /// Last update timestamp
    last_update: RwLock<i64>,
}

impl TrackerMetrics {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            units_emitted: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            sequences_aborted: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            scoring_events: AtomicU64::new(0),
            contest_switches: AtomicU64::new(0),
            current_phase: RwLock::new("NONE".to_string()),
            last_update: RwLock::new(Utc::now().timestamp()),
        }
    }

    pub fn inc_cycles(&self) -> u64 {
        self.cycles.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn inc_units_emitted(&self) {
        self.units_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_sequences_aborted(&self) {
        self.sequences_aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_fetch_failures(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_scoring_events(&self) {
        self.scoring_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_contest_switches(&self) {
        self.contest_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn set_phase(&self, phase: GamePhase) {
        *self.current_phase.write().await = phase.to_string();
        *self.last_update.write().await = Utc::now().timestamp();
    }

    /// Get current metrics as a formatted string
    pub async fn summary(&self) -> String {
        let phase = self.current_phase.read().await;
        let last_update = *self.last_update.read().await;

        format!(
            "phase={} cycles={} units={} sink_failures={} aborted={} fetch_failures={} scoring_events={} contest_switches={} last_update={}",
            phase,
            self.cycles.load(Ordering::Relaxed),
            self.units_emitted.load(Ordering::Relaxed),
            self.sink_failures.load(Ordering::Relaxed),
            self.sequences_aborted.load(Ordering::Relaxed),
            self.fetch_failures.load(Ordering::Relaxed),
            self.scoring_events.load(Ordering::Relaxed),
            self.contest_switches.load(Ordering::Relaxed),
            last_update,
        )
    }

    /// Log periodic status
    pub async fn log_status(&self) {
        info!("tracker status: {}", self.summary().await);
    }
}

impl Default for TrackerMetrics {
    fn default() -> Self {
        Self::new()
    }
}
