//! The poll loop.
//!
//! read pointer → fetch snapshot → classify → phase handler → sleep, forever.
//! Every failure is absorbed here; the loop never exits on its own.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::differ::ScoringPlayDiffer;
use super::emitter::{EmitOutcome, SequenceEmitter};
use super::guard::ContestGuard;
use super::phase::PhaseClassifier;
use super::render::{self, Teams};
use crate::config::Timing;
use crate::domain::{
    ContestPointer, GamePhase, GameSnapshot, OutputUnit, PhaseChange, TrackerState,
};
use crate::error::{FailureKind, Result};
use crate::services::TrackerMetrics;
use crate::traits::{BundleFormatter, ContentSink, ContestSource, FeedClient};

/// Log a metrics summary every this many cycles
const STATUS_EVERY_CYCLES: u64 = 60;

/// What one poll cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Contest pointer unreadable; nothing emitted
    ContestUnavailable,
    /// No snapshot; placeholder unit emitted
    FetchFailed,
    /// Nothing to say this cycle
    Idle(GamePhase),
    Emitted { phase: GamePhase, units: usize },
    /// Contest switched mid-sequence; restart from the top
    Aborted { phase: GamePhase, units: usize },
}

impl CycleOutcome {
    /// Sleep before the next cycle
    pub fn backoff(&self, timing: &Timing) -> Duration {
        match self {
            CycleOutcome::ContestUnavailable => timing.contest_backoff,
            CycleOutcome::FetchFailed => timing.fetch_failure_backoff,
            CycleOutcome::Aborted { .. } => Duration::ZERO,
            CycleOutcome::Idle(_) | CycleOutcome::Emitted { .. } => timing.poll_interval,
        }
    }

    fn from_emit(phase: GamePhase, outcome: EmitOutcome, already: usize) -> Self {
        let units = already + outcome.emitted();
        if outcome.is_aborted() {
            CycleOutcome::Aborted { phase, units }
        } else if units == 0 {
            CycleOutcome::Idle(phase)
        } else {
            CycleOutcome::Emitted { phase, units }
        }
    }
}

/// Single-contest live tracker
pub struct GameTracker {
    contests: Arc<dyn ContestSource>,
    feed: Arc<dyn FeedClient>,
    formatter: Arc<dyn BundleFormatter>,
    emitter: SequenceEmitter,
    classifier: PhaseClassifier,
    timing: Timing,
    timezone_label: String,
    state: TrackerState,
    metrics: Arc<TrackerMetrics>,
}

impl GameTracker {
    pub fn new(
        contests: Arc<dyn ContestSource>,
        feed: Arc<dyn FeedClient>,
        formatter: Arc<dyn BundleFormatter>,
        sink: Arc<dyn ContentSink>,
        classifier: PhaseClassifier,
        timing: Timing,
    ) -> Self {
        let metrics = Arc::new(TrackerMetrics::new());
        Self {
            contests,
            feed,
            formatter,
            emitter: SequenceEmitter::new(sink, metrics.clone()),
            classifier,
            timing,
            timezone_label: "EST".to_string(),
            state: TrackerState::new(),
            metrics,
        }
    }

    pub fn with_timezone_label(mut self, label: impl Into<String>) -> Self {
        self.timezone_label = label.into();
        self
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn metrics(&self) -> Arc<TrackerMetrics> {
        self.metrics.clone()
    }

    /// Run forever
    pub async fn run(&mut self) {
        info!("game tracker started");
        loop {
            let wait = match self.run_cycle().await {
                Ok(outcome) => {
                    debug!(?outcome, "cycle finished");
                    outcome.backoff(&self.timing)
                }
                Err(e) => {
                    error!(kind = %e.kind(), error = %e, "cycle failed");
                    self.timing.error_backoff
                }
            };

            if self.metrics.cycles.load(std::sync::atomic::Ordering::Relaxed)
                % STATUS_EVERY_CYCLES
                == 0
            {
                self.metrics.log_status().await;
            }

            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
        }
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            _ = self.run() => {}
            _ = shutdown => {
                info!("shutdown requested, stopping game tracker");
            }
        }
        self.metrics.log_status().await;
    }

    /// One full poll cycle
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        self.metrics.inc_cycles();

        let pointer = match self.contests.current().await {
            Ok(pointer) => pointer,
            Err(e) => {
                warn!(kind = %FailureKind::ConfigUnavailable, error = %e, "contest pointer unavailable");
                return Ok(CycleOutcome::ContestUnavailable);
            }
        };
        let contest_id = pointer.contest_id.clone();

        let previous = self.state.contest_id().cloned();
        if self.state.observe_contest(&contest_id) {
            if previous.is_some() {
                self.metrics.inc_contest_switches();
            }
            info!(
                contest_id = %contest_id,
                previous = ?previous.as_ref().map(|c| c.as_str()),
                "tracking contest"
            );
        }

        let snapshot = match self.feed.fetch(&contest_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.metrics.inc_fetch_failures();
                warn!(contest_id = %contest_id, kind = %FailureKind::FetchFailure, error = %e, "feed fetch failed");
                let unit = render::fetch_failure_unit(&pointer)?;
                self.emitter.emit_one(&unit, contest_id.as_str()).await;
                return Ok(CycleOutcome::FetchFailed);
            }
        };

        if let Some(text) = snapshot.error_text.as_deref() {
            debug!(contest_id = %contest_id, kind = %FailureKind::ProviderSignal, error_text = text, "feed error text");
        }

        let reported = self.classifier.classify(&snapshot);

        // Provider error with no box score: no output, and no phase move so a
        // later "not started" report can still bring the status line back
        if reported == GamePhase::InProgress && snapshot.is_degenerate() {
            debug!(contest_id = %contest_id, phase = %self.state.phase(), "empty snapshot, phase held");
            return Ok(CycleOutcome::Idle(self.state.phase()));
        }

        let change = self.state.advance_phase(reported);
        match change {
            PhaseChange::Entered { from, to } => {
                info!(contest_id = %contest_id, %from, %to, "phase transition");
            }
            PhaseChange::Regressed { held, reported } => {
                warn!(contest_id = %contest_id, %held, %reported, "ignoring backwards phase report");
            }
            PhaseChange::Unchanged(_) => {}
        }

        let phase = change.effective();
        self.metrics.set_phase(phase).await;

        let guard = ContestGuard::new(self.contests.clone(), contest_id);
        match phase {
            GamePhase::Scheduled => self.handle_scheduled(&pointer, &guard).await,
            GamePhase::InProgress => self.handle_in_progress(&pointer, &snapshot, &guard).await,
            GamePhase::Final => {
                if self.state.final_pending() {
                    self.handle_final(&pointer, &snapshot, &guard).await
                } else {
                    Ok(CycleOutcome::Idle(GamePhase::Final))
                }
            }
        }
    }

    /// Status line, then the pre-game bundle one block per unit
    async fn handle_scheduled(
        &mut self,
        pointer: &ContestPointer,
        guard: &ContestGuard,
    ) -> Result<CycleOutcome> {
        let phase = GamePhase::Scheduled;
        let contest_id = guard.contest_id();

        let status = render::not_started_unit(pointer, &self.timezone_label)?;
        self.emitter.emit_one(&status, contest_id.as_str()).await;

        if !pointer.pregame_stats_enabled {
            return Ok(CycleOutcome::Emitted { phase, units: 1 });
        }

        if !self.emitter.checkpoint(guard, self.timing.unit_pause).await {
            self.metrics.inc_sequences_aborted();
            return Ok(CycleOutcome::Aborted { phase, units: 1 });
        }

        let units = match self.formatter.pregame_bundle(contest_id).await {
            Ok(blocks) => blocks_to_units(&blocks, contest_id.as_str()),
            Err(e) => {
                warn!(contest_id = %contest_id, kind = %e.kind(), error = %e, "pre-game bundle skipped");
                return Ok(CycleOutcome::Emitted { phase, units: 1 });
            }
        };

        let outcome = self
            .emitter
            .emit_sequence(&units, guard, self.timing.unit_pause)
            .await;
        Ok(CycleOutcome::from_emit(phase, outcome, 1))
    }

    /// Scoring bundle on a new scoring play, otherwise the live play
    async fn handle_in_progress(
        &mut self,
        pointer: &ContestPointer,
        snapshot: &GameSnapshot,
        guard: &ContestGuard,
    ) -> Result<CycleOutcome> {
        let phase = GamePhase::InProgress;
        let contest_id = guard.contest_id();

        let diff = ScoringPlayDiffer::diff(snapshot, &self.state);
        self.state.record_scoring_play(diff.latest.clone());

        if diff.changed {
            if let Some(play) = diff.latest.as_ref() {
                self.metrics.inc_scoring_events();
                info!(
                    contest_id = %contest_id,
                    team = play.team.as_deref().unwrap_or("-"),
                    score_type = play.score_type.as_deref().unwrap_or("-"),
                    "new scoring play"
                );
                let units = [
                    render::scoring_summary_unit(play)?,
                    render::drive_summary_unit(play)?,
                ];
                let outcome = self
                    .emitter
                    .emit_sequence(&units, guard, self.timing.drive_pause)
                    .await;
                return Ok(CycleOutcome::from_emit(phase, outcome, 0));
            }
        }

        let Some(play) = snapshot.latest_play.as_ref() else {
            debug!(contest_id = %contest_id, "no play-by-play this cycle");
            return Ok(CycleOutcome::Idle(phase));
        };

        let teams = Teams::resolve(snapshot, pointer);
        let unit = render::live_play_unit(&teams, snapshot, play)?;
        self.emitter.emit_one(&unit, contest_id.as_str()).await;
        Ok(CycleOutcome::Emitted { phase, units: 1 })
    }

    /// One-shot terminal sequence: home line, away line, scoring recap,
    /// post-game bundle. A failed guard check between stages drops the rest;
    /// the sequence only counts as delivered once it runs to the end, so an
    /// unreadable pointer means a full retry on the next cycle.
    async fn handle_final(
        &mut self,
        pointer: &ContestPointer,
        snapshot: &GameSnapshot,
        guard: &ContestGuard,
    ) -> Result<CycleOutcome> {
        let phase = GamePhase::Final;
        let contest_id = guard.contest_id();
        let pause = self.timing.unit_pause;
        let teams = Teams::resolve(snapshot, pointer);

        let (home, away) = render::final_units(&teams, snapshot)?;
        let recap = render::postgame_scoring_units(&teams, snapshot)?;

        // Stage 1: home quarter detail
        self.emitter.emit_one(&home, contest_id.as_str()).await;
        let mut units = 1;
        if !self.emitter.checkpoint(guard, pause).await {
            self.metrics.inc_sequences_aborted();
            return Ok(CycleOutcome::Aborted { phase, units });
        }

        // Stage 2: away quarter detail
        self.emitter.emit_one(&away, contest_id.as_str()).await;
        units += 1;
        if !self.emitter.checkpoint(guard, pause).await {
            self.metrics.inc_sequences_aborted();
            return Ok(CycleOutcome::Aborted { phase, units });
        }

        // Stage 3: scoring recap
        let outcome = self.emitter.emit_sequence(&recap, guard, pause).await;
        units += outcome.emitted();
        if outcome.is_aborted() {
            return Ok(CycleOutcome::Aborted { phase, units });
        }
        if !self.emitter.checkpoint(guard, pause).await {
            self.metrics.inc_sequences_aborted();
            return Ok(CycleOutcome::Aborted { phase, units });
        }

        // Stage 4: post-game statistics
        let stats = match self.formatter.postgame_bundle(contest_id).await {
            Ok(blocks) => blocks_to_units(&blocks, contest_id.as_str()),
            Err(e) => {
                warn!(contest_id = %contest_id, kind = %e.kind(), error = %e, "post-game bundle skipped");
                Vec::new()
            }
        };
        let outcome = self.emitter.emit_sequence(&stats, guard, pause).await;
        if !outcome.is_aborted() {
            self.state.mark_final_delivered();
            info!(contest_id = %contest_id, "post-game sequence finished");
        }
        Ok(CycleOutcome::from_emit(phase, outcome, units))
    }
}

/// Formatter blocks to units; unusable blocks are dropped with a warning
fn blocks_to_units(blocks: &[String], contest_id: &str) -> Vec<OutputUnit> {
    blocks
        .iter()
        .filter_map(|block| match OutputUnit::from_block(block) {
            Ok(unit) => Some(unit),
            Err(e) => {
                warn!(contest_id, error = %e, "dropping formatter block");
                None
            }
        })
        .collect()
}
