//! Draw Orchestrator — `Idle → Rolling → Revealing → Idle`
//!
//! Single-threaded and frame-driven: the host calls [`DrawOrchestrator::advance`]
//! once per display frame. The orchestrator keeps a virtual clock, steps the
//! rotation simulator and fires the pending reveal step when it comes due.
//! Every reveal schedules the next one from inside its own step, so reveals
//! are strictly serial.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use ld_stage::{DrawPhase, Stage, StageEvent, StagePayload, StageTrace};

use crate::config::EngineConfig;
use crate::dynamics::{DynamicsModel, DynamicsResult};
use crate::error::{DrawError, DrawResult};
use crate::ledger::{DrawRecord, InventoryLedger};
use crate::listener::StageListener;
use crate::participant::{Participant, ParticipantId, RevealMark, Winner};
use crate::pool::PoolSet;
use crate::rotation::{RotationSimulator, RotationState};
use crate::sampler::Sampler;
use crate::timer::{RevealTimer, TimerAction};

/// Result of a finished draw, for the result modal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub pool_id: String,
    pub pool_name: String,
    pub winners: Vec<Winner>,
    /// Grand-prize presentation
    pub headline: bool,
}

/// A draw between acceptance and commit
#[derive(Debug, Clone)]
struct ActiveDraw {
    pool_id: String,
    winners: Vec<Winner>,
    dynamics: DynamicsResult,
}

/// Draw Orchestrator
///
/// Owns the ledger, the candidate list and the sphere. Rejected requests
/// change nothing; they return a [`DrawError`] and emit a `Rejected` stage.
pub struct DrawOrchestrator {
    /// Validated, immutable configuration
    config: EngineConfig,
    /// Duration and friction per winner count
    dynamics: DynamicsModel,
    /// Pools and history
    ledger: InventoryLedger,
    /// Random source for winners and items
    sampler: Sampler,
    /// Sphere motion
    rotation: RotationSimulator,
    /// The one pending reveal step
    timer: RevealTimer,
    /// Virtual clock (ms since construction)
    clock_ms: f64,
    /// Participants as loaded
    roster: Vec<Participant>,
    /// Participants still eligible
    candidates: Vec<Participant>,
    phase: DrawPhase,
    selected_pool: Option<String>,
    active: Option<ActiveDraw>,
    last_outcome: Option<DrawOutcome>,
    listeners: Vec<Box<dyn StageListener>>,
    /// Events since the last accepted start
    trace: StageTrace,
    draw_seq: u64,
}

impl DrawOrchestrator {
    /// `config` is expected to have passed [`EngineConfig::validate`]
    pub fn new(config: EngineConfig, pools: PoolSet) -> Self {
        let rotation = RotationSimulator::new(config.physics.clone());
        Self {
            dynamics: DynamicsModel::new(&config),
            config,
            ledger: InventoryLedger::new(pools),
            sampler: Sampler::new(),
            rotation,
            timer: RevealTimer::new(),
            clock_ms: 0.0,
            roster: Vec::new(),
            candidates: Vec::new(),
            phase: DrawPhase::Idle,
            selected_pool: None,
            active: None,
            last_outcome: None,
            listeners: Vec::new(),
            trace: StageTrace::new("session"),
            draw_seq: 0,
        }
    }

    /// Builder: replace the random source
    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Builder: reproducible draws
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_sampler(Sampler::seeded(seed))
    }

    pub fn add_listener(&mut self, listener: Box<dyn StageListener>) {
        self.listeners.push(listener);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dynamics(&self) -> &DynamicsModel {
        &self.dynamics
    }

    pub fn phase(&self) -> DrawPhase {
        self.phase
    }

    pub fn now_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn ledger(&self) -> &InventoryLedger {
        &self.ledger
    }

    pub fn candidates(&self) -> &[Participant] {
        &self.candidates
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn selected_pool(&self) -> Option<&str> {
        self.selected_pool.as_deref()
    }

    /// Winners of the draw in progress, in reveal order
    pub fn winners(&self) -> &[Winner] {
        match &self.active {
            Some(active) => &active.winners,
            None => &[],
        }
    }

    /// Winners already on screen
    pub fn revealed_winners(&self) -> impl Iterator<Item = &Winner> {
        self.winners().iter().filter(|w| w.is_revealed())
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation.state()
    }

    pub fn last_outcome(&self) -> Option<&DrawOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn trace(&self) -> &StageTrace {
        &self.trace
    }

    pub fn pending_action(&self) -> Option<TimerAction> {
        self.timer.pending_action()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // COMMANDS
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace the participant list. Winners already in the history stay
    /// ineligible, and a repeated id keeps only its first entry.
    pub fn load_participants(&mut self, participants: Vec<Participant>) -> DrawResult<usize> {
        if self.phase.is_busy() {
            return Err(self.reject(DrawError::DrawInProgress));
        }
        let listed = participants.len();
        let mut seen = HashSet::new();
        self.roster = participants
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();
        if self.roster.len() < listed {
            log::warn!(
                "Dropped {} participant(s) with a repeated id",
                listed - self.roster.len()
            );
        }
        self.recompute_candidates();
        log::info!(
            "Loaded {} participants ({} eligible)",
            self.roster.len(),
            self.candidates.len()
        );
        Ok(self.candidates.len())
    }

    /// Rebuild pools and candidates from persisted history
    pub fn restore_history(&mut self, history: Vec<DrawRecord>) -> DrawResult<()> {
        if self.phase.is_busy() {
            return Err(self.reject(DrawError::DrawInProgress));
        }
        self.ledger.restore(history)?;
        self.recompute_candidates();
        Ok(())
    }

    pub fn select_pool(&mut self, pool_id: &str) -> DrawResult<()> {
        if self.phase.is_busy() {
            return Err(self.reject(DrawError::DrawInProgress));
        }
        let Some(pool) = self.ledger.pool(pool_id) else {
            return Err(self.reject(DrawError::UnknownPool(pool_id.to_string())));
        };
        let remaining = pool.remaining() as u32;

        self.selected_pool = Some(pool_id.to_string());
        log::info!("Selected pool '{}' ({} remaining)", pool_id, remaining);
        self.emit(
            Stage::PoolSelected {
                pool_id: pool_id.to_string(),
                remaining,
            },
            self.clock_ms,
        );
        Ok(())
    }

    /// Start a draw on the selected pool
    pub fn start_selected(&mut self, requested: usize) -> DrawResult<usize> {
        match self.selected_pool.clone() {
            Some(pool_id) => self.start(&pool_id, requested),
            None => Err(self.reject(DrawError::NoPoolSelected)),
        }
    }

    /// Accept or reject a draw request.
    ///
    /// On acceptance, returns how many winners will actually be revealed:
    /// `min(requested, remaining capacity, candidates)`.
    pub fn start(&mut self, pool_id: &str, requested: usize) -> DrawResult<usize> {
        if self.phase != DrawPhase::Idle {
            return Err(self.reject(DrawError::DrawInProgress));
        }
        let Some(pool) = self.ledger.pool(pool_id) else {
            return Err(self.reject(DrawError::UnknownPool(pool_id.to_string())));
        };
        let pool_name = pool.name.clone();
        let remaining = pool.remaining();

        if self.candidates.is_empty() {
            return Err(self.reject(DrawError::NoCandidates));
        }
        if requested == 0 {
            return Err(self.reject(DrawError::InvalidCount(requested)));
        }
        if remaining == 0 {
            return Err(self.reject(DrawError::PoolExhausted(pool_name)));
        }

        let actual = requested.min(remaining).min(self.candidates.len());
        let (selected, _) = self.sampler.sample_without_replacement(&self.candidates, actual);
        let items = self.sampler.shuffle(&self.ledger.remaining_items(pool_id));
        let winners: Vec<Winner> = selected
            .into_iter()
            .zip(items)
            .map(|(participant, item)| Winner::new(participant, item))
            .collect();
        debug_assert_eq!(winners.len(), actual);

        let dynamics = self.dynamics.dynamics(actual);
        self.draw_seq += 1;
        self.trace = StageTrace::new(format!("draw-{:06}", self.draw_seq))
            .with_metadata("pool_id", pool_id.into())
            .with_metadata("requested", requested.into());
        self.active = Some(ActiveDraw {
            pool_id: pool_id.to_string(),
            winners,
            dynamics,
        });
        self.last_outcome = None;

        self.rotation.accelerate();
        self.transition(DrawPhase::Rolling);
        log::info!(
            "Draw #{} on '{}': {} of {} requested, reveal {}ms, friction {:.5}",
            self.draw_seq,
            pool_id,
            actual,
            requested,
            dynamics.reveal_phase_duration_ms,
            dynamics.friction_coefficient
        );

        let candidates = self.candidates.len() as u32;
        self.emit_with(
            Stage::RollStart {
                pool_id: pool_id.to_string(),
                winner_count: actual as u32,
            },
            self.clock_ms,
            |p| p.candidates_remaining(candidates),
        );
        self.timer
            .schedule(self.clock_ms + self.config.timing.pre_roll_ms, TimerAction::BeginReveal);

        Ok(actual)
    }

    /// Drive the session forward by `dt_ms` of wall time.
    ///
    /// The simulator is stepped piecewise so every regime change lands at the
    /// exact instant its step was due.
    pub fn advance(&mut self, dt_ms: f64) -> RotationState {
        let dt = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        self.advance_to(self.clock_ms + dt)
    }

    /// Run every pending step now, in order
    pub fn complete_pending(&mut self) {
        while let Some(due_ms) = self.timer.due_ms() {
            self.advance_to(due_ms.max(self.clock_ms));
        }
    }

    fn advance_to(&mut self, target: f64) -> RotationState {
        while let Some((due_ms, action)) = self.timer.take_due(target) {
            let at = due_ms.max(self.clock_ms);
            self.rotation.step(at - self.clock_ms);
            self.clock_ms = at;
            self.fire(action);
        }

        self.rotation.step(target - self.clock_ms);
        self.clock_ms = target;
        self.rotation.state()
    }

    /// Cancel any draw, clear the ledger and restore every loaded participant
    pub fn session_reset(&mut self) {
        if let Some(action) = self.timer.cancel() {
            log::info!("Session reset cancelled pending {:?}", action);
        }
        self.active = None;
        self.last_outcome = None;
        self.ledger.reset_all();
        self.candidates = self.roster.clone();
        self.rotation.settle();
        self.transition(DrawPhase::Idle);
        self.emit(Stage::SessionReset, self.clock_ms);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // REVEAL STEPS
    // ═══════════════════════════════════════════════════════════════════════

    fn fire(&mut self, action: TimerAction) {
        log::debug!("t={:.1}ms fire {:?}", self.clock_ms, action);
        match action {
            TimerAction::BeginReveal => self.begin_reveal(),
            TimerAction::RevealNext(index) => self.reveal(index),
            TimerAction::Finalize => self.finalize(),
        }
    }

    fn begin_reveal(&mut self) {
        let Some(active) = self.active.as_mut() else {
            log::warn!("Reveal step fired with no active draw");
            return;
        };
        for winner in &mut active.winners {
            winner.revealing = RevealMark::Pending;
        }
        let count = active.winners.len();
        let dynamics = active.dynamics;

        self.rotation.decelerate(dynamics.friction_coefficient);
        self.transition(DrawPhase::Revealing);
        self.emit(
            Stage::RevealStart {
                winner_count: count as u32,
                duration_ms: dynamics.reveal_phase_duration_ms,
                friction: dynamics.friction_coefficient,
            },
            self.clock_ms,
        );

        if count == 0 {
            self.timer.schedule(self.clock_ms, TimerAction::Finalize);
        } else {
            self.reveal(0);
        }
    }

    fn reveal(&mut self, index: usize) {
        let Some(active) = self.active.as_mut() else {
            log::warn!("Reveal step fired with no active draw");
            return;
        };
        let count = active.winners.len();
        let Some(winner) = active.winners.get_mut(index) else {
            log::warn!("Reveal index {} out of range ({} winners)", index, count);
            return;
        };
        winner.revealing = RevealMark::Revealed;
        let winner = winner.clone();

        log::debug!(
            "Reveal {}/{}: {} ({})",
            index + 1,
            count,
            winner.participant.name,
            winner.assigned_item
        );
        self.emit_with(
            Stage::WinnerReveal {
                index: index as u32,
                participant_id: winner.id().to_string(),
                name: winner.participant.name.clone(),
                item: winner.assigned_item.clone(),
            },
            self.clock_ms,
            |p| p.department(winner.participant.department.clone()),
        );

        let delay = self.dynamics.reveal_delay_ms(index, count);
        if index + 1 < count {
            self.timer
                .schedule(self.clock_ms + delay, TimerAction::RevealNext(index + 1));
        } else {
            self.emit(Stage::RevealComplete { winner_count: count as u32 }, self.clock_ms);
            let buffer = self.config.timing.reveal_buffer_ms;
            self.timer
                .schedule(self.clock_ms + delay + buffer, TimerAction::Finalize);
        }
    }

    fn finalize(&mut self) {
        let Some(active) = self.active.take() else {
            log::warn!("Finalize fired with no active draw");
            return;
        };

        let participants: Vec<Participant> =
            active.winners.iter().map(|w| w.participant.clone()).collect();
        let items: Vec<String> = active.winners.iter().map(|w| w.assigned_item.clone()).collect();

        let committed = self
            .ledger
            .reserve_and_commit(&active.pool_id, &participants, &items)
            .map(|record| DrawOutcome {
                pool_id: record.pool_id.clone(),
                pool_name: record.pool_name.clone(),
                winners: record.winners.clone(),
                headline: false,
            });

        self.rotation.settle();
        self.transition(DrawPhase::Idle);

        match committed {
            Ok(mut outcome) => {
                let drawn: HashSet<&ParticipantId> = participants.iter().map(|p| &p.id).collect();
                self.candidates.retain(|c| !drawn.contains(&c.id));
                outcome.headline = self
                    .ledger
                    .pool(&outcome.pool_id)
                    .is_some_and(|p| p.is_headline);

                let candidates = self.candidates.len() as u32;
                let flips = self.flip_schedule(outcome.winners.len());
                self.emit_with(
                    Stage::DrawComplete {
                        pool_id: outcome.pool_id.clone(),
                        pool_name: outcome.pool_name.clone(),
                        winner_count: outcome.winners.len() as u32,
                        headline: outcome.headline,
                    },
                    self.clock_ms,
                    |p| p.candidates_remaining(candidates).custom(flips),
                );
                self.emit(Stage::Celebrate { headline: outcome.headline }, self.clock_ms);
                self.last_outcome = Some(outcome);
            }
            Err(e) => {
                log::error!("Draw on '{}' could not be committed: {}", active.pool_id, e);
                self.emit(Stage::Rejected { reason: e.to_string() }, self.clock_ms);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    fn recompute_candidates(&mut self) {
        let drawn: HashSet<&ParticipantId> = self
            .ledger
            .history()
            .iter()
            .flat_map(|r| r.winners.iter().map(Winner::id))
            .collect();
        self.candidates = self
            .roster
            .iter()
            .filter(|p| !drawn.contains(&p.id))
            .cloned()
            .collect();
    }

    /// Result-modal card flips, relative to the modal opening
    fn flip_schedule(&self, count: usize) -> serde_json::Value {
        let flow = &self.config.flow;
        let flip_at_ms: Vec<f64> = (0..count).map(|i| flow.flip_at(i)).collect();
        serde_json::json!({
            "flip_at_ms": flip_at_ms,
            "flips_done_ms": flow.flips_done_at(count),
        })
    }

    fn transition(&mut self, to: DrawPhase) {
        if self.phase != to {
            log::info!("Phase {} → {}", self.phase.display_name(), to.display_name());
            self.phase = to;
        }
    }

    fn reject(&mut self, err: DrawError) -> DrawError {
        log::warn!("Draw request rejected: {}", err);
        self.emit(Stage::Rejected { reason: err.to_string() }, self.clock_ms);
        err
    }

    fn emit(&mut self, stage: Stage, at_ms: f64) {
        self.emit_with(stage, at_ms, |p| p);
    }

    fn emit_with(
        &mut self,
        stage: Stage,
        at_ms: f64,
        payload: impl FnOnce(StagePayload) -> StagePayload,
    ) {
        let state = self.rotation.state();
        let payload = payload(StagePayload::with_rotation(
            state.angle_degrees,
            state.angular_velocity,
        ));
        let event = StageEvent::with_payload(stage, at_ms, payload);
        for listener in &mut self.listeners {
            listener.on_stage(&event);
        }
        self.trace.push(event);
    }
}

impl Drop for DrawOrchestrator {
    fn drop(&mut self) {
        if let Some(action) = self.timer.cancel() {
            log::debug!("Orchestrator dropped with pending {:?}", action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PrizePool;

    fn people(n: i64) -> Vec<Participant> {
        (1..=n)
            .map(|i| Participant::new(i, format!("P{i}"), "Ops"))
            .collect()
    }

    fn orchestrator() -> DrawOrchestrator {
        let pools = PoolSet::new(vec![
            PrizePool::new("first", "First Prize", vec!["Tablet".into()]).headline(),
            PrizePool::uniform("cash", "Red Packet", 5),
        ]);
        let mut orch = DrawOrchestrator::new(EngineConfig::classic(), pools).with_seed(42);
        orch.load_participants(people(10)).unwrap();
        orch
    }

    #[test]
    fn test_clamps_to_capacity() {
        let mut orch = orchestrator();
        assert_eq!(orch.start("first", 5), Ok(1));
        assert_eq!(orch.phase(), DrawPhase::Rolling);
        assert_eq!(orch.winners().len(), 1);
        assert_eq!(orch.winners()[0].assigned_item, "Tablet");
        assert!(!orch.winners()[0].is_revealed());

        orch.complete_pending();
        assert_eq!(orch.phase(), DrawPhase::Idle);
        assert_eq!(orch.ledger().pool("first").unwrap().drawn_count, 1);
        assert_eq!(orch.candidates().len(), 9);

        let outcome = orch.last_outcome().unwrap();
        assert!(outcome.headline);
        assert_eq!(orch.trace().trace_id, "draw-000001");
        assert_eq!(orch.trace().metadata["requested"], 5);

        let complete = orch.trace().events_by_type("draw_complete")[0];
        let flips = complete.payload.custom.as_ref().unwrap();
        assert_eq!(flips["flip_at_ms"], serde_json::json!([300.0]));
        assert_eq!(flips["flips_done_ms"], 300.0);
        assert_eq!(outcome.pool_name, "First Prize");
    }

    #[test]
    fn test_rejections_change_nothing() {
        let mut orch = orchestrator();
        assert_eq!(orch.start("nope", 1), Err(DrawError::UnknownPool("nope".into())));
        assert_eq!(orch.start("cash", 0), Err(DrawError::InvalidCount(0)));
        assert_eq!(orch.start_selected(1), Err(DrawError::NoPoolSelected));

        assert_eq!(orch.phase(), DrawPhase::Idle);
        assert_eq!(orch.candidates().len(), 10);
        assert_eq!(orch.trace().events_by_type("rejected").len(), 3);
    }

    #[test]
    fn test_no_overlapping_draws() {
        let mut orch = orchestrator();
        orch.start("cash", 2).unwrap();
        assert_eq!(orch.start("cash", 1), Err(DrawError::DrawInProgress));
        assert_eq!(orch.select_pool("first"), Err(DrawError::DrawInProgress));
        assert!(orch.load_participants(people(3)).is_err());
        assert_eq!(orch.winners().len(), 2);
    }

    #[test]
    fn test_item_less_pool_assigns_pool_name() {
        let mut orch = orchestrator();
        orch.select_pool("cash").unwrap();
        assert_eq!(orch.start_selected(3), Ok(3));
        assert!(orch.winners().iter().all(|w| w.assigned_item == "Red Packet"));
    }

    #[test]
    fn test_pre_roll_then_first_reveal() {
        let mut orch = orchestrator();
        orch.start("cash", 2).unwrap();

        orch.advance(1_499.0);
        assert_eq!(orch.phase(), DrawPhase::Rolling);
        assert_eq!(orch.revealed_winners().count(), 0);

        orch.advance(1.0);
        assert_eq!(orch.phase(), DrawPhase::Revealing);
        assert_eq!(orch.revealed_winners().count(), 1);
        assert_eq!(orch.pending_action(), Some(TimerAction::RevealNext(1)));
    }

    #[test]
    fn test_session_reset_cancels_draw() {
        let mut orch = orchestrator();
        orch.start("cash", 3).unwrap();
        orch.advance(1_600.0);
        orch.session_reset();

        assert_eq!(orch.phase(), DrawPhase::Idle);
        assert_eq!(orch.pending_action(), None);
        assert!(orch.winners().is_empty());
        assert_eq!(orch.candidates().len(), 10);

        orch.advance(60_000.0);
        assert!(orch.ledger().history().is_empty());
        assert!(orch.last_outcome().is_none());
    }

    #[test]
    fn test_restore_history_excludes_past_winners() {
        let mut orch = orchestrator();
        orch.start("cash", 4).unwrap();
        orch.complete_pending();
        let history = orch.ledger().history().to_vec();

        let mut fresh = orchestrator();
        fresh.restore_history(history).unwrap();
        assert_eq!(fresh.candidates().len(), 6);
        assert_eq!(fresh.ledger().remaining_capacity("cash"), 1);
    }
}
