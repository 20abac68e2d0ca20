//! Draw flow tests
//!
//! Full sessions driven through the public API: acceptance, frame-driven
//! reveal timing, commit, rejection and reset.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use approx::assert_relative_eq;
use ld_engine::{
    AudioService, Cue, CueDispatcher, DrawError, DrawOrchestrator, EngineConfig, Participant,
    ParticipantId, PoolSet, PrizePool,
};
use ld_stage::{DrawPhase, Stage, StageTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

const FRAME_MS: f64 = 1000.0 / 60.0;

fn people(n: i64) -> Vec<Participant> {
    (1..=n)
        .map(|i| {
            let department = if i % 2 == 0 { "Sales" } else { "R&D" };
            Participant::new(i, format!("Employee {i}"), department)
        })
        .collect()
}

fn pools() -> PoolSet {
    PoolSet::new(vec![
        PrizePool::new("first", "First Prize", vec!["Tablet".into()]).headline(),
        PrizePool::new(
            "third",
            "Third Prize",
            vec!["Smart Band".into(), "Smart Band".into(), "Earbuds".into(), "Earbuds".into()],
        ),
        PrizePool::uniform("redpacket", "Red Packet", 20),
    ])
}

fn orchestrator(config: EngineConfig, participants: i64) -> DrawOrchestrator {
    let mut orch = DrawOrchestrator::new(config, pools()).with_seed(2026);
    orch.load_participants(people(participants)).unwrap();
    orch
}

/// Step at 60 Hz until the draw is committed
fn run_frames(orch: &mut DrawOrchestrator) -> usize {
    let mut frames = 0;
    while orch.phase() != DrawPhase::Idle {
        orch.advance(FRAME_MS);
        frames += 1;
        assert!(frames < 100_000, "draw never finished");
    }
    frames
}

fn event_time(trace: &StageTrace, type_name: &str) -> f64 {
    trace.events_by_type(type_name)[0].timestamp_ms
}

#[derive(Clone, Default)]
struct RecordingAudio {
    played: Rc<RefCell<Vec<Cue>>>,
}

impl AudioService for RecordingAudio {
    fn play(&mut self, cue: Cue, _gain: f64) {
        self.played.borrow_mut().push(cue);
    }

    fn stop_loops(&mut self) {}
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIOS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_single_item_pool_clamps_request() {
    let mut orch = orchestrator(EngineConfig::standard(), 10);

    assert_eq!(orch.start("first", 5), Ok(1));
    run_frames(&mut orch);

    let outcome = orch.last_outcome().unwrap();
    assert_eq!(outcome.winners.len(), 1);
    assert_eq!(outcome.winners[0].assigned_item, "Tablet");
    assert!(outcome.headline);
    assert_eq!(orch.ledger().pool("first").unwrap().drawn_count, 1);
    assert_eq!(orch.candidates().len(), 9);
    assert!(!orch.candidates().contains(&outcome.winners[0].participant));
}

#[test]
fn test_exhausted_pool_rejected_without_change() {
    let mut orch = orchestrator(EngineConfig::rehearsal(), 10);
    orch.start("first", 1).unwrap();
    orch.complete_pending();

    let history_before = orch.ledger().history().to_vec();
    let candidates_before = orch.candidates().to_vec();

    assert_eq!(
        orch.start("first", 1),
        Err(DrawError::PoolExhausted("First Prize".into()))
    );
    assert_eq!(orch.phase(), DrawPhase::Idle);
    assert_eq!(orch.pending_action(), None);
    assert_eq!(orch.ledger().history(), history_before.as_slice());
    assert_eq!(orch.candidates(), candidates_before.as_slice());

    let rejected = orch.trace().events_by_type("rejected");
    assert!(matches!(
        &rejected.last().unwrap().stage,
        Stage::Rejected { reason } if reason == "pool exhausted: First Prize"
    ));
}

#[test]
fn test_configured_exhaustion_survives_restore() {
    let mut set = pools();
    set.pools[0].drawn_count = 1;
    let mut orch = DrawOrchestrator::new(EngineConfig::classic(), set).with_seed(7);
    orch.load_participants(people(10)).unwrap();

    orch.restore_history(Vec::new()).unwrap();
    assert_eq!(orch.ledger().remaining_capacity("first"), 0);
    assert_eq!(
        orch.start("first", 1),
        Err(DrawError::PoolExhausted("First Prize".into()))
    );
    assert_eq!(orch.phase(), DrawPhase::Idle);
}

#[test]
fn test_repeated_ids_never_win_twice() {
    let mut orch = DrawOrchestrator::new(EngineConfig::classic(), pools()).with_seed(11);
    let roster = vec![
        Participant::new(1, "Li Wei", "Sales"),
        Participant::new(1, "Li Wei (copy)", "Sales"),
        Participant::new(2, "Zhang Min", "R&D"),
    ];
    assert_eq!(orch.load_participants(roster).unwrap(), 2);
    assert_eq!(orch.roster()[0].name, "Li Wei");

    assert_eq!(orch.start("redpacket", 3), Ok(2));
    run_frames(&mut orch);

    let record = &orch.ledger().history()[0];
    let ids: HashSet<&ParticipantId> = record.winners.iter().map(|w| w.id()).collect();
    assert_eq!(ids.len(), record.winners.len());
    assert_eq!(orch.ledger().pool("redpacket").unwrap().drawn_count, 2);
}

#[test]
fn test_back_loaded_reveal_schedule() {
    // Classic: base 500, span 800, buffer 1000, pre-roll 1500
    let mut orch = orchestrator(EngineConfig::classic(), 10);
    assert_eq!(orch.start("third", 3), Ok(3));
    orch.complete_pending();

    let trace = orch.trace();
    assert!(trace.validate().is_valid(), "{:?}", trace.validate().warnings());

    let reveal_start = event_time(trace, "reveal_start");
    let complete = event_time(trace, "draw_complete");
    assert_relative_eq!(reveal_start, 1500.0);
    assert_relative_eq!(complete - reveal_start, 3300.0, epsilon = 1e-6);

    let gaps = trace.reveal_gaps_ms();
    assert_eq!(gaps.len(), 2);
    assert_relative_eq!(gaps[0], 500.0, epsilon = 1e-9);
    assert_relative_eq!(gaps[1], 500.0 + 800.0 / 3.0, epsilon = 1e-9);

    match &trace.events_by_type("reveal_start")[0].stage {
        Stage::RevealStart { duration_ms, .. } => assert_eq!(*duration_ms, 3300),
        other => panic!("unexpected stage {other:?}"),
    }
}

#[test]
fn test_sphere_reaches_idle_as_draw_completes() {
    let config = EngineConfig::standard();
    let idle = config.physics.idle_speed;
    let max = config.physics.max_speed;
    let mut orch = orchestrator(config, 30);

    orch.start("redpacket", 5).unwrap();
    let frames = run_frames(&mut orch);
    // 5000 pre-roll + 5 × 2500 + 500 buffer = 18 s at 60 Hz
    assert!((1080..=1081).contains(&frames), "took {frames} frames");

    let trace = orch.trace();
    let at_reveal = trace.events_by_type("reveal_start")[0].payload.angular_velocity;
    let at_complete = trace.events_by_type("draw_complete")[0].payload.angular_velocity;
    assert_eq!(at_reveal, Some(max));
    assert_relative_eq!(at_complete.unwrap(), idle, max_relative = 1e-6);
}

#[test]
fn test_winners_disjoint_across_draws() {
    let mut orch = orchestrator(EngineConfig::rehearsal(), 12);
    let mut seen: HashSet<ParticipantId> = HashSet::new();

    for (pool, count) in [("first", 1), ("third", 4), ("redpacket", 5), ("redpacket", 5)] {
        let actual = orch.start(pool, count).unwrap();
        orch.complete_pending();
        let outcome = orch.last_outcome().unwrap();
        assert_eq!(outcome.winners.len(), actual);
        for winner in &outcome.winners {
            assert!(seen.insert(winner.id().clone()), "{} won twice", winner.id());
        }
    }

    // 1 + 4 + 5 + 2: the last draw ran out of candidates
    assert_eq!(seen.len(), 12);
    assert!(orch.candidates().is_empty());
    assert_eq!(orch.start("redpacket", 1), Err(DrawError::NoCandidates));
}

#[test]
fn test_start_never_exceeds_bounds() {
    for requested in [1, 2, 3, 7, 50] {
        let mut orch = orchestrator(EngineConfig::rehearsal(), 3);
        let actual = orch.start("third", requested).unwrap();
        assert_eq!(actual, requested.min(4).min(3));
        orch.complete_pending();

        let pool = orch.ledger().pool("third").unwrap();
        assert_eq!(pool.drawn_count, actual);
        assert!(pool.drawn_count <= pool.capacity());
    }
}

#[test]
fn test_items_come_from_the_pool() {
    let mut orch = orchestrator(EngineConfig::rehearsal(), 10);
    orch.start("third", 4).unwrap();
    orch.complete_pending();

    let mut items: Vec<String> = orch
        .last_outcome()
        .unwrap()
        .winners
        .iter()
        .map(|w| w.assigned_item.clone())
        .collect();
    items.sort();
    assert_eq!(items, vec!["Earbuds", "Earbuds", "Smart Band", "Smart Band"]);
    assert!(orch.ledger().remaining_items("third").is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// LISTENERS & RESET
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_listeners_receive_every_stage() {
    let mut orch = orchestrator(EngineConfig::rehearsal(), 10);
    let shared = Rc::new(RefCell::new(StageTrace::new("listener")));
    let audio = RecordingAudio::default();
    let played = Rc::clone(&audio.played);

    orch.add_listener(Box::new(Rc::clone(&shared)));
    orch.add_listener(Box::new(CueDispatcher::new(Box::new(audio))));

    orch.select_pool("third").unwrap();
    orch.start_selected(2).unwrap();
    orch.complete_pending();

    let types: Vec<&str> = shared.borrow().events.iter().map(|e| e.type_name()).collect();
    assert_eq!(
        types,
        vec![
            "pool_selected",
            "roll_start",
            "reveal_start",
            "winner_reveal",
            "winner_reveal",
            "reveal_complete",
            "draw_complete",
            "celebrate",
        ]
    );
    assert_eq!(shared.borrow().final_phase(), DrawPhase::Idle);

    assert_eq!(
        *played.borrow(),
        vec![
            Cue::RollingMusic,
            Cue::RollingTick,
            Cue::CardFly,
            Cue::CardReveal,
            Cue::CardFly,
            Cue::CardReveal,
            Cue::IdleMusic,
            Cue::Fanfare,
        ]
    );
}

#[test]
fn test_reset_mid_reveal_stops_the_chain() {
    let mut orch = orchestrator(EngineConfig::standard(), 10);
    let shared = Rc::new(RefCell::new(StageTrace::new("reset")));
    orch.add_listener(Box::new(Rc::clone(&shared)));

    orch.start("redpacket", 4).unwrap();
    orch.advance(6_000.0);
    assert_eq!(orch.phase(), DrawPhase::Revealing);
    assert_eq!(orch.revealed_winners().count(), 1);

    orch.session_reset();
    let events_at_reset = shared.borrow().events.len();

    for _ in 0..3_000 {
        orch.advance(FRAME_MS);
    }
    assert_eq!(shared.borrow().events.len(), events_at_reset);
    assert_eq!(orch.candidates().len(), 10);
    assert_eq!(orch.ledger().remaining_capacity("redpacket"), 20);

    // A fresh draw works after reset
    assert_eq!(orch.start("redpacket", 2), Ok(2));
}
