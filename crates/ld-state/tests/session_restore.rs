//! History survives a restart and keeps past winners out of later draws

use ld_engine::{DrawOrchestrator, EngineConfig, Participant, PoolSet};
use ld_stage::DrawPhase;
use ld_state::{AudioPreferences, HistoryStore, JsonFileStore, reset_session};
use tempfile::tempdir;

fn roster() -> Vec<Participant> {
    (1..=40)
        .map(|i| Participant::new(i, format!("Guest {i}"), "Hall A"))
        .collect()
}

fn orchestrator() -> DrawOrchestrator {
    let mut orch = DrawOrchestrator::new(EngineConfig::rehearsal(), PoolSet::festival()).with_seed(8);
    orch.load_participants(roster()).unwrap();
    orch
}

#[test]
fn test_restart_restores_ledger_and_candidates() {
    let dir = tempdir().unwrap();
    let history = HistoryStore::new(JsonFileStore::new(dir.path()));

    let mut first_run = orchestrator();
    first_run.start("third", 5).unwrap();
    first_run.complete_pending();
    first_run.start("lucky", 10).unwrap();
    first_run.complete_pending();
    history.save(first_run.ledger().history()).unwrap();

    let mut second_run = orchestrator();
    second_run.restore_history(history.load().unwrap()).unwrap();

    assert_eq!(second_run.phase(), DrawPhase::Idle);
    assert_eq!(second_run.candidates().len(), 25);
    assert_eq!(second_run.ledger().remaining_capacity("third"), 0);
    assert_eq!(second_run.ledger().remaining_capacity("lucky"), 13);
    assert_eq!(
        second_run.ledger().remaining_items("lucky").len(),
        second_run.ledger().remaining_capacity("lucky")
    );
}

#[test]
fn test_reset_session_leaves_preferences() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());

    let prefs = AudioPreferences {
        muted: true,
        volume: 0.25,
    };
    prefs.save(&store).unwrap();

    let mut orch = orchestrator();
    orch.start("sunshine", 2).unwrap();
    orch.complete_pending();
    HistoryStore::new(&store).save(orch.ledger().history()).unwrap();

    reset_session(&store).unwrap();
    assert!(HistoryStore::new(&store).load().unwrap().is_empty());
    assert_eq!(AudioPreferences::load(&store), prefs);
}
