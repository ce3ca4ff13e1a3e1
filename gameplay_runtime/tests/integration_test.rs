//! Integration tests for gameplay_runtime.
//!
//! Sessions are driven with the recorded action fixture of the engine crate.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use chrono::{TimeZone, Utc};

use gameplay_engine::domain::{OutcomeStatus, Rejection};
use gameplay_engine::events::{ActionEnvelope, GameplayAction};
use gameplay_engine::state::create_initial_state;

use gameplay_runtime::drift::{compare_states, verify_determinism};
use gameplay_runtime::replay;
use gameplay_runtime::session::{
    ActionRequest, Session, SessionConfig, SessionError, SharedSession,
};
use gameplay_runtime::snapshot;

const SEED_SOURCE: &str = "trace-golden-001";
const SESSION_ID: &str = "session-a";

/// Load the recorded actions from the engine's test fixtures.
fn load_fixture_actions() -> Vec<ActionEnvelope> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("gameplay_engine")
        .join("tests")
        .join("fixtures")
        .join("session_actions.json");
    let json_str = fs::read_to_string(&path).expect("Failed to read session_actions.json");
    serde_json::from_str(&json_str).expect("Failed to parse session_actions.json")
}

fn request(envelope: &ActionEnvelope, expected_version: Option<u64>) -> ActionRequest {
    ActionRequest {
        session_id: SESSION_ID.to_string(),
        player_id: envelope.player_id.clone(),
        action: envelope.action.clone(),
        expected_version,
        at: envelope.at,
    }
}

fn new_session(config: SessionConfig) -> Session {
    let mut session = Session::new(SESSION_ID, SEED_SOURCE, None, config);
    for player in ["host", "ava", "kai", "ops"] {
        session.join(player).expect("join");
    }
    session
}

/// Session with every fixture action applied, each at the current version.
fn played_session(config: SessionConfig) -> (Session, Vec<ActionEnvelope>) {
    let actions = load_fixture_actions();
    let mut session = new_session(config);
    for envelope in &actions {
        let version = session.version();
        session
            .apply(request(envelope, Some(version)))
            .expect("fixture action must not conflict");
    }
    (session, actions)
}

fn guild_op(impact: i64) -> GameplayAction {
    GameplayAction::GuildOperation { impact }
}

fn host_request(action: GameplayAction, expected_version: Option<u64>) -> ActionRequest {
    ActionRequest {
        session_id: SESSION_ID.to_string(),
        player_id: "host".to_string(),
        action,
        expected_version,
        at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    }
}

// ─────────────────────────────────────────────────────────────
// Replay
// ─────────────────────────────────────────────────────────────

#[test]
fn session_matches_replay() {
    let (mut session, actions) = played_session(SessionConfig::default());
    assert_eq!(session.version(), actions.len() as u64 - 1);
    assert_eq!(session.action_log().len(), actions.len() - 1);

    let live_hash = session.current_hash();
    assert_eq!(live_hash, replay::rebuild_hash(SEED_SOURCE, None, &actions));

    let (_, replayed_hash) = session.replay_full();
    assert_eq!(replayed_hash, live_hash);
    assert_eq!(session.current_hash(), live_hash);
    assert_eq!(session.version(), actions.len() as u64 - 1);
}

#[test]
fn rebuild_from_midpoint_matches_full_replay() {
    let actions = load_fixture_actions();
    let (mid_state, mid_hash) = replay::rebuild_state(SEED_SOURCE, None, &actions[..10]);
    assert_eq!(mid_hash.len(), 64);

    let (full_state, _) = replay::rebuild_state(SEED_SOURCE, None, &actions);
    let (resumed, version) = replay::rebuild_from(mid_state, 10, &actions[10..]);
    assert_eq!(resumed, full_state);
    assert_eq!(version, actions.len() as u64 - 1);
}

// ─────────────────────────────────────────────────────────────
// Optimistic concurrency
// ─────────────────────────────────────────────────────────────

#[test]
fn stale_version_is_a_conflict() {
    let mut session = new_session(SessionConfig::default());

    let first = session.apply(host_request(guild_op(5), Some(0))).unwrap();
    assert_eq!(first.version, 1);
    assert!(first.result.applied);

    let err = session.apply(host_request(guild_op(5), Some(0))).unwrap_err();
    match err {
        SessionError::Conflict { expected, current } => {
            assert_eq!(expected, 0);
            assert_eq!(current, 1);
        }
        ref other => panic!("Expected Conflict, got: {:?}", other),
    }
    let reply = err.reply();
    assert!(reply.conflict);
    assert_eq!(session.version(), 1);
    assert_eq!(session.state().guild.events_completed, 1);
}

#[test]
fn racing_writers_yield_one_success_and_one_conflict() {
    let shared = Arc::new(SharedSession::new(new_session(SessionConfig::default())));

    let handles: Vec<_> = (0..2)
        .map(|i| {
            let shared = Arc::clone(&shared);
            thread::spawn(move || shared.apply(host_request(guild_op(3 + i), Some(0))))
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(shared.version(), 1);
}

#[test]
fn unchecked_requests_always_apply() {
    let mut session = new_session(SessionConfig::default());
    for _ in 0..3 {
        session.apply(host_request(guild_op(2), None)).unwrap();
    }
    assert_eq!(session.version(), 3);
}

#[test]
fn rejected_action_keeps_version() {
    let mut session = new_session(SessionConfig::default());
    let action = GameplayAction::UnlockSkill {
        skill_id: "skill-overclock".to_string(),
    };
    let response = session.apply(host_request(action, Some(0))).unwrap();

    assert!(!response.result.applied);
    assert!(matches!(
        response.result.rejection,
        Some(Rejection::MissingPrerequisite(_))
    ));
    assert_eq!(response.version, 0);
    assert!(session.action_log().is_empty());
}

// ─────────────────────────────────────────────────────────────
// Roster
// ─────────────────────────────────────────────────────────────

#[test]
fn roster_is_enforced() {
    let mut session = Session::new(SESSION_ID, SEED_SOURCE, None, SessionConfig::default());
    assert!(matches!(session.join("  "), Err(SessionError::BlankPlayer)));
    for player in ["a", "b", "c", "d", "e"] {
        session.join(player).unwrap();
    }
    session.join("a").unwrap();
    assert!(matches!(
        session.join("f"),
        Err(SessionError::SessionFull { max: 5 })
    ));

    let err = session.apply(host_request(guild_op(1), None)).unwrap_err();
    assert!(matches!(err, SessionError::UnknownPlayer(_)));
    assert!(!err.reply().conflict);

    assert!(session.leave("e"));
    assert!(!session.leave("e"));
    session.join("host").unwrap();
    assert_eq!(session.players().len(), 5);

    let mut foreign = host_request(guild_op(1), None);
    foreign.session_id = "session-b".to_string();
    assert!(matches!(
        session.apply(foreign),
        Err(SessionError::WrongSession(_))
    ));
}

// ─────────────────────────────────────────────────────────────
// Snapshots
// ─────────────────────────────────────────────────────────────

#[test]
fn interval_snapshots_and_restore() {
    let config = SessionConfig {
        snapshot_interval: 5,
        ..SessionConfig::default()
    };
    let (mut session, _) = played_session(config);
    let live_hash = session.current_hash();
    let live_version = session.version();

    let snap = session.latest_snapshot().expect("interval snapshot").clone();
    assert_eq!(snap.version, live_version - live_version % 5);
    assert!(snapshot::verify_snapshot_hash(&snap));

    let restored_hash = session.restore();
    assert_eq!(restored_hash, live_hash);
    assert_eq!(session.version(), live_version);
}

#[test]
fn damaged_snapshot_falls_back_to_replay() {
    let (mut session, _) = played_session(SessionConfig::default());
    let live_hash = session.current_hash();

    let mut snap = session.snapshot().unwrap();
    snap.hash = "0".repeat(64);
    session.replace_snapshot(Some(snap));

    assert_eq!(session.restore(), live_hash);
}

#[test]
fn snapshot_of_fixture_state_restores_identically() {
    let (mut session, _) = played_session(SessionConfig::default());
    let snap = session.snapshot().unwrap();
    let (state, version) = snapshot::load_snapshot(&snap).unwrap();
    assert_eq!(&state, session.state());
    assert_eq!(version, session.version());
}

// ─────────────────────────────────────────────────────────────
// Drift
// ─────────────────────────────────────────────────────────────

#[test]
fn drift_report_describes_session_progress() {
    let (session, actions) = played_session(SessionConfig::default());
    verify_determinism(SEED_SOURCE, None, &actions);

    let initial = create_initial_state(SEED_SOURCE, None);
    let report = compare_states(&initial, session.state());

    assert!(report.diverged);
    assert_eq!(report.depth_delta, 1);
    assert_eq!(report.lives_delta, 0);
    assert!(report.boss_hp_delta < 0);
    assert_eq!(report.joined_members, vec!["ava", "kai"]);
    assert_eq!(report.unlocked_skills, vec!["skill-focus"]);
    assert!(report.added_forks.is_empty());
    assert_eq!(report.outcome_a, OutcomeStatus::InProgress);

    let same = compare_states(session.state(), session.state());
    assert!(!same.diverged);
    assert!(!same.outcome_changed());
    assert_eq!(same.credits_delta, 0);
}

// ─────────────────────────────────────────────────────────────
// Wire format
// ─────────────────────────────────────────────────────────────

#[test]
fn action_request_parses_from_hosting_protocol() {
    let json = r#"{
        "session_id": "session-a",
        "player_id": "host",
        "type": "pvp.act",
        "payload": {"action": "scan"},
        "expected_version": 4,
        "at": "2026-03-01T12:00:00Z"
    }"#;
    let request: ActionRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.expected_version, Some(4));
    assert_eq!(request.action.action_type(), "pvp.act");

    let roundtrip: ActionRequest =
        serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
    assert_eq!(roundtrip, request);
}
