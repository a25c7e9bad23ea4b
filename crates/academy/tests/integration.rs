//! Integration tests for academy
//!
//! These tests drive the engine end to end: built-in curriculum, access
//! gate, lab controller, progress tracker and a file-backed store.

use academy_api::SessionStatus;
use academy_config::{Curriculum, builtin_curriculum, parse_config};
use academy_core::{
    AccessGate, CompletionSink, LabController, LabEvent, LabPhase, Output, PROMPT,
    ProgressTracker, interpret,
};
use academy_store::{SqliteStore, Store};
use academy_util::{LabId, LearnerId, SessionId};
use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;

const CODE: &str = "LINUX2024PREMIUM";

fn at(day: u32, hour: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
}

fn s1() -> SessionId {
    SessionId::new("week1-session1")
}

fn nav() -> LabId {
    LabId::new("basic-navigation")
}

fn setup() -> (Curriculum, Arc<dyn Store>) {
    let curriculum = builtin_curriculum().unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    (curriculum, store)
}

/// Counts completion signals and forwards them to a tracker
struct Recording<'a> {
    tracker: &'a mut ProgressTracker,
    calls: usize,
}

impl CompletionSink for Recording<'_> {
    fn lab_completed(&mut self, session_id: &SessionId, lab_id: &LabId) {
        self.calls += 1;
        self.tracker.lab_completed(session_id, lab_id);
    }
}

#[test]
fn test_interpreter_is_total() {
    for line in ["", "   ", "\t", "ls", "ls -la", "rm -rf /", "cat", "echo  a   b", "ÿ"] {
        match interpret(line) {
            Output::Lines(_) | Output::Clear => {}
        }
    }
}

#[test]
fn test_navigation_lab_end_to_end() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store.clone());
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();

    let mut lab = LabController::new(curriculum.console.output_cap);
    lab.start(&curriculum, &s1(), &nav());
    assert_eq!(lab.phase(), LabPhase::Running);

    let mut sink = Recording {
        tracker: &mut tracker,
        calls: 0,
    };
    let mut completions = 0;
    for line in ["pwd", "ls", "ls -la", "whoami"] {
        let submission = lab.submit(line, &mut sink);
        completions += submission
            .events
            .iter()
            .filter(|e| matches!(e, LabEvent::LabCompleted { .. }))
            .count();
    }

    assert_eq!(completions, 1);
    assert_eq!(sink.calls, 1);
    assert!(lab.is_complete());
    assert_eq!(lab.completed_steps().map(|c| c.len()), Some(4));

    assert!(tracker.is_lab_complete(&s1(), &nav()));
    assert_eq!(tracker.session_status(&s1()), SessionStatus::NotStarted);
    assert!(!tracker.session_progress(&s1()).unwrap().completed);
}

#[test]
fn test_wrong_command_then_correct_one() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();

    let mut lab = LabController::new(curriculum.console.output_cap);
    lab.start(&curriculum, &s1(), &nav());

    let submission = lab.submit("foo", &mut tracker);
    assert!(submission.lines.contains(&"foo: command not found".to_string()));
    assert_eq!(lab.active_step_index(), Some(0));

    let submission = lab.submit("pwd", &mut tracker);
    assert!(submission.lines.contains(&"/home/student".to_string()));
    assert_eq!(lab.active_step_index(), Some(1));
    assert_eq!(lab.completed_steps().map(|c| c.len()), Some(1));
}

#[test]
fn test_reset_keeps_step_progress() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();

    let mut lab = LabController::new(curriculum.console.output_cap);
    lab.start(&curriculum, &s1(), &nav());
    lab.submit("pwd", &mut tracker);
    lab.submit("ls", &mut tracker);

    lab.reset();
    assert_eq!(
        lab.output().lines().collect::<Vec<_>>(),
        ["Terminal reset!", ""]
    );
    assert_eq!(lab.active_step_index(), Some(2));

    lab.submit("ls -la", &mut tracker);
    lab.submit("whoami", &mut tracker);
    assert!(lab.is_complete());
}

#[test]
fn test_undefined_lab_degrades_to_not_found() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();

    let session = SessionId::new("week1-session2");
    let lab_id = LabId::new("io-redirection");
    let meta = curriculum.sessions.iter().find(|s| s.id == session).unwrap();
    assert!(curriculum.missing_labs(meta).contains(&lab_id));

    let mut lab = LabController::new(curriculum.console.output_cap);
    let event = lab.start(&curriculum, &session, &lab_id);
    assert!(matches!(event, LabEvent::LabNotFound { .. }));

    let submission = lab.submit("pwd", &mut tracker);
    assert!(submission.lines.is_empty());
    assert!(!tracker.is_lab_complete(&session, &lab_id));
}

#[test]
fn test_percent_over_builtin_curriculum() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();
    assert_eq!(tracker.aggregate_percent(), 0);

    let ids: Vec<SessionId> = curriculum.sessions.iter().map(|s| s.id.clone()).collect();
    for id in &ids[..3] {
        tracker.mark_session_complete(id, at(1, 10));
    }
    assert_eq!(tracker.aggregate_percent(), 38);

    tracker.mark_session_complete(&ids[3], at(1, 11));
    assert_eq!(tracker.aggregate_percent(), 50);
    assert!(tracker.achievements().iter().filter(|a| a.earned).count() >= 3);

    for id in &ids[4..] {
        tracker.mark_session_complete(id, at(1, 12));
    }
    assert_eq!(tracker.aggregate_percent(), 100);
    assert!(tracker.next_achievement().is_some_and(|a| a.id == "time-invested"));
}

#[test]
fn test_time_only_grows() {
    let (curriculum, store) = setup();
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login(CODE, None, at(1, 9)).unwrap();

    let mut previous = 0;
    for (hour, minutes) in [(10, 1), (11, 0), (12, 5), (13, 1)] {
        tracker.add_session_time(&s1(), minutes, at(1, hour));
        let spent = tracker.session_progress(&s1()).unwrap().time_spent;
        assert!(spent >= previous);
        previous = spent;
    }
    assert_eq!(previous, 7);
    assert_eq!(
        tracker.session_progress(&s1()).unwrap().last_accessed,
        Some(at(1, 13))
    );
}

#[test]
fn test_progress_persists_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("academy.db");
    let curriculum = builtin_curriculum().unwrap();

    {
        let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
        let gate = AccessGate::new(&curriculum, store);
        let mut tracker = gate.login(CODE, Some("learner@example.com"), at(1, 9)).unwrap();

        let mut lab = LabController::new(curriculum.console.output_cap);
        lab.start(&curriculum, &s1(), &nav());
        for line in ["pwd", "ls", "ls -la", "whoami"] {
            lab.submit(line, &mut tracker);
        }
        tracker.add_session_time(&s1(), 12, at(1, 10));
        tracker.mark_session_complete(&s1(), at(1, 10));
        gate.logout(&mut tracker, at(1, 11));
    }

    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&db_path).unwrap());
    let gate = AccessGate::new(&curriculum, store.clone());
    let tracker = gate.login(CODE, None, at(2, 9)).unwrap();

    assert_eq!(tracker.profile().email, "learner@example.com");
    assert_eq!(tracker.session_status(&s1()), SessionStatus::Completed);
    assert!(tracker.is_lab_complete(&s1(), &nav()));
    assert_eq!(tracker.total_time_minutes(), 12);
    assert_eq!(tracker.aggregate_percent(), 13);

    let stored = store
        .load_learner(&LearnerId::new("user_001"), at(2, 10))
        .unwrap()
        .unwrap();
    assert_eq!(
        stored.progress.get(&s1()).unwrap().completed_at,
        Some(at(1, 10))
    );
}

#[test]
fn test_custom_curriculum_drives_engine() {
    let content = r#"
        config_version = 1

        [console]
        output_cap = 5

        [[sessions]]
        id = "intro"
        title = "Intro"
        week = 1
        number = 1
        difficulty = "beginner"
        labs = ["echo-lab"]

        [[labs]]
        session = "intro"
        id = "echo-lab"
        title = "Echo"

        [[labs.steps]]
        title = "Say hello"
        instruction = "Type 'echo hello'"
        expected = "echo hello"

        [[learners]]
        access_code = "intro1"
        id = "u1"
        name = "Intro Learner"
        email = "u1@example.com"
    "#;
    let curriculum = parse_config(content).unwrap();
    let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
    let gate = AccessGate::new(&curriculum, store);
    let mut tracker = gate.login("INTRO1", None, at(1, 9)).unwrap();

    let mut lab = LabController::new(curriculum.console.output_cap);
    lab.start(&curriculum, &SessionId::new("intro"), &LabId::new("echo-lab"));
    for _ in 0..4 {
        lab.submit("pwd", &mut tracker);
    }
    assert_eq!(lab.output().len(), 5);

    let submission = lab.submit("echo hello world", &mut tracker);
    assert_eq!(
        submission.lines,
        [format!("{PROMPT}echo hello world"), "hello world".to_string()]
    );
    assert!(lab.is_complete());
    assert_eq!(tracker.aggregate_percent(), 0);
    assert!(tracker.is_lab_complete(&SessionId::new("intro"), &LabId::new("echo-lab")));
}
