//! Line-oriented front end
//!
//! Maps console commands onto the engine: the access gate, the learner's
//! progress tracker, the session timer and the lab controller. Every
//! command returns the lines to print; nothing here writes to stdout.

use academy_api::{ContentRepository, SessionStatus};
use academy_config::Curriculum;
use academy_core::{
    AccessGate, LabEvent, LabPhase, PROMPT, SessionTimer, SharedTracker,
};
use academy_store::Store;
use academy_util::{LabId, SessionId, format_datetime_full, format_minutes};
use std::sync::Arc;
use tracing::debug;

const CONSOLE_HELP: &[&str] = &[
    "Commands:",
    "  dashboard         - overall progress and achievements",
    "  sessions          - list all sessions",
    "  open <session>    - open a session (starts the practice timer)",
    "  complete          - mark the open session complete",
    "  lab <lab-id>      - enter a lab of the open session",
    "  back              - leave the current lab or session",
    "  profile           - show your learner profile",
    "  logout            - log out",
    "  quit              - exit",
    "Inside a lab: :hint, :reset, :quit",
];

/// Output of one console command
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(text: impl Into<String>) -> Self {
        Self::lines(vec![text.into()])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum View {
    Dashboard,
    Session(SessionId),
    Lab(SessionId),
}

pub struct Console {
    curriculum: Arc<Curriculum>,
    gate: AccessGate,
    tracker: Option<SharedTracker>,
    view: View,
    timer: Option<SessionTimer>,
    lab: academy_core::LabController,
}

impl Console {
    pub fn new(curriculum: Arc<Curriculum>, store: Arc<dyn Store>) -> Self {
        let gate = AccessGate::new(&curriculum, store);
        let lab = academy_core::LabController::new(curriculum.console.output_cap);
        Self {
            curriculum,
            gate,
            tracker: None,
            view: View::Dashboard,
            timer: None,
            lab,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.tracker.is_some()
    }

    pub fn prompt(&self) -> String {
        match &self.view {
            _ if self.tracker.is_none() => "login> ".into(),
            View::Dashboard => "academy> ".into(),
            View::Session(id) => format!("academy:{}> ", id),
            View::Lab(_) => PROMPT.into(),
        }
    }

    pub async fn login(&mut self, access_code: &str, email: Option<&str>) -> Reply {
        if self.tracker.is_some() {
            return Reply::line("Already logged in. Use 'logout' first.");
        }

        match self.gate.login(access_code, email, academy_util::now()) {
            Ok(tracker) => {
                let name = tracker.profile().name.clone();
                self.tracker = Some(tracker.into_shared());
                self.view = View::Dashboard;
                let mut reply = Reply::line(format!("Welcome, {}!", name));
                reply.lines.extend(self.dashboard().await);
                reply
            }
            Err(e) => Reply::line(e.to_string()),
        }
    }

    pub async fn logout(&mut self) -> Reply {
        let Some(tracker) = self.tracker.take() else {
            return Reply::line("Not logged in.");
        };
        self.timer = None;
        self.lab.close();
        self.view = View::Dashboard;

        let mut tracker = tracker.lock().await;
        self.gate.logout(&mut tracker, academy_util::now());
        Reply::line(format!("Goodbye, {}.", tracker.profile().name))
    }

    /// Handle one line of input
    pub async fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();

        if self.tracker.is_none() {
            return self.handle_logged_out(line).await;
        }
        if let View::Lab(session_id) = &self.view {
            let session_id = session_id.clone();
            return self.handle_lab(&session_id, line).await;
        }

        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let arg = words.next();

        match (command, arg) {
            ("", _) => Reply::default(),
            ("help", _) => Reply::lines(CONSOLE_HELP.iter().map(|l| l.to_string()).collect()),
            ("dashboard", _) => Reply::lines(self.dashboard().await),
            ("sessions", _) => Reply::lines(self.sessions().await),
            ("open", Some(id)) => self.open(SessionId::new(id)).await,
            ("open", None) => Reply::line("Usage: open <session>"),
            ("complete", _) => self.complete().await,
            ("lab", Some(id)) => self.enter_lab(LabId::new(id)).await,
            ("lab", None) => Reply::line("Usage: lab <lab-id>"),
            ("back", _) => self.back(),
            ("profile", _) => Reply::lines(self.profile().await),
            ("logout", _) => self.logout().await,
            ("quit" | "exit", _) => {
                let mut reply = self.logout().await;
                reply.quit = true;
                reply
            }
            (other, _) => Reply::line(format!(
                "Unknown command '{}'. Type 'help' for a list of commands.",
                other
            )),
        }
    }

    async fn handle_logged_out(&mut self, line: &str) -> Reply {
        let mut words = line.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (None, _, _) => Reply::default(),
            (Some("quit" | "exit"), _, _) => Reply {
                lines: Vec::new(),
                quit: true,
            },
            (Some("login"), Some(code), email) => self.login(code, email).await,
            (Some("login"), None, _) => Reply::line("Usage: login <access-code> [email]"),
            // a bare code is accepted as a login attempt
            (Some(code), None, _) => self.login(code, None).await,
            _ => Reply::line("Please log in with your access code."),
        }
    }

    async fn handle_lab(&mut self, session_id: &SessionId, line: &str) -> Reply {
        match line {
            ":quit" | "back" => return self.back(),
            ":hint" => {
                return Reply::line(match self.lab.hint() {
                    Some(hint) => format!("Hint: {}", hint),
                    None => "No hint for this step.".into(),
                });
            }
            ":reset" => {
                self.lab.reset();
                let mut reply = Reply::lines(self.lab.output().lines().map(String::from).collect());
                reply.lines.extend(self.step_lines());
                return reply;
            }
            _ => {}
        }

        if self.lab.phase() == LabPhase::NotFound {
            return Reply::line("This lab is not available. Type ':quit' to go back.");
        }

        let Some(tracker) = self.tracker.clone() else {
            return Reply::default();
        };
        let submission = {
            let mut tracker = tracker.lock().await;
            self.lab.submit(line, &mut *tracker)
        };

        let mut lines = Vec::new();
        if submission.cleared {
            lines.push("\x1b[2J\x1b[H".to_string());
        }
        // the prompt is printed by the caller; skip the echo
        lines.extend(submission.lines.into_iter().skip(usize::from(!submission.cleared)));

        for event in submission.events {
            match event {
                LabEvent::StepCompleted { index, title } => {
                    lines.push(format!("[done] Step {}: {}", index + 1, title));
                }
                LabEvent::StepActivated { .. } => lines.extend(self.step_lines()),
                LabEvent::LabCompleted { lab_id, .. } => {
                    debug!(session_id = %session_id, lab_id = %lab_id, "Lab finished in console");
                    lines.push("Lab complete! Your progress has been saved.".into());
                    lines.push("Type ':quit' to return to the session.".into());
                }
                LabEvent::LabStarted { .. } | LabEvent::LabNotFound { .. } => {}
            }
        }
        Reply::lines(lines)
    }

    async fn dashboard(&self) -> Vec<String> {
        let Some(tracker) = &self.tracker else {
            return Vec::new();
        };
        let tracker = tracker.lock().await;
        let now = academy_util::now();

        let mut lines = vec![
            format!("Welcome back, {}", tracker.profile().name),
            format!(
                "Progress: {}% ({}/{} sessions)  Time: {}  Days remaining: {}",
                tracker.aggregate_percent(),
                tracker.completed_session_count(),
                tracker.total_sessions(),
                format_minutes(tracker.total_time_minutes()),
                tracker.days_remaining(now).max(0),
            ),
        ];

        let earned: Vec<_> = tracker
            .achievements()
            .into_iter()
            .filter(|a| a.earned)
            .map(|a| a.title)
            .collect();
        if !earned.is_empty() {
            lines.push(format!("Achievements: {}", earned.join(", ")));
        }
        if let Some(next) = tracker.next_achievement() {
            lines.push(format!("Next achievement: {} ({})", next.title, next.description));
        }

        let next_session = self
            .curriculum
            .sessions()
            .iter()
            .find(|s| tracker.session_status(&s.id) != SessionStatus::Completed);
        match next_session {
            Some(session) => lines.push(format!("Continue with: {} - {}", session.id, session.title)),
            None => lines.push("All sessions complete. Congratulations!".into()),
        }
        lines
    }

    async fn sessions(&self) -> Vec<String> {
        let Some(tracker) = &self.tracker else {
            return Vec::new();
        };
        let tracker = tracker.lock().await;

        let mut lines = Vec::new();
        let mut week = 0;
        for session in self.curriculum.sessions() {
            if session.week != week {
                week = session.week;
                lines.push(format!("Week {}", week));
            }
            let marker = match tracker.session_status(&session.id) {
                SessionStatus::Completed => "[x]",
                SessionStatus::InProgress => "[~]",
                SessionStatus::NotStarted => "[ ]",
            };
            lines.push(format!(
                "  {} {:<16} {} ({}, {}) labs {}/{}",
                marker,
                session.id.as_str(),
                session.title,
                session.difficulty,
                session.duration,
                tracker.completed_lab_count(&session.id),
                session.labs.len(),
            ));
        }
        lines
    }

    async fn open(&mut self, session_id: SessionId) -> Reply {
        let Some(session) = self.curriculum.session(&session_id).cloned() else {
            return Reply::lines(
                self.curriculum
                    .session_content(&session_id)
                    .lines()
                    .map(String::from)
                    .collect(),
            );
        };
        let Some(tracker) = self.tracker.clone() else {
            return Reply::default();
        };

        // replacing the timer drops (and aborts) the previous one
        self.timer = Some(SessionTimer::start(
            tracker.clone(),
            session_id.clone(),
            self.curriculum.console.tick_interval,
            self.curriculum.console.minutes_per_tick,
        ));
        self.view = View::Session(session_id.clone());

        let tracker = tracker.lock().await;
        let mut lines: Vec<String> = self
            .curriculum
            .session_content(&session_id)
            .lines()
            .map(String::from)
            .collect();
        lines.push(String::new());
        lines.push(format!(
            "Week {} / Session {} - {} - {}",
            session.week, session.number, session.duration, session.difficulty
        ));
        if !session.topics.is_empty() {
            lines.push(format!("Topics: {}", session.topics.join(", ")));
        }
        lines.push("Labs:".into());
        for lab_id in &session.labs {
            let title = self
                .curriculum
                .lab(&session_id, lab_id)
                .map(|lab| lab.title.as_str())
                .unwrap_or("(coming soon)");
            let marker = if tracker.is_lab_complete(&session_id, lab_id) {
                "[x]"
            } else {
                "[ ]"
            };
            lines.push(format!("  {} {} - {}", marker, lab_id, title));
        }
        Reply::lines(lines)
    }

    async fn complete(&mut self) -> Reply {
        let View::Session(session_id) = &self.view else {
            return Reply::line("Open a session first.");
        };
        let Some(tracker) = &self.tracker else {
            return Reply::default();
        };
        let mut tracker = tracker.lock().await;
        if tracker.mark_session_complete(session_id, academy_util::now()) {
            Reply::line(format!(
                "Session {} marked complete. Overall progress: {}%",
                session_id,
                tracker.aggregate_percent()
            ))
        } else {
            Reply::line("Session already completed.")
        }
    }

    async fn enter_lab(&mut self, lab_id: LabId) -> Reply {
        let View::Session(session_id) = self.view.clone() else {
            return Reply::line("Open a session first.");
        };

        let event = self.lab.start(&*self.curriculum, &session_id, &lab_id);
        self.view = View::Lab(session_id);

        if let LabEvent::LabNotFound { .. } = event {
            return Reply::lines(vec![
                "Lab Not Found".into(),
                format!("The lab '{}' is not available yet.", lab_id),
                "Type ':quit' to go back.".into(),
            ]);
        }

        let mut lines = Vec::new();
        if let Some(definition) = self.lab.definition() {
            lines.push(definition.title.clone());
            lines.push(definition.description.clone());
            if !definition.objectives.is_empty() {
                lines.push("Objectives:".into());
                lines.extend(definition.objectives.iter().map(|o| format!("  - {}", o)));
            }
            lines.push(String::new());
        }
        lines.extend(self.lab.output().lines().map(String::from));
        lines.extend(self.step_lines());
        Reply::lines(lines)
    }

    fn back(&mut self) -> Reply {
        match self.view.clone() {
            View::Lab(session_id) => {
                self.lab.close();
                self.view = View::Session(session_id.clone());
                Reply::line(format!("Back to session {}.", session_id))
            }
            View::Session(_) => {
                self.timer = None;
                self.view = View::Dashboard;
                Reply::line("Back to dashboard.")
            }
            View::Dashboard => Reply::default(),
        }
    }

    async fn profile(&self) -> Vec<String> {
        let Some(tracker) = &self.tracker else {
            return Vec::new();
        };
        let tracker = tracker.lock().await;
        let profile = tracker.profile();
        let now = academy_util::now();

        let mut lines = vec![
            format!("Name:         {}", profile.name),
            format!("Email:        {}", profile.email),
            format!("Access level: {:?}", profile.access_level),
            format!(
                "Enrolled:     {} ({} days ago)",
                format_datetime_full(&profile.enrollment_date),
                tracker.enrollment_days(now)
            ),
            format!(
                "Access until: {} ({} days remaining)",
                format_datetime_full(&profile.expiry_date),
                tracker.days_remaining(now).max(0)
            ),
            "Achievements:".into(),
        ];
        for achievement in tracker.achievements() {
            let marker = if achievement.earned { "[x]" } else { "[ ]" };
            lines.push(format!(
                "  {} {} - {}",
                marker, achievement.title, achievement.description
            ));
        }
        lines
    }

    fn step_lines(&self) -> Vec<String> {
        let (Some(definition), Some(index)) = (self.lab.definition(), self.lab.active_step_index())
        else {
            return Vec::new();
        };
        let Some(step) = definition.steps.get(index) else {
            return Vec::new();
        };
        vec![
            format!("Step {}/{}: {}", index + 1, definition.steps.len(), step.title),
            format!("  {}", step.instruction),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_store::SqliteStore;

    fn console() -> (Console, Arc<dyn Store>) {
        let curriculum = Arc::new(academy_config::builtin_curriculum().unwrap());
        let store: Arc<dyn Store> = Arc::new(SqliteStore::in_memory().unwrap());
        (Console::new(curriculum, store.clone()), store)
    }

    fn has(reply: &Reply, needle: &str) -> bool {
        reply.lines.iter().any(|l| l.contains(needle))
    }

    #[tokio::test]
    async fn rejects_bad_code() {
        let (mut c, _) = console();
        let reply = c.handle("login WRONG").await;
        assert!(has(&reply, "Invalid access code"));
        assert!(!c.is_logged_in());
    }

    #[tokio::test]
    async fn lab_walkthrough_marks_progress() {
        let (mut c, store) = console();
        assert!(has(&c.handle("linux2024premium").await, "Welcome"));

        c.handle("open week1-session1").await;
        assert_eq!(c.prompt(), "academy:week1-session1> ");

        let reply = c.handle("lab basic-navigation").await;
        assert!(has(&reply, "Step 1/4"));
        assert_eq!(c.prompt(), PROMPT);

        let reply = c.handle("foo").await;
        assert_eq!(reply.lines, ["foo: command not found"]);

        assert!(has(&c.handle(":hint").await, "pwd"));

        for line in ["pwd", "ls", "ls -la"] {
            c.handle(line).await;
        }
        let reply = c.handle("whoami").await;
        assert!(has(&reply, "Lab complete"));

        c.handle(":quit").await;
        let reply = c.handle("sessions").await;
        assert!(has(&reply, "labs 1/3"));

        c.handle("logout").await;
        let record = store
            .load_learner(&academy_util::LearnerId::new("user_001"), academy_util::now())
            .unwrap()
            .unwrap();
        let session = record.progress.get(&SessionId::new("week1-session1")).unwrap();
        assert!(session.is_lab_completed(&LabId::new("basic-navigation")));
    }

    #[tokio::test]
    async fn missing_lab_is_a_dead_end() {
        let (mut c, _) = console();
        c.handle("LINUX2024PREMIUM").await;
        c.handle("open week1-session2").await;

        assert!(has(&c.handle("lab io-redirection").await, "Lab Not Found"));
        assert!(has(&c.handle("pwd").await, "not available"));
        assert!(has(&c.handle(":quit").await, "Back to session"));
    }

    #[tokio::test]
    async fn unknown_session_shows_not_found_page() {
        let (mut c, _) = console();
        c.handle("LINUX2024PREMIUM").await;
        assert!(has(&c.handle("open week9-session9").await, "Session Not Found"));
        assert_eq!(c.prompt(), "academy> ");
    }

    #[tokio::test]
    async fn complete_updates_dashboard() {
        let (mut c, _) = console();
        c.handle("LINUX2024PREMIUM").await;
        c.handle("open week1-session1").await;

        assert!(has(&c.handle("complete").await, "13%"));
        assert!(has(&c.handle("complete").await, "already"));

        c.handle("back").await;
        let reply = c.handle("dashboard").await;
        assert!(has(&reply, "1/8 sessions"));
        assert!(has(&reply, "First Steps"));
    }

    #[tokio::test]
    async fn quit_logs_out() {
        let (mut c, _) = console();
        c.handle("LINUX2024PREMIUM").await;
        let reply = c.handle("quit").await;
        assert!(reply.quit);
        assert!(!c.is_logged_in());
    }
}
