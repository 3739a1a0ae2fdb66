use crate::{Config, Database};
use crate::journal::Journal;
use crate::models::{DailyLog, Mood, Task, UserProfile};
use crate::notify::{self, Notifier};
use crate::profile;
use crate::review::{GeminiClient, ReviewGenerator, ReviewJob, ReviewOutcome, ReviewStatus};
use crate::timer::{self, FocusTimer, TimerEvent};
use crate::tui::error::TuiError;
use crate::tui::widgets::input_line::LineInput;
use crate::utils;
use ratatui::widgets::ListState;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPurpose {
    FocusLabel,
    NewTask,
    GotoDate,
}

impl InputPurpose {
    pub fn title(self) -> &'static str {
        match self {
            InputPurpose::FocusLabel => "Focus on",
            InputPurpose::NewTask => "New task",
            InputPurpose::GotoDate => "Go to date (YYYY-MM-DD)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
    Input(InputPurpose),
    EndEarly,
    MoodPicker,
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub selected_index: usize,
    pub list_state: ListState,
    pub review_scroll: usize,
    pub reason_selection: usize,
    pub mood_selection: usize,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            selected_index: 0,
            list_state: ListState::default(),
            review_scroll: 0,
            reason_selection: 0,
            mood_selection: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

/// Review panel contents, tied to the date it was requested for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Pending { date: String },
    Ready { date: String, outcome: ReviewOutcome },
}

pub struct App {
    pub config: Config,
    pub journal: Journal<Database>,
    pub profile: UserProfile,
    pub timer: FocusTimer,

    /// Date whose log is displayed and receives finished sessions
    pub selected_date: String,
    pub log: DailyLog,

    pub ui: UiState,
    pub status: StatusState,
    pub input: LineInput,
    pub review: ReviewState,

    review_job: Option<ReviewJob>,
    generator: Arc<dyn ReviewGenerator>,
    notifier: Box<dyn Notifier>,
}

impl App {
    /// Open the TUI state. Refuses to start before a profile exists.
    pub fn new(config: Config, database: Database) -> Result<Self, TuiError> {
        let user = profile::require(&database)?;
        let generator: Arc<dyn ReviewGenerator> = Arc::new(GeminiClient::from_config(&config.review));
        let notifier = notify::from_settings(config.sound_enabled);
        Self::from_parts(config, database, user, generator, notifier)
    }

    pub fn from_parts(
        config: Config,
        database: Database,
        profile: UserProfile,
        generator: Arc<dyn ReviewGenerator>,
        notifier: Box<dyn Notifier>,
    ) -> Result<Self, TuiError> {
        let mut app = Self {
            config,
            journal: Journal::new(database),
            profile,
            timer: FocusTimer::new(),
            selected_date: utils::get_current_date_string(),
            log: DailyLog::default(),
            ui: UiState::default(),
            status: StatusState::default(),
            input: LineInput::default(),
            review: ReviewState::Idle,
            review_job: None,
            generator,
            notifier,
        };
        app.reload_log()?;
        Ok(app)
    }

    pub fn reload_log(&mut self) -> Result<(), TuiError> {
        self.log = self.journal.log(&self.selected_date)?;
        self.adjust_selected_index();
        Ok(())
    }

    /// Report an error in the status bar instead of tearing down the UI
    fn report<T, E: std::fmt::Display>(&mut self, context: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, "{}", context);
                self.set_status_message(format!("{}: {}", context, e));
                None
            }
        }
    }

    // ----- selection -----

    pub fn selected_task(&self) -> Option<&Task> {
        self.log.tasks.get(self.ui.selected_index)
    }

    pub fn sync_list_state(&mut self) {
        if self.log.tasks.is_empty() {
            self.ui.list_state.select(None);
        } else {
            self.ui.list_state.select(Some(self.ui.selected_index));
        }
    }

    pub fn adjust_selected_index(&mut self) {
        let len = self.log.tasks.len();
        if self.ui.selected_index >= len {
            self.ui.selected_index = len.saturating_sub(1);
        }
        self.sync_list_state();
    }

    pub fn move_selection_up(&mut self) {
        if self.ui.selected_index > 0 {
            self.ui.selected_index -= 1;
            self.sync_list_state();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.ui.selected_index + 1 < self.log.tasks.len() {
            self.ui.selected_index += 1;
            self.sync_list_state();
        }
    }

    // ----- status bar -----

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    /// Check if status message should be auto-cleared (after 4 seconds)
    pub fn check_status_message_timeout(&mut self) {
        const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 4;
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }

    // ----- dates -----

    /// Show another day. The timer keeps running; later sessions log there.
    pub fn select_date(&mut self, date: String) -> Result<(), TuiError> {
        if date == self.selected_date {
            return Ok(());
        }
        self.selected_date = date;
        self.ui.selected_index = 0;
        self.ui.review_scroll = 0;
        if !matches!(self.review, ReviewState::Pending { .. }) {
            self.review = ReviewState::Idle;
        }
        self.reload_log()
    }

    pub fn shift_day(&mut self, days: i64) -> Result<(), TuiError> {
        let date = utils::shift_date(&self.selected_date, days);
        self.select_date(date)
    }

    pub fn goto_today(&mut self) -> Result<(), TuiError> {
        self.select_date(utils::get_current_date_string())
    }

    pub fn is_today(&self) -> bool {
        self.selected_date == utils::get_current_date_string()
    }

    // ----- timer -----

    pub fn toggle_timer(&mut self) {
        match self.timer.toggle(utils::local_now()) {
            Ok(true) => tracing::debug!(mode = ?self.timer.mode(), "timer started"),
            Ok(false) => tracing::debug!(mode = ?self.timer.mode(), "timer paused"),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn switch_timer_mode(&mut self, mode: timer::Mode) {
        if self.timer.mode() == mode && !self.timer.is_active() {
            return;
        }
        self.timer.switch_mode(mode);
        self.set_status_message(format!("Switched to {}", mode.label()));
    }

    /// Advance the countdown and collect a finished review. Called every loop.
    pub fn on_tick(&mut self, now: Instant) {
        let events = self.timer.poll(now, utils::local_now());
        for event in events {
            self.handle_timer_event(event);
        }
        // Countdown may have expired under the prompt
        if self.ui.mode == Mode::EndEarly && !self.timer.is_early_end_prompt_open() {
            self.ui.mode = Mode::View;
        }
        self.poll_review();
    }

    /// Persist a finished session, ring, refresh the list
    pub fn handle_timer_event(&mut self, event: TimerEvent) {
        let save_error = event.finalization().and_then(|finalization| {
            let record = finalization.record.clone()?;
            self.journal.record_session(&self.selected_date, record).err()
        });
        self.notifier.notify(&event);
        let result = self.reload_log();
        self.report("Failed to reload log", result);

        // Set last so a lost record is never reported as done
        if let Some(error) = save_error {
            tracing::error!(%error, date = %self.selected_date, "failed to save session");
            self.set_status_message(format!("Failed to save session: {}", error));
            return;
        }
        match &event {
            TimerEvent::WorkFinished(finalization) | TimerEvent::EndedEarly(finalization) => {
                self.set_status_message(format!(
                    "Pomodoro #{} done. Time for {}",
                    finalization.pomodoros_completed,
                    finalization.next_mode.label()
                ));
            }
            TimerEvent::BreakFinished => {
                self.set_status_message("Break over. Back to work".to_string());
            }
        }
    }

    pub fn open_end_early(&mut self) {
        match self.timer.request_early_end() {
            Ok(()) => {
                self.ui.reason_selection = 0;
                self.ui.mode = Mode::EndEarly;
            }
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn confirm_end_early(&mut self) {
        let reason = timer::EARLY_END_REASONS[self.ui.reason_selection % timer::EARLY_END_REASONS.len()];
        self.ui.mode = Mode::View;
        match self.timer.confirm_early_end(reason, utils::local_now()) {
            Ok(event) => self.handle_timer_event(event),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    pub fn cancel_end_early(&mut self) {
        self.timer.cancel_early_end();
        self.ui.mode = Mode::View;
    }

    // ----- text input -----

    pub fn begin_input(&mut self, purpose: InputPurpose) {
        let initial = match purpose {
            InputPurpose::FocusLabel => {
                if self.timer.is_active() || self.timer.mode() != timer::Mode::Work {
                    self.set_status_message(timer::TimerError::LabelLocked.to_string());
                    return;
                }
                self.timer.task_text().to_string()
            }
            InputPurpose::NewTask => String::new(),
            InputPurpose::GotoDate => self.selected_date.clone(),
        };
        self.input = LineInput::with_text(&initial);
        self.ui.mode = Mode::Input(purpose);
    }

    pub fn cancel_input(&mut self) {
        self.input = LineInput::default();
        self.ui.mode = Mode::View;
    }

    pub fn submit_input(&mut self) {
        let Mode::Input(purpose) = self.ui.mode else {
            return;
        };
        let text = self.input.text().to_string();
        match purpose {
            InputPurpose::FocusLabel => {
                let result = self.timer.set_task_text(text.trim());
                self.report("Cannot change label", result);
            }
            InputPurpose::NewTask => {
                if text.trim().is_empty() {
                    self.cancel_input();
                    return;
                }
                let date = self.selected_date.clone();
                let result = self.journal.add_task(&date, &text);
                if self.report("Failed to add task", result).is_some() {
                    let result = self.reload_log();
                    self.report("Failed to reload log", result);
                    self.ui.selected_index = self.log.tasks.len().saturating_sub(1);
                    self.sync_list_state();
                }
            }
            InputPurpose::GotoDate => {
                let Ok(date) = utils::normalize_date(&text) else {
                    self.set_status_message(format!("Not a date: {}", text.trim()));
                    return;
                };
                let result = self.select_date(date);
                self.report("Failed to load date", result);
            }
        }
        self.cancel_input();
    }

    // ----- tasks and mood -----

    pub fn toggle_selected_task(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        let date = self.selected_date.clone();
        let result = self.journal.toggle_complete(&date, &id);
        self.report("Failed to update task", result);
        let result = self.reload_log();
        self.report("Failed to reload log", result);
    }

    pub fn delete_selected_task(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        let date = self.selected_date.clone();
        let result = self.journal.delete_task(&date, &id);
        if let Some(true) = self.report("Failed to delete task", result) {
            self.set_status_message("Task deleted".to_string());
        }
        let result = self.reload_log();
        self.report("Failed to reload log", result);
    }

    pub fn open_mood_picker(&mut self) {
        self.ui.mood_selection = self
            .log
            .mood
            .and_then(|mood| Mood::ALL.iter().position(|m| *m == mood))
            .unwrap_or(Mood::ALL.len() / 2);
        self.ui.mode = Mode::MoodPicker;
    }

    pub fn confirm_mood(&mut self) {
        let mood = Mood::ALL[self.ui.mood_selection % Mood::ALL.len()];
        self.ui.mode = Mode::View;
        let date = self.selected_date.clone();
        let result = self.journal.set_mood(&date, mood);
        if self.report("Failed to save mood", result).is_some() {
            self.log.mood = Some(mood);
            self.set_status_message(format!("Mood: {}", mood.label()));
        }
    }

    // ----- review -----

    pub fn is_review_pending(&self) -> bool {
        matches!(self.review, ReviewState::Pending { .. })
    }

    pub fn request_review(&mut self) {
        if self.is_review_pending() {
            return;
        }
        self.ui.review_scroll = 0;
        self.review = ReviewState::Pending {
            date: self.selected_date.clone(),
        };
        self.review_job = Some(ReviewJob::spawn(
            Arc::clone(&self.generator),
            self.log.tasks.clone(),
            self.log.mood,
            Some(self.profile.clone()),
        ));
    }

    fn poll_review(&mut self) {
        let Some(job) = self.review_job.as_mut() else {
            return;
        };
        let ReviewStatus::Ready(outcome) = job.poll() else {
            return;
        };
        self.review_job = None;
        let date = match &self.review {
            ReviewState::Pending { date } => date.clone(),
            _ => self.selected_date.clone(),
        };
        if date == self.selected_date {
            self.review = ReviewState::Ready { date, outcome };
        } else {
            self.review = ReviewState::Idle;
            self.set_status_message(format!("Review for {} finished; reopen that day to request it again", date));
        }
    }

    /// Text currently shown in the review panel, if any
    pub fn review_text(&self) -> Option<&str> {
        match &self.review {
            ReviewState::Ready { outcome, .. } => Some(outcome.message()),
            _ => None,
        }
    }

    pub fn copy_review(&mut self) {
        let Some(text) = self.review_text().map(str::to_string) else {
            self.set_status_message("No review to copy".to_string());
            return;
        };
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        if self.report("Clipboard unavailable", result).is_some() {
            self.set_status_message("Review copied to clipboard".to_string());
        }
    }

    pub fn scroll_review_up(&mut self, lines: usize) {
        self.ui.review_scroll = self.ui.review_scroll.saturating_sub(lines);
    }

    pub fn scroll_review_down(&mut self, lines: usize) {
        self.ui.review_scroll = self.ui.review_scroll.saturating_add(lines);
    }

    // ----- help -----

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }
}
