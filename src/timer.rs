//! Pomodoro focus timer.
//!
//! `FocusTimer` owns the whole countdown session: mode, remaining seconds,
//! the running flag, the focus label and when the work session started.
//! The one-second clock (`Metronome`) lives inside the timer and exists
//! exactly while the timer is active, so dropping the timer or stopping it
//! on any path releases the clock with it.

use chrono::NaiveDateTime;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::session::{self, Finalization};

pub const WORK_DURATION_SECS: u32 = 25 * 60;
pub const SHORT_BREAK_DURATION_SECS: u32 = 5 * 60;
pub const LONG_BREAK_DURATION_SECS: u32 = 15 * 60;

/// Reasons offered when a work session is ended early
pub const EARLY_END_REASONS: [&str; 4] = ["提前完成", "已放棄", "要做別的事情", "其他因素"];

const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Work,
    ShortBreak,
    LongBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSpec {
    pub duration_secs: u32,
    pub label: &'static str,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Work, Mode::ShortBreak, Mode::LongBreak];

    pub fn spec(self) -> ModeSpec {
        match self {
            Mode::Work => ModeSpec {
                duration_secs: WORK_DURATION_SECS,
                label: "專注工作",
            },
            Mode::ShortBreak => ModeSpec {
                duration_secs: SHORT_BREAK_DURATION_SECS,
                label: "短暫休息",
            },
            Mode::LongBreak => ModeSpec {
                duration_secs: LONG_BREAK_DURATION_SECS,
                label: "長期休息",
            },
        }
    }

    pub fn duration_secs(self) -> u32 {
        self.spec().duration_secs
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    #[error("Enter a task label before starting a focus session")]
    MissingTaskLabel,
    #[error("The task label can only change while a work session is paused")]
    LabelLocked,
    #[error("Only a running work session can be ended early")]
    NotRunningWork,
    #[error("No early-end prompt is open")]
    NoPromptOpen,
}

/// What happened on a tick or an early end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// Work countdown reached zero and was finalized
    WorkFinished(Finalization),
    /// Work session confirmed as ended early and was finalized
    EndedEarly(Finalization),
    /// A break reached zero; the timer is back in work mode
    BreakFinished,
}

impl TimerEvent {
    /// Expiries ring the bell; an early end was the user's own action
    pub fn wants_notification(&self) -> bool {
        matches!(self, TimerEvent::WorkFinished(_) | TimerEvent::BreakFinished)
    }

    pub fn finalization(&self) -> Option<&Finalization> {
        match self {
            TimerEvent::WorkFinished(f) | TimerEvent::EndedEarly(f) => Some(f),
            TimerEvent::BreakFinished => None,
        }
    }
}

/// The ephemeral countdown state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSession {
    pub mode: Mode,
    pub seconds_left: u32,
    pub active: bool,
    pub current_task_text: String,
    pub session_start: Option<NaiveDateTime>,
    pub pomodoros_completed: u32,
}

impl Default for TimerSession {
    fn default() -> Self {
        Self {
            mode: Mode::Work,
            seconds_left: WORK_DURATION_SECS,
            active: false,
            current_task_text: String::new(),
            session_start: None,
            pomodoros_completed: 0,
        }
    }
}

/// Repeating one-second deadline
#[derive(Debug, Clone)]
pub struct Metronome {
    next_due: Instant,
}

impl Metronome {
    pub fn start(at: Instant) -> Self {
        Self { next_due: at + TICK }
    }

    /// Whole seconds elapsed since the last call, advancing the deadline
    pub fn due_ticks(&mut self, now: Instant) -> u32 {
        let mut due = 0;
        while now >= self.next_due {
            due += 1;
            self.next_due += TICK;
        }
        due
    }
}

#[derive(Debug, Default)]
pub struct FocusTimer {
    pub(crate) session: TimerSession,
    clock: Option<Metronome>,
    early_end_prompt: bool,
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &TimerSession {
        &self.session
    }

    pub fn mode(&self) -> Mode {
        self.session.mode
    }

    pub fn seconds_left(&self) -> u32 {
        self.session.seconds_left
    }

    pub fn is_active(&self) -> bool {
        self.session.active
    }

    pub fn task_text(&self) -> &str {
        &self.session.current_task_text
    }

    pub fn pomodoros_completed(&self) -> u32 {
        self.session.pomodoros_completed
    }

    pub fn is_early_end_prompt_open(&self) -> bool {
        self.early_end_prompt
    }

    /// True while a one-second clock is live; always equal to `is_active()`
    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    /// Work mode with a blank label cannot be started
    pub fn can_start(&self) -> bool {
        self.session.active
            || self.session.mode != Mode::Work
            || !self.session.current_task_text.trim().is_empty()
    }

    /// Fraction of the current countdown already elapsed, 0.0..=1.0
    pub fn progress(&self) -> f64 {
        let total = self.session.mode.duration_secs();
        if total == 0 {
            return 0.0;
        }
        f64::from(total.saturating_sub(self.session.seconds_left)) / f64::from(total)
    }

    fn set_active(&mut self, active: bool) {
        self.session.active = active;
        // Replacing the option drops any previous clock first
        self.clock = if active { Some(Metronome::start(Instant::now())) } else { None };
    }

    /// Cancel whatever is running and load a fresh countdown for `mode`.
    /// Never logs a task.
    pub fn switch_mode(&mut self, mode: Mode) {
        self.set_active(false);
        self.early_end_prompt = false;
        self.session.mode = mode;
        self.session.seconds_left = mode.duration_secs();
        tracing::debug!(?mode, "timer mode switched");
    }

    /// Change the focus label. Only while a work countdown is paused.
    pub fn set_task_text(&mut self, text: &str) -> Result<(), TimerError> {
        if self.session.active || self.session.mode != Mode::Work {
            return Err(TimerError::LabelLocked);
        }
        self.session.current_task_text = text.to_string();
        Ok(())
    }

    /// Start or pause. Returns the new running state.
    pub fn toggle(&mut self, now: NaiveDateTime) -> Result<bool, TimerError> {
        if !self.can_start() {
            return Err(TimerError::MissingTaskLabel);
        }
        let activate = !self.session.active;
        if activate && self.session.mode == Mode::Work && self.session.session_start.is_none() {
            self.session.session_start = Some(now);
        }
        self.set_active(activate);
        if !activate {
            self.early_end_prompt = false;
        }
        Ok(activate)
    }

    /// Advance the countdown by one second. No-op while paused.
    pub fn tick(&mut self, now: NaiveDateTime) -> Option<TimerEvent> {
        if !self.session.active {
            return None;
        }
        self.session.seconds_left = self.session.seconds_left.saturating_sub(1);
        if self.session.seconds_left > 0 {
            return None;
        }

        self.set_active(false);
        self.early_end_prompt = false;
        match self.session.mode {
            Mode::Work => Some(TimerEvent::WorkFinished(session::finalize(self, now, None))),
            Mode::ShortBreak | Mode::LongBreak => {
                self.switch_mode(Mode::Work);
                Some(TimerEvent::BreakFinished)
            }
        }
    }

    /// Drive the countdown from the clock: one tick per whole second elapsed
    /// since the last poll. Stops early once the timer is no longer active.
    pub fn poll(&mut self, instant: Instant, now: NaiveDateTime) -> Vec<TimerEvent> {
        let due = match self.clock.as_mut() {
            Some(clock) => clock.due_ticks(instant),
            None => return Vec::new(),
        };

        let mut events = Vec::new();
        for _ in 0..due {
            if !self.session.active {
                break;
            }
            if let Some(event) = self.tick(now) {
                events.push(event);
            }
        }
        events
    }

    /// Open the reason prompt. The countdown keeps running while it is open.
    pub fn request_early_end(&mut self) -> Result<(), TimerError> {
        if !self.session.active || self.session.mode != Mode::Work {
            return Err(TimerError::NotRunningWork);
        }
        self.early_end_prompt = true;
        Ok(())
    }

    /// Close the prompt without touching the countdown
    pub fn cancel_early_end(&mut self) {
        self.early_end_prompt = false;
    }

    /// Stop the clock and finalize the work session with `reason`
    pub fn confirm_early_end(
        &mut self,
        reason: &str,
        now: NaiveDateTime,
    ) -> Result<TimerEvent, TimerError> {
        if !self.early_end_prompt {
            return Err(TimerError::NoPromptOpen);
        }
        self.early_end_prompt = false;
        self.set_active(false);
        let finalization = session::finalize(self, now, Some(reason));
        Ok(TimerEvent::EndedEarly(finalization))
    }
}

/// `MM:SS` for the countdown display
pub fn format_countdown(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(time: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(&format!("2026-02-16 {time}"), "%Y-%m-%d %H:%M:%S")
            .expect("valid time")
    }

    fn started(label: &str, time: &str) -> FocusTimer {
        let mut timer = FocusTimer::new();
        timer.set_task_text(label).expect("label");
        assert!(timer.toggle(at(time)).expect("start"));
        timer
    }

    /// Tick once per second starting just after `start`
    fn run_ticks(timer: &mut FocusTimer, start: NaiveDateTime, count: u32) -> Vec<TimerEvent> {
        (1..=count)
            .filter_map(|n| timer.tick(start + chrono::Duration::seconds(i64::from(n))))
            .collect()
    }

    #[test]
    fn initial_state_is_paused_work() {
        let timer = FocusTimer::new();
        assert_eq!(timer.mode(), Mode::Work);
        assert_eq!(timer.seconds_left(), 1500);
        assert!(!timer.is_active());
        assert!(!timer.has_clock());
        assert_eq!(timer.pomodoros_completed(), 0);
    }

    #[test]
    fn mode_durations_are_fixed() {
        assert_eq!(Mode::Work.duration_secs(), 1500);
        assert_eq!(Mode::ShortBreak.duration_secs(), 300);
        assert_eq!(Mode::LongBreak.duration_secs(), 900);
    }

    #[test]
    fn work_cannot_start_without_label() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.toggle(at("09:00:00")), Err(TimerError::MissingTaskLabel));
        timer.set_task_text("   ").expect("label");
        assert_eq!(timer.toggle(at("09:00:00")), Err(TimerError::MissingTaskLabel));
        assert!(!timer.is_active());
        assert!(timer.session().session_start.is_none());
    }

    #[test]
    fn breaks_start_without_label() {
        let mut timer = FocusTimer::new();
        timer.switch_mode(Mode::ShortBreak);
        assert!(timer.toggle(at("09:00:00")).expect("start break"));
        assert!(timer.session().session_start.is_none());
    }

    #[test]
    fn clock_lives_exactly_while_active() {
        let mut timer = started("Draft report", "09:00:00");
        assert!(timer.has_clock());
        assert!(!timer.toggle(at("09:01:00")).expect("pause"));
        assert!(!timer.has_clock());
        timer.toggle(at("09:02:00")).expect("resume");
        assert!(timer.has_clock());
        timer.switch_mode(Mode::LongBreak);
        assert!(!timer.has_clock());
    }

    #[test]
    fn resume_keeps_original_start() {
        let mut timer = started("Draft report", "09:00:00");
        timer.toggle(at("09:05:00")).expect("pause");
        timer.toggle(at("09:20:00")).expect("resume");
        assert_eq!(timer.session().session_start, Some(at("09:00:00")));
    }

    #[test]
    fn label_is_locked_while_running_or_on_break() {
        let mut timer = started("Draft report", "09:00:00");
        assert_eq!(timer.set_task_text("other"), Err(TimerError::LabelLocked));
        timer.switch_mode(Mode::ShortBreak);
        assert_eq!(timer.set_task_text("other"), Err(TimerError::LabelLocked));
    }

    #[test]
    fn tick_is_noop_while_paused() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.tick(at("09:00:01")), None);
        assert_eq!(timer.seconds_left(), 1500);
    }

    #[test]
    fn natural_completion_logs_draft_report() {
        let mut timer = started("Draft report", "09:00:00");
        let events = run_ticks(&mut timer, at("09:00:00"), 1500);

        assert_eq!(events.len(), 1);
        let TimerEvent::WorkFinished(finalization) = &events[0] else {
            panic!("expected work completion, got {:?}", events[0]);
        };
        let record = finalization.record.as_ref().expect("record");
        assert_eq!(record.text, "Draft report");
        assert_eq!(record.start_time, "09:00");
        assert_eq!(record.end_time, "09:25");
        assert_eq!(finalization.pomodoros_completed, 1);
        assert_eq!(finalization.next_mode, Mode::ShortBreak);

        assert_eq!(timer.mode(), Mode::ShortBreak);
        assert_eq!(timer.seconds_left(), 300);
        assert_eq!(timer.pomodoros_completed(), 1);
        assert!(!timer.is_active());
        assert!(!timer.has_clock());
        assert_eq!(timer.task_text(), "");
        assert!(timer.session().session_start.is_none());
        assert!(events[0].wants_notification());
    }

    #[test]
    fn early_end_tags_reason() {
        let mut timer = started("Draft report", "09:00:00");
        run_ticks(&mut timer, at("09:00:00"), 600);
        timer.request_early_end().expect("prompt");
        let event = timer
            .confirm_early_end("提前完成", at("09:10:00"))
            .expect("confirm");

        let TimerEvent::EndedEarly(finalization) = &event else {
            panic!("expected early end, got {event:?}");
        };
        let record = finalization.record.as_ref().expect("record");
        assert_eq!(record.text, "Draft report (提前完成)");
        assert_eq!(record.start_time, "09:00");
        assert_eq!(record.end_time, "09:10");
        assert_eq!(timer.mode(), Mode::ShortBreak);
        assert_eq!(timer.pomodoros_completed(), 1);
        assert!(!timer.has_clock());
        assert!(!event.wants_notification());
    }

    #[test]
    fn early_end_prompt_does_not_pause_countdown() {
        let mut timer = started("Draft report", "09:00:00");
        timer.request_early_end().expect("prompt");
        run_ticks(&mut timer, at("09:00:00"), 30);
        assert!(timer.is_active());
        assert_eq!(timer.seconds_left(), 1470);

        timer.cancel_early_end();
        assert!(!timer.is_early_end_prompt_open());
        assert!(timer.is_active());
        assert_eq!(timer.seconds_left(), 1470);
        assert_eq!(timer.pomodoros_completed(), 0);
    }

    #[test]
    fn expiry_while_prompt_open_takes_natural_path() {
        let mut timer = started("Draft report", "09:00:00");
        run_ticks(&mut timer, at("09:00:00"), 1490);
        timer.request_early_end().expect("prompt");
        let events = run_ticks(&mut timer, at("09:24:50"), 10);
        assert!(matches!(events.as_slice(), [TimerEvent::WorkFinished(_)]));
        assert!(!timer.is_early_end_prompt_open());
        assert_eq!(
            timer.confirm_early_end("已放棄", at("09:25:01")),
            Err(TimerError::NoPromptOpen)
        );
    }

    #[test]
    fn early_end_requires_running_work() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.request_early_end(), Err(TimerError::NotRunningWork));
        timer.switch_mode(Mode::ShortBreak);
        timer.toggle(at("09:00:00")).expect("start break");
        assert_eq!(timer.request_early_end(), Err(TimerError::NotRunningWork));
    }

    #[test]
    fn break_expiry_returns_to_work() {
        let mut timer = FocusTimer::new();
        timer.switch_mode(Mode::LongBreak);
        timer.toggle(at("10:00:00")).expect("start");
        let events = run_ticks(&mut timer, at("10:00:00"), 900);
        assert_eq!(events, vec![TimerEvent::BreakFinished]);
        assert_eq!(timer.mode(), Mode::Work);
        assert_eq!(timer.seconds_left(), 1500);
        assert!(!timer.is_active());
        assert_eq!(timer.pomodoros_completed(), 0);
    }

    #[test]
    fn metronome_counts_whole_seconds() {
        let start = Instant::now();
        let mut metronome = Metronome::start(start);
        assert_eq!(metronome.due_ticks(start + Duration::from_millis(999)), 0);
        assert_eq!(metronome.due_ticks(start + Duration::from_millis(1000)), 1);
        assert_eq!(metronome.due_ticks(start + Duration::from_millis(3500)), 2);
        assert_eq!(metronome.due_ticks(start + Duration::from_millis(3900)), 0);
    }

    #[test]
    fn poll_without_clock_does_nothing() {
        let mut timer = FocusTimer::new();
        let later = Instant::now() + Duration::from_secs(10);
        assert!(timer.poll(later, at("09:00:10")).is_empty());
        assert_eq!(timer.seconds_left(), 1500);
    }

    #[test]
    fn poll_catches_up_and_stops_at_expiry() {
        let mut timer = FocusTimer::new();
        timer.switch_mode(Mode::ShortBreak);
        timer.toggle(at("09:00:00")).expect("start");
        // Far more than the break length: ticking must stop at expiry
        let later = Instant::now() + Duration::from_secs(10_000);
        let events = timer.poll(later, at("11:00:00"));
        assert_eq!(events, vec![TimerEvent::BreakFinished]);
        assert_eq!(timer.mode(), Mode::Work);
        assert_eq!(timer.seconds_left(), 1500);
    }

    #[test]
    fn countdown_format_is_zero_padded() {
        assert_eq!(format_countdown(1500), "25:00");
        assert_eq!(format_countdown(65), "01:05");
        assert_eq!(format_countdown(0), "00:00");
    }

    proptest! {
        #[test]
        fn switching_mode_never_finalizes(ticks in 0u32..1499, target in 0usize..3) {
            let mut timer = started("Draft report", "09:00:00");
            let events = run_ticks(&mut timer, at("09:00:00"), ticks);
            prop_assert!(events.is_empty());

            timer.switch_mode(Mode::ALL[target]);
            prop_assert_eq!(timer.pomodoros_completed(), 0);
            prop_assert!(!timer.is_active());
            prop_assert!(!timer.has_clock());
            prop_assert_eq!(timer.mode(), Mode::ALL[target]);
            prop_assert_eq!(timer.seconds_left(), Mode::ALL[target].duration_secs());
        }

        #[test]
        fn rotation_follows_session_count(sessions in prop::collection::vec(any::<bool>(), 1..13)) {
            let mut timer = FocusTimer::new();
            let mut clock = at("08:00:00");
            for (index, natural) in sessions.iter().enumerate() {
                let n = index as u32 + 1;
                timer.switch_mode(Mode::Work);
                timer.set_task_text(&format!("session {n}")).expect("label");
                timer.toggle(clock).expect("start");

                let finalization = if *natural {
                    let events = run_ticks(&mut timer, clock, 1500);
                    clock += chrono::Duration::seconds(1500);
                    events[0].finalization().cloned().expect("finalized")
                } else {
                    clock += chrono::Duration::seconds(60);
                    timer.request_early_end().expect("prompt");
                    timer.confirm_early_end(EARLY_END_REASONS[index % 4], clock)
                        .expect("confirm")
                        .finalization()
                        .cloned()
                        .expect("finalized")
                };

                let expected = if n % 4 == 0 { Mode::LongBreak } else { Mode::ShortBreak };
                prop_assert_eq!(finalization.pomodoros_completed, n);
                prop_assert_eq!(finalization.next_mode, expected);
                prop_assert_eq!(timer.mode(), expected);

                let record = finalization.record.expect("labelled sessions are logged");
                prop_assert!(record.start_time <= record.end_time);
            }
        }
    }
}
