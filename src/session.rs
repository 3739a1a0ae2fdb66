use chrono::NaiveDateTime;

use crate::models::Task;
use crate::timer::{FocusTimer, Mode};

/// Pomodoros per cycle; every Nth completed session earns a long break
pub const SESSIONS_PER_LONG_BREAK: u32 = 4;

/// A finished work session ready to be appended to the day's log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub text: String,
    pub start_time: String,
    pub end_time: String,
}

impl SessionRecord {
    pub fn into_task(self) -> Task {
        Task::timed(self.text, self.start_time, self.end_time)
    }
}

/// Result of closing out a work session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finalization {
    /// `None` when there was no start stamp or the label was blank
    pub record: Option<SessionRecord>,
    pub pomodoros_completed: u32,
    pub next_mode: Mode,
}

pub fn format_hhmm(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Break that follows the `completed`-th work session
pub fn next_break(completed: u32) -> Mode {
    if completed > 0 && completed % SESSIONS_PER_LONG_BREAK == 0 {
        Mode::LongBreak
    } else {
        Mode::ShortBreak
    }
}

/// Close out the current work session.
///
/// Runs on natural expiry (`reason == None`) and on a confirmed early end.
/// The counter advances either way, even when nothing is logged.
pub(crate) fn finalize(
    timer: &mut FocusTimer,
    now: NaiveDateTime,
    reason: Option<&str>,
) -> Finalization {
    let session = &mut timer.session;
    let label = std::mem::take(&mut session.current_task_text);
    let start = session.session_start.take();

    let record = match start {
        Some(start) if !label.trim().is_empty() => {
            let text = match reason {
                Some(reason) => format!("{label} ({reason})"),
                None => label,
            };
            Some(SessionRecord {
                text,
                start_time: format_hhmm(start),
                end_time: format_hhmm(now),
            })
        }
        _ => None,
    };

    session.pomodoros_completed += 1;
    let completed = session.pomodoros_completed;
    let next_mode = next_break(completed);
    timer.switch_mode(next_mode);

    tracing::info!(
        completed,
        ?next_mode,
        early = reason.is_some(),
        logged = record.is_some(),
        "work session finalized"
    );

    Finalization {
        record,
        pomodoros_completed: completed,
        next_mode,
    }
}
