use thiserror::Error;

use crate::database::DatabaseError;
use crate::models::{DailyLog, Mood, Task};
use crate::session::SessionRecord;
use crate::store::LogStore;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("Store error: {0}")]
    Store(#[from] DatabaseError),
    #[error("Task text must not be empty")]
    EmptyTask,
    #[error("Invalid task: {0}")]
    InvalidTask(String),
}

/// Per-date task and mood operations.
///
/// Every mutation is one read-modify-write of a whole `DailyLog` through
/// `LogStore::update`; reading a date never creates it.
pub struct Journal<S: LogStore> {
    store: S,
}

impl<S: LogStore> Journal<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The log for a date, or the empty default if nothing was stored yet
    pub fn log(&self, date: &str) -> Result<DailyLog, JournalError> {
        Ok(self.store.read(date)?.unwrap_or_default())
    }

    pub fn add_task(&self, date: &str, text: &str) -> Result<Task, JournalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::EmptyTask);
        }
        self.append(date, Task::new(text.to_string()))
    }

    /// Append a task with an explicit time range (manual entry of a past session)
    pub fn add_timed_task(
        &self,
        date: &str,
        text: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<Task, JournalError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(JournalError::EmptyTask);
        }
        let task = Task::timed(text.to_string(), start_time.to_string(), end_time.to_string());
        task.validate().map_err(JournalError::InvalidTask)?;
        self.append(date, task)
    }

    /// Persist the outcome of a finished focus session
    pub fn record_session(&self, date: &str, record: SessionRecord) -> Result<Task, JournalError> {
        let task = record.into_task();
        tracing::info!(date, text = %task.text, range = ?task.time_range(), "focus session logged");
        self.append(date, task)
    }

    fn append(&self, date: &str, task: Task) -> Result<Task, JournalError> {
        let created = task.clone();
        self.store.update(date, move |log| log.push_task(task))?;
        Ok(created)
    }

    /// Flip completion; returns false when no task has this id
    pub fn toggle_complete(&self, date: &str, id: &str) -> Result<bool, JournalError> {
        let mut found = false;
        self.store.update(date, |log| found = log.toggle_task(id))?;
        Ok(found)
    }

    /// Remove exactly the task with this id; returns false when absent
    pub fn delete_task(&self, date: &str, id: &str) -> Result<bool, JournalError> {
        let mut found = false;
        self.store.update(date, |log| found = log.remove_task(id))?;
        Ok(found)
    }

    pub fn set_mood(&self, date: &str, mood: Mood) -> Result<(), JournalError> {
        self.store.update(date, |log| log.set_mood(mood))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLogStore;

    const DAY: &str = "2026-02-16";

    fn journal() -> Journal<InMemoryLogStore> {
        Journal::new(InMemoryLogStore::new())
    }

    #[test]
    fn reading_a_date_does_not_create_it() {
        let journal = journal();
        assert_eq!(journal.log(DAY).expect("log"), DailyLog::default());
        assert!(journal.store().is_empty());
    }

    #[test]
    fn add_task_trims_and_rejects_empty_text() {
        let journal = journal();
        let task = journal.add_task(DAY, "  Write report ").expect("add");
        assert_eq!(task.text, "Write report");
        assert!(matches!(journal.add_task(DAY, "   "), Err(JournalError::EmptyTask)));
        assert_eq!(journal.log(DAY).expect("log").tasks, vec![task]);
    }

    #[test]
    fn add_timed_task_validates_range() {
        let journal = journal();
        assert!(journal.add_timed_task(DAY, "Focus", "09:00", "9:25").is_err());
        let task = journal
            .add_timed_task(DAY, "Focus", "09:00", "09:25")
            .expect("add timed");
        assert_eq!(task.time_range().as_deref(), Some("09:00 - 09:25"));
    }

    #[test]
    fn toggle_twice_is_identity() {
        let journal = journal();
        let task = journal.add_task(DAY, "Plan sprint").expect("add");

        assert!(journal.toggle_complete(DAY, &task.id).expect("toggle"));
        assert!(journal.log(DAY).expect("log").tasks[0].completed);
        assert!(journal.toggle_complete(DAY, &task.id).expect("toggle"));
        assert!(!journal.log(DAY).expect("log").tasks[0].completed);
    }

    #[test]
    fn delete_removes_one_and_keeps_order() {
        let journal = journal();
        let a = journal.add_task(DAY, "a").expect("add");
        let b = journal.add_task(DAY, "b").expect("add");
        let c = journal.add_task(DAY, "c").expect("add");

        assert!(journal.delete_task(DAY, &b.id).expect("delete"));
        assert!(!journal.delete_task(DAY, &b.id).expect("delete again"));
        let ids: Vec<String> = journal.log(DAY).expect("log").tasks.into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[test]
    fn set_mood_keeps_tasks() {
        let journal = journal();
        journal.add_task(DAY, "a").expect("add");
        journal.set_mood(DAY, Mood::Awful).expect("mood");
        journal.set_mood(DAY, Mood::Good).expect("mood");
        let log = journal.log(DAY).expect("log");
        assert_eq!(log.tasks.len(), 1);
        assert_eq!(log.mood, Some(Mood::Good));
    }

    #[test]
    fn dates_are_independent() {
        let journal = journal();
        journal.add_task(DAY, "monday").expect("add");
        journal.add_task("2026-02-17", "tuesday").expect("add");
        assert_eq!(journal.log(DAY).expect("log").tasks.len(), 1);
        assert_eq!(journal.log("2026-02-17").expect("log").tasks[0].text, "tuesday");
    }
}
