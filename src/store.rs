use std::collections::HashMap;
use std::sync::Mutex;

use crate::database::DatabaseError;
use crate::models::DailyLog;
use crate::utils::{date_key, parse_date};

/// Durable mapping from date key (YYYY-MM-DD) to that day's log.
///
/// `write` replaces the whole record; there is no partial update protocol.
/// `update` is the read-modify-write primitive every journal mutation goes
/// through. Implementations that can serialise writers per date should
/// override it.
pub trait LogStore {
    fn read(&self, date: &str) -> Result<Option<DailyLog>, DatabaseError>;

    fn write(&self, date: &str, log: &DailyLog) -> Result<(), DatabaseError>;

    fn update<F>(&self, date: &str, mutate: F) -> Result<DailyLog, DatabaseError>
    where
        F: FnOnce(&mut DailyLog),
    {
        let mut log = self.read(date)?.unwrap_or_default();
        mutate(&mut log);
        self.write(date, &log)?;
        Ok(log)
    }
}

impl<S: LogStore> LogStore for &S {
    fn read(&self, date: &str) -> Result<Option<DailyLog>, DatabaseError> {
        (**self).read(date)
    }

    fn write(&self, date: &str, log: &DailyLog) -> Result<(), DatabaseError> {
        (**self).write(date, log)
    }

    fn update<F>(&self, date: &str, mutate: F) -> Result<DailyLog, DatabaseError>
    where
        F: FnOnce(&mut DailyLog),
    {
        (**self).update(date, mutate)
    }
}

/// Only zero-padded `YYYY-MM-DD` keys; `2026-2-5` would split a day in two
pub(crate) fn check_date_key(date: &str) -> Result<(), DatabaseError> {
    match parse_date(date) {
        Ok(parsed) if date_key(parsed) == date => Ok(()),
        _ => Err(DatabaseError::InvalidDate(date.to_string())),
    }
}

#[derive(Debug, Default)]
pub struct InMemoryLogStore {
    logs: Mutex<HashMap<String, DailyLog>>,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of date keys that have been written
    pub fn len(&self) -> usize {
        self.logs.lock().map(|logs| logs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LogStore for InMemoryLogStore {
    fn read(&self, date: &str) -> Result<Option<DailyLog>, DatabaseError> {
        check_date_key(date)?;
        let logs = self
            .logs
            .lock()
            .map_err(|error| DatabaseError::LockPoisoned(error.to_string()))?;
        Ok(logs.get(date).cloned())
    }

    fn write(&self, date: &str, log: &DailyLog) -> Result<(), DatabaseError> {
        check_date_key(date)?;
        let mut logs = self
            .logs
            .lock()
            .map_err(|error| DatabaseError::LockPoisoned(error.to_string()))?;
        logs.insert(date.to_string(), log.clone());
        Ok(())
    }

    fn update<F>(&self, date: &str, mutate: F) -> Result<DailyLog, DatabaseError>
    where
        F: FnOnce(&mut DailyLog),
    {
        check_date_key(date)?;
        // Held across the whole cycle so concurrent updaters cannot lose writes
        let mut logs = self
            .logs
            .lock()
            .map_err(|error| DatabaseError::LockPoisoned(error.to_string()))?;
        let log = logs.entry(date.to_string()).or_default();
        mutate(log);
        Ok(log.clone())
    }
}
