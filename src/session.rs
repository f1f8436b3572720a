//! Finalized runs and the newest-first history they live in.

use chrono::{DateTime, TimeZone, Utc};

use crate::stopwatch::FinishedRun;

const LOCAL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const UNKNOWN_DATE: &str = "Unknown date";

/// An immutable record of one completed run.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    total_ms: u64,
    laps: Vec<u64>,
    recorded_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(total_ms: u64, laps: Vec<u64>, recorded_at: Option<DateTime<Utc>>) -> Self {
        Self { total_ms, laps, recorded_at }
    }

    pub fn from_run(run: FinishedRun, recorded_at: DateTime<Utc>) -> Self {
        Self::new(run.total_ms, run.laps, Some(recorded_at))
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Laps in recording order.
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        self.recorded_at
    }

    /// Recording time rendered in the given zone, or a placeholder when the
    /// stored timestamp could not be read back.
    pub fn recorded_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        match self.recorded_at {
            Some(at) => at.with_timezone(tz).format(LOCAL_FORMAT).to_string(),
            None => UNKNOWN_DATE.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionHistory {
    sessions: Vec<Session>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects `sessions` already newest-first.
    pub fn from_sessions(sessions: Vec<Session>) -> Self {
        Self { sessions }
    }

    pub fn prepend(&mut self, session: Session) {
        self.sessions.insert(0, session);
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    /// Newest first.
    pub fn iter(&self) -> std::slice::Iter<'_, Session> {
        self.sessions.iter()
    }
}
