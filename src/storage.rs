use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::StoreError;
use crate::session::{Session, SessionHistory};

/// Version written into every saved record. Version 0 is the bare session
/// array written before the envelope existed.
pub const SCHEMA_VERSION: u32 = 1;

/// String key-value storage, shaped after the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Clones share contents.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    #[serde(default, deserialize_with = "de_millis")]
    total_time: u64,
    #[serde(default, deserialize_with = "de_millis_seq")]
    laps: Vec<u64>,
    #[serde(default, deserialize_with = "de_date")]
    date: String,
}

#[derive(Serialize, Deserialize)]
struct HistoryRecord {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    sessions: Vec<SessionRecord>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredHistory {
    Legacy(Vec<SessionRecord>),
    Versioned(HistoryRecord),
}

// Older writers stored plain JS numbers, which may carry a fraction.
fn millis_from(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

fn de_millis<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.map(millis_from).unwrap_or(0))
}

fn de_millis_seq<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u64>, D::Error> {
    Ok(Option::<Vec<f64>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .map(millis_from)
        .collect())
}

// A date that is null or not a string loads as unknown rather than failing
// the whole record.
fn de_date<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(date) => Ok(date),
        _ => Ok(String::new()),
    }
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        Self {
            total_time: session.total_ms(),
            laps: session.laps().to_vec(),
            date: session
                .recorded_at()
                .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_default(),
        }
    }
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        let recorded_at = DateTime::parse_from_rfc3339(&record.date)
            .ok()
            .map(|at| at.with_timezone(&Utc));
        Session::new(record.total_time, record.laps, recorded_at)
    }
}

pub fn encode_history(history: &SessionHistory) -> Result<String, StoreError> {
    let record = HistoryRecord {
        version: SCHEMA_VERSION,
        sessions: history.iter().map(SessionRecord::from).collect(),
    };
    serde_json::to_string(&record).map_err(StoreError::Encode)
}

pub fn decode_history(raw: &str) -> Result<SessionHistory, StoreError> {
    let records = match serde_json::from_str::<StoredHistory>(raw).map_err(StoreError::Decode)? {
        StoredHistory::Legacy(records) => records,
        StoredHistory::Versioned(record) => {
            if record.version > SCHEMA_VERSION {
                log::warn!(
                    "session history has schema version {}, newer than {}; reading best-effort",
                    record.version,
                    SCHEMA_VERSION
                );
            }
            record.sessions
        }
    };
    Ok(SessionHistory::from_sessions(
        records.into_iter().map(Session::from).collect(),
    ))
}

/// Persists the full session history under one fixed key.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    /// Never fails: unreadable or malformed data yields an empty history.
    pub fn load_history(&self) -> SessionHistory {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionHistory::new(),
            Err(e) => {
                log::warn!("Failed to read session history: {}", e);
                return SessionHistory::new();
            }
        };
        match decode_history(&raw) {
            Ok(history) => history,
            Err(e) => {
                log::warn!("Discarding stored session history: {}", e);
                SessionHistory::new()
            }
        }
    }

    /// Overwrites whatever is stored with the full history.
    pub fn save_history(&mut self, history: &SessionHistory) -> Result<(), StoreError> {
        let data = encode_history(history)?;
        self.backend.set(&self.key, &data)
    }

    /// Removes the key outright rather than storing an empty list.
    pub fn clear_history(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)
    }
}
