//! Persistence store — durable key/value storage for interview sessions.
//!
//! Key layout:
//! - `current-session`  → id of the in-progress session, or absent
//! - `session:<id>`     → codec wire form of one session
//! - `session-history`  → JSON list of lightweight summaries, not sessions
//!
//! `SessionStore` is the dependency-injected seam: `AppState` carries an
//! `Arc<dyn SessionStore>`, backed by redis in production and by
//! `MemoryStore` in tests. Both go through the codec, so the wire form is
//! identical across backings.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::session::codec::{self, CodecError};
use crate::session::model::{ExperienceTier, InterviewSession, RoleCategory};

pub const CURRENT_SESSION_KEY: &str = "current-session";
pub const HISTORY_KEY: &str = "session-history";

pub fn session_key(id: Uuid) -> String {
    format!("session:{id}")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Lightweight history-ledger record for one completed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: Uuid,
    pub role_type: RoleCategory,
    pub experience_level: ExperienceTier,
    pub created_at: String,
    pub completed_at: Option<String>,
    pub overall_score: Option<f64>,
}

impl SessionSummary {
    pub fn of(session: &InterviewSession) -> Self {
        SessionSummary {
            id: session.id,
            role_type: session.parsed_jd.role_type,
            experience_level: session.parsed_jd.experience_level,
            created_at: codec::format_timestamp(session.created_at),
            completed_at: session.completed_at.map(codec::format_timestamp),
            overall_score: session.session_feedback.as_ref().map(|f| f.overall_score),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Serializes and writes the session under its own key, then points
    /// `current-session` at it.
    async fn save(&self, session: &InterviewSession) -> Result<(), StoreError>;

    /// Absent key → `Ok(None)`. A stored value that no longer deserializes
    /// also degrades to `Ok(None)` (logged), trading the corrupt record for
    /// availability.
    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError>;

    /// Resolves the `current-session` pointer, then loads.
    async fn load_current(&self) -> Result<Option<InterviewSession>, StoreError>;

    /// No error if the pointer is already absent.
    async fn clear_current_pointer(&self) -> Result<(), StoreError>;

    /// No error if the session is already absent.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Upserts this session's summary into the history ledger by id —
    /// replaced in place when present, appended otherwise. Never duplicates.
    async fn save_to_history(&self, session: &InterviewSession) -> Result<(), StoreError>;

    /// The stored ledger; unset or corrupted degrades to empty.
    async fn history(&self) -> Result<Vec<SessionSummary>, StoreError>;

    /// Deletes every session referenced in history, then the ledger, then
    /// the current pointer.
    async fn clear_all(&self) -> Result<(), StoreError>;
}

/// Parses raw ledger text, degrading corruption to an empty list.
fn parse_history(raw: Option<String>) -> Vec<SessionSummary> {
    match raw {
        None => Vec::new(),
        Some(text) => match serde_json::from_str(&text) {
            Ok(list) => list,
            Err(e) => {
                warn!("session history is corrupted, treating as empty: {e}");
                Vec::new()
            }
        },
    }
}

fn upsert_summary(mut history: Vec<SessionSummary>, summary: SessionSummary) -> Vec<SessionSummary> {
    match history.iter_mut().find(|s| s.id == summary.id) {
        Some(slot) => *slot = summary,
        None => history.push(summary),
    }
    history
}

/// Decodes stored wire text, degrading deserialization failure to `None`.
fn decode_stored(id: Uuid, raw: Option<String>) -> Option<InterviewSession> {
    let text = raw?;
    match codec::deserialize(&text) {
        Ok(session) => Some(session),
        Err(e) => {
            warn!("stored session {id} failed to deserialize, treating as absent: {e}");
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RedisStore — production backing
// ────────────────────────────────────────────────────────────────────────────

pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn conn(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

fn map_redis_err(e: redis::RedisError) -> StoreError {
    if e.code() == Some("OOM") {
        StoreError::QuotaExceeded(e.to_string())
    } else if e.is_connection_refusal() || e.is_io_error() || e.is_timeout() {
        StoreError::Unavailable(e.to_string())
    } else {
        StoreError::Backend(e.to_string())
    }
}

#[async_trait]
impl SessionStore for RedisStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let wire = codec::serialize(session)?;
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(session_key(session.id), wire)
            .await
            .map_err(map_redis_err)?;
        conn.set::<_, _, ()>(CURRENT_SESSION_KEY, session.id.to_string())
            .await
            .map_err(map_redis_err)?;
        debug!("saved session {}", session.id);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(session_key(id)).await.map_err(map_redis_err)?;
        Ok(decode_stored(id, raw))
    }

    async fn load_current(&self) -> Result<Option<InterviewSession>, StoreError> {
        let mut conn = self.conn().await?;
        let pointer: Option<String> = conn
            .get(CURRENT_SESSION_KEY)
            .await
            .map_err(map_redis_err)?;
        let Some(id) = pointer.and_then(|p| p.parse::<Uuid>().ok()) else {
            return Ok(None);
        };
        self.load(id).await
    }

    async fn clear_current_pointer(&self) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(CURRENT_SESSION_KEY)
            .await
            .map_err(map_redis_err)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(session_key(id))
            .await
            .map_err(map_redis_err)
    }

    async fn save_to_history(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(HISTORY_KEY).await.map_err(map_redis_err)?;
        let history = upsert_summary(parse_history(raw), SessionSummary::of(session));
        let text = serde_json::to_string(&history).map_err(CodecError::from)?;
        conn.set::<_, _, ()>(HISTORY_KEY, text)
            .await
            .map_err(map_redis_err)
    }

    async fn history(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let mut conn = self.conn().await?;
        let raw: Option<String> = conn.get(HISTORY_KEY).await.map_err(map_redis_err)?;
        Ok(parse_history(raw))
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let history = self.history().await?;
        let mut conn = self.conn().await?;
        for summary in &history {
            conn.del::<_, ()>(session_key(summary.id))
                .await
                .map_err(map_redis_err)?;
        }
        conn.del::<_, ()>(HISTORY_KEY).await.map_err(map_redis_err)?;
        conn.del::<_, ()>(CURRENT_SESSION_KEY)
            .await
            .map_err(map_redis_err)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemoryStore — in-process backing for tests and local development
// ────────────────────────────────────────────────────────────────────────────

/// Keeps the same wire-text representation redis would hold, so codec
/// behavior (including corruption degradation) is exercised identically.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    sessions: HashMap<Uuid, String>,
    current: Option<Uuid>,
    history: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn inject_raw_session(&self, id: Uuid, text: impl Into<String>) {
        self.inner.lock().unwrap().sessions.insert(id, text.into());
    }

    #[cfg(test)]
    pub fn inject_raw_history(&self, text: impl Into<String>) {
        self.inner.lock().unwrap().history = Some(text.into());
    }

    #[cfg(test)]
    pub fn current_pointer(&self) -> Option<Uuid> {
        self.inner.lock().unwrap().current
    }

    #[cfg(test)]
    pub fn stored_session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn save(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let wire = codec::serialize(session)?;
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(session.id, wire);
        inner.current = Some(session.id);
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError> {
        let raw = self.inner.lock().unwrap().sessions.get(&id).cloned();
        Ok(decode_stored(id, raw))
    }

    async fn load_current(&self) -> Result<Option<InterviewSession>, StoreError> {
        let Some(id) = self.inner.lock().unwrap().current else {
            return Ok(None);
        };
        self.load(id).await
    }

    async fn clear_current_pointer(&self) -> Result<(), StoreError> {
        self.inner.lock().unwrap().current = None;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.lock().unwrap().sessions.remove(&id);
        Ok(())
    }

    async fn save_to_history(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let history = upsert_summary(
            parse_history(inner.history.clone()),
            SessionSummary::of(session),
        );
        inner.history = Some(serde_json::to_string(&history).map_err(CodecError::from)?);
        Ok(())
    }

    async fn history(&self) -> Result<Vec<SessionSummary>, StoreError> {
        let raw = self.inner.lock().unwrap().history.clone();
        Ok(parse_history(raw))
    }

    async fn clear_all(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let history = parse_history(inner.history.clone());
        for summary in &history {
            inner.sessions.remove(&summary.id);
        }
        inner.history = None;
        inner.current = None;
        Ok(())
    }
}
