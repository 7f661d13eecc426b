//! Session-scoped result store: the last ranked list of each session.
//!
//! A run writes its filtered list here on success and clients read it back later.
//! Writes are last-write-wins per session with no expiry.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::lab::ScoredLab;

/// Fixed key name; each session's entry is `savedLabs:<session_id>`.
pub const SAVED_LABS_KEY: &str = "savedLabs";

/// What a session last saw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMatches {
    pub session_id: Uuid,
    pub computed_at: DateTime<Utc>,
    pub labs: Vec<ScoredLab>,
}

pub fn session_key(session_id: Uuid) -> String {
    format!("{SAVED_LABS_KEY}:{session_id}")
}

#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn load(&self, session_id: Uuid) -> Result<Option<SavedMatches>, AppError>;

    /// Overwrites whatever the session had saved.
    async fn save(&self, saved: &SavedMatches) -> Result<(), AppError>;
}

/// Redis-backed store, one JSON string per session.
#[derive(Clone)]
pub struct RedisResultStore {
    client: redis::Client,
}

impl RedisResultStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::ResultStore(format!("Redis connection failed: {e}")))
    }
}

#[async_trait]
impl ResultStore for RedisResultStore {
    async fn load(&self, session_id: Uuid) -> Result<Option<SavedMatches>, AppError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(session_key(session_id))
            .await
            .map_err(|e| AppError::ResultStore(format!("Redis GET failed: {e}")))?;

        raw.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| AppError::ResultStore(format!("Corrupt saved matches: {e}")))
        })
        .transpose()
    }

    async fn save(&self, saved: &SavedMatches) -> Result<(), AppError> {
        let json = serde_json::to_string(saved)
            .map_err(|e| AppError::ResultStore(format!("Serialize failed: {e}")))?;
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(session_key(saved.session_id), json)
            .await
            .map_err(|e| AppError::ResultStore(format!("Redis SET failed: {e}")))?;
        Ok(())
    }
}

/// In-process store used when no Redis URL is configured. Lost on restart.
///
/// Holds one entry per client-supplied session id and is never pruned. Anonymous runs
/// are not saved, so it only grows with the number of distinct sessions.
#[derive(Default)]
pub struct MemoryResultStore {
    entries: RwLock<HashMap<Uuid, SavedMatches>>,
}

#[cfg(test)]
impl MemoryResultStore {
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn load(&self, session_id: Uuid) -> Result<Option<SavedMatches>, AppError> {
        Ok(self.entries.read().await.get(&session_id).cloned())
    }

    async fn save(&self, saved: &SavedMatches) -> Result<(), AppError> {
        self.entries
            .write()
            .await
            .insert(saved.session_id, saved.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lab::make_lab;

    fn saved(session_id: Uuid, lab_ids: &[i64]) -> SavedMatches {
        SavedMatches {
            session_id,
            computed_at: Utc::now(),
            labs: lab_ids
                .iter()
                .map(|&id| ScoredLab {
                    lab: make_lab(id, "Lab"),
                    similarity_score: 5,
                    match_reason: "Good fit".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_session_key_uses_fixed_prefix() {
        let id = Uuid::nil();
        assert_eq!(
            session_key(id),
            "savedLabs:00000000-0000-0000-0000-000000000000"
        );
    }

    #[tokio::test]
    async fn test_memory_store_overwrites_per_session() {
        let store = MemoryResultStore::default();
        let session = Uuid::new_v4();

        assert!(store.load(session).await.unwrap().is_none());

        store.save(&saved(session, &[1, 2])).await.unwrap();
        store.save(&saved(session, &[3])).await.unwrap();

        let loaded = store.load(session).await.unwrap().unwrap();
        assert_eq!(loaded.labs.len(), 1);
        assert_eq!(loaded.labs[0].lab.id, 3);
    }

    #[tokio::test]
    async fn test_memory_store_isolates_sessions() {
        let store = MemoryResultStore::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.save(&saved(a, &[1])).await.unwrap();

        assert!(store.load(b).await.unwrap().is_none());
        assert_eq!(store.load(a).await.unwrap().unwrap().session_id, a);
    }

    #[test]
    fn test_saved_matches_json_shape() {
        let value = serde_json::to_value(saved(Uuid::nil(), &[4])).unwrap();
        assert_eq!(value["labs"][0]["id"], 4);
        assert_eq!(value["labs"][0]["similarity_score"], 5);
        assert!(value["computed_at"].is_string());
    }
}
