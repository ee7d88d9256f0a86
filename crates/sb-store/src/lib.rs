use anyhow::Result;
use async_trait::async_trait;
use rocksdb::{DB, IteratorMode, Options};
use sb_api_types::ApprovedNamespace;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Persisted record of an established WalletConnect session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub topic: String,
    pub peer_name: String,
    pub peer_url: String,
    pub namespaces: BTreeMap<String, ApprovedNamespace>,
    pub account_ids: Vec<String>,
    pub created_at_epoch_ms: u128,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn save_session(&self, record: &SessionRecord) -> Result<()>;
    async fn load_session(&self, topic: &str) -> Result<Option<SessionRecord>>;
    /// Newest first.
    async fn list_sessions(&self) -> Result<Vec<SessionRecord>>;
    /// Returns whether a record existed.
    async fn remove_session(&self, topic: &str) -> Result<bool>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<()> {
        let mut guard = self.sessions.write().await;
        guard.insert(record.topic.clone(), record.clone());
        Ok(())
    }

    async fn load_session(&self, topic: &str) -> Result<Option<SessionRecord>> {
        let guard = self.sessions.read().await;
        Ok(guard.get(topic).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let guard = self.sessions.read().await;
        let mut sessions: Vec<SessionRecord> = guard.values().cloned().collect();
        sessions.sort_by(|a, b| b.created_at_epoch_ms.cmp(&a.created_at_epoch_ms));
        Ok(sessions)
    }

    async fn remove_session(&self, topic: &str) -> Result<bool> {
        let mut guard = self.sessions.write().await;
        Ok(guard.remove(topic).is_some())
    }
}

pub struct RocksDbSessionStore {
    db: Arc<DB>,
}

impl RocksDbSessionStore {
    pub fn open_default(path: &str) -> Result<Self> {
        let mut options = Options::default();
        options.create_if_missing(true);
        let db = DB::open(&options, path)?;
        Ok(Self { db: Arc::new(db) })
    }

    fn key_for_session(topic: &str) -> String {
        format!("session:{topic}")
    }

    fn key_for_preference(name: &str) -> String {
        format!("pref:{name}")
    }

    /// Persisted UI state (theme, last review choices). Plain strings on
    /// purpose; callers own the value format.
    pub fn save_preference(&self, name: &str, value: &str) -> Result<()> {
        let key = Self::key_for_preference(name);
        self.db.put(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    pub fn load_preference(&self, name: &str) -> Result<Option<String>> {
        let key = Self::key_for_preference(name);
        let value = self.db.get(key.as_bytes())?;
        match value {
            Some(raw) => Ok(Some(String::from_utf8(raw.to_vec())?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SessionStore for RocksDbSessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<()> {
        let key = Self::key_for_session(&record.topic);
        let value = serde_json::to_vec(record)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(())
    }

    async fn load_session(&self, topic: &str) -> Result<Option<SessionRecord>> {
        let key = Self::key_for_session(topic);
        let value = self.db.get(key.as_bytes())?;
        match value {
            Some(raw) => Ok(Some(serde_json::from_slice::<SessionRecord>(&raw)?)),
            None => Ok(None),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let mut sessions = Vec::new();

        for entry in self.db.iterator(IteratorMode::Start) {
            let (key, value) = entry?;
            if !key.as_ref().starts_with(b"session:") {
                continue;
            }
            sessions.push(serde_json::from_slice::<SessionRecord>(&value)?);
        }

        sessions.sort_by(|a, b| b.created_at_epoch_ms.cmp(&a.created_at_epoch_ms));
        Ok(sessions)
    }

    async fn remove_session(&self, topic: &str) -> Result<bool> {
        let key = Self::key_for_session(topic);
        let existed = self.db.get(key.as_bytes())?.is_some();
        if existed {
            self.db.delete(key.as_bytes())?;
        }
        Ok(existed)
    }
}
