//! JSON file backed message store
//!
//! The file holds a JSON array of [`OutgoingMessage`] objects. Messages are
//! loaded into memory on open and on [`FileMessageStore::reload`].

use super::types::OutgoingMessage;
use super::MessageStore;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Message store loaded from a JSON file
pub struct FileMessageStore {
    path: Option<PathBuf>,
    messages: Arc<RwLock<HashMap<String, OutgoingMessage>>>,
}

impl FileMessageStore {
    /// Open a store from a JSON file
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let messages = Self::load_from_disk(&path).await?;

        tracing::info!(
            "Loaded {} outgoing messages from {}",
            messages.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path),
            messages: Arc::new(RwLock::new(messages)),
        })
    }

    /// Create an in-memory store from a list of messages
    pub fn from_messages(messages: Vec<OutgoingMessage>) -> Self {
        Self {
            path: None,
            messages: Arc::new(RwLock::new(index(messages))),
        }
    }

    /// Insert or replace a message
    pub async fn insert(&self, message: OutgoingMessage) {
        self.messages
            .write()
            .await
            .insert(message.key.clone(), message);
    }

    /// Number of stored messages
    pub async fn len(&self) -> usize {
        self.messages.read().await.len()
    }

    /// Whether the store holds no messages
    pub async fn is_empty(&self) -> bool {
        self.messages.read().await.is_empty()
    }

    /// Re-read the backing file, replacing all messages
    pub async fn reload(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Err(Error::Store("In-memory store has no file to reload".to_string()));
        };

        let messages = Self::load_from_disk(path).await?;
        *self.messages.write().await = messages;
        Ok(())
    }

    async fn load_from_disk(path: &Path) -> Result<HashMap<String, OutgoingMessage>> {
        let data = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let messages: Vec<OutgoingMessage> = serde_json::from_str(&data).map_err(|e| {
            Error::Store(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(index(messages))
    }
}

fn index(messages: Vec<OutgoingMessage>) -> HashMap<String, OutgoingMessage> {
    let mut map = HashMap::with_capacity(messages.len());
    for message in messages {
        if map.contains_key(&message.key) {
            tracing::warn!("Duplicate outgoing message key '{}', keeping the last", message.key);
        }
        map.insert(message.key.clone(), message);
    }
    map
}

#[async_trait]
impl MessageStore for FileMessageStore {
    async fn get(&self, key: &str) -> Result<OutgoingMessage> {
        self.find(key)
            .await?
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn find(&self, key: &str) -> Result<Option<OutgoingMessage>> {
        Ok(self.messages.read().await.get(key).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MessageKind;
    use serde_json::json;

    fn write_messages(dir: &tempfile::TempDir, value: serde_json::Value) -> PathBuf {
        let path = dir.path().join("messages.json");
        std::fs::write(&path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn test_open_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_messages(
            &dir,
            json!([
                {"key": "unknown", "text": "Sorry, I didn't get that"},
                {"key": "welcome", "kind": "template", "template_name": "welcome_v2"}
            ]),
        );

        let store = FileMessageStore::open(&path).await.unwrap();
        assert_eq!(store.len().await, 2);

        let welcome = store.get("welcome").await.unwrap();
        assert_eq!(welcome.kind, MessageKind::Template);
        assert_eq!(welcome.template_name.as_deref(), Some("welcome_v2"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = FileMessageStore::from_messages(vec![]);
        assert!(store.is_empty().await);
        assert!(matches!(store.get("nope").await, Err(Error::NotFound(_))));
        assert!(store.find("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_keys_last_wins() {
        let store = FileMessageStore::from_messages(vec![
            OutgoingMessage::text("a", "first"),
            OutgoingMessage::text("a", "second"),
        ]);
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get("a").await.unwrap().text.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let store = FileMessageStore::from_messages(vec![OutgoingMessage::text("a", "old")]);
        store.insert(OutgoingMessage::text("a", "new")).await;
        store.insert(OutgoingMessage::text("b", "other")).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await.unwrap().text.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_reload_picks_up_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_messages(&dir, json!([{"key": "a", "text": "one"}]));
        let store = FileMessageStore::open(&path).await.unwrap();

        write_messages(&dir, json!([{"key": "a", "text": "two"}, {"key": "b"}]));
        store.reload().await.unwrap();

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("a").await.unwrap().text.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn test_reload_in_memory_fails() {
        let store = FileMessageStore::from_messages(vec![]);
        assert!(matches!(store.reload().await, Err(Error::Store(_))));
    }

    #[tokio::test]
    async fn test_open_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FileMessageStore::open(&path).await.err().unwrap();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileMessageStore::open(dir.path().join("absent.json"))
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("Failed to read"));
    }
}
