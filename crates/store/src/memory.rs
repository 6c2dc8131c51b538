//! In-memory conversation store.
//!
//! Same contract as the SQLite store, no durability. Used by tests and by
//! `store.backend = "memory"` runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reagent_core::error::StoreError;
use reagent_core::message::ChatMessage;
use reagent_core::store::{MessageStore, ThreadSummary};
use std::collections::HashMap;
use tokio::sync::RwLock;

struct ThreadEntry {
    messages: Vec<ChatMessage>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// An ephemeral message store backed by a HashMap.
#[derive(Default)]
pub struct InMemoryMessageStore {
    threads: RwLock<HashMap<String, ThreadEntry>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread_id)
            .map(|entry| entry.messages.clone())
            .unwrap_or_default())
    }

    async fn put(&self, thread_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let now = Utc::now();
        let mut threads = self.threads.write().await;
        threads
            .entry(thread_id.to_string())
            .and_modify(|entry| {
                entry.messages = messages.to_vec();
                entry.updated_at = now;
            })
            .or_insert_with(|| ThreadEntry {
                messages: messages.to_vec(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<(), StoreError> {
        let mut threads = self.threads.write().await;
        threads
            .remove(thread_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::ThreadNotFound(thread_id.to_string()))
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, StoreError> {
        let threads = self.threads.read().await;
        let mut summaries: Vec<ThreadSummary> = threads
            .iter()
            .map(|(thread_id, entry)| ThreadSummary {
                thread_id: thread_id.clone(),
                message_count: entry.messages.len() as u32,
                created_at: entry.created_at,
                updated_at: entry.updated_at,
            })
            .collect();
        summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_and_replace() {
        let store = InMemoryMessageStore::new();
        store
            .put("thread_a", &[ChatMessage::user("one")])
            .await
            .unwrap();
        store
            .put(
                "thread_a",
                &[ChatMessage::user("one"), ChatMessage::assistant("two")],
            )
            .await
            .unwrap();

        let loaded = store.get("thread_a").await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].content, "two");
    }

    #[tokio::test]
    async fn unknown_thread_is_empty() {
        let store = InMemoryMessageStore::new();
        assert!(store.get("thread_x").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_thread_errors() {
        let store = InMemoryMessageStore::new();
        assert!(store.delete("thread_x").await.is_err());
    }

    #[tokio::test]
    async fn list_counts_messages() {
        let store = InMemoryMessageStore::new();
        store
            .put("thread_a", &[ChatMessage::user("hi")])
            .await
            .unwrap();
        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].message_count, 1);
    }
}
