//! Persistence traits — conversation threads and the document index.
//!
//! The message store keeps whole conversation threads; a turn ends with a
//! full-replace `put` of the complete message list. The document index
//! backs the document_search and list_documents tools.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::StoreError;
use crate::message::ChatMessage;

/// Summary of a conversation thread, as returned by `list_threads`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub thread_id: String,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Conversation thread persistence.
///
/// Implementations: SQLite (durable) and in-memory (tests, ephemeral runs).
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Fetch all messages for a thread, in order. An unknown thread is an
    /// empty conversation, not an error.
    async fn get(&self, thread_id: &str) -> std::result::Result<Vec<ChatMessage>, StoreError>;

    /// Replace the entire message list for a thread.
    async fn put(
        &self,
        thread_id: &str,
        messages: &[ChatMessage],
    ) -> std::result::Result<(), StoreError>;

    /// Delete a thread and all its messages.
    async fn delete(&self, thread_id: &str) -> std::result::Result<(), StoreError>;

    /// List all known threads, most recently updated first.
    async fn list_threads(&self) -> std::result::Result<Vec<ThreadSummary>, StoreError>;

    /// Liveness probe for the health endpoint.
    async fn health(&self) -> bool {
        self.list_threads().await.is_ok()
    }
}

/// A scored document match from the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentHit {
    pub document_id: String,
    pub filename: String,
    pub content: String,
    pub similarity: f32,
}

/// A document known to the index, without scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Searchable document storage.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Find documents relevant to `query`, best matches first. Hits below
    /// `similarity_threshold` are dropped.
    async fn search(
        &self,
        query: &str,
        limit: usize,
        similarity_threshold: f32,
    ) -> std::result::Result<Vec<DocumentHit>, StoreError>;

    /// Enumerate indexed documents, newest first.
    async fn list(&self, limit: usize) -> std::result::Result<Vec<DocumentInfo>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_summary_serializes() {
        let summary = ThreadSummary {
            thread_id: "thread_abc".into(),
            message_count: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("thread_abc"));
        assert!(json.contains("\"message_count\":4"));
    }

    #[test]
    fn document_hit_serializes() {
        let hit = DocumentHit {
            document_id: "doc-1".into(),
            filename: "notes.md".into(),
            content: "quarterly planning notes".into(),
            similarity: 0.82,
        };
        let json = serde_json::to_string(&hit).unwrap();
        assert!(json.contains("notes.md"));
    }
}
