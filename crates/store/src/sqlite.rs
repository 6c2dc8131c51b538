//! SQLite conversation store.
//!
//! Two tables:
//! - `conversation_threads` — one row per thread with timestamps
//! - `conversation_messages` — ordered messages, `message_order` preserves
//!   conversation order
//!
//! A turn ends with a full replace of the thread's message list, done in a
//! single transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reagent_core::error::StoreError;
use reagent_core::message::{ChatMessage, Role};
use reagent_core::store::{MessageStore, ThreadSummary};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A durable SQLite message store.
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    /// Create a new SQLite store from a file path.
    ///
    /// The database and tables are created automatically. Pass `":memory:"`
    /// for an in-process ephemeral database (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        // Each pool connection to ":memory:" would get its own database,
        // so in-memory runs are pinned to a single connection.
        let max_connections = if path.contains(":memory:") { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite message store initialized at {path}");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_threads (
                thread_id  TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("threads table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS conversation_messages (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id     TEXT NOT NULL REFERENCES conversation_threads(thread_id)
                              ON DELETE CASCADE,
                message_order INTEGER NOT NULL,
                role          TEXT NOT NULL,
                content       TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("messages table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_thread
             ON conversation_messages(thread_id, message_order)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("messages index: {e}")))?;

        Ok(())
    }

    fn parse_timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    async fn get(&self, thread_id: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query(
            "SELECT role, content FROM conversation_messages
             WHERE thread_id = ?1 ORDER BY message_order ASC",
        )
        .bind(thread_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| ChatMessage {
                role: Role::normalize(row.get::<&str, _>("role")),
                content: row.get("content"),
            })
            .collect())
    }

    async fn put(&self, thread_id: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        sqlx::query(
            "INSERT INTO conversation_threads (thread_id, created_at, updated_at)
             VALUES (?1, ?2, ?2)
             ON CONFLICT(thread_id) DO UPDATE SET updated_at = ?2",
        )
        .bind(thread_id)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        sqlx::query("DELETE FROM conversation_messages WHERE thread_id = ?1")
            .bind(thread_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        for (order, message) in messages.iter().enumerate() {
            sqlx::query(
                "INSERT INTO conversation_messages (thread_id, message_order, role, content)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(thread_id)
            .bind(order as i64)
            .bind(message.role.as_str())
            .bind(&message.content)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        debug!(thread_id, count = messages.len(), "Thread persisted");
        Ok(())
    }

    async fn delete(&self, thread_id: &str) -> Result<(), StoreError> {
        // ON DELETE CASCADE cleans up the messages
        let result = sqlx::query("DELETE FROM conversation_threads WHERE thread_id = ?1")
            .bind(thread_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ThreadNotFound(thread_id.to_string()));
        }

        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<ThreadSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT t.thread_id, t.created_at, t.updated_at,
                   COUNT(m.id) AS message_count
            FROM conversation_threads t
            LEFT JOIN conversation_messages m ON m.thread_id = t.thread_id
            GROUP BY t.thread_id
            ORDER BY t.updated_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::QueryFailed(e.to_string()))?;

        Ok(rows
            .iter()
            .map(|row| ThreadSummary {
                thread_id: row.get("thread_id"),
                message_count: row.get::<i64, _>("message_count") as u32,
                created_at: Self::parse_timestamp(row.get("created_at")),
                updated_at: Self::parse_timestamp(row.get("updated_at")),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteMessageStore {
        SqliteMessageStore::new(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn unknown_thread_is_empty() {
        let store = store().await;
        assert!(store.get("thread_missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_get_roundtrip_preserves_order() {
        let store = store().await;
        let messages = vec![
            ChatMessage::user("What is 2 + 2?"),
            ChatMessage::assistant("2 + 2 is 4."),
            ChatMessage::user("And doubled?"),
        ];
        store.put("thread_a", &messages).await.unwrap();

        let loaded = store.get("thread_a").await.unwrap();
        assert_eq!(loaded, messages);
    }

    #[tokio::test]
    async fn put_replaces_previous_contents() {
        let store = store().await;
        store
            .put("thread_a", &[ChatMessage::user("old")])
            .await
            .unwrap();
        let replacement = vec![ChatMessage::user("new"), ChatMessage::assistant("reply")];
        store.put("thread_a", &replacement).await.unwrap();

        assert_eq!(store.get("thread_a").await.unwrap(), replacement);
    }

    #[tokio::test]
    async fn delete_removes_thread_and_messages() {
        let store = store().await;
        store
            .put("thread_a", &[ChatMessage::user("hi")])
            .await
            .unwrap();
        store.delete("thread_a").await.unwrap();

        assert!(store.get("thread_a").await.unwrap().is_empty());
        assert!(store.list_threads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_thread_errors() {
        let store = store().await;
        assert!(matches!(
            store.delete("thread_missing").await,
            Err(StoreError::ThreadNotFound(_))
        ));
    }

    #[tokio::test]
    async fn list_threads_reports_counts() {
        let store = store().await;
        store
            .put(
                "thread_a",
                &[ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            )
            .await
            .unwrap();
        store
            .put("thread_b", &[ChatMessage::user("yo")])
            .await
            .unwrap();

        let threads = store.list_threads().await.unwrap();
        assert_eq!(threads.len(), 2);
        let a = threads.iter().find(|t| t.thread_id == "thread_a").unwrap();
        assert_eq!(a.message_count, 2);
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reagent.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteMessageStore::new(path).await.unwrap();
            store
                .put("thread_a", &[ChatMessage::user("durable?")])
                .await
                .unwrap();
        }

        let store = SqliteMessageStore::new(path).await.unwrap();
        let loaded = store.get("thread_a").await.unwrap();
        assert_eq!(loaded[0].content, "durable?");
    }
}
