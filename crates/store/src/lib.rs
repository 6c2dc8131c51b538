//! Persistence backends for Reagent.
//!
//! Conversation threads live in SQLite (durable) or in memory (tests and
//! ephemeral runs). The document index backing document_search is an
//! in-memory keyword index.

pub mod documents;
pub mod memory;
pub mod sqlite;

pub use documents::InMemoryDocumentIndex;
pub use memory::InMemoryMessageStore;
pub use sqlite::SqliteMessageStore;
