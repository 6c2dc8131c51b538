//! # Reagent Core
//!
//! Domain types, traits, and error definitions for the Reagent conversational
//! agent service. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every collaborator is defined as a trait here. Implementations live in
//! their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StoreError, ToolError};
pub use message::{ChatMessage, Role, new_thread_id};
pub use provider::Provider;
pub use store::{DocumentHit, DocumentIndex, DocumentInfo, MessageStore, ThreadSummary};
pub use tool::{Tool, ToolParams, ToolRegistry, ToolResult};
