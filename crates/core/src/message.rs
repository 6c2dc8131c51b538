//! Chat message domain types.
//!
//! These are the core value objects that flow through the entire system:
//! the HTTP layer receives a user message → the reasoning loop processes it
//! → the final answer is appended and the whole thread is persisted.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
    /// System instructions
    System,
}

impl Role {
    /// Normalize external role spellings ("ai", "human") onto our enum.
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "assistant" | "ai" => Role::Assistant,
            "system" => Role::System,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// A single message in a conversation thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

/// Generate a fresh opaque thread identifier.
pub fn new_thread_id() -> String {
    format!("thread_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = ChatMessage::user("Hello, agent!");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello, agent!");
    }

    #[test]
    fn role_normalization() {
        assert_eq!(Role::normalize("ai"), Role::Assistant);
        assert_eq!(Role::normalize("human"), Role::User);
        assert_eq!(Role::normalize("assistant"), Role::Assistant);
        assert_eq!(Role::normalize("system"), Role::System);
        assert_eq!(Role::normalize("anything"), Role::User);
    }

    #[test]
    fn message_serialization_roundtrip() {
        let msg = ChatMessage::assistant("Test message");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        let deserialized: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, msg);
    }

    #[test]
    fn thread_ids_are_unique() {
        let a = new_thread_id();
        let b = new_thread_id();
        assert!(a.starts_with("thread_"));
        assert_ne!(a, b);
    }
}
