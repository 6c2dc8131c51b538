//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world: search
//! the web, evaluate math, run code snippets, query uploaded documents.
//!
//! The registry converts every internal tool failure into a failed
//! [`ToolResult`] — tool execution never propagates an error into the
//! reasoning loop.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use crate::error::ToolError;

/// Parameters for a tool call, as parsed from the model's `key=value` lines.
pub type ToolParams = BTreeMap<String, String>;

/// The result of a tool execution.
///
/// Invariant: `error` is set iff `success` is false; `content` may be empty
/// when the call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content
    pub content: String,

    /// Optional structured metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,

    /// Error description, present only on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// Create a successful result.
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            success: true,
            content: content.into(),
            metadata: None,
            error: None,
        }
    }

    /// Create a successful result with metadata.
    pub fn ok_with_metadata(
        content: impl Into<String>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: true,
            content: content.into(),
            metadata: Some(metadata),
            error: None,
        }
    }

    /// Create a failed result.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            content: String::new(),
            metadata: None,
            error: Some(error.into()),
        }
    }
}

/// The core Tool trait.
///
/// Each tool (web_search, calculator, code_execution, document_search, ...)
/// implements this trait. Tools are registered in the ToolRegistry and made
/// available to the reasoning loop.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "calculator").
    fn name(&self) -> &str;

    /// A description of what this tool does, including its parameters and a
    /// usage example. Rendered verbatim into the reasoning prompt.
    fn description(&self) -> &str;

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: &ToolParams) -> std::result::Result<ToolResult, ToolError>;
}

/// A registry of available tools.
///
/// The reasoning loop uses this to:
/// 1. Render the tool catalogue into the reasoning prompt
/// 2. Look up and execute tools when the model requests them
///
/// Tools are kept in registration order so the catalogue is stable.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Appended in order; the first match wins on lookup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        tracing::info!(tool = tool.name(), "Registered tool");
        self.tools.push(tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Human/model-readable catalogue of all registered tools, concatenated
    /// in registration order.
    pub fn describe(&self) -> String {
        if self.tools.is_empty() {
            return "No tools available.".into();
        }

        self.tools
            .iter()
            .map(|t| format!("**{}**\n{}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Execute a tool by name.
    ///
    /// Never raises: an unknown name or an internal tool failure is
    /// converted into a failed [`ToolResult`].
    pub async fn execute(&self, name: &str, params: &ToolParams) -> ToolResult {
        let Some(tool) = self.get(name) else {
            return ToolResult::failed(format!(
                "Tool '{}' not found. Available tools: {:?}",
                name,
                self.names()
            ));
        };

        tracing::info!(tool = name, ?params, "Executing tool");

        match tool.execute(params).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = name, error = %e, "Tool execution failed");
                ToolResult::failed(format!("Tool execution failed: {e}"))
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
