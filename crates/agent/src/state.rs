//! Agent state — the mutable record threaded through one turn.
//!
//! Constructed fresh per incoming chat turn from persisted history plus the
//! new user message, mutated by every stage, and discarded once the final
//! answer is persisted. Durability belongs to the message store, not here.

use reagent_core::message::ChatMessage;
use reagent_core::tool::{ToolParams, ToolResult};
use serde::Serialize;

/// Default ceiling on reasoning passes per turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 5;

/// One recorded reasoning pass.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningStep {
    /// 1-indexed, contiguous
    pub step: u32,
    pub thought: String,
    pub action: String,
    pub params: ToolParams,
}

/// One recorded tool execution.
#[derive(Debug, Clone, Serialize)]
pub struct ToolInvocation {
    /// The reasoning pass this execution belongs to
    pub step: u32,
    pub tool: String,
    pub params: ToolParams,
    pub success: bool,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// The state object owned by one turn of the reasoning loop.
#[derive(Debug, Clone)]
pub struct AgentState {
    /// Prior history plus this turn's user message; the final answer is
    /// appended at termination
    pub messages: Vec<ChatMessage>,
    pub thread_id: String,
    /// Number of reasoning passes taken so far; never exceeds
    /// `max_iterations`
    pub current_step: u32,
    pub max_iterations: u32,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub tool_results: Vec<ToolInvocation>,
    /// Set exactly once, by the terminal stage
    pub final_answer: Option<String>,
    /// Scratch fields overwritten by whichever stage ran last
    pub current_thought: String,
    pub next_action: Option<String>,
    /// Parameters destined for the next tool call. Kept apart from the
    /// reasoning trace so stages cannot collide with recorded state.
    pub pending_params: ToolParams,
}

impl AgentState {
    /// Seed state for a new turn.
    pub fn new(
        history: Vec<ChatMessage>,
        user_message: &str,
        thread_id: impl Into<String>,
        max_iterations: u32,
    ) -> Self {
        let mut messages = history;
        messages.push(ChatMessage::user(user_message));
        Self {
            messages,
            thread_id: thread_id.into(),
            current_step: 0,
            max_iterations: max_iterations.max(1),
            reasoning_steps: Vec::new(),
            tool_results: Vec::new(),
            final_answer: None,
            current_thought: String::new(),
            next_action: None,
            pending_params: ToolParams::new(),
        }
    }

    /// This turn's user message (always the last seeded message).
    pub fn user_message(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Record a reasoning pass and update the scratch fields.
    pub fn record_reasoning(&mut self, thought: String, action: String, params: ToolParams) {
        self.reasoning_steps.push(ReasoningStep {
            step: self.current_step,
            thought: thought.clone(),
            action: action.clone(),
            params: params.clone(),
        });
        self.current_thought = thought;
        self.next_action = Some(action);
        self.pending_params = params;
    }

    /// Record a tool execution against the current step.
    pub fn record_tool_result(&mut self, tool: String, params: ToolParams, result: ToolResult) {
        self.tool_results.push(ToolInvocation {
            step: self.current_step,
            tool,
            params,
            success: result.success,
            content: result.content,
            error: result.error,
            metadata: result.metadata,
        });
    }
}

/// Per-turn overrides supplied by the caller.
#[derive(Debug, Clone, Default)]
pub struct TurnSettings {
    pub max_iterations: Option<u32>,
    pub provider: Option<reagent_providers::ProviderKind>,
}

/// The structured record `run_turn` hands back to the HTTP layer.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub final_answer: String,
    pub reasoning_steps: Vec<ReasoningStep>,
    pub tool_results: Vec<ToolInvocation>,
    pub current_step: u32,
    /// Full message list for persistence: prior history + user message +
    /// exactly one trailing assistant message
    pub messages: Vec<ChatMessage>,
}
