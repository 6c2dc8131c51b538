//! The ReAct reasoning loop for Reagent.
//!
//! One user turn flows through a four-stage state machine (reasoning, tool
//! execution, intermediate synthesis, final answer) driven by text-parsed
//! model output. Everything the loop needs — the model gateway and the tool
//! registry — is injected at construction.

pub mod machine;
pub mod parser;
pub mod prompts;
pub mod state;

pub use machine::AgentLoop;
pub use parser::{FINAL_ANSWER, ParsedResponse, parse_response};
pub use state::{
    AgentState, DEFAULT_MAX_ITERATIONS, ReasoningStep, ToolInvocation, TurnOutcome, TurnSettings,
};
