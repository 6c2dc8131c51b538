//! Prompt builder — three pure functions, one per generating stage.
//!
//! Prior tool outputs are truncated to a fixed preview length in the
//! reasoning and synthesis prompts to bound prompt growth; the final-answer
//! prompt gets the untruncated content.

use reagent_core::message::ChatMessage;

use crate::state::AgentState;

/// Preview length for tool output embedded in reasoning/synthesis prompts.
const TOOL_PREVIEW_CHARS: usize = 400;

/// Build the reasoning prompt: pick the next action.
pub fn reasoning_prompt(state: &AgentState, tool_catalogue: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are a helpful assistant that reasons step by step and may use tools.\n\n",
    );
    prompt.push_str("Available tools:\n");
    prompt.push_str(tool_catalogue);
    prompt.push_str("\n\n");

    push_history(&mut prompt, &state.messages);

    push_trace(&mut prompt, state, true);

    prompt.push_str(&format!(
        "\nThis is reasoning step {} of at most {}.\n\n",
        state.current_step, state.max_iterations
    ));
    prompt.push_str(
        "Respond in exactly this format:\n\
**Thought:** your reasoning about what to do next\n\
**Action:** one tool name from the list above, or final_answer if you can already answer\n\
**Action Parameters:** key=value lines, one per line (omit if the action takes none)\n",
    );

    prompt
}

/// Build the synthesis prompt: decide whether to stop or keep going.
pub fn synthesis_prompt(state: &AgentState, tool_catalogue: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str(
        "You are evaluating whether enough information has been gathered to \
answer the user.\n\n",
    );
    prompt.push_str("Available tools:\n");
    prompt.push_str(tool_catalogue);
    prompt.push_str("\n\n");

    push_history(&mut prompt, &state.messages);

    push_trace(&mut prompt, state, true);

    prompt.push_str(
        "\nIf the gathered information is sufficient, choose final_answer. \
Otherwise choose the single most useful next tool.\n\n\
Respond in exactly this format:\n\
**Evaluation:** whether the information gathered so far is sufficient, and why\n\
**Action:** final_answer, or one tool name from the list above\n\
**Action Parameters:** key=value lines, one per line (omit if none)\n",
    );

    prompt
}

/// Build the final-answer prompt: free text, no structural fields.
pub fn final_answer_prompt(state: &AgentState) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a helpful assistant.\n\n");

    push_history(&mut prompt, &state.messages);

    // Full, untruncated tool output — this is what the answer draws on.
    push_trace(&mut prompt, state, false);

    prompt.push_str(
        "\nUsing the conversation and the gathered information above, write a \
natural, complete answer to the user's last message. Respond with the answer \
text only, no labels or formatting scaffolding.\n",
    );

    prompt
}

fn push_history(prompt: &mut String, messages: &[ChatMessage]) {
    prompt.push_str("Conversation so far:\n");
    for message in messages {
        prompt.push_str(&format!("{}: {}\n", message.role.as_str(), message.content));
    }
}

fn push_trace(prompt: &mut String, state: &AgentState, truncate: bool) {
    if !state.reasoning_steps.is_empty() {
        prompt.push_str("\nPrevious reasoning steps:\n");
        for step in &state.reasoning_steps {
            prompt.push_str(&format!(
                "Step {}: thought: {} | action: {}\n",
                step.step, step.thought, step.action
            ));
        }
    }

    if !state.tool_results.is_empty() {
        prompt.push_str("\nTool results so far:\n");
        for result in &state.tool_results {
            let status = if result.success { "ok" } else { "failed" };
            let body = if result.success {
                result.content.as_str()
            } else {
                result.error.as_deref().unwrap_or("unknown error")
            };
            let body = if truncate {
                preview(body, TOOL_PREVIEW_CHARS)
            } else {
                body.to_string()
            };
            prompt.push_str(&format!(
                "[step {}] {} ({status}): {}\n",
                result.step, result.tool, body
            ));
        }
    }
}

/// Truncate to a character budget with an ellipsis marker.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut out: String = text.chars().take(max).collect();
        out.push('…');
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reagent_core::tool::{ToolParams, ToolResult};

    fn state_with_tool_output(content: &str) -> AgentState {
        let mut state = AgentState::new(vec![], "What is sqrt(16)+2?", "thread_a", 5);
        state.current_step = 1;
        state.record_reasoning(
            "need to compute".into(),
            "calculator".into(),
            ToolParams::new(),
        );
        state.record_tool_result(
            "calculator".into(),
            ToolParams::new(),
            ToolResult::ok(content),
        );
        state
    }

    #[test]
    fn reasoning_prompt_includes_catalogue_and_format() {
        let state = AgentState::new(vec![], "Hello", "thread_a", 5);
        let prompt = reasoning_prompt(&state, "**calculator**\nEvaluate expressions.");
        assert!(prompt.contains("**calculator**"));
        assert!(prompt.contains("**Thought:**"));
        assert!(prompt.contains("**Action:**"));
        assert!(prompt.contains("user: Hello"));
    }

    #[test]
    fn reasoning_prompt_truncates_tool_output() {
        let long = "x".repeat(1000);
        let state = state_with_tool_output(&long);
        let prompt = reasoning_prompt(&state, "catalogue");
        assert!(prompt.contains('…'));
        assert!(!prompt.contains(&long));
    }

    #[test]
    fn final_answer_prompt_keeps_full_tool_output() {
        let long = "x".repeat(1000);
        let state = state_with_tool_output(&long);
        let prompt = final_answer_prompt(&state);
        assert!(prompt.contains(&long));
        assert!(!prompt.contains("**Thought:**"));
    }

    #[test]
    fn synthesis_prompt_asks_for_evaluation() {
        let state = state_with_tool_output("Calculation: sqrt(16)+2 = 6.0");
        let prompt = synthesis_prompt(&state, "catalogue");
        assert!(prompt.contains("**Evaluation:**"));
        assert!(prompt.contains("= 6.0"));
    }

    #[test]
    fn failed_tool_results_show_the_error() {
        let mut state = AgentState::new(vec![], "hi", "thread_a", 5);
        state.current_step = 1;
        state.record_tool_result(
            "calculator".into(),
            ToolParams::new(),
            ToolResult::failed("Division by zero"),
        );
        let prompt = reasoning_prompt(&state, "catalogue");
        assert!(prompt.contains("(failed)"));
        assert!(prompt.contains("Division by zero"));
    }
}
