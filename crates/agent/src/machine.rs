//! The reasoning-loop state machine.
//!
//! One turn alternates among four stages:
//!
//! - `Reasoning` — ask the model what to do next; increments `current_step`
//! - `ToolExecution` — run the chosen tool, record the result, loop back
//! - `IntermediateSynthesis` — ask the model whether enough has been
//!   gathered; the only stage allowed to decide termination besides the
//!   iteration cap
//! - `FinalAnswer` — produce the reply (terminal)
//!
//! Splitting "decide next tool" from "decide whether to stop" lets the loop
//! re-evaluate sufficiency independently of the per-step tool choice, and
//! the iteration cap guarantees termination even if the model never emits
//! `final_answer`. Model or tool failures never abort the loop: they are
//! absorbed as degraded text or failed tool records and the turn still ends
//! with an answer.

use reagent_core::message::ChatMessage;
use reagent_core::tool::ToolRegistry;
use reagent_providers::ModelGateway;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::parser::{FINAL_ANSWER, parse_response};
use crate::prompts::{final_answer_prompt, reasoning_prompt, synthesis_prompt};
use crate::state::{AgentState, DEFAULT_MAX_ITERATIONS, TurnOutcome, TurnSettings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Reasoning,
    ToolExecution,
    IntermediateSynthesis,
    FinalAnswer,
}

/// The turn orchestrator. Collaborators are injected so tests can run the
/// loop against mock providers and a hand-built registry.
pub struct AgentLoop {
    gateway: Arc<ModelGateway>,
    tools: Arc<ToolRegistry>,
    default_max_iterations: u32,
}

impl AgentLoop {
    pub fn new(gateway: Arc<ModelGateway>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            gateway,
            tools,
            default_max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Set the default iteration cap (per-turn settings still override).
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.default_max_iterations = max.max(1);
        self
    }

    /// Run one full turn: prior history plus a new user message in, a final
    /// answer plus the complete reasoning trace out.
    pub async fn run_turn(
        &self,
        history: Vec<ChatMessage>,
        user_message: &str,
        thread_id: &str,
        settings: &TurnSettings,
    ) -> TurnOutcome {
        let max_iterations = settings
            .max_iterations
            .unwrap_or(self.default_max_iterations);
        let mut state = AgentState::new(history, user_message, thread_id, max_iterations);
        let catalogue = self.tools.describe();

        info!(
            thread_id,
            max_iterations = state.max_iterations,
            "Reasoning loop starting"
        );

        let mut stage = Stage::Reasoning;

        loop {
            match stage {
                Stage::Reasoning => {
                    if state.current_step >= state.max_iterations {
                        debug!(thread_id, "Iteration cap reached, moving to synthesis");
                        stage = Stage::IntermediateSynthesis;
                        continue;
                    }
                    state.current_step += 1;

                    let prompt = reasoning_prompt(&state, &catalogue);
                    let raw = self
                        .gateway
                        .generate(&prompt, thread_id, settings.provider)
                        .await;
                    let parsed = parse_response(&raw);

                    debug!(
                        thread_id,
                        step = state.current_step,
                        action = %parsed.action,
                        "Reasoning pass"
                    );

                    let is_tool = self.tools.contains(&parsed.action);
                    state.record_reasoning(parsed.leading, parsed.action, parsed.params);

                    stage = if is_tool {
                        Stage::ToolExecution
                    } else {
                        Stage::IntermediateSynthesis
                    };
                }

                Stage::ToolExecution => {
                    // Whatever action is active now is the one executed;
                    // earlier proposals for this step are advisory only.
                    let tool = state
                        .next_action
                        .clone()
                        .unwrap_or_else(|| FINAL_ANSWER.to_string());
                    let params = std::mem::take(&mut state.pending_params);

                    let result = self.tools.execute(&tool, &params).await;
                    if !result.success {
                        warn!(thread_id, tool = %tool, "Tool reported failure");
                    }
                    state.record_tool_result(tool, params, result);

                    stage = Stage::Reasoning;
                }

                Stage::IntermediateSynthesis => {
                    let prompt = synthesis_prompt(&state, &catalogue);
                    let raw = self
                        .gateway
                        .generate(&prompt, thread_id, settings.provider)
                        .await;
                    let parsed = parse_response(&raw);

                    debug!(thread_id, action = %parsed.action, "Synthesis pass");
                    state.current_thought = parsed.leading;

                    if state.current_step >= state.max_iterations
                        || parsed.action == FINAL_ANSWER
                        || !self.tools.contains(&parsed.action)
                    {
                        stage = Stage::FinalAnswer;
                    } else {
                        // Synthesis overrides the reasoning stage's choice.
                        state.next_action = Some(parsed.action);
                        state.pending_params = parsed.params;
                        stage = Stage::Reasoning;
                    }
                }

                Stage::FinalAnswer => {
                    let prompt = final_answer_prompt(&state);
                    let answer = self
                        .gateway
                        .generate(&prompt, thread_id, settings.provider)
                        .await;
                    state.final_answer = Some(answer.clone());
                    state.messages.push(ChatMessage::assistant(answer));
                    break;
                }
            }
        }

        info!(
            thread_id,
            steps = state.current_step,
            tool_calls = state.tool_results.len(),
            "Reasoning loop completed"
        );

        TurnOutcome {
            final_answer: state.final_answer.unwrap_or_default(),
            reasoning_steps: state.reasoning_steps,
            tool_results: state.tool_results,
            current_step: state.current_step,
            messages: state.messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reagent_core::Provider;
    use reagent_core::error::{ProviderError, ToolError};
    use reagent_core::tool::{Tool, ToolParams, ToolResult};
    use reagent_providers::ProviderKind;
    use std::sync::Mutex;

    /// Replays a scripted sequence of responses; repeats the last one when
    /// the script runs out.
    struct ScriptedProvider {
        responses: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(responses: &[&str]) -> Self {
            Self {
                responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                Ok(responses.pop().unwrap())
            } else {
                Ok(responses.last().cloned().unwrap_or_default())
            }
        }
    }

    struct MathTool;

    #[async_trait]
    impl Tool for MathTool {
        fn name(&self) -> &str {
            "calculator"
        }
        fn description(&self) -> &str {
            "Evaluate a mathematical expression.\n\nParameters:\n- expression (str)"
        }
        async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
            let expr = params.get("expression").cloned().unwrap_or_default();
            Ok(ToolResult::ok(format!("Calculation: {expr} = 6.0")))
        }
    }

    fn agent_loop(responses: &[&str]) -> AgentLoop {
        let gateway = Arc::new(ModelGateway::new(vec![(
            ProviderKind::Ollama,
            Arc::new(ScriptedProvider::new(responses)),
        )]));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(MathTool));
        AgentLoop::new(gateway, Arc::new(registry))
    }

    #[tokio::test]
    async fn greeting_terminates_in_one_step() {
        let agent = agent_loop(&[
            "**Thought:** Simple greeting, no tools needed.\n**Action:** final_answer",
            "**Evaluation:** Nothing to gather.\n**Action:** final_answer",
            "Hello! How can I help you today?",
        ]);

        let outcome = agent
            .run_turn(vec![], "Hello", "thread_a", &TurnSettings::default())
            .await;

        assert_eq!(outcome.current_step, 1);
        assert_eq!(outcome.final_answer, "Hello! How can I help you today?");
        assert!(outcome.tool_results.is_empty());
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[1].content, outcome.final_answer);
    }

    #[tokio::test]
    async fn calculation_runs_the_tool_then_answers() {
        let agent = agent_loop(&[
            "**Thought:** I need to compute.\n**Action:** calculator\n\
**Action Parameters:**\nexpression=sqrt(16)+2",
            "**Thought:** I have the value now.\n**Action:** final_answer",
            "**Evaluation:** The calculation is done.\n**Action:** final_answer",
            "The result of sqrt(16)+2 is 6.0.",
        ]);

        let outcome = agent
            .run_turn(
                vec![],
                "What is sqrt(16)+2?",
                "thread_a",
                &TurnSettings::default(),
            )
            .await;

        assert_eq!(outcome.tool_results.len(), 1);
        assert!(outcome.tool_results[0].content.contains("= 6.0"));
        assert_eq!(outcome.tool_results[0].step, 1);
        assert_eq!(outcome.current_step, 2);
        assert!(outcome.final_answer.contains("6.0"));
    }

    #[tokio::test]
    async fn iteration_cap_forces_termination() {
        // The model insists on the tool forever; the cap must end the turn.
        let agent = agent_loop(&[
            "**Thought:** keep going\n**Action:** calculator\n\
**Action Parameters:**\nexpression=1+1",
        ]);

        let settings = TurnSettings {
            max_iterations: Some(1),
            ..Default::default()
        };
        let outcome = agent.run_turn(vec![], "loop!", "thread_a", &settings).await;

        assert_eq!(outcome.current_step, 1);
        assert_eq!(outcome.tool_results.len(), 1);
        assert!(!outcome.final_answer.is_empty());
    }

    #[tokio::test]
    async fn cap_bounds_steps_even_when_synthesis_keeps_proposing_tools() {
        let agent = agent_loop(&[
            "**Thought:** tool\n**Action:** calculator\n**Action Parameters:**\nexpression=1",
        ]);

        let settings = TurnSettings {
            max_iterations: Some(3),
            ..Default::default()
        };
        let outcome = agent.run_turn(vec![], "go", "thread_a", &settings).await;

        assert!(outcome.current_step <= 3);
        assert!(!outcome.final_answer.is_empty());
    }

    #[tokio::test]
    async fn unconfigured_gateway_still_terminates() {
        let gateway = Arc::new(ModelGateway::new(vec![]));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(MathTool));
        let agent = AgentLoop::new(gateway, Arc::new(registry));

        let outcome = agent
            .run_turn(vec![], "Hello", "thread_a", &TurnSettings::default())
            .await;

        // The fixed degraded text contains no Action label, so the parser
        // fallback ends the loop after one pass.
        assert_eq!(outcome.current_step, 1);
        assert!(outcome
            .final_answer
            .contains("No language model providers are configured"));
    }

    #[tokio::test]
    async fn unrecognized_action_routes_through_synthesis() {
        let agent = agent_loop(&[
            "**Thought:** let me use a tool that does not exist\n**Action:** teleporter",
            "**Evaluation:** no such tool, answer directly.\n**Action:** final_answer",
            "I can't teleport, but here's an answer.",
        ]);

        let outcome = agent
            .run_turn(vec![], "beam me up", "thread_a", &TurnSettings::default())
            .await;

        assert!(outcome.tool_results.is_empty());
        assert_eq!(outcome.reasoning_steps[0].action, "teleporter");
        assert!(outcome.final_answer.contains("answer"));
    }

    #[tokio::test]
    async fn synthesis_override_runs_a_tool_next() {
        // Reasoning says final_answer; synthesis insists on the calculator.
        let agent = agent_loop(&[
            "**Thought:** I think I can answer.\n**Action:** final_answer",
            "**Evaluation:** Not yet, we should compute first.\n**Action:** calculator\n\
**Action Parameters:**\nexpression=2+4",
            "**Thought:** computed, done now.\n**Action:** final_answer",
            "**Evaluation:** sufficient.\n**Action:** final_answer",
            "It comes to 6.0.",
        ]);

        let outcome = agent
            .run_turn(vec![], "What is 2+4?", "thread_a", &TurnSettings::default())
            .await;

        // The override sends control back through Reasoning, which decides
        // the action actually executed.
        assert!(outcome.current_step >= 2);
        assert_eq!(outcome.final_answer, "It comes to 6.0.");
    }

    #[tokio::test]
    async fn reasoning_steps_are_contiguous() {
        let agent = agent_loop(&[
            "**Thought:** a\n**Action:** calculator\n**Action Parameters:**\nexpression=1",
            "**Thought:** b\n**Action:** calculator\n**Action Parameters:**\nexpression=2",
            "**Thought:** c\n**Action:** final_answer",
            "**Evaluation:** done\n**Action:** final_answer",
            "All done.",
        ]);

        let outcome = agent
            .run_turn(vec![], "count", "thread_a", &TurnSettings::default())
            .await;

        for (i, step) in outcome.reasoning_steps.iter().enumerate() {
            assert_eq!(step.step, i as u32 + 1);
        }
        assert_eq!(outcome.reasoning_steps.len(), 3);
        assert_eq!(outcome.tool_results.len(), 2);
    }

    #[tokio::test]
    async fn history_is_preserved_in_outcome_messages() {
        let agent = agent_loop(&[
            "**Thought:** greet again\n**Action:** final_answer",
            "**Evaluation:** fine\n**Action:** final_answer",
            "Hi again!",
        ]);

        let history = vec![ChatMessage::user("Hello"), ChatMessage::assistant("Hi!")];
        let outcome = agent
            .run_turn(history, "Hello again", "thread_a", &TurnSettings::default())
            .await;

        assert_eq!(outcome.messages.len(), 4);
        assert_eq!(outcome.messages[0].content, "Hello");
        assert_eq!(outcome.messages[2].content, "Hello again");
        assert_eq!(outcome.messages[3].content, "Hi again!");
    }
}
