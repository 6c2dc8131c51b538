//! `reagent chat` — run a single message through the agent.

use reagent_agent::{AgentLoop, TurnSettings};
use reagent_config::AppConfig;
use reagent_core::store::MessageStore;
use reagent_providers::ModelGateway;
use reagent_store::{InMemoryDocumentIndex, SqliteMessageStore};
use std::path::Path;
use std::sync::Arc;

pub async fn run(
    config_path: &Path,
    message: &str,
    thread_id: Option<String>,
    max_iterations: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        AppConfig::load_from(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    let store = SqliteMessageStore::new(&config.store.db_path).await?;
    let index = Arc::new(InMemoryDocumentIndex::new());
    let tools = Arc::new(reagent_tools::default_registry(index));
    let gateway = Arc::new(ModelGateway::from_config(&config)?);
    let agent =
        AgentLoop::new(gateway, tools).with_max_iterations(config.agent.max_iterations);

    let thread_id = thread_id.unwrap_or_else(reagent_core::message::new_thread_id);
    let history = store.get(&thread_id).await.unwrap_or_default();

    let settings = TurnSettings {
        max_iterations,
        ..Default::default()
    };
    let outcome = agent.run_turn(history, message, &thread_id, &settings).await;

    if let Err(e) = store.put(&thread_id, &outcome.messages).await {
        tracing::error!(%thread_id, error = %e, "Failed to persist thread");
    }

    for step in &outcome.reasoning_steps {
        eprintln!("[step {}] {} -> {}", step.step, step.thought, step.action);
    }
    for result in &outcome.tool_results {
        let status = if result.success { "ok" } else { "failed" };
        eprintln!("[tool {}] {} ({status})", result.step, result.tool);
    }

    println!("{}", outcome.final_answer);
    eprintln!("(thread: {thread_id})");

    Ok(())
}
