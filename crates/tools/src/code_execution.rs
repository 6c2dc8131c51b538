//! Code execution tool — runs short Python snippets in a subprocess.
//!
//! The snippet is written to a temp file and run with `python3`. Execution
//! is capped at 10 seconds; a runaway process is killed. This is NOT a
//! sandbox — the snippet runs with the server's privileges.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::tool::{Tool, ToolParams, ToolResult};
use std::io::Write;
use std::time::Duration;
use tracing::warn;

const EXECUTION_TIMEOUT_SECS: u64 = 10;

pub struct CodeExecutionTool;

#[async_trait]
impl Tool for CodeExecutionTool {
    fn name(&self) -> &str {
        "code_execution"
    }

    fn description(&self) -> &str {
        "Execute a short Python snippet and return its output. Execution is \
limited to 10 seconds.\n\n\
Parameters:\n\
- code (str): the Python code to run\n\n\
Example: code=print(sum(range(10)))"
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
        let code = params
            .get("code")
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'code' parameter".into()))?;

        let mut file = tempfile::Builder::new()
            .prefix("reagent_exec_")
            .suffix(".py")
            .tempfile()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "code_execution".into(),
                reason: format!("Failed to create temp file: {e}"),
            })?;

        file.write_all(code.as_bytes())
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "code_execution".into(),
                reason: format!("Failed to write snippet: {e}"),
            })?;

        let mut child = tokio::process::Command::new("python3")
            .arg(file.path())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "code_execution".into(),
                reason: format!("Failed to spawn python3: {e}"),
            })?;

        let timeout = Duration::from_secs(EXECUTION_TIMEOUT_SECS);
        let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| ToolError::ExecutionFailed {
                tool_name: "code_execution".into(),
                reason: e.to_string(),
            })?,
            Err(_) => {
                warn!(timeout_secs = EXECUTION_TIMEOUT_SECS, "Snippet timed out, killed");
                return Ok(ToolResult::failed(format!(
                    "Execution timed out after {EXECUTION_TIMEOUT_SECS} seconds"
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if output.status.success() {
            Ok(ToolResult::ok(format!(
                "Code executed successfully.\n\nOutput:\n```\n{}\n```",
                stdout.trim_end()
            )))
        } else {
            Ok(ToolResult::failed(format!(
                "Code exited with {}:\n{}",
                output.status,
                stderr.trim_end()
            )))
        }
    }
}
