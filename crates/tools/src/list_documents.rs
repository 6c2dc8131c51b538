//! List documents tool — enumerates what the document index knows about.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::store::DocumentIndex;
use reagent_core::tool::{Tool, ToolParams, ToolResult};
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 20;

pub struct ListDocumentsTool {
    index: Arc<dyn DocumentIndex>,
}

impl ListDocumentsTool {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for ListDocumentsTool {
    fn name(&self) -> &str {
        "list_documents"
    }

    fn description(&self) -> &str {
        "List the user's uploaded documents, newest first.\n\n\
Parameters:\n\
- limit (int, optional): maximum documents to list, default 20\n\n\
Example: limit=10"
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, 100);

        let docs = self
            .index
            .list(limit)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "list_documents".into(),
                reason: e.to_string(),
            })?;

        if docs.is_empty() {
            return Ok(ToolResult::ok("No documents have been uploaded."));
        }

        let mut lines = vec![format!("{} document(s):", docs.len())];
        for doc in &docs {
            lines.push(format!(
                "- {} (uploaded {})",
                doc.filename,
                doc.uploaded_at.format("%Y-%m-%d")
            ));
        }

        Ok(ToolResult::ok(lines.join("\n")))
    }
}
