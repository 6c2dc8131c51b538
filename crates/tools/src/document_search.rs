//! Document search tool — semantic lookup over uploaded documents.

use async_trait::async_trait;
use reagent_core::error::ToolError;
use reagent_core::store::DocumentIndex;
use reagent_core::tool::{Tool, ToolParams, ToolResult};
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 5;
const DEFAULT_THRESHOLD: f32 = 0.3;

pub struct DocumentSearchTool {
    index: Arc<dyn DocumentIndex>,
}

impl DocumentSearchTool {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }
}

#[async_trait]
impl Tool for DocumentSearchTool {
    fn name(&self) -> &str {
        "document_search"
    }

    fn description(&self) -> &str {
        "Search the user's uploaded documents for passages relevant to a \
query.\n\n\
Parameters:\n\
- query (str): what to look for\n\
- limit (int, optional): maximum passages to return, default 5\n\n\
Example: query=quarterly revenue targets"
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult, ToolError> {
        let query = params
            .get("query")
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' parameter".into()))?;

        let limit = params
            .get("limit")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, 20);

        let hits = self
            .index
            .search(query, limit, DEFAULT_THRESHOLD)
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "document_search".into(),
                reason: e.to_string(),
            })?;

        if hits.is_empty() {
            return Ok(ToolResult::ok(format!(
                "No documents matched '{query}'."
            )));
        }

        let mut lines = vec![format!("Found {} relevant passage(s):", hits.len())];
        for hit in &hits {
            lines.push(format!(
                "[{}] (similarity: {:.2})\n{}",
                hit.filename, hit.similarity, hit.content
            ));
        }

        let mut metadata = serde_json::Map::new();
        metadata.insert("hit_count".into(), serde_json::json!(hits.len()));

        Ok(ToolResult::ok_with_metadata(lines.join("\n\n"), metadata))
    }
}
