//! Built-in tool implementations for Reagent.
//!
//! Tools give the agent the ability to act: search the web, do math, run
//! Python snippets, and query the user's uploaded documents.

pub mod calculator;
pub mod code_execution;
pub mod document_search;
pub mod list_documents;
pub mod web_search;

pub use calculator::CalculatorTool;
pub use code_execution::CodeExecutionTool;
pub use document_search::DocumentSearchTool;
pub use list_documents::ListDocumentsTool;
pub use web_search::WebSearchTool;

use reagent_core::store::DocumentIndex;
use reagent_core::tool::ToolRegistry;
use std::sync::Arc;

/// Create the default tool registry with all built-in tools.
pub fn default_registry(index: Arc<dyn DocumentIndex>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebSearchTool));
    registry.register(Box::new(CalculatorTool));
    registry.register(Box::new(CodeExecutionTool));
    registry.register(Box::new(DocumentSearchTool::new(index.clone())));
    registry.register(Box::new(ListDocumentsTool::new(index)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reagent_core::error::StoreError;
    use reagent_core::store::{DocumentHit, DocumentInfo};

    struct EmptyIndex;

    #[async_trait]
    impl DocumentIndex for EmptyIndex {
        async fn search(
            &self,
            _query: &str,
            _limit: usize,
            _similarity_threshold: f32,
        ) -> Result<Vec<DocumentHit>, StoreError> {
            Ok(vec![])
        }
        async fn list(&self, _limit: usize) -> Result<Vec<DocumentInfo>, StoreError> {
            Ok(vec![])
        }
    }

    #[test]
    fn default_registry_has_all_tools_in_order() {
        let registry = default_registry(Arc::new(EmptyIndex));
        assert_eq!(
            registry.names(),
            vec![
                "web_search",
                "calculator",
                "code_execution",
                "document_search",
                "list_documents",
            ]
        );
    }
}
