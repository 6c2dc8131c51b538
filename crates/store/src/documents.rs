//! In-memory keyword document index.
//!
//! Scores documents by token overlap with the query. Good enough for the
//! document_search tool without an embedding backend; a vector index could
//! implement the same trait later.

use async_trait::async_trait;
use chrono::Utc;
use reagent_core::error::StoreError;
use reagent_core::store::{DocumentHit, DocumentIndex, DocumentInfo};
use std::collections::HashSet;
use tokio::sync::RwLock;
use uuid::Uuid;

struct IndexedDocument {
    info: DocumentInfo,
    content: String,
}

/// A keyword-scored document index held in memory.
#[derive(Default)]
pub struct InMemoryDocumentIndex {
    documents: RwLock<Vec<IndexedDocument>>,
}

impl InMemoryDocumentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document to the index. Returns the generated document id.
    pub async fn add(&self, filename: impl Into<String>, content: impl Into<String>) -> String {
        let document_id = Uuid::new_v4().to_string();
        let mut documents = self.documents.write().await;
        documents.push(IndexedDocument {
            info: DocumentInfo {
                document_id: document_id.clone(),
                filename: filename.into(),
                uploaded_at: Utc::now(),
            },
            content: content.into(),
        });
        document_id
    }
}

fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(String::from)
        .collect()
}

/// Fraction of query tokens that appear in the document.
fn score(query_tokens: &HashSet<String>, content: &str) -> f32 {
    if query_tokens.is_empty() {
        return 0.0;
    }
    let doc_tokens = tokens(content);
    let overlap = query_tokens.intersection(&doc_tokens).count();
    overlap as f32 / query_tokens.len() as f32
}

#[async_trait]
impl DocumentIndex for InMemoryDocumentIndex {
    async fn search(
        &self,
        query: &str,
        limit: usize,
        similarity_threshold: f32,
    ) -> Result<Vec<DocumentHit>, StoreError> {
        let query_tokens = tokens(query);
        let documents = self.documents.read().await;

        let mut hits: Vec<DocumentHit> = documents
            .iter()
            .filter_map(|doc| {
                let similarity = score(&query_tokens, &doc.content);
                (similarity >= similarity_threshold && similarity > 0.0).then(|| DocumentHit {
                    document_id: doc.info.document_id.clone(),
                    filename: doc.info.filename.clone(),
                    content: doc.content.clone(),
                    similarity,
                })
            })
            .collect();

        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn list(&self, limit: usize) -> Result<Vec<DocumentInfo>, StoreError> {
        let documents = self.documents.read().await;
        let mut infos: Vec<DocumentInfo> = documents.iter().map(|d| d.info.clone()).collect();
        infos.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        infos.truncate(limit);
        Ok(infos)
    }
}
