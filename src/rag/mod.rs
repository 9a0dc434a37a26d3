use log::info;
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use crate::error::AgentError;
use crate::llm::embedding::EmbeddingClient;
use crate::models::document::ScoredDocument;
use crate::profiles::{ profiles_to_documents, ProfileSource };
use crate::store::{ PersistentVectorStore, Retriever, SearchKwargs, SearchType, VectorStore };

/// Whether a persisted index already exists. Only the directory's existence is checked;
/// an index that is stale relative to the profile file is reused as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Missing,
    Present,
}

impl IndexState {
    pub fn of(directory: &Path) -> Self {
        if directory.exists() { IndexState::Present } else { IndexState::Missing }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOrigin {
    Built {
        documents: usize,
    },
    Reopened,
}

pub async fn build_or_open_index(
    directory: &Path,
    profiles: &dyn ProfileSource,
    embedding_client: Arc<dyn EmbeddingClient>
) -> Result<(PersistentVectorStore, IndexOrigin), AgentError> {
    match IndexState::of(directory) {
        IndexState::Missing => {
            info!("Persistent directory does not exist. Initializing vector store...");

            let records = profiles.load()?;
            let documents = profiles_to_documents(&records)?;

            info!("--- Document Profiles Information ---");
            info!("Number of document profiles: {}", documents.len());
            if let Some(sample) = documents.first() {
                info!("Sample document profile:\n{}", sample.page_content);
            }

            info!("--- Creating vector store ---");
            let count = documents.len();
            let store = PersistentVectorStore::from_documents(
                documents,
                embedding_client,
                directory
            ).await?;
            info!("--- Finished creating vector store ---");

            Ok((store, IndexOrigin::Built { documents: count }))
        }
        IndexState::Present => {
            info!("Reusing persisted vector store at {}", directory.display());
            let store = PersistentVectorStore::open(directory, embedding_client)?;
            Ok((store, IndexOrigin::Reopened))
        }
    }
}

pub async fn retrieve(
    store: Arc<dyn VectorStore>,
    query: &str,
    search_type: SearchType,
    kwargs: SearchKwargs
) -> Result<Vec<ScoredDocument>, AgentError> {
    let retriever = Retriever::new(store, search_type, kwargs);
    retriever.invoke(query).await
}

pub fn format_relevant_documents(results: &[ScoredDocument]) -> String {
    let mut out = String::from("\n--- Relevant Documents ---\n");
    for (i, hit) in results.iter().enumerate() {
        let _ = writeln!(out, "Document {}:\n{}", i + 1, hit.document.page_content);
        if !hit.document.metadata.is_empty() {
            let metadata = serde_json
                ::to_string(&hit.document.metadata)
                .unwrap_or_else(|_| format!("{:?}", hit.document.metadata));
            let _ = writeln!(out, "Source: {}\n", metadata);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;

    #[test]
    fn formats_body_and_metadata() {
        let results = vec![
            ScoredDocument {
                document: Document::new("Name = Kathryn\n").with_metadata("email", "kathryn@example.com"),
                score: Some(0.9),
            },
            ScoredDocument { document: Document::new("Name = Bare\n"), score: None }
        ];
        let text = format_relevant_documents(&results);
        assert!(text.contains("Document 1:\nName = Kathryn\n"));
        assert!(text.contains("Source: {\"email\":\"kathryn@example.com\"}"));
        assert!(text.contains("Document 2:\nName = Bare\n"));
        assert_eq!(text.matches("Source:").count(), 1);
    }

    #[test]
    fn missing_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(IndexState::of(dir.path()), IndexState::Present);
        assert_eq!(IndexState::of(&dir.path().join("nope")), IndexState::Missing);
    }
}
