use async_trait::async_trait;
use chrono::{ DateTime, Utc };
use log::{ info, warn };
use serde::{ Deserialize, Serialize };
use std::collections::BTreeMap;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;
use uuid::Uuid;

use super::mmr::{ mmr_rerank, top_k_by_similarity };
use super::VectorStore;
use crate::error::AgentError;
use crate::llm::embedding::EmbeddingClient;
use crate::models::document::{ Document, ScoredDocument };

pub const INDEX_FILE_NAME: &str = "index.json";
const INDEX_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: Uuid,
    page_content: String,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    embedding: Vec<f32>,
}

impl IndexEntry {
    fn to_document(&self) -> Document {
        Document {
            page_content: self.page_content.clone(),
            metadata: self.metadata.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    embedding_model: String,
    created_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

/// Similarity index kept in memory and persisted as a single JSON file inside a directory.
pub struct PersistentVectorStore {
    embedding_client: Arc<dyn EmbeddingClient>,
    entries: Vec<IndexEntry>,
}

impl PersistentVectorStore {
    /// Embeds `documents` in one batch and writes a new index under `directory`.
    /// The index is written to a sibling staging directory first and renamed into place,
    /// so `directory` only appears once it holds a complete index.
    pub async fn from_documents(
        documents: Vec<Document>,
        embedding_client: Arc<dyn EmbeddingClient>,
        directory: impl AsRef<Path>
    ) -> Result<Self, AgentError> {
        let directory = directory.as_ref().to_path_buf();
        let texts: Vec<String> = documents
            .iter()
            .map(|d| d.page_content.clone())
            .collect();
        let embeddings = embedding_client.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(
                AgentError::Capability(
                    format!("Expected {} embeddings, got {}", documents.len(), embeddings.len())
                )
            );
        }

        let entries: Vec<IndexEntry> = documents
            .into_iter()
            .zip(embeddings)
            .map(|(doc, embedding)| IndexEntry {
                id: Uuid::new_v4(),
                page_content: doc.page_content,
                metadata: doc.metadata,
                embedding,
            })
            .collect();

        let index = IndexFile {
            version: INDEX_FORMAT_VERSION,
            embedding_model: embedding_client.model().to_string(),
            created_at: Utc::now(),
            entries,
        };

        let staging = staging_path(&directory)?;
        let persisted = write_index(&staging, &index).and_then(|_| {
            fs::rename(&staging, &directory)?;
            Ok(())
        });
        if let Err(e) = persisted {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
        info!("Persisted {} index entries to {}", index.entries.len(), directory.display());

        Ok(Self {
            embedding_client,
            entries: index.entries,
        })
    }

    /// Reopens an index written by [`PersistentVectorStore::from_documents`].
    pub fn open(
        directory: impl AsRef<Path>,
        embedding_client: Arc<dyn EmbeddingClient>
    ) -> Result<Self, AgentError> {
        let directory = directory.as_ref().to_path_buf();
        let path = directory.join(INDEX_FILE_NAME);
        let content = fs::read(&path)?;
        let index: IndexFile = serde_json::from_slice(&content)?;

        if index.version != INDEX_FORMAT_VERSION {
            return Err(
                AgentError::Capability(
                    format!("Unsupported index format version {} in {}", index.version, path.display())
                )
            );
        }
        if index.embedding_model != embedding_client.model() {
            warn!(
                "Index at {} was built with embedding model '{}', querying with '{}'",
                directory.display(),
                index.embedding_model,
                embedding_client.model()
            );
        }
        info!(
            "Opened index at {} ({} entries, created {})",
            directory.display(),
            index.entries.len(),
            index.created_at.to_rfc3339()
        );

        Ok(Self {
            embedding_client,
            entries: index.entries,
        })
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, AgentError> {
        Ok(self.embedding_client.embed(query).await?.embedding)
    }

    fn vectors(&self) -> Vec<&[f32]> {
        self.entries
            .iter()
            .map(|e| e.embedding.as_slice())
            .collect()
    }
}

/// `<parent>/.<name>.staging-<uuid>`, creating `<parent>` if needed.
fn staging_path(directory: &Path) -> Result<PathBuf, AgentError> {
    let name = directory
        .file_name()
        .ok_or_else(|| AgentError::Config(format!("Invalid index directory: {}", directory.display())))?;
    let parent = match directory.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    Ok(parent.join(format!(".{}.staging-{}", name.to_string_lossy(), Uuid::new_v4())))
}

fn write_index(staging: &Path, index: &IndexFile) -> Result<(), AgentError> {
    fs::create_dir(staging)?;
    fs::write(staging.join(INDEX_FILE_NAME), serde_json::to_vec(index)?)?;
    Ok(())
}

#[async_trait]
impl VectorStore for PersistentVectorStore {
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize
    ) -> Result<Vec<ScoredDocument>, AgentError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_query(query).await?;

        Ok(
            top_k_by_similarity(&query_vec, &self.vectors(), k)
                .into_iter()
                .map(|(idx, score)| ScoredDocument {
                    document: self.entries[idx].to_document(),
                    score: Some(score),
                })
                .collect()
        )
    }

    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32
    ) -> Result<Vec<ScoredDocument>, AgentError> {
        if self.entries.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let query_vec = self.embed_query(query).await?;

        let candidates: Vec<(usize, &[f32])> = top_k_by_similarity(
            &query_vec,
            &self.vectors(),
            fetch_k.max(k)
        )
            .into_iter()
            .map(|(idx, _)| (idx, self.entries[idx].embedding.as_slice()))
            .collect();

        Ok(
            mmr_rerank(&query_vec, &candidates, k, lambda_mult)
                .into_iter()
                .map(|(idx, score)| ScoredDocument {
                    document: self.entries[idx].to_document(),
                    score: Some(score),
                })
                .collect()
        )
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
