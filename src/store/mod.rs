pub mod mmr;
pub mod persistent;
pub mod retriever;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::models::document::ScoredDocument;

pub use persistent::PersistentVectorStore;
pub use retriever::{ Retriever, SearchKwargs, SearchType };

/// Queryable similarity index over embedded documents.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Up to `k` documents, most similar first.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize
    ) -> Result<Vec<ScoredDocument>, AgentError>;

    /// Up to `k` documents picked from the `fetch_k` most similar by maximal marginal relevance.
    async fn max_marginal_relevance_search(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
        lambda_mult: f32
    ) -> Result<Vec<ScoredDocument>, AgentError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
