use log::info;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::VectorStore;
use crate::error::AgentError;
use crate::models::document::ScoredDocument;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Similarity,
    Mmr,
    SimilarityScoreThreshold,
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchType::Similarity => write!(f, "similarity"),
            SearchType::Mmr => write!(f, "mmr"),
            SearchType::SimilarityScoreThreshold => write!(f, "similarity_score_threshold"),
        }
    }
}

impl FromStr for SearchType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "similarity" => Ok(SearchType::Similarity),
            "mmr" => Ok(SearchType::Mmr),
            "similarity_score_threshold" => Ok(SearchType::SimilarityScoreThreshold),
            _ => Err(AgentError::Config(format!("Invalid search type: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchKwargs {
    pub k: usize,
    pub fetch_k: usize,
    pub lambda_mult: f32,
    /// Only consulted by [`SearchType::SimilarityScoreThreshold`].
    pub score_threshold: Option<f32>,
}

impl Default for SearchKwargs {
    fn default() -> Self {
        Self {
            k: 3,
            fetch_k: 20,
            lambda_mult: 0.5,
            score_threshold: None,
        }
    }
}

#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    search_type: SearchType,
    kwargs: SearchKwargs,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>, search_type: SearchType, kwargs: SearchKwargs) -> Self {
        Self { store, search_type, kwargs }
    }

    pub async fn invoke(&self, query: &str) -> Result<Vec<ScoredDocument>, AgentError> {
        info!(
            "Retrieving with search_type={} k={} fetch_k={} lambda_mult={}",
            self.search_type,
            self.kwargs.k,
            self.kwargs.fetch_k,
            self.kwargs.lambda_mult
        );
        let kw = &self.kwargs;
        match self.search_type {
            SearchType::Similarity => self.store.similarity_search_with_score(query, kw.k).await,
            SearchType::Mmr =>
                self.store.max_marginal_relevance_search(
                    query,
                    kw.k,
                    kw.fetch_k,
                    kw.lambda_mult
                ).await,
            SearchType::SimilarityScoreThreshold => {
                let threshold = kw.score_threshold.ok_or_else(||
                    AgentError::Config(
                        "score_threshold is required for similarity_score_threshold search".into()
                    )
                )?;
                let hits = self.store.similarity_search_with_score(query, kw.k).await?;
                Ok(
                    hits
                        .into_iter()
                        .filter(|hit| hit.score.map_or(false, |s| s >= threshold))
                        .collect()
                )
            }
        }
    }
}
