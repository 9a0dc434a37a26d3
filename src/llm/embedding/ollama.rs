use async_trait::async_trait;
use rllm::{ builder::{ LLMBackend, LLMBuilder }, LLMProvider };

use super::{ EmbeddingClient, EmbeddingResponse };
use crate::error::AgentError;
use crate::llm::LlmConfig;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";

pub struct OllamaEmbeddingClient {
    llm: Box<dyn LLMProvider + Send + Sync>,
    model: String,
}

impl OllamaEmbeddingClient {
    pub fn new(base_url: Option<String>, model: Option<String>) -> Result<Self, AgentError> {
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let embed_model = model.unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());

        let llm = LLMBuilder::new()
            .backend(LLMBackend::Ollama)
            .base_url(url)
            .model(&embed_model)
            .stream(false)
            .build()
            .map_err(|e| AgentError::Capability(e.to_string()))?;

        Ok(Self { llm, model: embed_model })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AgentError> {
        Self::new(config.base_url.clone(), config.embedding_model.clone())
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, AgentError> {
        let mut embeddings = self.llm
            .embed(vec![text.to_string()]).await
            .map_err(|e| AgentError::Capability(e.to_string()))?;
        let embedding = embeddings
            .pop()
            .ok_or_else(|| AgentError::Capability("Ollama embedding generation returned no results".into()))?;

        Ok(EmbeddingResponse { embedding })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AgentError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let embeddings = self.llm
            .embed(texts.to_vec()).await
            .map_err(|e| AgentError::Capability(e.to_string()))?;
        if embeddings.len() != texts.len() {
            return Err(
                AgentError::Capability(
                    format!("Expected {} embeddings, got {}", texts.len(), embeddings.len())
                )
            );
        }
        Ok(embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
