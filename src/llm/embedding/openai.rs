use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ EmbeddingClient, EmbeddingResponse };
use crate::error::AgentError;
use crate::llm::{ endpoint_url, LlmConfig };

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-nomic-embed-text-v1.5";
/// Largest number of inputs sent in one `/embeddings` request.
pub const MAX_BATCH_INPUTS: usize = 1000;

pub struct OpenAIEmbeddingClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingListResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAIEmbeddingClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>
    ) -> Result<Self, AgentError> {
        let model_name = model.unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        endpoint_url(&api_url, "embeddings")?;

        Ok(Self {
            http: HttpClient::builder().build()?,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model_name,
            base_url: api_url,
            batch_size: MAX_BATCH_INPUTS,
        })
    }

    /// Caps the inputs per request below `MAX_BATCH_INPUTS`, for servers with smaller limits.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_INPUTS);
        self
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AgentError> {
        Self::new(config.api_key.clone(), config.embedding_model.clone(), config.base_url.clone())
    }

    async fn request_embeddings(&self, input: &[String]) -> Result<Vec<Vec<f32>>, AgentError> {
        let url = endpoint_url(&self.base_url, "embeddings")?;
        let req = EmbeddingRequest { model: &self.model, input };

        let mut builder = self.http.post(url).json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let mut resp = builder
            .send().await?
            .error_for_status()?
            .json::<EmbeddingListResponse>().await?;

        if resp.data.len() != input.len() {
            return Err(
                AgentError::Capability(
                    format!("Expected {} embeddings, got {}", input.len(), resp.data.len())
                )
            );
        }
        resp.data.sort_by_key(|d| d.index);
        Ok(
            resp.data
                .into_iter()
                .map(|d| d.embedding)
                .collect()
        )
    }
}

#[async_trait]
impl EmbeddingClient for OpenAIEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingResponse, AgentError> {
        let mut embeddings = self.request_embeddings(&[text.to_string()]).await?;
        let embedding = embeddings
            .pop()
            .ok_or_else(|| AgentError::Capability("Embedding generation returned no results".into()))?;

        Ok(EmbeddingResponse { embedding })
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, AgentError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            info!("Embedding batch of {} texts with '{}'", chunk.len(), self.model);
            vectors.extend(self.request_embeddings(chunk).await?);
        }
        Ok(vectors)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
