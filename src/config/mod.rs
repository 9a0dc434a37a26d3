use log::info;
use std::path::PathBuf;

use crate::cli::Args;
use crate::error::AgentError;
use crate::llm::{ LlmConfig, LlmType };
use crate::store::{ SearchKwargs, SearchType };

/// Everything a run needs, built once at startup and passed down explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chat: LlmConfig,
    pub embedding: LlmConfig,
    pub profiles_path: PathBuf,
    pub index_dir: PathBuf,
    pub search_type: SearchType,
    pub search_kwargs: SearchKwargs,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Result<Self, AgentError> {
        let chat = LlmConfig {
            llm_type: args.chat_llm_type.parse::<LlmType>()?,
            api_key: non_empty(&args.chat_api_key),
            completion_model: non_empty(&args.chat_model),
            embedding_model: None,
            base_url: args.chat_base_url.as_deref().and_then(non_empty),
            streaming: args.chat_streaming,
        };

        let embedding = LlmConfig {
            llm_type: args.embedding_llm_type.parse::<LlmType>()?,
            api_key: non_empty(&args.embedding_api_key),
            completion_model: None,
            embedding_model: non_empty(&args.embedding_model),
            base_url: args.embedding_base_url.as_deref().and_then(non_empty),
            streaming: false,
        };

        if args.search_k == 0 {
            return Err(AgentError::Config("search k must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&args.search_lambda) {
            return Err(
                AgentError::Config(format!("search lambda must be within 0..=1, got {}", args.search_lambda))
            );
        }

        Ok(Self {
            chat,
            embedding,
            profiles_path: PathBuf::from(&args.profiles_path),
            index_dir: PathBuf::from(&args.index_dir),
            search_type: args.search_type.parse()?,
            search_kwargs: SearchKwargs {
                k: args.search_k,
                fetch_k: args.search_fetch_k,
                lambda_mult: args.search_lambda,
                score_threshold: args.search_score_threshold,
            },
        })
    }

    pub fn log_summary(&self) {
        info!("--- Core Configuration ---");
        info!("Chat LLM Type: {}", self.chat.llm_type);
        info!("Chat Base URL: {}", self.chat.base_url.as_deref().unwrap_or("adapter default"));
        info!("Chat Model: {}", self.chat.completion_model.as_deref().unwrap_or("adapter default"));
        info!("Chat Streaming: {}", self.chat.streaming);
        info!("Embedding LLM Type: {}", self.embedding.llm_type);
        info!(
            "Embedding Base URL: {}",
            self.embedding.base_url.as_deref().unwrap_or("adapter default")
        );
        info!(
            "Embedding Model: {}",
            self.embedding.embedding_model.as_deref().unwrap_or("adapter default")
        );
        info!("Profiles Path: {}", self.profiles_path.display());
        info!("Index Directory: {}", self.index_dir.display());
        info!("Search Type: {}", self.search_type);
        info!("-------------------------");
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}
