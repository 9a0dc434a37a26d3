pub mod chat;
pub mod embedding;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use url::Url;

use crate::error::AgentError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    /// Any OpenAI-compatible server (OpenAI, LM Studio, vLLM, llama.cpp server).
    OpenAI,
    Ollama,
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmType::OpenAI => write!(f, "openai"),
            LlmType::Ollama => write!(f, "ollama"),
        }
    }
}

impl FromStr for LlmType {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "lmstudio" => Ok(LlmType::OpenAI),
            "ollama" => Ok(LlmType::Ollama),
            _ => Err(AgentError::Config(format!("Invalid LLM type: '{}'", s))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub embedding_model: Option<String>,
    pub base_url: Option<String>,
    pub streaming: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_type: LlmType::OpenAI,
            api_key: None,
            completion_model: None,
            embedding_model: None,
            base_url: None,
            streaming: false,
        }
    }
}

/// Appends `route` to `base_url`, keeping any path prefix such as `/v1`.
pub fn endpoint_url(base_url: &str, route: &str) -> Result<Url, AgentError> {
    let base = format!("{}/", base_url.trim_end_matches('/'));
    let url = Url::parse(&base)?.join(route.trim_start_matches('/'))?;
    Ok(url)
}
