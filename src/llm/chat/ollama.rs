use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ collect_stream, http_stream_generate, ChatClient, ChatStream, CompletionResponse, StreamLine };
use crate::error::AgentError;
use crate::llm::{ endpoint_url, LlmConfig, LlmType };
use crate::models::chat::{ ChatMessage, WireMessage };

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_CHAT_MODEL: &str = "llama3.2:3b";

#[derive(Debug)]
pub struct OllamaChatClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
    streaming: bool,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<WireMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

impl OllamaChatClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>, streaming: bool) -> Self {
        let model = completion_model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
            streaming,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AgentError> {
        if config.llm_type != LlmType::Ollama {
            return Err(AgentError::Config("Invalid config type for OllamaChatClient".into()));
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone(), config.streaming))
    }

    fn request(&self, messages: &[ChatMessage], stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.completion_model.clone(),
            messages: messages.iter().map(ChatMessage::to_wire).collect(),
            stream,
        }
    }
}

fn parse_ndjson_line(line: &str) -> StreamLine {
    if line.is_empty() {
        return StreamLine::Skip;
    }
    match serde_json::from_str::<ChatResponse>(line) {
        Ok(ChatResponse { error: Some(error), .. }) => {
            StreamLine::Error(format!("Ollama error: {}", error))
        }
        Ok(resp) => {
            let token = resp.message.map(|m| m.content).unwrap_or_default();
            if !token.is_empty() {
                StreamLine::Token(token)
            } else if resp.done {
                StreamLine::Done
            } else {
                StreamLine::Skip
            }
        }
        Err(e) => {
            debug!("JSON parse error: {} for line: {}", e, line);
            StreamLine::Error(format!("Malformed stream line: {}", e))
        }
    }
}

#[async_trait]
impl ChatClient for OllamaChatClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, AgentError> {
        info!("Invoking Ollama model '{}' with {} messages", self.completion_model, messages.len());
        if self.streaming {
            let stream = self.stream(messages).await?;
            let response = collect_stream(stream).await?;
            return Ok(CompletionResponse { response });
        }

        let url = endpoint_url(&self.base_url, "api/chat")?;
        let resp = self.http
            .post(url)
            .json(&self.request(messages, false))
            .send().await?
            .error_for_status()?
            .json::<ChatResponse>().await?;

        if let Some(error) = resp.error {
            return Err(AgentError::Capability(format!("Ollama error: {}", error)));
        }
        let message = resp.message.ok_or_else(||
            AgentError::Capability("Ollama chat response had no message".into())
        )?;
        Ok(CompletionResponse { response: message.content })
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, AgentError> {
        let url = endpoint_url(&self.base_url, "api/chat")?;
        http_stream_generate(&self.http, url, self.request(messages, true), parse_ndjson_line, None).await
    }

    fn model(&self) -> &str {
        &self.completion_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndjson_lines() {
        assert_eq!(
            parse_ndjson_line(r#"{"message":{"role":"assistant","content":"9"},"done":false}"#),
            StreamLine::Token("9".into())
        );
        assert_eq!(
            parse_ndjson_line(r#"{"message":{"role":"assistant","content":""},"done":true}"#),
            StreamLine::Done
        );
        assert_eq!(parse_ndjson_line(""), StreamLine::Skip);
        assert!(matches!(parse_ndjson_line("garbage"), StreamLine::Error(_)));
        assert_eq!(
            parse_ndjson_line(r#"{"error":"model 'llama3.2:3b' not found"}"#),
            StreamLine::Error("Ollama error: model 'llama3.2:3b' not found".into())
        );
    }

    #[test]
    fn rejects_foreign_config() {
        let config = LlmConfig::default();
        assert!(OllamaChatClient::from_config(&config).is_err());
    }
}
