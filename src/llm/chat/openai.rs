use async_trait::async_trait;
use log::{ debug, info };
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };

use super::{ collect_stream, http_stream_generate, ChatClient, ChatStream, CompletionResponse, StreamLine };
use crate::error::AgentError;
use crate::llm::{ endpoint_url, LlmConfig };
use crate::models::chat::{ ChatMessage, WireMessage };

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:1234/v1";
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.2-3b-instruct";

pub struct OpenAIChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    streaming: bool,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIStreamResponse {
    #[serde(default)]
    choices: Vec<OpenAIStreamChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct OpenAIStreamChoice {
    delta: OpenAIDelta,
    #[serde(rename = "finish_reason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

impl OpenAIChatClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
        streaming: bool
    ) -> Result<Self, AgentError> {
        let chat_model = model.unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let api_url = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        endpoint_url(&api_url, "chat/completions")?;

        let http = HttpClient::builder().build()?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()),
            model: chat_model,
            base_url: api_url,
            streaming,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, AgentError> {
        Self::new(
            config.api_key.clone(),
            config.completion_model.clone(),
            config.base_url.clone(),
            config.streaming
        )
    }

    pub fn build_request(&self, messages: &[ChatMessage], stream: bool) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::to_wire).collect(),
            stream,
        }
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, AgentError> {
        let url = endpoint_url(&self.base_url, "chat/completions")?;
        let req = self.build_request(messages, false);

        let mut builder = self.http.post(url).json(&req);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send().await?.error_for_status()?.json::<OpenAIResponse>().await?;

        let content = resp.choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Capability("No choices in chat completion response".into()))?
            .message.content
            .unwrap_or_default();

        Ok(CompletionResponse { response: content })
    }
}

pub fn parse_sse_line(line: &str) -> StreamLine {
    // blank separators, comments and the non-data event fields
    if
        line.is_empty() ||
        line.starts_with(':') ||
        ["event:", "id:", "retry:"].iter().any(|field| line.starts_with(field))
    {
        return StreamLine::Skip;
    }
    let Some(data) = line.strip_prefix("data:") else {
        return StreamLine::Error(format!("Unexpected line in event stream: {}", line));
    };
    let data = data.trim();
    if data == "[DONE]" {
        return StreamLine::Done;
    }

    match serde_json::from_str::<OpenAIStreamResponse>(data) {
        Ok(stream_resp) => {
            if let Some(error) = stream_resp.error {
                let message = error
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                return StreamLine::Error(format!("Chat server error: {}", message));
            }
            let mut token = String::new();
            let mut finished = false;
            for choice in stream_resp.choices {
                if let Some(content) = choice.delta.content {
                    token.push_str(&content);
                }
                if choice.finish_reason.as_deref() == Some("stop") {
                    finished = true;
                }
            }
            if !token.is_empty() {
                StreamLine::Token(token)
            } else if finished {
                StreamLine::Done
            } else {
                StreamLine::Skip
            }
        }
        Err(e) => {
            debug!("JSON parse error: {} for data: {}", e, data);
            StreamLine::Error(format!("Malformed stream chunk: {}", e))
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, AgentError> {
        info!("Invoking chat model '{}' with {} messages", self.model, messages.len());
        if self.streaming {
            let stream = self.stream(messages).await?;
            let response = collect_stream(stream).await?;
            return Ok(CompletionResponse { response });
        }
        self.complete(messages).await
    }

    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, AgentError> {
        let url = endpoint_url(&self.base_url, "chat/completions")?;
        let req = self.build_request(messages, true);
        http_stream_generate(&self.http, url, req, parse_sse_line, self.api_key.as_deref()).await
    }

    fn model(&self) -> &str {
        &self.model
    }
}
