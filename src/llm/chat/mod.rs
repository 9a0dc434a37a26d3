pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use futures::{ Future, Stream, StreamExt };
use log::warn;
use reqwest::Client as HttpClient;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use url::Url;

use super::{ LlmConfig, LlmType };
use self::ollama::OllamaChatClient;
use self::openai::OpenAIChatClient;
use crate::error::AgentError;
use crate::models::chat::ChatMessage;

pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, AgentError>> + Send>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends the whole conversation and returns the assistant reply.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<CompletionResponse, AgentError>;

    /// Same request, but yields reply deltas as the server produces them.
    async fn stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, AgentError>;

    fn model(&self) -> &str;
}

/// What a single line of a streamed response body means.
#[derive(Debug, PartialEq, Eq)]
pub enum StreamLine {
    Token(String),
    Done,
    Skip,
    /// The server reported an error or sent something that is not part of the protocol.
    Error(String),
}

pub fn create_streaming_response<F, Fut>(response_fn: F) -> ChatStream
    where
        F: FnOnce(mpsc::Sender<Result<String, AgentError>>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        response_fn(tx).await;
    });

    Box::pin(ReceiverStream::new(rx))
}

/// POSTs `payload` and turns the line-delimited response body into a token stream.
/// Lines may be split across network chunks, so bytes are buffered until a newline.
/// A body that ends without a token or an end marker yields a `Capability` error.
pub async fn http_stream_generate(
    http: &HttpClient,
    url: Url,
    payload: impl serde::Serialize + Send + 'static,
    line_parser: fn(&str) -> StreamLine,
    api_key: Option<&str>
) -> Result<ChatStream, AgentError> {
    let mut req = http.post(url).json(&payload);
    if let Some(key) = api_key {
        req = req.bearer_auth(key);
    }
    let resp = req.send().await?.error_for_status()?;

    Ok(
        create_streaming_response(move |tx| async move {
            let mut bytes = resp.bytes_stream();
            let mut pending: Vec<u8> = Vec::new();
            let mut saw_token = false;

            loop {
                let chunk = bytes.next().await;
                let at_end = chunk.is_none();
                match chunk {
                    Some(Ok(buf)) => pending.extend_from_slice(&buf),
                    Some(Err(e)) => {
                        let _ = tx.send(Err(e.into())).await;
                        return;
                    }
                    // flush a final line that has no trailing newline
                    None => pending.push(b'\n'),
                }

                while let Some(pos) = pending.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=pos).collect();
                    let text = String::from_utf8_lossy(&line);
                    match line_parser(text.trim()) {
                        StreamLine::Token(tok) => {
                            saw_token = true;
                            if tx.send(Ok(tok)).await.is_err() {
                                return;
                            }
                        }
                        StreamLine::Done => {
                            return;
                        }
                        StreamLine::Skip => {}
                        StreamLine::Error(msg) => {
                            warn!("Streaming response rejected: {}", msg);
                            let _ = tx.send(Err(AgentError::Capability(msg))).await;
                            return;
                        }
                    }
                }

                if at_end {
                    break;
                }
            }

            if !saw_token {
                let _ = tx.send(
                    Err(AgentError::Capability("Stream ended without a completion".into()))
                ).await;
            }
        })
    )
}

/// Drains a token stream into the full reply, stopping at the first error.
pub async fn collect_stream(mut stream: ChatStream) -> Result<String, AgentError> {
    let mut reply = String::new();
    while let Some(token) = stream.next().await {
        reply.push_str(&token?);
    }
    Ok(reply)
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, AgentError> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::OpenAI => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Ollama => {
            let specific_client = OllamaChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}
