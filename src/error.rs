use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required profile field '{0}'")]
    MissingField(&'static str),

    #[error("Capability error: {0}")]
    Capability(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::Capability(err.to_string())
    }
}

impl From<url::ParseError> for AgentError {
    fn from(err: url::ParseError) -> Self {
        AgentError::Config(format!("Invalid URL: {}", err))
    }
}
