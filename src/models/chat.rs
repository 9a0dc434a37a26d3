use serde::{ Deserialize, Serialize };

use crate::error::AgentError;

/// One turn of a conversation. Order within a conversation is significant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatMessage {
    System(String),
    Human(String),
    Ai(String),
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage::System(content.into())
    }

    pub fn human(content: impl Into<String>) -> Self {
        ChatMessage::Human(content.into())
    }

    pub fn ai(content: impl Into<String>) -> Self {
        ChatMessage::Ai(content.into())
    }

    /// Role name as used by OpenAI-compatible and Ollama chat endpoints.
    pub fn role(&self) -> &'static str {
        match self {
            ChatMessage::System(_) => "system",
            ChatMessage::Human(_) => "user",
            ChatMessage::Ai(_) => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System(c) | ChatMessage::Human(c) | ChatMessage::Ai(c) => c,
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role().to_string(),
            content: self.content().to_string(),
        }
    }
}

impl TryFrom<(&str, &str)> for ChatMessage {
    type Error = AgentError;

    fn try_from((role, content): (&str, &str)) -> Result<Self, Self::Error> {
        match role.to_lowercase().as_str() {
            "system" => Ok(ChatMessage::system(content)),
            "user" | "human" => Ok(ChatMessage::human(content)),
            "assistant" | "ai" => Ok(ChatMessage::ai(content)),
            _ => Err(AgentError::Config(format!("Unknown chat message role: '{}'", role))),
        }
    }
}

/// Converts `(role, text)` tuples into a conversation, failing on the first unknown role.
pub fn conversation_from_tuples(turns: &[(&str, &str)]) -> Result<Vec<ChatMessage>, AgentError> {
    turns.iter().copied().map(ChatMessage::try_from).collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_and_typed_notation_are_equal() {
        let tuples = conversation_from_tuples(&[
            ("system", "Solve the following math problems"),
            ("user", "What is 81 divided by 9?"),
        ]).unwrap();
        let typed = vec![
            ChatMessage::system("Solve the following math problems"),
            ChatMessage::human("What is 81 divided by 9?"),
        ];
        assert_eq!(tuples, typed);
    }

    #[test]
    fn role_aliases() {
        assert_eq!(ChatMessage::try_from(("human", "hi")).unwrap(), ChatMessage::human("hi"));
        assert_eq!(ChatMessage::try_from(("AI", "ok")).unwrap(), ChatMessage::ai("ok"));
        assert_eq!(ChatMessage::try_from(("assistant", "ok")).unwrap().role(), "assistant");
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = ChatMessage::try_from(("tool", "x")).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }

    #[test]
    fn wire_roles() {
        assert_eq!(ChatMessage::system("s").to_wire().role, "system");
        assert_eq!(ChatMessage::human("u").to_wire().role, "user");
        assert_eq!(ChatMessage::ai("a").to_wire().content, "a");
    }
}
