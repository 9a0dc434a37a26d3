use log::info;

use crate::error::AgentError;
use crate::llm::chat::ChatClient;
use crate::models::chat::{ conversation_from_tuples, ChatMessage };

pub const MATH_SYSTEM_PROMPT: &str = "Solve the following math problems";

/// Two-turn conversation written in `(role, text)` notation.
pub fn tuple_conversation() -> Result<Vec<ChatMessage>, AgentError> {
    conversation_from_tuples(&[
        ("system", MATH_SYSTEM_PROMPT),
        ("user", "What is 81 divided by 9?"),
    ])
}

/// Four-turn conversation with typed messages, including a prior assistant turn.
pub fn typed_conversation() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(MATH_SYSTEM_PROMPT),
        ChatMessage::human("What is 81 divided by 9?"),
        ChatMessage::ai("81 divided by 9 is 9."),
        ChatMessage::human("What is 10 times 5?")
    ]
}

pub async fn ask(client: &dyn ChatClient, messages: &[ChatMessage]) -> Result<String, AgentError> {
    let result = client.invoke(messages).await?;
    Ok(result.response)
}

/// Runs both scenarios in order and returns the replies.
pub async fn run_math_chat(client: &dyn ChatClient) -> Result<Vec<String>, AgentError> {
    let mut answers = Vec::with_capacity(2);
    for messages in [tuple_conversation()?, typed_conversation()] {
        info!("Sending {} messages to '{}'", messages.len(), client.model());
        let answer = ask(client, &messages).await?;
        println!("Answer from AI: {}", answer);
        answers.push(answer);
    }
    Ok(answers)
}
