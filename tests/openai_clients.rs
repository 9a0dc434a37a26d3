use mavericks::agent::{ run_math_chat, tuple_conversation, typed_conversation };
use mavericks::error::AgentError;
use mavericks::llm::chat::openai::OpenAIChatClient;
use mavericks::llm::chat::ChatClient;
use mavericks::llm::embedding::openai::OpenAIEmbeddingClient;
use mavericks::llm::embedding::EmbeddingClient;
use mavericks::models::chat::ChatMessage;
use mockito::{ Matcher, Server };
use serde_json::json;

fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            { "index": 0, "message": { "role": "assistant", "content": content }, "finish_reason": "stop" }
        ]
    }).to_string()
}

fn base_url(server: &Server) -> String {
    format!("{}/v1", server.url())
}

#[tokio::test]
async fn tuple_and_typed_notation_send_identical_requests() {
    let mut server = Server::new_async().await;
    let expected = json!({
        "model": "llama-3.2-3b-instruct",
        "messages": [
            { "role": "system", "content": "Solve the following math problems" },
            { "role": "user", "content": "What is 81 divided by 9?" }
        ],
        "stream": false
    });
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::Json(expected))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body("81 divided by 9 is 9."))
        .expect(2)
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), false).unwrap();
    let from_tuples = client.invoke(&tuple_conversation().unwrap()).await.unwrap();
    let from_typed = client
        .invoke(&[
            ChatMessage::system("Solve the following math problems"),
            ChatMessage::human("What is 81 divided by 9?"),
        ]).await
        .unwrap();

    assert_eq!(from_tuples, from_typed);
    assert_eq!(from_tuples.response, "81 divided by 9 is 9.");
    mock.assert_async().await;
}

#[tokio::test]
async fn typed_conversation_carries_prior_ai_turn() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(
            Matcher::PartialJson(
                json!({
                "messages": [
                    { "role": "system", "content": "Solve the following math problems" },
                    { "role": "user", "content": "What is 81 divided by 9?" },
                    { "role": "assistant", "content": "81 divided by 9 is 9." },
                    { "role": "user", "content": "What is 10 times 5?" }
                ]
            })
            )
        )
        .with_status(200)
        .with_body(completion_body("10 times 5 is 50."))
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), false).unwrap();
    let reply = client.invoke(&typed_conversation()).await.unwrap();
    assert_eq!(reply.response, "10 times 5 is 50.");
    mock.assert_async().await;
}

#[tokio::test]
async fn streamed_reply_is_joined() {
    let mut server = Server::new_async().await;
    let sse = [
        r#"data: {"choices":[{"delta":{"role":"assistant"},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"content":"81 divided "},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{"content":"by 9 is 9."},"finish_reason":null}]}"#,
        r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#,
        "data: [DONE]",
    ]
        .iter()
        .map(|l| format!("{}\n\n", l))
        .collect::<String>();
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_body(Matcher::PartialJson(json!({ "stream": true })))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(sse)
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), true).unwrap();
    let reply = client.invoke(&tuple_conversation().unwrap()).await.unwrap();
    assert_eq!(reply.response, "81 divided by 9 is 9.");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_surfaces_as_capability_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .with_body("model not loaded")
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), false).unwrap();
    let err = client.invoke(&typed_conversation()).await.unwrap_err();
    assert!(matches!(err, AgentError::Capability(_)));
}

#[tokio::test]
async fn api_key_is_sent_as_bearer_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-local")
        .with_status(200)
        .with_body(completion_body("ok"))
        .create_async().await;

    let client = OpenAIChatClient::new(
        Some("sk-local".into()),
        None,
        Some(base_url(&server)),
        false
    ).unwrap();
    client.invoke(&typed_conversation()).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn math_chat_runs_both_scenarios() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(completion_body("done"))
        .expect(2)
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), false).unwrap();
    let answers = run_math_chat(&client).await.unwrap();
    assert_eq!(answers, vec!["done".to_string(), "done".to_string()]);
    mock.assert_async().await;
}

#[tokio::test]
async fn batch_embeddings_follow_response_index() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/embeddings")
        .match_body(
            Matcher::Json(
                json!({
                "model": "text-embedding-nomic-embed-text-v1.5",
                "input": ["first", "second"]
            })
            )
        )
        .with_status(200)
        .with_body(
            json!({
                "object": "list",
                "data": [
                    { "object": "embedding", "index": 1, "embedding": [0.0, 1.0] },
                    { "object": "embedding", "index": 0, "embedding": [1.0, 0.0] }
                ]
            }).to_string()
        )
        .create_async().await;

    let client = OpenAIEmbeddingClient::new(None, None, Some(base_url(&server))).unwrap();
    let vectors = client.embed_batch(&["first".to_string(), "second".to_string()]).await.unwrap();
    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    mock.assert_async().await;
}

#[tokio::test]
async fn short_embedding_response_is_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/embeddings")
        .with_status(200)
        .with_body(json!({ "data": [] }).to_string())
        .create_async().await;

    let client = OpenAIEmbeddingClient::new(None, None, Some(base_url(&server))).unwrap();
    let err = client.embed("Name = Kathryn").await.unwrap_err();
    assert!(matches!(err, AgentError::Capability(_)));
}

#[tokio::test]
async fn embeddings_are_requested_in_batches() {
    let mut server = Server::new_async().await;
    let embedding_list = |vectors: &[[f32; 2]]| {
        let data = vectors
            .iter()
            .enumerate()
            .map(|(index, v)| json!({ "object": "embedding", "index": index, "embedding": v }))
            .collect::<Vec<_>>();
        json!({ "object": "list", "data": data }).to_string()
    };
    let first = server
        .mock("POST", "/v1/embeddings")
        .match_body(Matcher::PartialJson(json!({ "input": ["a", "b"] })))
        .with_status(200)
        .with_body(embedding_list(&[[1.0, 0.0], [0.0, 1.0]]))
        .expect(1)
        .create_async().await;
    let second = server
        .mock("POST", "/v1/embeddings")
        .match_body(Matcher::PartialJson(json!({ "input": ["c"] })))
        .with_status(200)
        .with_body(embedding_list(&[[0.5, 0.5]]))
        .expect(1)
        .create_async().await;

    let client = OpenAIEmbeddingClient::new(None, None, Some(base_url(&server)))
        .unwrap()
        .with_batch_size(2);
    let texts = ["a", "b", "c"].map(String::from);
    let vectors = client.embed_batch(&texts).await.unwrap();

    assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
    first.assert_async().await;
    second.assert_async().await;
}

async fn stream_reply_from(body: &str) -> Result<String, AgentError> {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(body)
        .create_async().await;

    let client = OpenAIChatClient::new(None, None, Some(base_url(&server)), true).unwrap();
    client.invoke(&typed_conversation()).await.map(|reply| reply.response)
}

#[tokio::test]
async fn streamed_error_object_is_a_capability_error() {
    let err = stream_reply_from("data: {\"error\":{\"message\":\"model crashed\"}}\n\n").await.unwrap_err();
    match err {
        AgentError::Capability(msg) => assert!(msg.contains("model crashed")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn non_event_stream_body_is_a_capability_error() {
    let err = stream_reply_from("<html>not an api</html>").await.unwrap_err();
    assert!(matches!(err, AgentError::Capability(_)));
}

#[tokio::test]
async fn undecodable_stream_chunk_is_a_capability_error() {
    let err = stream_reply_from("data: {\"choices\": [\n\n").await.unwrap_err();
    assert!(matches!(err, AgentError::Capability(_)));
}

#[tokio::test]
async fn stream_without_completion_is_a_capability_error() {
    let err = stream_reply_from(": keep-alive\n\n").await.unwrap_err();
    assert!(matches!(err, AgentError::Capability(_)));
}

#[tokio::test]
async fn empty_completion_with_stop_is_accepted() {
    let reply = stream_reply_from(
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n"
    ).await.unwrap();
    assert_eq!(reply, "");
}
