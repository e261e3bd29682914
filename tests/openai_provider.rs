use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use platica::domains::message::Role;
use platica::domains::model::AiModel;
use platica::error::PlaticaError;
use platica::interfaces::generation::{ChatTurn, Generator};
use platica::providers::openai::OpenAiGenerator;

fn model() -> AiModel {
    AiModel {
        id: "model-1".to_string(),
        name: "test".to_string(),
        algorithm: "chat-completions".to_string(),
        params: "{}".to_string(),
        description: "test model".to_string(),
        path: "gpt-4o-mini".to_string(),
    }
}

#[tokio::test]
async fn generates_a_reply_from_the_chat_endpoint() {
    let server = MockServer::start_async().await;
    let chat_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o-mini",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "mock text"},
                    "finish_reason": "stop"
                }]
            }));
        })
        .await;

    let generator = OpenAiGenerator::new(
        Some("key".to_string()),
        Some(server.base_url()),
        Some("You are a helpful assistant".to_string()),
    );
    let history = vec![
        ChatTurn {
            role: Role::User,
            content: "earlier question".to_string(),
        },
        ChatTurn {
            role: Role::Assistant,
            content: "earlier answer".to_string(),
        },
    ];

    let reply = generator
        .generate(&history, "next question", &model(), 256)
        .await
        .unwrap();
    assert_eq!(reply, "mock text");
    chat_mock.assert_hits(1);
}

#[tokio::test]
async fn backend_failures_surface_as_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).json_body(json!({"error": "boom"}));
        })
        .await;

    let generator = OpenAiGenerator::new(Some("key".to_string()), Some(server.base_url()), None);
    let err = generator
        .generate(&[], "question", &model(), 256)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::BackendUnavailable(_)));
}

#[tokio::test]
async fn empty_choices_surface_as_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(json!({
                "id": "chatcmpl-2",
                "object": "chat.completion",
                "created": 1,
                "model": "gpt-4o-mini",
                "choices": []
            }));
        })
        .await;

    let generator = OpenAiGenerator::new(Some("key".to_string()), Some(server.base_url()), None);
    let err = generator
        .generate(&[], "question", &model(), 256)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::BackendUnavailable(_)));
}
