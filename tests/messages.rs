mod common;

use platica::domains::message::{Rating, Role};
use platica::error::PlaticaError;
use platica::pagination::WindowArgs;
use platica::services::chats::CreateChatInput;
use platica::services::messages::{
    CreateMessageInput, DeleteMessageInput, RegenerateMessageInput, UpdateMessageInput,
};

use common::{backend, register_and_login, TestBackend};

async fn chat_for(backend: &TestBackend, token: &str, title: &str) -> String {
    backend
        .chats
        .create(
            token,
            CreateChatInput {
                title: title.to_string(),
                model_id: None,
            },
        )
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn exchange_produces_a_pair_and_links_the_chat() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    let pair = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat_id.clone(),
                content: "What is compound interest?".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(pair.user_message.role, Role::User);
    assert_eq!(pair.user_message.content, "What is compound interest?");
    assert_eq!(pair.assistant_message.role, Role::Assistant);
    assert_eq!(pair.assistant_message.content, "mock reply");

    let history = backend.message_repo.history(&chat_id).await.unwrap();
    assert_eq!(history.len(), 2);

    let chat = backend.chat_repo.get(&chat_id).await.unwrap();
    assert_eq!(
        chat.message_ids,
        vec![pair.user_message.id.clone(), pair.assistant_message.id.clone()]
    );
    assert!(chat.updated_at.is_some());
}

#[tokio::test]
async fn generation_failure_writes_nothing() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    backend.generator.set_failing(true);
    let err = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat_id.clone(),
                content: "hello?".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::BackendUnavailable(_)));

    // Never exactly one message: the failed exchange left zero.
    assert!(backend.message_repo.history(&chat_id).await.unwrap().is_empty());
    let chat = backend.chat_repo.get(&chat_id).await.unwrap();
    assert!(chat.message_ids.is_empty());
}

#[tokio::test]
async fn generation_receives_the_prior_history() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    for content in ["first", "second"] {
        backend
            .messages
            .create(
                &token,
                CreateMessageInput {
                    chat_id: chat_id.clone(),
                    content: content.to_string(),
                },
            )
            .await
            .unwrap();
    }

    let lengths = backend.generator.history_lengths.lock().unwrap().clone();
    assert_eq!(lengths, vec![0, 2]);
}

#[tokio::test]
async fn missing_model_aborts_before_any_write() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;

    let chat = backend
        .chats
        .create(
            &token,
            CreateChatInput {
                title: "Broken binding".to_string(),
                model_id: Some("64b5f0c0a7e0a1b2c3d4e5f6".to_string()),
            },
        )
        .await
        .unwrap();

    let err = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat.id.clone(),
                content: "hello".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::ModelNotFound(_)));
    assert!(backend.message_repo.history(&chat.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_requires_bookmark_or_rating() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    let pair = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id,
                content: "hello".to_string(),
            },
        )
        .await
        .unwrap();

    let err = backend
        .messages
        .update(
            &token,
            UpdateMessageInput {
                message_id: pair.assistant_message.id.clone(),
                bookmark: None,
                rating: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::InvalidArgument(_)));

    let updated = backend
        .messages
        .update(
            &token,
            UpdateMessageInput {
                message_id: pair.assistant_message.id.clone(),
                bookmark: Some(true),
                rating: Some(Rating::Good),
            },
        )
        .await
        .unwrap();
    assert!(updated.bookmark);
    assert_eq!(updated.rating, Rating::Good);
    assert!(updated.updated_at.is_some());
}

#[tokio::test]
async fn regenerate_updates_both_documents_in_place() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    let pair = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat_id.clone(),
                content: "original".to_string(),
            },
        )
        .await
        .unwrap();

    let regenerated = backend
        .messages
        .regenerate(
            &token,
            RegenerateMessageInput {
                user_message_id: pair.user_message.id.clone(),
                assistant_message_id: pair.assistant_message.id.clone(),
                content: "rephrased".to_string(),
            },
        )
        .await
        .unwrap();

    assert_eq!(regenerated.user_message.id, pair.user_message.id);
    assert_eq!(regenerated.user_message.content, "rephrased");
    assert_eq!(regenerated.assistant_message.content, "mock reply");
    assert!(regenerated.user_message.updated_at.is_some());

    // Still exactly two messages in the chat.
    assert_eq!(backend.message_repo.history(&chat_id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn delete_removes_exactly_the_pair() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let chat_id = chat_for(&backend, &token, "Budget").await;

    let first = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat_id.clone(),
                content: "keep".to_string(),
            },
        )
        .await
        .unwrap();
    let second = backend
        .messages
        .create(
            &token,
            CreateMessageInput {
                chat_id: chat_id.clone(),
                content: "drop".to_string(),
            },
        )
        .await
        .unwrap();

    backend
        .messages
        .delete(
            &token,
            DeleteMessageInput {
                user_message_id: second.user_message.id.clone(),
                assistant_message_id: second.assistant_message.id.clone(),
            },
        )
        .await
        .unwrap();

    let history = backend.message_repo.history(&chat_id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().any(|m| m.id == first.user_message.id));

    let err = backend
        .messages
        .delete(
            &token,
            DeleteMessageInput {
                user_message_id: second.user_message.id,
                assistant_message_id: second.assistant_message.id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::NotFound(_)));
}

#[tokio::test]
async fn favorites_span_all_owned_chats() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let (_, other_token) = register_and_login(&backend, "Bruno", "bruno@example.com").await;

    let chat_a = chat_for(&backend, &token, "First").await;
    let chat_b = chat_for(&backend, &token, "Second").await;
    let foreign = chat_for(&backend, &other_token, "Foreign").await;

    for chat_id in [&chat_a, &chat_b, &foreign] {
        let owner_token = if chat_id == &foreign { &other_token } else { &token };
        let pair = backend
            .messages
            .create(
                owner_token,
                CreateMessageInput {
                    chat_id: chat_id.clone(),
                    content: "bookmark me".to_string(),
                },
            )
            .await
            .unwrap();
        backend
            .messages
            .update(
                owner_token,
                UpdateMessageInput {
                    message_id: pair.assistant_message.id,
                    bookmark: Some(true),
                    rating: None,
                },
            )
            .await
            .unwrap();
    }

    let args = WindowArgs::new("created_at", true, 10, 0);
    let favorites = backend.messages.favorites(&token, &args).await.unwrap();
    assert_eq!(favorites.total_items_count, 2);
    assert!(favorites
        .items
        .iter()
        .all(|message| message.bookmark && message.chat_id != foreign));
}
