mod common;

use platica::error::PlaticaError;
use platica::pagination::WindowArgs;
use platica::services::chats::CreateChatInput;
use platica::services::reminders::CreateReminderInput;

use common::{backend, register_and_login};

#[tokio::test]
async fn reminder_ownership_is_enforced() {
    let backend = backend().await;
    let (_, token_a) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let (_, token_b) = register_and_login(&backend, "Bruno", "bruno@example.com").await;

    let reminder = backend
        .reminders
        .create(
            &token_a,
            CreateReminderInput {
                title: "Pay rent".to_string(),
                description: None,
                due_at: 1_900_000_000,
            },
        )
        .await
        .unwrap();

    let err = backend
        .reminders
        .delete(&token_b, &reminder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Forbidden(_)));

    let err = backend
        .reminders
        .get(&token_b, &reminder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Forbidden(_)));

    backend
        .reminders
        .delete(&token_a, &reminder.id)
        .await
        .unwrap();

    let err = backend
        .reminders
        .get(&token_a, &reminder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::NotFound(_)));
}

#[tokio::test]
async fn verification_failures_take_precedence_over_lookups() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;

    let reminder = backend
        .reminders
        .create(
            &token,
            CreateReminderInput {
                title: "Pay rent".to_string(),
                description: None,
                due_at: 1_900_000_000,
            },
        )
        .await
        .unwrap();

    // Malformed credential with an existing record: Unauthenticated, not
    // Forbidden or NotFound.
    let err = backend
        .reminders
        .delete("garbage-token", &reminder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Unauthenticated(_)));

    let expired = backend.gate.sign_with_ttl("someone", -5).unwrap();
    let err = backend
        .reminders
        .delete(&expired, &reminder.id)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Unauthenticated(_)));

    // Still present after the rejected attempts.
    assert!(backend.reminders.get(&token, &reminder.id).await.is_ok());
}

#[tokio::test]
async fn chat_scoped_reads_are_owner_checked() {
    let backend = backend().await;
    let (_, token_a) = register_and_login(&backend, "Ana", "ana@example.com").await;
    let (_, token_b) = register_and_login(&backend, "Bruno", "bruno@example.com").await;

    let chat = backend
        .chats
        .create(
            &token_a,
            CreateChatInput {
                title: "Budget questions".to_string(),
                model_id: None,
            },
        )
        .await
        .unwrap();

    let args = WindowArgs::new("created_at", false, 10, 0);
    let err = backend
        .messages
        .list_for_chat(&token_b, &chat.id, &args)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Forbidden(_)));

    assert!(backend
        .messages
        .list_for_chat(&token_a, &chat.id, &args)
        .await
        .is_ok());
}

#[tokio::test]
async fn guest_chats_are_unreachable_with_a_bearer_credential() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;

    let view = backend.guest.create_session().await.unwrap();
    let args = WindowArgs::new("created_at", false, 10, 0);
    let err = backend
        .messages
        .list_for_chat(&token, &view.chat.id, &args)
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::Forbidden(_)));
}

#[tokio::test]
async fn unknown_ids_do_not_resolve() {
    let backend = backend().await;
    let (_, token) = register_and_login(&backend, "Ana", "ana@example.com").await;

    // A well-formed but absent id and a malformed id both fail NotFound.
    let err = backend
        .reminders
        .get(&token, "64b5f0c0a7e0a1b2c3d4e5f6")
        .await
        .unwrap_err();
    assert!(matches!(err, PlaticaError::NotFound(_)));

    let err = backend.reminders.get(&token, "nonsense").await.unwrap_err();
    assert!(matches!(err, PlaticaError::NotFound(_)));
}
