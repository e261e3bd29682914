use std::sync::Arc;

use async_graphql::InputObject;
use mongodb::bson::Document;

use crate::auth::AccessGate;
use crate::domains::chat::Chat;
use crate::domains::now_ts;
use crate::error::{PlaticaError, Result};
use crate::pagination::{Window, WindowArgs};
use crate::repos::chats::ChatRepo;
use crate::repos::messages::MessageRepo;
use crate::repos::users::UserRepo;

#[derive(Debug, Clone, InputObject)]
pub struct CreateChatInput {
    pub title: String,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateChatInput {
    pub id: String,
    pub title: Option<String>,
    pub model_id: Option<String>,
}

#[derive(Clone)]
pub struct ChatService {
    chats: ChatRepo,
    users: UserRepo,
    messages: MessageRepo,
    gate: Arc<AccessGate>,
}

impl ChatService {
    pub fn new(
        chats: ChatRepo,
        users: UserRepo,
        messages: MessageRepo,
        gate: Arc<AccessGate>,
    ) -> Self {
        Self {
            chats,
            users,
            messages,
            gate,
        }
    }

    pub async fn create(&self, token: &str, input: CreateChatInput) -> Result<Chat> {
        let claims = self.gate.verify(token)?;
        let user = self.users.get(&claims.sub).await?;

        let chat = Chat::owned(user.id.clone(), input.title, input.model_id, now_ts());
        let id = self.chats.insert(&chat).await?;

        let matched = self.users.push_chat_id(&user.id, &id).await?;
        if matched == 0 {
            tracing::error!(chat = %id, user = %user.id, "chat stored but user link failed");
            return Err(PlaticaError::Inconsistent(format!(
                "chat {id} was stored but linking it to user {} failed",
                user.id
            )));
        }
        self.chats.get(&id).await
    }

    pub async fn get(&self, token: &str, id: &str) -> Result<Chat> {
        let claims = self.gate.verify(token)?;
        let chat = self.chats.get(id).await?;
        self.gate.ensure_owner(&claims, &chat)?;
        Ok(chat)
    }

    pub async fn update(&self, token: &str, input: UpdateChatInput) -> Result<Chat> {
        let claims = self.gate.verify(token)?;
        let chat = self.chats.get(&input.id).await?;
        self.gate.ensure_owner(&claims, &chat)?;

        let mut set = Document::new();
        if let Some(title) = input.title {
            set.insert("title", title);
        }
        if let Some(model_id) = input.model_id {
            set.insert("model_id", model_id);
        }
        set.insert("updated_at", now_ts());

        let matched = self.chats.update_fields(&input.id, set).await?;
        if matched == 0 {
            return Err(PlaticaError::NotFound(format!(
                "chat {} not found",
                input.id
            )));
        }
        self.chats.get(&input.id).await
    }

    /// Enumerate-then-delete cascade. The enumeration happens before the
    /// deletes so a concurrent insert racing the cascade surfaces as a count
    /// mismatch instead of silently undercounting.
    pub async fn delete_cascade(&self, token: &str, id: &str) -> Result<Chat> {
        let claims = self.gate.verify(token)?;
        let chat = self.chats.get(id).await?;
        self.gate.ensure_owner(&claims, &chat)?;

        let enumerated = self.messages.history(&chat.id).await?.len() as u64;
        let deleted = self.messages.delete_for_chat(&chat.id).await?;
        let chats_deleted = self.chats.delete(&chat.id).await?;

        if deleted != enumerated || chats_deleted != 1 {
            tracing::error!(
                chat = %chat.id,
                enumerated,
                deleted,
                chats_deleted,
                "cascade delete left the store inconsistent"
            );
            return Err(PlaticaError::Inconsistent(format!(
                "cascade for chat {id} removed {deleted} of {enumerated} messages and \
                 {chats_deleted} chats"
            )));
        }
        Ok(chat)
    }

    pub async fn list(&self, token: &str, args: &WindowArgs) -> Result<Window<Chat>> {
        let claims = self.gate.verify(token)?;
        self.chats.window_for_owner(&claims.sub, args).await
    }
}
