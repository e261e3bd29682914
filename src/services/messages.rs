use std::sync::Arc;

use async_graphql::InputObject;
use mongodb::bson::doc;

use crate::auth::AccessGate;
use crate::domains::chat::Chat;
use crate::domains::message::{Message, MessagePair, Rating, Role};
use crate::domains::model::AiModel;
use crate::domains::now_ts;
use crate::error::{PlaticaError, Result};
use crate::interfaces::generation::{ChatTurn, Generator};
use crate::pagination::{Window, WindowArgs};
use crate::repos::chats::ChatRepo;
use crate::repos::messages::MessageRepo;
use crate::repos::models::ModelRepo;

#[derive(Debug, Clone, InputObject)]
pub struct CreateMessageInput {
    pub chat_id: String,
    pub content: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateMessageInput {
    pub message_id: String,
    pub bookmark: Option<bool>,
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, InputObject)]
pub struct DeleteMessageInput {
    pub user_message_id: String,
    pub assistant_message_id: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct RegenerateMessageInput {
    pub user_message_id: String,
    pub assistant_message_id: String,
    pub content: String,
}

#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepo,
    chats: ChatRepo,
    models: ModelRepo,
    gate: Arc<AccessGate>,
    generator: Arc<dyn Generator>,
    default_model_id: Option<String>,
    max_output_length: u32,
}

impl MessageService {
    pub fn new(
        messages: MessageRepo,
        chats: ChatRepo,
        models: ModelRepo,
        gate: Arc<AccessGate>,
        generator: Arc<dyn Generator>,
        default_model_id: Option<String>,
        max_output_length: u32,
    ) -> Self {
        Self {
            messages,
            chats,
            models,
            gate,
            generator,
            default_model_id,
            max_output_length,
        }
    }

    async fn resolve_model(&self, chat: &Chat) -> Result<AiModel> {
        let model_id = chat
            .model_id
            .clone()
            .or_else(|| self.default_model_id.clone())
            .ok_or_else(|| {
                PlaticaError::ModelNotFound(format!(
                    "chat {} has no model bound and no default model is configured",
                    chat.id
                ))
            })?;
        match self.models.get(&model_id).await {
            Ok(model) => Ok(model),
            Err(PlaticaError::NotFound(_)) => Err(PlaticaError::ModelNotFound(format!(
                "model {model_id} is not registered"
            ))),
            Err(other) => Err(other),
        }
    }

    /// The message-pair sequence: generation runs first against the full
    /// prior history, so a backend failure aborts before anything is
    /// written. After both inserts the chat's cache list is linked; a failed
    /// link is reported as an inconsistency, the messages stay reachable
    /// through chat-scoped queries.
    pub(crate) async fn exchange(&self, chat: &Chat, content: &str) -> Result<MessagePair> {
        let model = self.resolve_model(chat).await?;
        let prior = self.messages.history(&chat.id).await?;
        let history: Vec<ChatTurn> = prior
            .into_iter()
            .map(|message| ChatTurn {
                role: message.role,
                content: message.content,
            })
            .collect();

        let reply = self
            .generator
            .generate(&history, content, &model, self.max_output_length)
            .await?;

        let now = now_ts();
        let user_id = self
            .messages
            .insert(&Message::new(
                chat.id.clone(),
                Role::User,
                content.to_string(),
                now,
            ))
            .await?;
        let assistant_id = self
            .messages
            .insert(&Message::new(chat.id.clone(), Role::Assistant, reply, now))
            .await?;

        let matched = self
            .chats
            .push_message_ids(&chat.id, &[user_id.clone(), assistant_id.clone()], now)
            .await?;
        if matched == 0 {
            tracing::error!(
                chat = %chat.id,
                user_message = %user_id,
                assistant_message = %assistant_id,
                "messages stored but chat link failed"
            );
            return Err(PlaticaError::Inconsistent(format!(
                "messages {user_id} and {assistant_id} were stored but chat {} could not be \
                 updated",
                chat.id
            )));
        }

        Ok(MessagePair {
            user_message: self.messages.get(&user_id).await?,
            assistant_message: self.messages.get(&assistant_id).await?,
        })
    }

    pub async fn create(&self, token: &str, input: CreateMessageInput) -> Result<MessagePair> {
        let claims = self.gate.verify(token)?;
        let chat = self.chats.get(&input.chat_id).await?;
        self.gate.ensure_owner(&claims, &chat)?;
        self.exchange(&chat, &input.content).await
    }

    pub async fn update(&self, token: &str, input: UpdateMessageInput) -> Result<Message> {
        if input.bookmark.is_none() && input.rating.is_none() {
            return Err(PlaticaError::InvalidArgument(
                "either bookmark or rating must be provided".to_string(),
            ));
        }

        let claims = self.gate.verify(token)?;
        let message = self.messages.get(&input.message_id).await?;
        let chat = self.chats.get(&message.chat_id).await?;
        self.gate.ensure_owner(&claims, &chat)?;

        let now = now_ts();
        let mut set = doc! {"updated_at": now};
        if let Some(bookmark) = input.bookmark {
            set.insert("bookmark", bookmark);
        }
        if let Some(rating) = input.rating {
            let value = mongodb::bson::to_bson(&rating)
                .map_err(|e| PlaticaError::Serialization(e.to_string()))?;
            set.insert("rating", value);
        }

        let matched = self.messages.update_fields(&input.message_id, set).await?;
        if matched == 0 {
            return Err(PlaticaError::NotFound(format!(
                "message {} not found",
                input.message_id
            )));
        }
        self.chats
            .update_fields(&chat.id, doc! {"updated_at": now})
            .await?;
        self.messages.get(&input.message_id).await
    }

    pub async fn delete(&self, token: &str, input: DeleteMessageInput) -> Result<MessagePair> {
        let claims = self.gate.verify(token)?;
        let user_message = self.messages.get(&input.user_message_id).await?;
        let assistant_message = self.messages.get(&input.assistant_message_id).await?;
        if user_message.chat_id != assistant_message.chat_id {
            return Err(PlaticaError::InvalidArgument(
                "messages do not belong to the same chat".to_string(),
            ));
        }
        let chat = self.chats.get(&user_message.chat_id).await?;
        self.gate.ensure_owner(&claims, &chat)?;

        let user_deleted = self.messages.delete(&input.user_message_id).await?;
        let assistant_deleted = self.messages.delete(&input.assistant_message_id).await?;
        if user_deleted != 1 || assistant_deleted != 1 {
            tracing::error!(
                chat = %chat.id,
                user_deleted,
                assistant_deleted,
                "message pair delete left the store inconsistent"
            );
            return Err(PlaticaError::Inconsistent(format!(
                "deleted {user_deleted} user and {assistant_deleted} assistant messages, \
                 expected one of each"
            )));
        }
        Ok(MessagePair {
            user_message,
            assistant_message,
        })
    }

    /// Regeneration updates both documents in place after the backend call;
    /// both updates must match exactly one document.
    pub async fn regenerate(
        &self,
        token: &str,
        input: RegenerateMessageInput,
    ) -> Result<MessagePair> {
        let claims = self.gate.verify(token)?;
        let user_message = self.messages.get(&input.user_message_id).await?;
        let assistant_message = self.messages.get(&input.assistant_message_id).await?;
        if user_message.chat_id != assistant_message.chat_id {
            return Err(PlaticaError::InvalidArgument(
                "messages do not belong to the same chat".to_string(),
            ));
        }
        let chat = self.chats.get(&user_message.chat_id).await?;
        self.gate.ensure_owner(&claims, &chat)?;

        let model = self.resolve_model(&chat).await?;
        let prior = self.messages.history(&chat.id).await?;
        let history: Vec<ChatTurn> = prior
            .into_iter()
            .map(|message| ChatTurn {
                role: message.role,
                content: message.content,
            })
            .collect();
        let reply = self
            .generator
            .generate(&history, &input.content, &model, self.max_output_length)
            .await?;

        let now = now_ts();
        let user_matched = self
            .messages
            .update_fields(
                &input.user_message_id,
                doc! {"content": &input.content, "updated_at": now},
            )
            .await?;
        let assistant_matched = self
            .messages
            .update_fields(
                &input.assistant_message_id,
                doc! {"content": reply, "updated_at": now},
            )
            .await?;
        if user_matched != 1 || assistant_matched != 1 {
            tracing::error!(
                chat = %chat.id,
                user_matched,
                assistant_matched,
                "message pair regeneration left the store inconsistent"
            );
            return Err(PlaticaError::Inconsistent(format!(
                "regeneration matched {user_matched} user and {assistant_matched} assistant \
                 messages, expected one of each"
            )));
        }

        Ok(MessagePair {
            user_message: self.messages.get(&input.user_message_id).await?,
            assistant_message: self.messages.get(&input.assistant_message_id).await?,
        })
    }

    pub async fn list_for_chat(
        &self,
        token: &str,
        chat_id: &str,
        args: &WindowArgs,
    ) -> Result<Window<Message>> {
        let claims = self.gate.verify(token)?;
        let chat = self.chats.get(chat_id).await?;
        self.gate.ensure_owner(&claims, &chat)?;
        self.messages.window_for_chat(chat_id, args).await
    }

    /// Two-level favorites join: enumerate the caller's chats, then window
    /// the bookmarked messages across them.
    pub async fn favorites(&self, token: &str, args: &WindowArgs) -> Result<Window<Message>> {
        let claims = self.gate.verify(token)?;
        let chat_ids: Vec<String> = self
            .chats
            .find_by_owner(&claims.sub)
            .await?
            .into_iter()
            .map(|chat| chat.id)
            .collect();
        self.messages.window_favorites(&chat_ids, args).await
    }
}
