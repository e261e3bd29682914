use std::collections::HashMap;

use uuid::Uuid;

use crate::domains::chat::Chat;
use crate::domains::guest::{GuestSession, GuestSessionStatus, GuestSessionView};
use crate::domains::message::MessagePair;
use crate::domains::now_ts;
use crate::error::{PlaticaError, Result};
use crate::pagination::{Window, WindowArgs};
use crate::repos::chats::ChatRepo;
use crate::repos::guests::GuestRepo;
use crate::repos::messages::MessageRepo;
use crate::services::messages::MessageService;

#[derive(Clone)]
pub struct GuestService {
    guests: GuestRepo,
    chats: ChatRepo,
    message_repo: MessageRepo,
    messages: MessageService,
    default_model_id: Option<String>,
    guest_chat_title: String,
    session_ttl_seconds: i64,
}

impl GuestService {
    pub fn new(
        guests: GuestRepo,
        chats: ChatRepo,
        message_repo: MessageRepo,
        messages: MessageService,
        default_model_id: Option<String>,
        guest_chat_title: String,
        session_ttl_seconds: i64,
    ) -> Self {
        Self {
            guests,
            chats,
            message_repo,
            messages,
            default_model_id,
            guest_chat_title,
            session_ttl_seconds,
        }
    }

    /// Insert the placeholder chat, then the session referencing it. If the
    /// session insert fails the chat is left orphaned; that gap is logged,
    /// not repaired.
    pub async fn create_session(&self) -> Result<GuestSessionView> {
        let session_id = Uuid::new_v4().to_string();
        let now = now_ts();

        let chat = Chat::guest(
            session_id.clone(),
            self.guest_chat_title.clone(),
            self.default_model_id.clone(),
            now,
        );
        let chat_id = self.chats.insert(&chat).await?;

        let session = GuestSession {
            id: String::new(),
            session_id: session_id.clone(),
            chat_id: chat_id.clone(),
            created_at: now,
            status: GuestSessionStatus::Active,
        };
        let id = match self.guests.insert_session(&session).await {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(chat = %chat_id, "guest session insert failed, chat is orphaned");
                return Err(err);
            }
        };

        let chat = self.chats.get(&chat_id).await?;
        Ok(GuestSessionView {
            id,
            session_id,
            created_at: now,
            status: GuestSessionStatus::Active,
            chat,
        })
    }

    pub async fn is_active(&self, session_id: &str) -> Result<bool> {
        Ok(self
            .guests
            .find_by_session_id(session_id)
            .await?
            .is_some_and(|session| session.status == GuestSessionStatus::Active))
    }

    pub async fn resolve_chat_id(&self, session_id: &str) -> Result<String> {
        self.guests
            .find_by_session_id(session_id)
            .await?
            .map(|session| session.chat_id)
            .ok_or_else(|| {
                PlaticaError::NotFound(format!("guest session {session_id} not found"))
            })
    }

    async fn active_session(&self, session_id: &str) -> Result<GuestSession> {
        let session = self
            .guests
            .find_by_session_id(session_id)
            .await?
            .ok_or_else(|| {
                PlaticaError::NotFound(format!("guest session {session_id} not found"))
            })?;
        if session.status != GuestSessionStatus::Active {
            return Err(PlaticaError::Forbidden(
                "guest session has expired".to_string(),
            ));
        }
        Ok(session)
    }

    pub async fn create_message(&self, session_id: &str, content: &str) -> Result<MessagePair> {
        let session = self.active_session(session_id).await?;
        let chat = self.chats.get(&session.chat_id).await?;
        if chat.session_id.as_deref() != Some(session_id) {
            return Err(PlaticaError::Forbidden(
                "chat is not bound to this session".to_string(),
            ));
        }

        let pair = self.messages.exchange(&chat, content).await?;
        self.guests.log_query(content, now_ts()).await?;
        Ok(pair)
    }

    pub async fn list_messages(
        &self,
        session_id: &str,
        chat_id: &str,
        args: &WindowArgs,
    ) -> Result<Window<crate::domains::message::Message>> {
        let session = self.active_session(session_id).await?;
        if session.chat_id != chat_id {
            return Err(PlaticaError::Forbidden(
                "chat is not bound to this session".to_string(),
            ));
        }
        self.message_repo.window_for_chat(chat_id, args).await
    }

    /// Guest queries newer than the cutoff, grouped by content, most
    /// frequent first. Grouping happens in-process; the store contract has
    /// no aggregation primitive.
    pub async fn popular_queries(&self, days: i64, limit: i64) -> Result<Vec<String>> {
        if days <= 0 || limit <= 0 {
            return Err(PlaticaError::InvalidArgument(
                "days and limit must be positive".to_string(),
            ));
        }
        let cutoff = now_ts() - days * 86_400;
        let contents = self.guests.queries_since(cutoff).await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for content in contents {
            *counts.entry(content).or_insert(0) += 1;
        }
        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranked
            .into_iter()
            .take(limit as usize)
            .map(|(content, _)| content)
            .collect())
    }

    /// Time-based sweep: ACTIVE sessions older than the TTL are flipped to
    /// EXPIRED. The transition is one-way; the per-document filter never
    /// touches an already expired session.
    pub async fn expire_stale(&self) -> Result<u64> {
        let cutoff = now_ts() - self.session_ttl_seconds;
        let stale = self.guests.find_active_older_than(cutoff).await?;
        let mut expired = 0;
        for session in stale {
            expired += self.guests.mark_expired(&session.id).await?;
        }
        Ok(expired)
    }
}
