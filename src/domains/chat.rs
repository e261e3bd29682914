use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::auth::Owned;

/// Exactly one of `user_id` and `session_id` is set: a chat belongs either to
/// an account or to a guest session, never both.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
#[graphql(complex)]
pub struct Chat {
    #[serde(default)]
    pub id: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub model_id: Option<String>,
    pub title: String,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    /// Cache of message ids; reads go through chat-scoped queries.
    #[graphql(skip)]
    #[serde(default)]
    pub message_ids: Vec<String>,
}

impl Chat {
    pub fn owned(user_id: String, title: String, model_id: Option<String>, now: i64) -> Self {
        Self {
            id: String::new(),
            user_id: Some(user_id),
            session_id: None,
            model_id,
            title,
            created_at: now,
            updated_at: None,
            message_ids: Vec::new(),
        }
    }

    pub fn guest(session_id: String, title: String, model_id: Option<String>, now: i64) -> Self {
        Self {
            id: String::new(),
            user_id: None,
            session_id: Some(session_id),
            model_id,
            title,
            created_at: now,
            updated_at: None,
            message_ids: Vec::new(),
        }
    }

    pub fn binding_is_exclusive(&self) -> bool {
        self.user_id.is_some() != self.session_id.is_some()
    }
}

impl Owned for Chat {
    fn owner_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
