use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    #[default]
    Empty,
    Bad,
    Good,
}

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Message {
    #[serde(default)]
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub bookmark: bool,
    #[serde(default)]
    pub rating: Rating,
    pub created_at: i64,
    pub updated_at: Option<i64>,
}

impl Message {
    pub fn new(chat_id: String, role: Role, content: String, now: i64) -> Self {
        Self {
            id: String::new(),
            chat_id,
            role,
            content,
            bookmark: false,
            rating: Rating::Empty,
            created_at: now,
            updated_at: None,
        }
    }
}

/// A user message and the assistant reply produced for it.
#[derive(Debug, Clone, SimpleObject)]
pub struct MessagePair {
    pub user_message: Message,
    pub assistant_message: Message,
}
