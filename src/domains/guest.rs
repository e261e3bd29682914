use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::domains::chat::Chat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GuestSessionStatus {
    Active,
    Expired,
}

/// Anonymous session bound to a single chat. Status only ever moves
/// ACTIVE -> EXPIRED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestSession {
    #[serde(default)]
    pub id: String,
    pub session_id: String,
    pub chat_id: String,
    pub created_at: i64,
    pub status: GuestSessionStatus,
}

/// Composed view returned when a guest session is opened.
#[derive(Debug, Clone, SimpleObject)]
pub struct GuestSessionView {
    pub id: String,
    pub session_id: String,
    pub created_at: i64,
    pub status: GuestSessionStatus,
    pub chat: Chat,
}
