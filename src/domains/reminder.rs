use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::auth::Owned;

#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Reminder {
    #[serde(default)]
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub due_at: i64,
    pub created_at: i64,
    pub updated_at: Option<i64>,
    #[serde(default)]
    pub notification_sent: bool,
}

impl Reminder {
    pub fn new(
        user_id: String,
        title: String,
        description: Option<String>,
        due_at: i64,
        now: i64,
    ) -> Self {
        Self {
            id: String::new(),
            user_id,
            title,
            description,
            due_at,
            created_at: now,
            updated_at: None,
            notification_sent: false,
        }
    }
}

impl Owned for Reminder {
    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}
