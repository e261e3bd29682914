use std::sync::Arc;

use async_graphql::InputObject;
use mongodb::bson::Document;

use crate::auth::AccessGate;
use crate::domains::now_ts;
use crate::domains::reminder::Reminder;
use crate::error::{PlaticaError, Result};
use crate::pagination::{Window, WindowArgs};
use crate::repos::reminders::ReminderRepo;
use crate::repos::users::UserRepo;

#[derive(Debug, Clone, InputObject)]
pub struct CreateReminderInput {
    pub title: String,
    pub description: Option<String>,
    pub due_at: i64,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateReminderInput {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<i64>,
}

#[derive(Clone)]
pub struct ReminderService {
    reminders: ReminderRepo,
    users: UserRepo,
    gate: Arc<AccessGate>,
}

impl ReminderService {
    pub fn new(reminders: ReminderRepo, users: UserRepo, gate: Arc<AccessGate>) -> Self {
        Self {
            reminders,
            users,
            gate,
        }
    }

    /// Insert the reminder, then link it onto the owning user. A failed link
    /// leaves the inserted reminder in place and is reported as an
    /// inconsistency rather than rolled back.
    pub async fn create(&self, token: &str, input: CreateReminderInput) -> Result<Reminder> {
        let claims = self.gate.verify(token)?;
        let user = self.users.get(&claims.sub).await?;

        let reminder = Reminder::new(
            user.id.clone(),
            input.title,
            input.description,
            input.due_at,
            now_ts(),
        );
        let id = self.reminders.insert(&reminder).await?;

        let matched = self.users.push_reminder_id(&user.id, &id).await?;
        if matched == 0 {
            tracing::error!(reminder = %id, user = %user.id, "reminder stored but user link failed");
            return Err(PlaticaError::Inconsistent(format!(
                "reminder {id} was stored but linking it to user {} failed",
                user.id
            )));
        }
        self.reminders.get(&id).await
    }

    pub async fn get(&self, token: &str, id: &str) -> Result<Reminder> {
        let claims = self.gate.verify(token)?;
        let reminder = self.reminders.get(id).await?;
        self.gate.ensure_owner(&claims, &reminder)?;
        Ok(reminder)
    }

    pub async fn update(&self, token: &str, input: UpdateReminderInput) -> Result<Reminder> {
        let claims = self.gate.verify(token)?;
        let reminder = self.reminders.get(&input.id).await?;
        self.gate.ensure_owner(&claims, &reminder)?;

        let mut set = Document::new();
        if let Some(title) = input.title {
            set.insert("title", title);
        }
        if let Some(description) = input.description {
            set.insert("description", description);
        }
        if let Some(due_at) = input.due_at {
            set.insert("due_at", due_at);
        }
        set.insert("updated_at", now_ts());

        let matched = self.reminders.update_fields(&input.id, set).await?;
        if matched == 0 {
            return Err(PlaticaError::NotFound(format!(
                "reminder {} not found",
                input.id
            )));
        }
        self.reminders.get(&input.id).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<Reminder> {
        let claims = self.gate.verify(token)?;
        let reminder = self.reminders.get(id).await?;
        self.gate.ensure_owner(&claims, &reminder)?;

        let deleted = self.reminders.delete(id).await?;
        if deleted != 1 {
            return Err(PlaticaError::NotFound(format!("reminder {id} not found")));
        }
        Ok(reminder)
    }

    pub async fn list(&self, token: &str, args: &WindowArgs) -> Result<Window<Reminder>> {
        let claims = self.gate.verify(token)?;
        self.reminders.window_for_owner(&claims.sub, args).await
    }
}
