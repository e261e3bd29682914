use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::domains::now_ts;
use crate::domains::reminder::Reminder;
use crate::domains::user::User;
use crate::error::Result;
use crate::interfaces::mail::Mailer;
use crate::repos::reminders::ReminderRepo;
use crate::repos::users::UserRepo;
use crate::scheduler::ScheduledJob;
use crate::services::guest::GuestService;

const NOTIFY_HORIZON_SECONDS: i64 = 3600;

const DUE_FORMAT: &[FormatItem<'static>] =
    format_description!("[day]/[month]/[year] [hour]:[minute]");

fn format_due(ts: i64) -> String {
    OffsetDateTime::from_unix_timestamp(ts)
        .ok()
        .and_then(|dt| dt.format(DUE_FORMAT).ok())
        .unwrap_or_else(|| ts.to_string())
}

pub fn reminder_email_body(user: &User, reminder: &Reminder) -> String {
    let description = reminder
        .description
        .as_deref()
        .map(|text| format!("<p>Description: {text}</p>"))
        .unwrap_or_default();
    format!(
        "<html>\n  <body>\n    <h1>Hello {name}</h1>\n    <p>This is your reminder for \
         <strong>{title}</strong></p>\n    {description}\n    <p>Due: {due}</p>\n    <br>\n    \
         <p>Regards,<br>The Platica team</p>\n  </body>\n</html>",
        name = user.name,
        title = reminder.title,
        due = format_due(reminder.due_at),
    )
}

/// Emails owners of reminders coming due within the next hour, then flips
/// the notification flag so a reminder is announced once.
pub struct ReminderNotifierJob {
    reminders: ReminderRepo,
    users: UserRepo,
    mailer: Arc<dyn Mailer>,
    interval: Duration,
}

impl ReminderNotifierJob {
    pub fn new(
        reminders: ReminderRepo,
        users: UserRepo,
        mailer: Arc<dyn Mailer>,
        interval: Duration,
    ) -> Self {
        Self {
            reminders,
            users,
            mailer,
            interval,
        }
    }
}

#[async_trait]
impl ScheduledJob for ReminderNotifierJob {
    fn name(&self) -> &str {
        "reminder_notifier"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        let now = now_ts();
        let due = self
            .reminders
            .find_due_unnotified(now, now + NOTIFY_HORIZON_SECONDS)
            .await?;

        for reminder in due {
            let user = match self.users.get(&reminder.user_id).await {
                Ok(user) => user,
                Err(err) => {
                    tracing::warn!(reminder = %reminder.id, error = %err, "reminder owner missing");
                    continue;
                }
            };
            let subject = format!("Your reminder for {}", reminder.title);
            let body = reminder_email_body(&user, &reminder);
            if let Err(err) = self.mailer.send(&user.email, &subject, &body).await {
                tracing::warn!(reminder = %reminder.id, error = %err, "reminder email failed");
                continue;
            }
            self.reminders.mark_notified(&reminder.id).await?;
            tracing::info!(reminder = %reminder.id, to = %user.email, "reminder notification sent");
        }
        Ok(())
    }
}

/// Flips guest sessions past their TTL from ACTIVE to EXPIRED.
pub struct GuestSessionSweepJob {
    guests: GuestService,
    interval: Duration,
}

impl GuestSessionSweepJob {
    pub fn new(guests: GuestService, interval: Duration) -> Self {
        Self { guests, interval }
    }
}

#[async_trait]
impl ScheduledJob for GuestSessionSweepJob {
    fn name(&self) -> &str {
        "guest_session_sweep"
    }

    fn interval(&self) -> Duration {
        self.interval
    }

    async fn run(&self) -> Result<()> {
        let expired = self.guests.expire_stale().await?;
        if expired > 0 {
            tracing::info!(expired, "expired stale guest sessions");
        }
        Ok(())
    }
}
