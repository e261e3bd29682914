mod common;

use std::sync::Arc;
use std::time::Duration;

use platica::domains::now_ts;
use platica::jobs::{GuestSessionSweepJob, ReminderNotifierJob};
use platica::scheduler::ScheduledJob;
use platica::services::reminders::CreateReminderInput;

use common::{backend, register_and_login, RecordingMailer};

#[tokio::test]
async fn reminder_notifier_sends_once_per_reminder() {
    let backend = backend().await;
    let (user, token) = register_and_login(&backend, "Ana", "ana@example.com").await;

    let soon = backend
        .reminders
        .create(
            &token,
            CreateReminderInput {
                title: "Pay rent".to_string(),
                description: Some("Transfer before noon".to_string()),
                due_at: now_ts() + 600,
            },
        )
        .await
        .unwrap();
    backend
        .reminders
        .create(
            &token,
            CreateReminderInput {
                title: "Far away".to_string(),
                description: None,
                due_at: now_ts() + 7 * 86_400,
            },
        )
        .await
        .unwrap();

    let mailer = Arc::new(RecordingMailer::default());
    let job = ReminderNotifierJob::new(
        backend.reminder_repo.clone(),
        backend.user_repo.clone(),
        mailer.clone(),
        Duration::from_secs(60),
    );

    job.run().await.unwrap();
    {
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        let (to, subject, body) = &sent[0];
        assert_eq!(to, &user.email);
        assert!(subject.contains("Pay rent"));
        assert!(body.contains("Hello Ana"));
        assert!(body.contains("Transfer before noon"));
    }

    let stored = backend.reminder_repo.get(&soon.id).await.unwrap();
    assert!(stored.notification_sent);

    // A second tick finds nothing left to announce.
    job.run().await.unwrap();
    assert_eq!(mailer.sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn guest_sweep_job_runs_the_lifecycle_transition() {
    let backend = backend().await;
    backend.guest.create_session().await.unwrap();

    let job = GuestSessionSweepJob::new(backend.guest.clone(), Duration::from_secs(60));
    assert_eq!(job.name(), "guest_session_sweep");
    job.run().await.unwrap();

    // Fresh session, default TTL: still active after the sweep.
    let sessions = backend
        .guest_repo
        .find_active_older_than(now_ts() + 1)
        .await
        .unwrap();
    assert_eq!(sessions.len(), 1);
}
