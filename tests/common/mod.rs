#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use platica::auth::AccessGate;
use platica::domains::model::AiModel;
use platica::domains::user::User;
use platica::error::{PlaticaError, Result};
use platica::interfaces::generation::{ChatTurn, Generator};
use platica::interfaces::mail::Mailer;
use platica::providers::memory::MemoryStore;
use platica::repos::chats::ChatRepo;
use platica::repos::guests::GuestRepo;
use platica::repos::messages::MessageRepo;
use platica::repos::models::ModelRepo;
use platica::repos::reminders::ReminderRepo;
use platica::repos::users::UserRepo;
use platica::services::chats::ChatService;
use platica::services::guest::GuestService;
use platica::services::messages::MessageService;
use platica::services::models::ModelService;
use platica::services::reminders::ReminderService;
use platica::services::users::{LoginInput, RegisterUserInput, UserService};

pub const PASSWORD: &str = "Abc123!";
pub const GUEST_SESSION_TTL: i64 = 24 * 3600;

/// Scripted generation backend: replays queued replies (falling back to
/// "mock reply"), records the history length of every call and can be
/// flipped into a failing state.
pub struct QueueGenerator {
    replies: Mutex<Vec<String>>,
    failing: AtomicBool,
    pub history_lengths: Mutex<Vec<usize>>,
}

impl QueueGenerator {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            failing: AtomicBool::new(false),
            history_lengths: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Generator for QueueGenerator {
    async fn generate(
        &self,
        history: &[ChatTurn],
        _content: &str,
        _model: &AiModel,
        _max_output_length: u32,
    ) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PlaticaError::BackendUnavailable(
                "mock backend down".to_string(),
            ));
        }
        self.history_lengths.lock().unwrap().push(history.len());
        let mut replies = self.replies.lock().unwrap();
        if replies.is_empty() {
            Ok("mock reply".to_string())
        } else {
            Ok(replies.remove(0))
        }
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        self.sent.lock().unwrap().push((
            to.to_string(),
            subject.to_string(),
            html_body.to_string(),
        ));
        Ok(())
    }
}

pub struct TestBackend {
    pub store: Arc<MemoryStore>,
    pub gate: Arc<AccessGate>,
    pub generator: Arc<QueueGenerator>,
    pub users: UserService,
    pub reminders: ReminderService,
    pub chats: ChatService,
    pub messages: MessageService,
    pub models: ModelService,
    pub guest: GuestService,
    pub user_repo: UserRepo,
    pub reminder_repo: ReminderRepo,
    pub chat_repo: ChatRepo,
    pub message_repo: MessageRepo,
    pub model_repo: ModelRepo,
    pub guest_repo: GuestRepo,
    pub default_model_id: String,
}

pub async fn backend() -> TestBackend {
    let store = Arc::new(MemoryStore::new());
    let gate = Arc::new(AccessGate::new("test-secret", 60));

    let user_repo = UserRepo::new(store.clone());
    let reminder_repo = ReminderRepo::new(store.clone());
    let chat_repo = ChatRepo::new(store.clone());
    let message_repo = MessageRepo::new(store.clone());
    let model_repo = ModelRepo::new(store.clone());
    let guest_repo = GuestRepo::new(store.clone());

    let default_model_id = model_repo
        .insert(&AiModel {
            id: String::new(),
            name: "default".to_string(),
            algorithm: "chat-completions".to_string(),
            params: "{}".to_string(),
            description: "test model".to_string(),
            path: "mock-model".to_string(),
        })
        .await
        .unwrap();

    let generator = Arc::new(QueueGenerator::new(Vec::new()));

    let users = UserService::new(user_repo.clone(), gate.clone());
    let reminders = ReminderService::new(reminder_repo.clone(), user_repo.clone(), gate.clone());
    let chats = ChatService::new(
        chat_repo.clone(),
        user_repo.clone(),
        message_repo.clone(),
        gate.clone(),
    );
    let messages = MessageService::new(
        message_repo.clone(),
        chat_repo.clone(),
        model_repo.clone(),
        gate.clone(),
        generator.clone(),
        Some(default_model_id.clone()),
        256,
    );
    let models = ModelService::new(model_repo.clone(), gate.clone());
    let guest = GuestService::new(
        guest_repo.clone(),
        chat_repo.clone(),
        message_repo.clone(),
        messages.clone(),
        Some(default_model_id.clone()),
        "Guest chat".to_string(),
        GUEST_SESSION_TTL,
    );

    TestBackend {
        store,
        gate,
        generator,
        users,
        reminders,
        chats,
        messages,
        models,
        guest,
        user_repo,
        reminder_repo,
        chat_repo,
        message_repo,
        model_repo,
        guest_repo,
        default_model_id,
    }
}

pub async fn register_and_login(backend: &TestBackend, name: &str, email: &str) -> (User, String) {
    let user = backend
        .users
        .register(RegisterUserInput {
            name: name.to_string(),
            lastname: "Tester".to_string(),
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap();
    let token = backend
        .users
        .login(LoginInput {
            email: email.to_string(),
            password: PASSWORD.to_string(),
        })
        .await
        .unwrap()
        .access_token;
    (user, token)
}
