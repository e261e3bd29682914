use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use platica::api::{self, build_schema, SchemaParts};
use platica::auth::AccessGate;
use platica::config::Config;
use platica::error::{PlaticaError, Result};
use platica::interfaces::generation::Generator;
use platica::interfaces::mail::Mailer;
use platica::interfaces::store::DocumentStore;
use platica::jobs::{GuestSessionSweepJob, ReminderNotifierJob};
use platica::providers::mongo::MongoStore;
use platica::providers::openai::OpenAiGenerator;
use platica::providers::smtp::SmtpMailer;
use platica::repos::chats::ChatRepo;
use platica::repos::guests::GuestRepo;
use platica::repos::messages::MessageRepo;
use platica::repos::models::ModelRepo;
use platica::repos::reminders::ReminderRepo;
use platica::repos::users::UserRepo;
use platica::scheduler::Scheduler;
use platica::services::chats::ChatService;
use platica::services::guest::GuestService;
use platica::services::messages::MessageService;
use platica::services::models::ModelService;
use platica::services::reminders::ReminderService;
use platica::services::users::UserService;

#[derive(Parser, Debug)]
#[command(name = "platica-server")]
#[command(about = "Conversational assistant backend")]
struct Cli {
    #[arg(long, env = "PLATICA_CONFIG", default_value = "./config.json")]
    config: String,
    #[arg(long, help = "Override the configured listen host")]
    host: Option<String>,
    #[arg(long, help = "Override the configured listen port")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_file(&cli.config)?.resolve_env();

    let host = cli
        .host
        .or_else(|| config.server.as_ref().and_then(|server| server.host.clone()))
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let port = cli
        .port
        .or_else(|| config.server.as_ref().and_then(|server| server.port))
        .unwrap_or(8000);

    let mongo = config
        .mongo
        .as_ref()
        .ok_or_else(|| PlaticaError::Config("mongo section is not configured".to_string()))?;
    let uri = mongo
        .uri
        .clone()
        .unwrap_or_else(|| "mongodb://localhost:27017".to_string());
    let database = mongo.database.clone().unwrap_or_else(|| "platica".to_string());
    let store: Arc<dyn DocumentStore> = Arc::new(MongoStore::connect(&uri, &database).await?);

    let gate = Arc::new(AccessGate::new(
        &config.jwt_secret()?,
        config.token_ttl_minutes(),
    ));

    let users = UserRepo::new(store.clone());
    let reminders = ReminderRepo::new(store.clone());
    let chats = ChatRepo::new(store.clone());
    let messages = MessageRepo::new(store.clone());
    let models = ModelRepo::new(store.clone());
    let guests = GuestRepo::new(store.clone());

    let generation = config.generation.clone();
    let generator: Arc<dyn Generator> = Arc::new(OpenAiGenerator::new(
        generation.as_ref().and_then(|g| g.api_key.clone()),
        generation.as_ref().and_then(|g| g.base_url.clone()),
        generation.as_ref().and_then(|g| g.system_prompt.clone()),
    ));

    let default_model_id = config
        .chat
        .as_ref()
        .and_then(|chat| chat.default_model_id.clone());
    let guest_chat_title = config
        .chat
        .as_ref()
        .and_then(|chat| chat.guest_chat_title.clone())
        .unwrap_or_else(|| "Guest chat".to_string());

    let user_service = UserService::new(users.clone(), gate.clone());
    let reminder_service = ReminderService::new(reminders.clone(), users.clone(), gate.clone());
    let chat_service = ChatService::new(
        chats.clone(),
        users.clone(),
        messages.clone(),
        gate.clone(),
    );
    let message_service = MessageService::new(
        messages.clone(),
        chats.clone(),
        models.clone(),
        gate.clone(),
        generator,
        default_model_id.clone(),
        config.max_output_length(),
    );
    let model_service = ModelService::new(models.clone(), gate.clone());
    let guest_service = GuestService::new(
        guests,
        chats.clone(),
        messages.clone(),
        message_service.clone(),
        default_model_id,
        guest_chat_title,
        config.guest_session_ttl_seconds(),
    );

    let reminder_poll = config
        .jobs
        .as_ref()
        .and_then(|jobs| jobs.reminder_poll_seconds)
        .unwrap_or(60);
    let guest_sweep = config
        .jobs
        .as_ref()
        .and_then(|jobs| jobs.guest_sweep_seconds)
        .unwrap_or(3600);

    let mut scheduler = Scheduler::new();
    match &config.mail {
        Some(mail) => {
            let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(mail)?);
            scheduler.register_job(Arc::new(ReminderNotifierJob::new(
                reminders.clone(),
                users.clone(),
                mailer,
                Duration::from_secs(reminder_poll.max(1)),
            )));
        }
        None => {
            tracing::warn!("mail is not configured; reminder notifications are disabled");
        }
    }
    scheduler.register_job(Arc::new(GuestSessionSweepJob::new(
        guest_service.clone(),
        Duration::from_secs(guest_sweep.max(1)),
    )));
    scheduler.start();

    let schema = build_schema(SchemaParts {
        users: user_service,
        reminders: reminder_service,
        chats: chat_service,
        messages: message_service,
        models: model_service,
        guest: guest_service,
        reminder_repo: reminders,
        chat_repo: chats,
        message_repo: messages,
    });

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    api::run_with_shutdown(&host, port, schema, shutdown).await?;
    scheduler.stop().await;

    Ok(())
}
