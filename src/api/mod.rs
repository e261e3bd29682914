use std::future::Future;

use async_graphql::{EmptySubscription, ErrorExtensions, Schema};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::{PlaticaError, Result};
use crate::repos::chats::ChatRepo;
use crate::repos::messages::MessageRepo;
use crate::repos::reminders::ReminderRepo;
use crate::services::chats::ChatService;
use crate::services::guest::GuestService;
use crate::services::messages::MessageService;
use crate::services::models::ModelService;
use crate::services::reminders::ReminderService;
use crate::services::users::UserService;

pub mod schema;

pub use schema::{MutationRoot, QueryRoot};

pub type PlaticaSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Bearer credential lifted out of the Authorization header by the HTTP
/// handler and handed to resolvers through the GraphQL context.
pub struct Credential(pub String);

impl ErrorExtensions for PlaticaError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string())
            .extend_with(|_, extensions| extensions.set("kind", self.kind()))
    }
}

pub struct SchemaParts {
    pub users: UserService,
    pub reminders: ReminderService,
    pub chats: ChatService,
    pub messages: MessageService,
    pub models: ModelService,
    pub guest: GuestService,
    pub reminder_repo: ReminderRepo,
    pub chat_repo: ChatRepo,
    pub message_repo: MessageRepo,
}

pub fn build_schema(parts: SchemaParts) -> PlaticaSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(parts.users)
        .data(parts.reminders)
        .data(parts.chats)
        .data(parts.messages)
        .data(parts.models)
        .data(parts.guest)
        .data(parts.reminder_repo)
        .data(parts.chat_repo)
        .data(parts.message_repo)
        .finish()
}

#[derive(Clone)]
pub struct AppState {
    pub schema: PlaticaSchema,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/graphql", post(graphql_handler))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

fn bearer_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string)
        .filter(|token| !token.is_empty())
}

async fn graphql_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = req.into_inner();
    if let Some(token) = bearer_from_headers(&headers) {
        request = request.data(Credential(token));
    }
    state.schema.execute(request).await.into()
}

pub async fn run_with_shutdown<F>(
    host: &str,
    port: u16,
    schema: PlaticaSchema,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(AppState { schema });
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PlaticaError::Config(e.to_string()))?;
    tracing::info!(%addr, "serving the query/mutation endpoint");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PlaticaError::Config(e.to_string()))?;
    Ok(())
}
