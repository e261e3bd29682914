use async_graphql::{ComplexObject, Context, ErrorExtensions, Object};

use crate::api::Credential;
use crate::domains::chat::Chat;
use crate::domains::guest::GuestSessionView;
use crate::domains::message::{Message, MessagePair};
use crate::domains::model::AiModel;
use crate::domains::reminder::Reminder;
use crate::domains::user::{AuthToken, User};
use crate::error::PlaticaError;
use crate::pagination::{Window, WindowArgs};
use crate::repos::chats::ChatRepo;
use crate::repos::messages::MessageRepo;
use crate::repos::reminders::ReminderRepo;
use crate::services::chats::{ChatService, CreateChatInput, UpdateChatInput};
use crate::services::guest::GuestService;
use crate::services::messages::{
    CreateMessageInput, DeleteMessageInput, MessageService, RegenerateMessageInput,
    UpdateMessageInput,
};
use crate::services::models::{ModelService, RegisterModelInput, UpdateModelInput};
use crate::services::reminders::{CreateReminderInput, ReminderService, UpdateReminderInput};
use crate::services::users::{LoginInput, RegisterUserInput, UpdateUserInput, UserService};

fn bearer<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a str> {
    ctx.data_opt::<Credential>()
        .map(|credential| credential.0.as_str())
        .ok_or_else(|| {
            PlaticaError::Unauthenticated("missing bearer credential".to_string()).extend()
        })
}

#[ComplexObject]
impl User {
    /// Owner-scoped query; the cached id list on the document is never used
    /// for reads.
    async fn reminders(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Reminder>> {
        let repo = ctx.data_unchecked::<ReminderRepo>();
        repo.find_by_owner(&self.id).await.map_err(|e| e.extend())
    }

    async fn chats(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Chat>> {
        let repo = ctx.data_unchecked::<ChatRepo>();
        repo.find_by_owner(&self.id).await.map_err(|e| e.extend())
    }
}

#[ComplexObject]
impl Chat {
    /// Chat-scoped query in ascending chronological order; authoritative
    /// over the cached message id list.
    async fn messages(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Message>> {
        let repo = ctx.data_unchecked::<MessageRepo>();
        repo.history(&self.id).await.map_err(|e| e.extend())
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn hello_world(&self) -> &'static str {
        "HelloWorld"
    }

    async fn get_user_by_id(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users.get_by_id(&id).await.map_err(|e| e.extend())
    }

    async fn get_user_by_email(
        &self,
        ctx: &Context<'_>,
        email: String,
    ) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users.get_by_email(&email).await.map_err(|e| e.extend())
    }

    async fn me(&self, ctx: &Context<'_>) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users.me(bearer(ctx)?).await.map_err(|e| e.extend())
    }

    async fn get_all_users(
        &self,
        ctx: &Context<'_>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<User>> {
        let users = ctx.data_unchecked::<UserService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        users.list(&args).await.map_err(|e| e.extend())
    }

    async fn get_all_reminders(
        &self,
        ctx: &Context<'_>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<Reminder>> {
        let reminders = ctx.data_unchecked::<ReminderService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        reminders
            .list(bearer(ctx)?, &args)
            .await
            .map_err(|e| e.extend())
    }

    async fn get_reminder_by_id(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Reminder> {
        let reminders = ctx.data_unchecked::<ReminderService>();
        reminders.get(bearer(ctx)?, &id).await.map_err(|e| e.extend())
    }

    async fn get_all_chats(
        &self,
        ctx: &Context<'_>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<Chat>> {
        let chats = ctx.data_unchecked::<ChatService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        chats.list(bearer(ctx)?, &args).await.map_err(|e| e.extend())
    }

    async fn get_all_messages(
        &self,
        ctx: &Context<'_>,
        chat_id: String,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<Message>> {
        let messages = ctx.data_unchecked::<MessageService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        messages
            .list_for_chat(bearer(ctx)?, &chat_id, &args)
            .await
            .map_err(|e| e.extend())
    }

    async fn get_all_favorite_messages(
        &self,
        ctx: &Context<'_>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default = true)] desc: bool,
    ) -> async_graphql::Result<Window<Message>> {
        let messages = ctx.data_unchecked::<MessageService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        messages
            .favorites(bearer(ctx)?, &args)
            .await
            .map_err(|e| e.extend())
    }

    async fn get_all_models(
        &self,
        ctx: &Context<'_>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<AiModel>> {
        let models = ctx.data_unchecked::<ModelService>();
        let args = WindowArgs::new(order_by, desc, limit, offset);
        models.list(&args).await.map_err(|e| e.extend())
    }

    /// Messages of one chat, reachable either with a bearer credential or a
    /// guest session id.
    async fn get_chat_messages(
        &self,
        ctx: &Context<'_>,
        chat_id: String,
        session_id: Option<String>,
        order_by: String,
        limit: i64,
        #[graphql(default)] offset: i64,
        #[graphql(default)] desc: bool,
    ) -> async_graphql::Result<Window<Message>> {
        let args = WindowArgs::new(order_by, desc, limit, offset);
        if let Some(credential) = ctx.data_opt::<Credential>() {
            let messages = ctx.data_unchecked::<MessageService>();
            return messages
                .list_for_chat(&credential.0, &chat_id, &args)
                .await
                .map_err(|e| e.extend());
        }
        if let Some(session_id) = session_id {
            let guest = ctx.data_unchecked::<GuestService>();
            return guest
                .list_messages(&session_id, &chat_id, &args)
                .await
                .map_err(|e| e.extend());
        }
        Err(
            PlaticaError::Unauthenticated(
                "a bearer credential or a guest session id is required".to_string(),
            )
            .extend(),
        )
    }

    async fn get_popular_queries(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 7)] days: i64,
        #[graphql(default = 10)] limit: i64,
    ) -> async_graphql::Result<Vec<String>> {
        let guest = ctx.data_unchecked::<GuestService>();
        guest
            .popular_queries(days, limit)
            .await
            .map_err(|e| e.extend())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn register_user(
        &self,
        ctx: &Context<'_>,
        input: RegisterUserInput,
    ) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users.register(input).await.map_err(|e| e.extend())
    }

    async fn login_user(
        &self,
        ctx: &Context<'_>,
        input: LoginInput,
    ) -> async_graphql::Result<AuthToken> {
        let users = ctx.data_unchecked::<UserService>();
        users.login(input).await.map_err(|e| e.extend())
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        input: UpdateUserInput,
    ) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users
            .update(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_user(&self, ctx: &Context<'_>, email: String) -> async_graphql::Result<User> {
        let users = ctx.data_unchecked::<UserService>();
        users
            .delete(bearer(ctx)?, &email)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_reminder(
        &self,
        ctx: &Context<'_>,
        input: CreateReminderInput,
    ) -> async_graphql::Result<Reminder> {
        let reminders = ctx.data_unchecked::<ReminderService>();
        reminders
            .create(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_reminder(
        &self,
        ctx: &Context<'_>,
        input: UpdateReminderInput,
    ) -> async_graphql::Result<Reminder> {
        let reminders = ctx.data_unchecked::<ReminderService>();
        reminders
            .update(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_reminder(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Reminder> {
        let reminders = ctx.data_unchecked::<ReminderService>();
        reminders
            .delete(bearer(ctx)?, &id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_chat(
        &self,
        ctx: &Context<'_>,
        input: CreateChatInput,
    ) -> async_graphql::Result<Chat> {
        let chats = ctx.data_unchecked::<ChatService>();
        chats
            .create(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_chat(
        &self,
        ctx: &Context<'_>,
        input: UpdateChatInput,
    ) -> async_graphql::Result<Chat> {
        let chats = ctx.data_unchecked::<ChatService>();
        chats
            .update(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_chat(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<Chat> {
        let chats = ctx.data_unchecked::<ChatService>();
        chats
            .delete_cascade(bearer(ctx)?, &id)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_message(
        &self,
        ctx: &Context<'_>,
        input: CreateMessageInput,
    ) -> async_graphql::Result<MessagePair> {
        let messages = ctx.data_unchecked::<MessageService>();
        messages
            .create(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_message(
        &self,
        ctx: &Context<'_>,
        input: UpdateMessageInput,
    ) -> async_graphql::Result<Message> {
        let messages = ctx.data_unchecked::<MessageService>();
        messages
            .update(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_message(
        &self,
        ctx: &Context<'_>,
        input: DeleteMessageInput,
    ) -> async_graphql::Result<MessagePair> {
        let messages = ctx.data_unchecked::<MessageService>();
        messages
            .delete(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn regenerate_message(
        &self,
        ctx: &Context<'_>,
        input: RegenerateMessageInput,
    ) -> async_graphql::Result<MessagePair> {
        let messages = ctx.data_unchecked::<MessageService>();
        messages
            .regenerate(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn create_guest_session(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<GuestSessionView> {
        let guest = ctx.data_unchecked::<GuestService>();
        guest.create_session().await.map_err(|e| e.extend())
    }

    async fn create_guest_message(
        &self,
        ctx: &Context<'_>,
        session_id: String,
        content: String,
    ) -> async_graphql::Result<MessagePair> {
        let guest = ctx.data_unchecked::<GuestService>();
        guest
            .create_message(&session_id, &content)
            .await
            .map_err(|e| e.extend())
    }

    async fn register_model(
        &self,
        ctx: &Context<'_>,
        input: RegisterModelInput,
    ) -> async_graphql::Result<AiModel> {
        let models = ctx.data_unchecked::<ModelService>();
        models
            .register(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn update_model(
        &self,
        ctx: &Context<'_>,
        input: UpdateModelInput,
    ) -> async_graphql::Result<AiModel> {
        let models = ctx.data_unchecked::<ModelService>();
        models
            .update(bearer(ctx)?, input)
            .await
            .map_err(|e| e.extend())
    }

    async fn delete_model(&self, ctx: &Context<'_>, id: String) -> async_graphql::Result<AiModel> {
        let models = ctx.data_unchecked::<ModelService>();
        models
            .delete(bearer(ctx)?, &id)
            .await
            .map_err(|e| e.extend())
    }
}
