pub mod chats;
pub mod guest;
pub mod messages;
pub mod models;
pub mod reminders;
pub mod users;
