use std::time::{SystemTime, UNIX_EPOCH};

pub mod chat;
pub mod guest;
pub mod message;
pub mod model;
pub mod reminder;
pub mod user;

pub fn now_ts() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
