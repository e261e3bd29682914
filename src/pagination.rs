use std::future::Future;

use async_graphql::{OutputType, SimpleObject};

use crate::domains::chat::Chat;
use crate::domains::message::Message;
use crate::domains::model::AiModel;
use crate::domains::reminder::Reminder;
use crate::domains::user::User;
use crate::error::{PlaticaError, Result};

pub const MAX_WINDOW_LIMIT: i64 = 100;

#[derive(Debug, Clone)]
pub struct WindowArgs {
    pub order_by: String,
    pub desc: bool,
    pub limit: i64,
    pub offset: i64,
}

impl WindowArgs {
    pub fn new(order_by: impl Into<String>, desc: bool, limit: i64, offset: i64) -> Self {
        Self {
            order_by: order_by.into(),
            desc,
            limit,
            offset,
        }
    }
}

/// A bounded, ordered slice of a filtered collection paired with the full
/// matching-set count.
#[derive(Debug, Clone, SimpleObject)]
#[graphql(concrete(name = "UserWindow", params(User)))]
#[graphql(concrete(name = "ReminderWindow", params(Reminder)))]
#[graphql(concrete(name = "ChatWindow", params(Chat)))]
#[graphql(concrete(name = "MessageWindow", params(Message)))]
#[graphql(concrete(name = "AiModelWindow", params(AiModel)))]
pub struct Window<T: OutputType> {
    pub items: Vec<T>,
    pub total_items_count: u64,
}

/// Cut one window out of a dataset exposed through a fetch and a count
/// capability. `fetch` materializes the full ordered matching set; `count`
/// re-counts the same predicate afterwards, so the count can be stale
/// relative to the slice under concurrent writes. That staleness is part of
/// the contract, not hidden.
///
/// An empty matching set short-circuits to an empty window before the offset
/// is validated, so any offset against zero total succeeds.
pub async fn window<T, FF, CF>(args: &WindowArgs, fetch: FF, count: CF) -> Result<Window<T>>
where
    T: OutputType,
    FF: Future<Output = Result<Vec<T>>>,
    CF: Future<Output = Result<u64>>,
{
    if args.limit <= 0 || args.limit > MAX_WINDOW_LIMIT {
        return Err(PlaticaError::InvalidArgument(format!(
            "limit ({}) must be between 1-{MAX_WINDOW_LIMIT}",
            args.limit
        )));
    }

    let items = fetch.await?;
    let total_items_count = count.await?;

    if total_items_count == 0 {
        return Ok(Window {
            items: Vec::new(),
            total_items_count: 0,
        });
    }

    if args.offset != 0 && !(args.offset >= 0 && (args.offset as u64) < total_items_count) {
        return Err(PlaticaError::InvalidArgument(format!(
            "offset ({}) is out of range (0-{})",
            args.offset,
            total_items_count - 1
        )));
    }

    let start = (args.offset.max(0) as usize).min(items.len());
    let items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(args.limit as usize)
        .collect();

    Ok(Window {
        items,
        total_items_count,
    })
}
