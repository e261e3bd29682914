use std::sync::Arc;

use mongodb::bson::{doc, Document};

use crate::domains::reminder::Reminder;
use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;
use crate::pagination::{self, Window, WindowArgs};
use crate::repos::{decode_all, from_doc, parse_id, sort_key, to_insert_doc};

const COLLECTION: &str = "reminders";

#[derive(Clone)]
pub struct ReminderRepo {
    store: Arc<dyn DocumentStore>,
}

impl ReminderRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, reminder: &Reminder) -> Result<String> {
        self.store
            .insert_one(COLLECTION, to_insert_doc(reminder)?)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Reminder> {
        let oid = parse_id(id)?;
        self.store
            .find_one(COLLECTION, doc! {"_id": oid})
            .await?
            .map(from_doc)
            .transpose()?
            .ok_or_else(|| PlaticaError::NotFound(format!("reminder {id} not found")))
    }

    pub async fn update_fields(&self, id: &str, set: Document) -> Result<u64> {
        let oid = parse_id(id)?;
        self.store
            .update_one(COLLECTION, doc! {"_id": oid}, doc! {"$set": set})
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<u64> {
        let oid = parse_id(id)?;
        self.store.delete_one(COLLECTION, doc! {"_id": oid}).await
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Reminder>> {
        let docs = self
            .store
            .find_sorted(COLLECTION, doc! {"user_id": owner_id}, "created_at", false)
            .await?;
        decode_all(docs)
    }

    pub async fn window_for_owner(
        &self,
        owner_id: &str,
        args: &WindowArgs,
    ) -> Result<Window<Reminder>> {
        let filter = doc! {"user_id": owner_id};
        let fetch = async {
            let docs = self
                .store
                .find_sorted(
                    COLLECTION,
                    filter.clone(),
                    sort_key(&args.order_by),
                    args.desc,
                )
                .await?;
            decode_all(docs)
        };
        pagination::window(args, fetch, self.store.count(COLLECTION, filter.clone())).await
    }

    /// Reminders coming due inside `[now, until)` whose notification has not
    /// been sent yet.
    pub async fn find_due_unnotified(&self, now: i64, until: i64) -> Result<Vec<Reminder>> {
        let filter = doc! {
            "due_at": {"$gte": now, "$lt": until},
            "notification_sent": false,
        };
        let docs = self
            .store
            .find_sorted(COLLECTION, filter, "due_at", false)
            .await?;
        decode_all(docs)
    }

    pub async fn mark_notified(&self, id: &str) -> Result<u64> {
        let oid = parse_id(id)?;
        self.store
            .update_one(
                COLLECTION,
                doc! {"_id": oid},
                doc! {"$set": {"notification_sent": true}},
            )
            .await
    }
}
