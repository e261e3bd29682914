use std::sync::Arc;

use mongodb::bson::{doc, Document};

use crate::domains::message::Message;
use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;
use crate::pagination::{self, Window, WindowArgs};
use crate::repos::{decode_all, from_doc, parse_id, sort_key, to_insert_doc};

const COLLECTION: &str = "messages";

#[derive(Clone)]
pub struct MessageRepo {
    store: Arc<dyn DocumentStore>,
}

impl MessageRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, message: &Message) -> Result<String> {
        self.store
            .insert_one(COLLECTION, to_insert_doc(message)?)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Message> {
        let oid = parse_id(id)?;
        self.store
            .find_one(COLLECTION, doc! {"_id": oid})
            .await?
            .map(from_doc)
            .transpose()?
            .ok_or_else(|| PlaticaError::NotFound(format!("message {id} not found")))
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

    /// The authoritative, chat-scoped read: full history in ascending
    /// chronological order. Never derived from the chat's cache list.
    pub async fn history(&self, chat_id: &str) -> Result<Vec<Message>> {
        let docs = self
            .store
            .find_sorted(COLLECTION, doc! {"chat_id": chat_id}, "created_at", false)
            .await?;
        decode_all(docs)
    }

    pub async fn delete_for_chat(&self, chat_id: &str) -> Result<u64> {
        self.store
            .delete_many(COLLECTION, doc! {"chat_id": chat_id})
            .await
    }

    pub async fn window_for_chat(
        &self,
        chat_id: &str,
        args: &WindowArgs,
    ) -> Result<Window<Message>> {
        let filter = doc! {"chat_id": chat_id};
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

    /// Bookmarked messages across the given chats: the second level of the
    /// favorites join after the caller's chats were enumerated.
    pub async fn window_favorites(
        &self,
        chat_ids: &[String],
        args: &WindowArgs,
    ) -> Result<Window<Message>> {
        let filter = doc! {"chat_id": {"$in": chat_ids.to_vec()}, "bookmark": true};
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
}
