use std::sync::Arc;

use mongodb::bson::{doc, Document};

use crate::domains::chat::Chat;
use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;
use crate::pagination::{self, Window, WindowArgs};
use crate::repos::{decode_all, from_doc, parse_id, sort_key, to_insert_doc};

const COLLECTION: &str = "chats";

#[derive(Clone)]
pub struct ChatRepo {
    store: Arc<dyn DocumentStore>,
}

impl ChatRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Rejects chats violating the owner-xor-session binding before anything
    /// reaches the store.
    pub async fn insert(&self, chat: &Chat) -> Result<String> {
        if !chat.binding_is_exclusive() {
            return Err(PlaticaError::InvalidArgument(
                "chat must be bound to exactly one of an owner or a guest session".to_string(),
            ));
        }
        self.store
            .insert_one(COLLECTION, to_insert_doc(chat)?)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Chat> {
        let oid = parse_id(id)?;
        self.store
            .find_one(COLLECTION, doc! {"_id": oid})
            .await?
            .map(from_doc)
            .transpose()?
            .ok_or_else(|| PlaticaError::NotFound(format!("chat {id} not found")))
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

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Chat>> {
        let docs = self
            .store
            .find_sorted(COLLECTION, doc! {"user_id": owner_id}, "created_at", false)
            .await?;
        decode_all(docs)
    }

    pub async fn push_message_ids(&self, chat_id: &str, ids: &[String], now: i64) -> Result<u64> {
        let oid = parse_id(chat_id)?;
        self.store
            .update_one(
                COLLECTION,
                doc! {"_id": oid},
                doc! {
                    "$push": {"message_ids": {"$each": ids.to_vec()}},
                    "$set": {"updated_at": now},
                },
            )
            .await
    }

    pub async fn window_for_owner(
        &self,
        owner_id: &str,
        args: &WindowArgs,
    ) -> Result<Window<Chat>> {
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
}
