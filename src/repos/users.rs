use std::sync::Arc;

use mongodb::bson::{doc, Document};

use crate::domains::user::User;
use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;
use crate::pagination::{self, Window, WindowArgs};
use crate::repos::{decode_all, from_doc, parse_id, sort_key, to_insert_doc};

const COLLECTION: &str = "users";

#[derive(Clone)]
pub struct UserRepo {
    store: Arc<dyn DocumentStore>,
}

impl UserRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, user: &User) -> Result<String> {
        self.store
            .insert_one(COLLECTION, to_insert_doc(user)?)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        let oid = parse_id(id)?;
        self.store
            .find_one(COLLECTION, doc! {"_id": oid})
            .await?
            .map(from_doc)
            .transpose()?
            .ok_or_else(|| PlaticaError::NotFound(format!("user {id} not found")))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.store
            .find_one(COLLECTION, doc! {"email": email})
            .await?
            .map(from_doc)
            .transpose()
    }

    pub async fn get_by_email(&self, email: &str) -> Result<User> {
        self.find_by_email(email)
            .await?
            .ok_or_else(|| PlaticaError::NotFound(format!("user {email} not found")))
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

    pub async fn push_reminder_id(&self, user_id: &str, reminder_id: &str) -> Result<u64> {
        let oid = parse_id(user_id)?;
        self.store
            .update_one(
                COLLECTION,
                doc! {"_id": oid},
                doc! {"$push": {"reminder_ids": reminder_id}},
            )
            .await
    }

    pub async fn push_chat_id(&self, user_id: &str, chat_id: &str) -> Result<u64> {
        let oid = parse_id(user_id)?;
        self.store
            .update_one(
                COLLECTION,
                doc! {"_id": oid},
                doc! {"$push": {"chat_ids": chat_id}},
            )
            .await
    }

    pub async fn window(&self, args: &WindowArgs) -> Result<Window<User>> {
        let fetch = async {
            let docs = self
                .store
                .find_sorted(COLLECTION, doc! {}, sort_key(&args.order_by), args.desc)
                .await?;
            decode_all(docs)
        };
        pagination::window(args, fetch, self.store.count(COLLECTION, doc! {})).await
    }
}
