use std::sync::Arc;

use mongodb::bson::{doc, Document};

use crate::domains::model::AiModel;
use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;
use crate::pagination::{self, Window, WindowArgs};
use crate::repos::{decode_all, from_doc, parse_id, sort_key, to_insert_doc};

const COLLECTION: &str = "models";

#[derive(Clone)]
pub struct ModelRepo {
    store: Arc<dyn DocumentStore>,
}

impl ModelRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert(&self, model: &AiModel) -> Result<String> {
        self.store
            .insert_one(COLLECTION, to_insert_doc(model)?)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<AiModel> {
        let oid = parse_id(id)?;
        self.store
            .find_one(COLLECTION, doc! {"_id": oid})
            .await?
            .map(from_doc)
            .transpose()?
            .ok_or_else(|| PlaticaError::NotFound(format!("model {id} not found")))
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

    pub async fn window(&self, args: &WindowArgs) -> Result<Window<AiModel>> {
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
