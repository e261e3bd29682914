use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{Client, Collection, Database};

use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;
        options.app_name = Some("platica".to_string());
        let client =
            Client::with_options(options).map_err(|e| PlaticaError::Storage(e.to_string()))?;
        Ok(Self {
            db: client.database(database),
        })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    fn sort_doc(order_by: &str, desc: bool) -> Document {
        let mut sort = Document::new();
        sort.insert(order_by, if desc { -1 } else { 1 });
        if order_by != "_id" {
            sort.insert("_id", 1);
        }
        sort
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String> {
        let result = self
            .collection(collection)
            .insert_one(doc, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;
        result
            .inserted_id
            .as_object_id()
            .map(|id| id.to_hex())
            .ok_or_else(|| {
                PlaticaError::Storage("insert did not produce an object id".to_string())
            })
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(filter, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))
    }

    async fn find_sorted(
        &self,
        collection: &str,
        filter: Document,
        order_by: &str,
        desc: bool,
    ) -> Result<Vec<Document>> {
        let mut options = FindOptions::default();
        options.sort = Some(Self::sort_doc(order_by, desc));

        let mut cursor = self
            .collection(collection)
            .find(filter, options)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;

        let mut docs = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?
        {
            docs.push(doc);
        }
        Ok(docs)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        self.collection(collection)
            .count_documents(filter, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<u64> {
        let result = self
            .collection(collection)
            .update_one(filter, update, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_one(filter, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;
        Ok(result.deleted_count)
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter, None)
            .await
            .map_err(|e| PlaticaError::Storage(e.to_string()))?;
        Ok(result.deleted_count)
    }
}
