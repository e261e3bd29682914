use mongodb::bson::{oid::ObjectId, Document};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PlaticaError, Result};

pub mod chats;
pub mod guests;
pub mod messages;
pub mod models;
pub mod reminders;
pub mod users;

/// An id string that cannot be parsed back into a storage id does not
/// resolve to any record.
pub(crate) fn parse_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| PlaticaError::NotFound(format!("id {id} does not resolve")))
}

pub(crate) fn to_insert_doc<T: Serialize>(value: &T) -> Result<Document> {
    let mut doc = mongodb::bson::to_document(value)
        .map_err(|e| PlaticaError::Serialization(e.to_string()))?;
    doc.remove("id");
    Ok(doc)
}

/// Normalize the storage-native `_id` into an opaque `id` string before
/// decoding into a domain value.
pub(crate) fn from_doc<T: DeserializeOwned>(mut doc: Document) -> Result<T> {
    if let Ok(oid) = doc.get_object_id("_id") {
        doc.remove("_id");
        doc.insert("id", oid.to_hex());
    }
    mongodb::bson::from_document(doc).map_err(|e| PlaticaError::Serialization(e.to_string()))
}

pub(crate) fn decode_all<T: DeserializeOwned>(docs: Vec<Document>) -> Result<Vec<T>> {
    docs.into_iter().map(from_doc).collect()
}

pub(crate) fn sort_key(order_by: &str) -> &str {
    if order_by == "id" {
        "_id"
    } else {
        order_by
    }
}
