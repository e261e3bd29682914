use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tokio::sync::RwLock;

use crate::error::{PlaticaError, Result};
use crate::interfaces::store::DocumentStore;

/// In-memory document store interpreting the same filter and update subset
/// the MongoDB backend is used with. Backs the test suite and small dev
/// setups; not meant for durable deployments.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn cmp_bson(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::Int32(x), Bson::Int32(y)) => Some(x.cmp(y)),
        (Bson::Int64(x), Bson::Int64(y)) => Some(x.cmp(y)),
        (Bson::Int32(x), Bson::Int64(y)) => Some(i64::from(*x).cmp(y)),
        (Bson::Int64(x), Bson::Int32(y)) => Some(x.cmp(&i64::from(*y))),
        (Bson::Double(x), Bson::Double(y)) => x.partial_cmp(y),
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, cond)| match cond {
        Bson::Document(ops) if ops.keys().any(|op| op.starts_with('$')) => {
            let value = doc.get(key);
            ops.iter().all(|(op, operand)| match op.as_str() {
                "$gte" => value
                    .and_then(|v| cmp_bson(v, operand))
                    .is_some_and(|o| o != Ordering::Less),
                "$gt" => value
                    .and_then(|v| cmp_bson(v, operand))
                    .is_some_and(|o| o == Ordering::Greater),
                "$lte" => value
                    .and_then(|v| cmp_bson(v, operand))
                    .is_some_and(|o| o != Ordering::Greater),
                "$lt" => value
                    .and_then(|v| cmp_bson(v, operand))
                    .is_some_and(|o| o == Ordering::Less),
                "$in" => match (operand, value) {
                    (Bson::Array(items), Some(v)) => items.iter().any(|item| item == v),
                    _ => false,
                },
                _ => false,
            })
        }
        other => doc.get(key) == Some(other),
    })
}

fn sort_docs(docs: &mut [Document], order_by: &str, desc: bool) {
    docs.sort_by(|a, b| {
        let primary = match (a.get(order_by), b.get(order_by)) {
            (Some(x), Some(y)) => cmp_bson(x, y).unwrap_or(Ordering::Equal),
            // Missing fields sort lowest, as in MongoDB.
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        };
        let primary = if desc { primary.reverse() } else { primary };
        primary.then_with(|| match (a.get("_id"), b.get("_id")) {
            (Some(x), Some(y)) => cmp_bson(x, y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        })
    });
}

fn apply_update(doc: &mut Document, update: &Document) -> Result<()> {
    for (op, spec) in update {
        let Bson::Document(fields) = spec else {
            return Err(PlaticaError::Storage(format!(
                "unsupported update specification for {op}"
            )));
        };
        match op.as_str() {
            "$set" => {
                for (key, value) in fields {
                    doc.insert(key.clone(), value.clone());
                }
            }
            "$push" => {
                for (key, value) in fields {
                    let mut current = match doc.get(key) {
                        Some(Bson::Array(items)) => items.clone(),
                        _ => Vec::new(),
                    };
                    match value {
                        Bson::Document(push_spec) if push_spec.contains_key("$each") => {
                            if let Some(Bson::Array(values)) = push_spec.get("$each") {
                                current.extend(values.iter().cloned());
                            }
                        }
                        other => current.push(other.clone()),
                    }
                    doc.insert(key.clone(), Bson::Array(current));
                }
            }
            other => {
                return Err(PlaticaError::Storage(format!(
                    "unsupported update operator {other}"
                )))
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, mut doc: Document) -> Result<String> {
        let id = match doc.get_object_id("_id") {
            Ok(id) => id,
            Err(_) => {
                let id = ObjectId::new();
                doc.insert("_id", id);
                id
            }
        };
        let mut guard = self.collections.write().await;
        guard.entry(collection.to_string()).or_default().push(doc);
        Ok(id.to_hex())
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| matches(doc, &filter)).cloned()))
    }

    async fn find_sorted(
        &self,
        collection: &str,
        filter: Document,
        order_by: &str,
        desc: bool,
    ) -> Result<Vec<Document>> {
        let guard = self.collections.read().await;
        let mut docs: Vec<Document> = guard
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches(doc, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        sort_docs(&mut docs, order_by, desc);
        Ok(docs)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        let guard = self.collections.read().await;
        Ok(guard
            .get(collection)
            .map(|docs| docs.iter().filter(|doc| matches(doc, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<u64> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let Some(doc) = docs.iter_mut().find(|doc| matches(doc, &filter)) else {
            return Ok(0);
        };
        apply_update(doc, &update)?;
        Ok(1)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64> {
        let mut guard = self.collections.write().await;
        let Some(docs) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|doc| !matches(doc, &filter));
        Ok((before - docs.len()) as u64)
    }
}
