use async_trait::async_trait;
use mongodb::bson::Document;

use crate::error::Result;

/// The narrow document-store contract every repository is written against:
/// per-collection single-document writes, predicate reads and counts. No
/// joins, no aggregation, no cross-document transactions.
///
/// Filters use exact-match fields plus the `$gte`/`$gt`/`$lte`/`$lt`/`$in`
/// operators; updates use `$set` and `$push` (with `$each`). Identifiers are
/// ObjectIds rendered to and from hex strings at this boundary.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the generated id as a hex string.
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<String>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Materialize the full matching set ordered by `order_by` with `_id`
    /// ascending as the deterministic tiebreaker.
    async fn find_sorted(
        &self,
        collection: &str,
        filter: Document,
        order_by: &str,
        desc: bool,
    ) -> Result<Vec<Document>>;

    async fn count(&self, collection: &str, filter: Document) -> Result<u64>;

    /// Apply a `$set`/`$push` update to the first matching document and
    /// return the matched count.
    async fn update_one(
        &self,
        collection: &str,
        filter: Document,
        update: Document,
    ) -> Result<u64>;

    /// Delete the first matching document and return the deleted count.
    async fn delete_one(&self, collection: &str, filter: Document) -> Result<u64>;

    /// Delete every matching document and return the deleted count.
    async fn delete_many(&self, collection: &str, filter: Document) -> Result<u64>;
}
