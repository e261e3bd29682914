use std::sync::Arc;

use mongodb::bson::doc;

use crate::domains::guest::GuestSession;
use crate::error::Result;
use crate::interfaces::store::DocumentStore;
use crate::repos::{decode_all, from_doc, parse_id, to_insert_doc};

const SESSIONS: &str = "guest_sessions";
const QUERY_LOG: &str = "guest_messages";

#[derive(Clone)]
pub struct GuestRepo {
    store: Arc<dyn DocumentStore>,
}

impl GuestRepo {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn insert_session(&self, session: &GuestSession) -> Result<String> {
        self.store
            .insert_one(SESSIONS, to_insert_doc(session)?)
            .await
    }

    pub async fn find_by_session_id(&self, session_id: &str) -> Result<Option<GuestSession>> {
        self.store
            .find_one(SESSIONS, doc! {"session_id": session_id})
            .await?
            .map(from_doc)
            .transpose()
    }

    /// One-way transition: only ACTIVE sessions are ever flipped.
    pub async fn mark_expired(&self, id: &str) -> Result<u64> {
        let oid = parse_id(id)?;
        self.store
            .update_one(
                SESSIONS,
                doc! {"_id": oid, "status": "ACTIVE"},
                doc! {"$set": {"status": "EXPIRED"}},
            )
            .await
    }

    pub async fn find_active_older_than(&self, cutoff: i64) -> Result<Vec<GuestSession>> {
        let filter = doc! {"status": "ACTIVE", "created_at": {"$lt": cutoff}};
        let docs = self
            .store
            .find_sorted(SESSIONS, filter, "created_at", false)
            .await?;
        decode_all(docs)
    }

    pub async fn log_query(&self, content: &str, now: i64) -> Result<String> {
        self.store
            .insert_one(QUERY_LOG, doc! {"content": content, "created_at": now})
            .await
    }

    pub async fn queries_since(&self, cutoff: i64) -> Result<Vec<String>> {
        let filter = doc! {"created_at": {"$gte": cutoff}};
        let docs = self
            .store
            .find_sorted(QUERY_LOG, filter, "created_at", false)
            .await?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| doc.get_str("content").ok().map(str::to_string))
            .collect())
    }
}
