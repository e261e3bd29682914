use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

/// A registered generation backend: `path` is the handle handed to the
/// generation collaborator, `params` an opaque serialized parameter blob.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct AiModel {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub algorithm: String,
    pub params: String,
    pub description: String,
    pub path: String,
}
