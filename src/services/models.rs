use std::sync::Arc;

use async_graphql::InputObject;
use mongodb::bson::Document;

use crate::auth::AccessGate;
use crate::domains::model::AiModel;
use crate::error::{PlaticaError, Result};
use crate::pagination::{Window, WindowArgs};
use crate::repos::models::ModelRepo;

#[derive(Debug, Clone, InputObject)]
pub struct RegisterModelInput {
    pub name: String,
    pub algorithm: String,
    pub params: String,
    pub description: String,
    pub path: String,
}

#[derive(Debug, Clone, InputObject)]
pub struct UpdateModelInput {
    pub id: String,
    pub name: Option<String>,
    pub algorithm: Option<String>,
    pub params: Option<String>,
    pub description: Option<String>,
    pub path: Option<String>,
}

/// The model registry is global: mutations require a valid credential but
/// models are not owner-scoped.
#[derive(Clone)]
pub struct ModelService {
    models: ModelRepo,
    gate: Arc<AccessGate>,
}

impl ModelService {
    pub fn new(models: ModelRepo, gate: Arc<AccessGate>) -> Self {
        Self { models, gate }
    }

    pub async fn register(&self, token: &str, input: RegisterModelInput) -> Result<AiModel> {
        self.gate.verify(token)?;
        let model = AiModel {
            id: String::new(),
            name: input.name,
            algorithm: input.algorithm,
            params: input.params,
            description: input.description,
            path: input.path,
        };
        let id = self.models.insert(&model).await?;
        self.models.get(&id).await
    }

    pub async fn update(&self, token: &str, input: UpdateModelInput) -> Result<AiModel> {
        self.gate.verify(token)?;
        self.models.get(&input.id).await?;

        let mut set = Document::new();
        if let Some(name) = input.name {
            set.insert("name", name);
        }
        if let Some(algorithm) = input.algorithm {
            set.insert("algorithm", algorithm);
        }
        if let Some(params) = input.params {
            set.insert("params", params);
        }
        if let Some(description) = input.description {
            set.insert("description", description);
        }
        if let Some(path) = input.path {
            set.insert("path", path);
        }

        let matched = self.models.update_fields(&input.id, set).await?;
        if matched == 0 {
            return Err(PlaticaError::NotFound(format!(
                "model {} not found",
                input.id
            )));
        }
        self.models.get(&input.id).await
    }

    pub async fn delete(&self, token: &str, id: &str) -> Result<AiModel> {
        self.gate.verify(token)?;
        let model = self.models.get(id).await?;
        let deleted = self.models.delete(id).await?;
        if deleted != 1 {
            return Err(PlaticaError::NotFound(format!("model {id} not found")));
        }
        Ok(model)
    }

    pub async fn list(&self, args: &WindowArgs) -> Result<Window<AiModel>> {
        self.models.window(args).await
    }
}
