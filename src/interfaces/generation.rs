use async_trait::async_trait;

use crate::domains::message::Role;
use crate::domains::model::AiModel;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// Synchronous single-shot generation backend. The whole mutation awaits the
/// call; there is no streaming or cancellation path.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce the assistant reply for `content` given the full prior chat
    /// history in ascending chronological order. Fails `BackendUnavailable`
    /// when the backend cannot be reached or returns nothing.
    async fn generate(
        &self,
        history: &[ChatTurn],
        content: &str,
        model: &AiModel,
        max_output_length: u32,
    ) -> Result<String>;
}
