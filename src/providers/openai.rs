use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

use crate::domains::message::Role;
use crate::domains::model::AiModel;
use crate::error::{PlaticaError, Result};
use crate::interfaces::generation::{ChatTurn, Generator};

/// Chat-completions generation backend. The model handle stored on the
/// [`AiModel`] document (`path`) is passed through as the model name.
pub struct OpenAiGenerator {
    client: Client<OpenAIConfig>,
    system_prompt: Option<String>,
}

impl OpenAiGenerator {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        system_prompt: Option<String>,
    ) -> Self {
        let mut config = OpenAIConfig::new();
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        if let Some(base) = base_url {
            config = config.with_api_base(base);
        }
        Self {
            client: Client::with_config(config),
            system_prompt,
        }
    }

    fn build_messages(
        &self,
        history: &[ChatTurn],
        content: &str,
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages = Vec::new();

        if let Some(system) = &self.system_prompt {
            let message = ChatCompletionRequestSystemMessageArgs::default()
                .content(system.as_str())
                .build()
                .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;
            messages.push(ChatCompletionRequestMessage::System(message));
        }

        for turn in history {
            match turn.role {
                Role::User => {
                    let message = ChatCompletionRequestUserMessageArgs::default()
                        .content(ChatCompletionRequestUserMessageContent::Text(
                            turn.content.clone(),
                        ))
                        .build()
                        .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;
                    messages.push(ChatCompletionRequestMessage::User(message));
                }
                Role::Assistant => {
                    let message = ChatCompletionRequestAssistantMessageArgs::default()
                        .content(ChatCompletionRequestAssistantMessageContent::Text(
                            turn.content.clone(),
                        ))
                        .build()
                        .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;
                    messages.push(ChatCompletionRequestMessage::Assistant(message));
                }
            }
        }

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                content.to_string(),
            ))
            .build()
            .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;
        messages.push(ChatCompletionRequestMessage::User(message));

        Ok(messages)
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(
        &self,
        history: &[ChatTurn],
        content: &str,
        model: &AiModel,
        max_output_length: u32,
    ) -> Result<String> {
        let messages = self.build_messages(history, content)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model.path.clone())
            .messages(messages)
            .max_completion_tokens(max_output_length)
            .build()
            .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PlaticaError::BackendUnavailable(e.to_string()))?;

        let reply = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();
        if reply.is_empty() {
            return Err(PlaticaError::BackendUnavailable(
                "generation backend returned no content".to_string(),
            ));
        }
        Ok(reply)
    }
}
