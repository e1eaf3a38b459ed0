use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::DeepSeekConfig;
use crate::error::CompletionError;
use crate::events::ChatMessage;

/// Message in the completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for LlmMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            role: message.role.as_ref().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Remote chat-completion collaborator
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Produce one assistant reply for the persona and ordered turns
    async fn complete(&self, persona: &str, turns: &[ChatMessage])
    -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<LlmMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: LlmMessage,
}

/// DeepSeek chat completions over plain request/response
#[derive(Clone)]
pub struct DeepSeekClient {
    config: DeepSeekConfig,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl DeepSeekClient {
    pub fn new(config: DeepSeekConfig, api_key: Option<String>) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn build_messages(persona: &str, turns: &[ChatMessage]) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(LlmMessage {
            role: "system".to_string(),
            content: persona.to_string(),
        });
        messages.extend(turns.iter().map(LlmMessage::from));
        messages
    }
}

#[async_trait]
impl CompletionClient for DeepSeekClient {
    async fn complete(
        &self,
        persona: &str,
        turns: &[ChatMessage],
    ) -> Result<String, CompletionError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let payload = CompletionRequest {
            model: &self.config.model,
            messages: Self::build_messages(persona, turns),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::debug!(turns = turns.len(), model = %self.config.model, "requesting completion");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %error_text, "DeepSeek API error");
            return Err(CompletionError::Status(status.as_u16()));
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(CompletionError::EmptyResponse)
    }
}
