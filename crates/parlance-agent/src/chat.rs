//! Chat-completion client.
//!
//! Speaks the OpenAI-compatible `/chat/completions` shape: a system
//! instruction plus a user prompt in, generated text out. Instructions are
//! passed per call rather than held as client state, so concurrent requests
//! with different instructions cannot observe each other.

use crate::error::AgentError;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Configuration for the chat-completion collaborator.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Full URL of the chat-completions endpoint.
    pub url: String,
    /// Bearer token for the completion service.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Standing system instructions for conversational replies.
    pub instructions: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            model: "gpt-4o".to_string(),
            instructions: "You are an AI language tutor helping people practice a language."
                .to_string(),
            timeout_secs: 30,
        }
    }
}

// Manual Debug so the API key never lands in logs.
impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("instructions", &self.instructions)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    instructions: String,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Result<Self, AgentError> {
        if config.url.is_empty() {
            return Err(AgentError::Chat("chat url is not configured".to_string()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Chat(format!("failed to build chat client: {e}")))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            instructions: config.instructions.clone(),
        })
    }

    /// Completion with the standing conversational instructions.
    pub async fn complete(&self, prompt: &str) -> Result<String, AgentError> {
        self.complete_with_instructions(&self.instructions, prompt)
            .await
    }

    /// Completion with caller-supplied system instructions.
    pub async fn complete_with_instructions(
        &self,
        instructions: &str,
        prompt: &str,
    ) -> Result<String, AgentError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": instructions },
                { "role": "user", "content": prompt },
            ],
            "stream": false,
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout
                } else {
                    AgentError::Chat(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Chat(format!(
                "completion service returned {status}: {detail}"
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Chat(format!("failed to parse completion response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AgentError::Chat("completion response had no choices".to_string()))?;

        Ok(content)
    }
}
