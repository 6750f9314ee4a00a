//! OpenAI-compatible chat completion client.
//!
//! Used by the LLM decision policy and the narrative generator. Both wrap
//! calls in their own timeouts; the client timeout is only a backstop.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ModelConfig;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A single message in a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A single completion choice returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub index: usize,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

/// Token usage statistics for a request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// A chat completion response from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub id: String,
    pub choices: Vec<Choice>,
    /// Some compatible servers omit usage entirely.
    #[serde(default)]
    pub usage: Usage,
}

impl ChatResponse {
    /// Text of the first choice, or an empty string.
    pub fn first_text(&self) -> String {
        self.choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for an OpenAI-compatible chat completions API.
#[derive(Debug, Clone)]
pub struct LlmClient {
    api_base: String,
    api_key: String,
    model_id: String,
    http: reqwest::Client,
}

impl LlmClient {
    /// Create a client for `config.api_base` (e.g. `"https://api.openai.com/v1"`).
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model_id: config.model_id.clone(),
            http,
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Send a chat completion request and return the parsed response.
    ///
    /// Calls `POST {api_base}/chat/completions`.
    pub async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
        max_tokens: usize,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.api_base);
        let model = self.model_id.as_str();
        debug!(model, temperature, max_tokens, "sending chat completion request");

        let body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let mut request = self.http.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let resp = request
            .send()
            .await
            .context("failed to send chat completion request")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chat completion API returned {status}: {text}");
        }

        let chat_response: ChatResponse = resp
            .json()
            .await
            .context("failed to parse chat completion response")?;

        info!(
            model,
            prompt_tokens = chat_response.usage.prompt_tokens,
            completion_tokens = chat_response.usage.completion_tokens,
            "chat completion succeeded"
        );

        Ok(chat_response)
    }

    /// Send `messages` and return the text of the first choice.
    pub async fn complete_text(
        &self,
        messages: &[ChatMessage],
        temperature: f64,
        max_tokens: usize,
    ) -> Result<String> {
        let resp = self.chat_completion(messages, temperature, max_tokens).await?;
        Ok(resp.first_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_constructors() {
        let sys = ChatMessage::system("You steer an actor.");
        assert_eq!(sys.role, "system");
        assert_eq!(sys.content, "You steer an actor.");
        assert_eq!(ChatMessage::user("go").role, "user");
        assert_eq!(ChatMessage::assistant("ok").role, "assistant");
    }

    #[test]
    fn test_response_without_usage_parses() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [ { "index": 0, "message": { "role": "assistant", "content": "jump" }, "finish_reason": "stop" } ]
        }"#;
        let resp: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.first_text(), "jump");
        assert_eq!(resp.usage.total_tokens, 0);
    }

    #[test]
    fn test_first_text_of_empty_response() {
        let resp = ChatResponse {
            id: "x".into(),
            choices: Vec::new(),
            usage: Usage::default(),
        };
        assert!(resp.first_text().is_empty());
    }

    #[test]
    fn test_client_trims_base_url() {
        let config = ModelConfig {
            api_base: "http://localhost:8000/v1/".into(),
            ..ModelConfig::default()
        };
        let client = LlmClient::new(&config).unwrap();
        assert_eq!(client.api_base, "http://localhost:8000/v1");
        assert_eq!(client.model_id(), "gpt-4o-mini");
    }
}
