//! Text generation over an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use feedback_topics::{MessageBundle, TextGenerator, TopicsError};
use feedback_types::GeneratorSettings;

use crate::error::ClientError;

/// Connection details for [`ApiGenerator`].
#[derive(Debug, Clone)]
pub struct ApiGeneratorConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// API key
    pub api_key: SecretString,

    /// Request timeout
    pub timeout: Duration,
}

impl ApiGeneratorConfig {
    /// Create config for the OpenAI API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            timeout: Duration::from_secs(60),
        }
    }

    /// Build from loaded settings. The API key must be present.
    pub fn from_settings(settings: &GeneratorSettings) -> Result<Self, ClientError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                ClientError::Config(
                    "generator API key missing (set FEEDBACK_GENERATOR__API_KEY)".to_string(),
                )
            })?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: SecretString::from(api_key),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking chat-completion client.
///
/// One request per call. Failures are returned, never retried.
pub struct ApiGenerator {
    client: Client,
    config: ApiGeneratorConfig,
}

impl ApiGenerator {
    /// Create a new generator client.
    pub fn new(config: ApiGeneratorConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Model this client talks to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request(&self, messages: &MessageBundle) -> Result<String, ClientError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &messages.system,
                },
                ChatMessage {
                    role: "user",
                    content: &messages.user,
                },
            ],
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| ClientError::Parse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClientError::Parse("No choices in response".to_string()))
    }
}

impl TextGenerator for ApiGenerator {
    #[instrument(skip_all, fields(model = %self.config.model))]
    fn generate(&self, messages: &MessageBundle) -> Result<String, TopicsError> {
        debug!(prompt_chars = messages.user.len(), "Calling generation API");
        self.request(messages)
            .map_err(|e| TopicsError::Generation(e.to_string()))
    }
}
