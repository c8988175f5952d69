//! Sentiment classification over a hosted text-classification endpoint.
//!
//! Speaks the Hugging Face inference API shape: `POST {base}/models/{model}`
//! with `{"inputs": text}`, answered by a list of `{label, score}`
//! candidates, either flat or nested one level for batched inputs.
//!
//! The winning label is upper-cased before it reaches the pipeline, so a
//! model answering `Very Positive` lands in the report's Sentiment column
//! as `VERY POSITIVE`. This keeps model labels comparable with the
//! `NEUTRAL` fallback used when classification fails.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use feedback_topics::{SentimentClassifier, TopicsError};
use feedback_types::{ClassifierSettings, SentimentScore};

use crate::error::ClientError;

/// Connection details for [`ApiClassifier`].
#[derive(Debug, Clone)]
pub struct ApiClassifierConfig {
    /// Inference API base URL
    pub base_url: String,
    /// Model name
    pub model: String,
    /// Optional API token; public models accept anonymous calls
    pub api_key: Option<SecretString>,
    /// Request timeout
    pub timeout: Duration,
}

impl ApiClassifierConfig {
    /// Build from loaded settings.
    pub fn from_settings(settings: &ClassifierSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .map(SecretString::from),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Nested(Vec<Vec<Candidate>>),
    Flat(Vec<Candidate>),
}

impl ClassifyResponse {
    /// Highest-scoring candidate for the single input sent.
    fn best(self) -> Option<Candidate> {
        let candidates = match self {
            ClassifyResponse::Nested(outer) => outer.into_iter().next().unwrap_or_default(),
            ClassifyResponse::Flat(candidates) => candidates,
        };
        candidates
            .into_iter()
            .fold(None, |best: Option<Candidate>, c| match best {
                Some(b) if b.score >= c.score => Some(b),
                _ => Some(c),
            })
    }
}

/// Parse a classification response body into the top label.
fn parse_response(body: &str) -> Result<SentimentScore, ClientError> {
    let response: ClassifyResponse =
        serde_json::from_str(body).map_err(|e| ClientError::Parse(e.to_string()))?;
    response
        .best()
        .map(|c| SentimentScore::new(c.label.to_uppercase(), c.score))
        .ok_or_else(|| ClientError::Parse("No labels in response".to_string()))
}

/// Blocking sentiment classifier client.
pub struct ApiClassifier {
    client: Client,
    config: ApiClassifierConfig,
}

impl ApiClassifier {
    /// Create a new classifier client.
    pub fn new(config: ApiClassifierConfig) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn request(&self, text: &str) -> Result<SentimentScore, ClientError> {
        let url = format!("{}/models/{}", self.config.base_url, self.config.model);
        let mut request = self.client.post(&url).json(&ClassifyRequest { inputs: text });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request.send()?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClientError::RateLimited);
        }
        let body = response.text()?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_response(&body)
    }
}

impl SentimentClassifier for ApiClassifier {
    #[instrument(skip_all, fields(model = %self.config.model))]
    fn classify(&self, text: &str) -> Result<SentimentScore, TopicsError> {
        if text.trim().is_empty() {
            return Ok(SentimentScore::neutral());
        }

        let score = self
            .request(text)
            .map_err(|e| TopicsError::Classification(e.to_string()))?;
        debug!(label = %score.label, score = score.score, "Classified feedback");
        Ok(score)
    }
}
