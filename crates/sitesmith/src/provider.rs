//! Provider seam: async chat-completion client, response shapes, and the
//! provider error taxonomy with recoverable/fatal classification.
//!
//! The orchestrator only sees the `Provider` trait, so tests drive the
//! pipeline with in-process mocks and never touch the network.
//!
//! ## Failure classification
//!
//! | Variant      | Recoverable | Pipeline behavior        |
//! |--------------|-------------|--------------------------|
//! | Network      | yes         | fallback bundle          |
//! | Timeout      | yes         | fallback bundle          |
//! | RateLimited  | yes         | fallback bundle          |
//! | Unavailable  | no          | surfaced to the caller   |
//! | Api          | no          | surfaced to the caller   |

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::Config;

/// Failures raised by the provider call itself (never by the parsing
/// pipeline, which is total).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Connection-level trouble reaching the endpoint.
    #[error("network failure: {0}")]
    Network(String),

    /// The request exceeded the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// HTTP 429 from the endpoint.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The provider integration is missing or misconfigured.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Any other provider-side failure (non-success HTTP status).
    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ProviderError {
    /// Recoverable failures resolve to the fallback bundle; everything else
    /// propagates to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::RateLimited(_)
        )
    }

    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

/// The shapes a provider response payload can take. Providers are
/// inconsistent here: some return plain text, some wrap it one or two levels
/// deep. `Unknown` stringifies the whole value as the last resort before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    PlainText(String),
    MessageWrapped(Value),
    ContentWrapped(String),
    Unknown(Value),
}

impl ResponseShape {
    pub fn classify(value: Value) -> Self {
        match value {
            Value::String(text) => Self::PlainText(text),
            Value::Object(map) => {
                if let Some(message) = map.get("message") {
                    return Self::MessageWrapped(message.clone());
                }
                if let Some(Value::String(content)) = map.get("content") {
                    return Self::ContentWrapped(content.clone());
                }
                Self::Unknown(Value::Object(map))
            }
            other => Self::Unknown(other),
        }
    }

    /// Extract the text to feed the normalizer.
    pub fn into_text(self) -> String {
        match self {
            Self::PlainText(text) | Self::ContentWrapped(text) => text,
            Self::MessageWrapped(inner) => match inner {
                Value::String(text) => text,
                Value::Object(mut map) => match map.remove("content") {
                    Some(Value::String(text)) => text,
                    Some(other) => other.to_string(),
                    None => Value::Object(map).to_string(),
                },
                other => other.to_string(),
            },
            Self::Unknown(value) => value.to_string(),
        }
    }

    /// Classify and extract in one step.
    pub fn text_of(value: Value) -> String {
        Self::classify(value).into_text()
    }
}

/// An asynchronous chat-completion backend.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a system instruction plus user prompt; return the response
    /// payload (shape handled downstream by [`ResponseShape`]).
    async fn complete(&self, system: &str, user: &str) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<'a, P: Provider + ?Sized> Provider for &'a P {
    async fn complete(&self, system: &str, user: &str) -> Result<Value, ProviderError> {
        (**self).complete(system, user).await
    }
}

/// OpenAI-compatible chat-completions client.
pub struct HttpProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpProvider {
    pub fn new(config: &Config) -> Result<Self, ProviderError> {
        if config.base_url.trim().is_empty() || config.model.trim().is_empty() {
            return Err(ProviderError::Unavailable(
                "chat endpoint is not configured (base URL or model missing)".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Unavailable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl Provider for HttpProvider {
    async fn complete(&self, system: &str, user: &str) -> Result<Value, ProviderError> {
        let request_body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "temperature": 0.4,
            "max_tokens": 8192
        });

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let status = response.status();
        if status.as_u16() == 429 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::RateLimited(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(ProviderError::from_reqwest)?;
        // A non-JSON body is still usable: feed it through as plain text.
        let value: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        // Chat-completions shape: the payload lives at choices[0].message.
        // Anything else passes through whole for ResponseShape to sort out.
        Ok(value
            .pointer("/choices/0/message")
            .cloned()
            .unwrap_or(value))
    }
}

/// Check whether an OpenAI-compatible endpoint is reachable (GET /models).
pub async fn check_endpoint(base_url: &str) -> bool {
    let models_url = format!("{}/models", base_url.trim_end_matches('/'));
    match reqwest::Client::new()
        .get(&models_url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}
