//! Chat-completion boundary.
//!
//! The generator only needs "prompt in, text out". [`LlmBackend`] is that
//! seam; [`OpenAiBackend`] is the production implementation against an
//! OpenAI-compatible `/chat/completions` endpoint.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::error::TransportError;

/// One request/response exchange with a language model.
pub trait LlmBackend {
    /// Send a system prompt plus user text and return the raw message content.
    fn complete(
        &self,
        system_prompt: &str,
        user_input: &str,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiBackend {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiBackend {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = chat_endpoint(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| TransportError::Request {
                url: endpoint.to_string(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// `{base}/chat/completions`, keeping any path prefix such as `/v1`.
fn chat_endpoint(base_url: &str) -> Result<Url, TransportError> {
    let invalid = |message: String| TransportError::InvalidEndpoint {
        url: base_url.to_string(),
        message,
    };
    let mut base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("chat/completions").map_err(|e| invalid(e.to_string()))
}

impl LlmBackend for OpenAiBackend {
    async fn complete(&self, system_prompt: &str, user_input: &str) -> Result<String, TransportError> {
        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_input },
            ],
        });

        tracing::info!(endpoint = %self.endpoint, model = %self.model, "requesting schedule from LLM");
        let resp = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| TransportError::Request {
                url: self.endpoint.to_string(),
                source,
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|source| TransportError::Request {
            url: self.endpoint.to_string(),
            source,
        })?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| TransportError::Status {
                status: status.as_u16(),
                body: format!("undecodable response body: {e}"),
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(TransportError::EmptyResponse)
    }
}
