// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the persona service API.
//!
//! Provides [`PersonaClient`] which handles request construction,
//! authentication, and transient error retry.

use std::time::Duration;

use bridgebot_core::BridgeError;
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, CharacterResponse, GenerateRequest, GenerateResponse};

/// HTTP client for persona service communication.
///
/// Manages the auth header, per-request timeout, and retry logic for
/// transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct PersonaClient {
    client: reqwest::Client,
    base_url: String,
    character_id: String,
    max_retries: u32,
}

impl PersonaClient {
    /// Creates a new persona API client.
    pub fn new(
        token: &str,
        base_url: String,
        character_id: String,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, BridgeError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| BridgeError::Config(format!("invalid persona token: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| BridgeError::Persona {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            character_id,
            max_retries,
        })
    }

    /// The character this client converses as.
    pub fn character_id(&self) -> &str {
        &self.character_id
    }

    /// Fetches the character's public metadata.
    pub async fn fetch_character(&self) -> Result<CharacterResponse, BridgeError> {
        let url = format!("{}/v1/characters/{}", self.base_url, self.character_id);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying character fetch after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response =
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| BridgeError::Persona {
                        message: format!("HTTP request failed: {e}"),
                        source: Some(Box::new(e)),
                    })?;

            let status = response.status();
            debug!(status = %status, attempt, "character response received");

            if status.is_success() {
                return response.json().await.map_err(|e| BridgeError::Persona {
                    message: format!("failed to parse character response: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(BridgeError::persona(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Err(last_error
            .unwrap_or_else(|| BridgeError::persona("character fetch failed after retries")))
    }

    /// Generates a reply for the rendered conversation batch.
    pub async fn generate(&self, message: &str) -> Result<String, BridgeError> {
        let url = format!("{}/v1/chat", self.base_url);
        let request = GenerateRequest {
            character_id: &self.character_id,
            message,
        };
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying reply generation after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| BridgeError::Persona {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "generate response received");

            if status.is_success() {
                let parsed: GenerateResponse =
                    response.json().await.map_err(|e| BridgeError::Persona {
                        message: format!("failed to parse generate response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                return Ok(parsed.reply);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(BridgeError::persona(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            return Err(api_error(status, response.text().await.unwrap_or_default()));
        }

        Err(last_error
            .unwrap_or_else(|| BridgeError::persona("reply generation failed after retries")))
    }
}

/// Builds the error for a non-transient API failure, preferring the
/// service's own error envelope when the body parses as one.
fn api_error(status: reqwest::StatusCode, body: String) -> BridgeError {
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        format!(
            "persona API error ({}): {}",
            api_err.error.type_, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };
    BridgeError::persona(message)
}

/// Whether an HTTP status warrants a retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PersonaClient {
        PersonaClient::new(
            "test-token",
            server.uri(),
            "char-1".to_string(),
            Duration::from_secs(5),
            1,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_character_parses_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/characters/char-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Mira",
                "avatar_url": "https://cdn.example/mira.png"
            })))
            .mount(&server)
            .await;

        let character = client_for(&server).fetch_character().await.unwrap();
        assert_eq!(character.name, "Mira");
        assert_eq!(
            character.avatar_url.as_deref(),
            Some("https://cdn.example/mira.png")
        );
    }

    #[tokio::test]
    async fn generate_posts_batch_and_returns_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .and(body_partial_json(serde_json::json!({
                "character_id": "char-1",
                "message": "A: hello"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "hi A!"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).generate("A: hello").await.unwrap();
        assert_eq!(reply, "hi A!");
    }

    #[tokio::test]
    async fn generate_retries_transient_error_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"reply": "recovered"})),
            )
            .mount(&server)
            .await;

        let reply = client_for(&server).generate("A: hi").await.unwrap();
        assert_eq!(reply, "recovered");
    }

    #[tokio::test]
    async fn generate_surfaces_api_error_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"type": "authentication_error", "message": "bad token"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).generate("A: hi").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("authentication_error"), "got: {msg}");
        assert!(msg.contains("bad token"), "got: {msg}");
    }
}
