//! Generative-language HTTP client.
//!
//! The remote API exposes the same `generateContent` operation under two
//! API versions and a rotating set of model identifiers; which ones a
//! given key can call varies. The client walks a fixed preference order
//! (every candidate model under `v1beta`, then under `v1`) and takes the
//! first success. Failures are linear and sequential: no racing requests,
//! no retries, no backoff.

use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::error::{AssistError, AssistResult};
use crate::extract::{parse_draft, ListDraft};
use crate::prompt::build_prompt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Base URL of the generative-language API.
const BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// API versions to try, in order. `v1beta` carries the newest models.
const API_VERSIONS: &[&str] = &["v1beta", "v1"];

/// Candidate model identifiers in order of preference.
const CANDIDATE_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.5-pro",
    "gemini-flash-latest",
    "gemini-pro-latest",
    "gemini-2.0-flash-001",
    "gemini-2.5-flash-lite",
];

/// Per-request timeout.
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The models one API version reports as available for the current key.
#[derive(Debug, Clone)]
pub struct ModelListing {
    /// API version queried (`v1beta` or `v1`).
    pub version: &'static str,
    /// Model names on success.
    pub models: Vec<String>,
    /// Error message when the version could not be listed.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for generating shopping lists from free-text descriptions.
#[derive(Debug, Clone)]
pub struct AssistClient {
    api_key: String,
    http: reqwest::Client,
}

impl AssistClient {
    /// Create a client with the given API key.
    pub fn new(api_key: impl Into<String>) -> AssistResult<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(AssistError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { api_key, http })
    }

    /// Generate a normalized list draft from a free-text description.
    ///
    /// Tries each candidate endpoint in [`attempt_order`] until one
    /// returns 2xx; when all fail, the last failure is reported.
    #[instrument(skip(self, description))]
    pub async fn generate_list(&self, description: &str) -> AssistResult<ListDraft> {
        if description.trim().is_empty() {
            return Err(AssistError::EmptyPrompt);
        }

        let body = request_body(&build_prompt(description));
        let mut last_failure = AssistError::RemoteApi {
            status: 0,
            message: "no endpoint attempted".into(),
        };

        for (version, model) in attempt_order() {
            let url = format!(
                "{BASE_URL}/{version}/models/{model}:generateContent?key={key}",
                key = self.api_key
            );

            let response = match self.http.post(&url).json(&body).send().await {
                Ok(response) => response,
                Err(err) => {
                    warn!(version, model, %err, "request failed, trying next candidate");
                    last_failure = err.into();
                    continue;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let message = response
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|v| api_error_message(&v))
                    .unwrap_or_else(|| status.to_string());
                debug!(version, model, status = status.as_u16(), "candidate rejected");
                last_failure = AssistError::RemoteApi {
                    status: status.as_u16(),
                    message,
                };
                continue;
            }

            debug!(version, model, "candidate accepted");
            let payload: Value = response.json().await?;
            let text = response_text(&payload).ok_or(AssistError::EmptyResponse)?;
            return parse_draft(&text);
        }

        Err(last_failure)
    }

    /// List the models each API version exposes to the current key.
    ///
    /// A diagnostic for "model not available" failures: per-version errors
    /// are reported inline rather than aborting the whole listing.
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> AssistResult<Vec<ModelListing>> {
        let mut listings = Vec::with_capacity(API_VERSIONS.len());

        for version in API_VERSIONS {
            let url = format!("{BASE_URL}/{version}/models?key={key}", key = self.api_key);

            let listing = match self.http.get(&url).send().await {
                Err(err) => ModelListing {
                    version,
                    models: Vec::new(),
                    error: Some(err.to_string()),
                },
                Ok(response) => {
                    let status = response.status();
                    let payload = response.json::<Value>().await.ok();
                    if status.is_success() {
                        ModelListing {
                            version,
                            models: payload.as_ref().map(model_names).unwrap_or_default(),
                            error: None,
                        }
                    } else {
                        ModelListing {
                            version,
                            models: Vec::new(),
                            error: Some(
                                payload
                                    .as_ref()
                                    .and_then(api_error_message)
                                    .unwrap_or_else(|| status.to_string()),
                            ),
                        }
                    }
                }
            };
            listings.push(listing);
        }

        Ok(listings)
    }
}

// ---------------------------------------------------------------------------
// Request/response plumbing
// ---------------------------------------------------------------------------

/// Every (version, model) pair in preference order.
fn attempt_order() -> impl Iterator<Item = (&'static str, &'static str)> {
    API_VERSIONS
        .iter()
        .flat_map(|version| CANDIDATE_MODELS.iter().map(move |model| (*version, *model)))
}

/// The `generateContent` request body for `prompt`.
fn request_body(prompt: &str) -> Value {
    json!({
        "contents": [ { "parts": [ { "text": prompt } ] } ],
        "generationConfig": {
            "temperature": 0.7,
            "topK": 40,
            "topP": 0.95,
            "maxOutputTokens": 1024,
        },
    })
}

/// Pull the text field out of a `generateContent` response.
///
/// Supports both response shapes seen in the wild: the part-based
/// `content.parts[0].text` and the flattened `content.text`.
fn response_text(payload: &Value) -> Option<String> {
    let content = payload.get("candidates")?.get(0)?.get("content")?;

    if let Some(text) = content
        .get("parts")
        .and_then(|parts| parts.get(0))
        .and_then(|part| part.get("text"))
        .and_then(Value::as_str)
    {
        return Some(text.to_string());
    }

    if let Some(text) = content.get("text").and_then(Value::as_str) {
        return Some(text.to_string());
    }

    content.as_str().map(str::to_string)
}

/// The `error.message` field of an API error body, if present.
fn api_error_message(payload: &Value) -> Option<String> {
    payload
        .get("error")?
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// The model names of a `models` listing response.
fn model_names(payload: &Value) -> Vec<String> {
    payload
        .get("models")
        .and_then(Value::as_array)
        .map(|models| {
            models
                .iter()
                .filter_map(|m| m.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(matches!(
            AssistClient::new(""),
            Err(AssistError::MissingApiKey)
        ));
    }

    #[test]
    fn attempt_order_walks_v1beta_before_v1() {
        let order: Vec<_> = attempt_order().collect();
        assert_eq!(order.len(), API_VERSIONS.len() * CANDIDATE_MODELS.len());
        assert_eq!(order[0], ("v1beta", "gemini-2.5-flash"));
        assert_eq!(order[CANDIDATE_MODELS.len()], ("v1", "gemini-2.5-flash"));
        assert_eq!(
            order.last().copied(),
            Some(("v1", "gemini-2.5-flash-lite"))
        );
    }

    #[test]
    fn request_body_carries_prompt_and_generation_config() {
        let body = request_body("lista de feira");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "lista de feira");

        let config = &body["generationConfig"];
        assert_eq!(config["temperature"], 0.7);
        assert_eq!(config["topK"], 40);
        assert_eq!(config["topP"], 0.95);
        assert_eq!(config["maxOutputTokens"], 1024);
    }

    #[test]
    fn response_text_reads_part_based_shape() {
        let payload = serde_json::json!({
            "candidates": [ { "content": { "parts": [ { "text": "olá" } ] } } ]
        });
        assert_eq!(response_text(&payload).as_deref(), Some("olá"));
    }

    #[test]
    fn response_text_reads_flattened_shape() {
        let payload = serde_json::json!({
            "candidates": [ { "content": { "text": "olá" } } ]
        });
        assert_eq!(response_text(&payload).as_deref(), Some("olá"));
    }

    #[test]
    fn response_text_reads_bare_string_content() {
        let payload = serde_json::json!({
            "candidates": [ { "content": "olá" } ]
        });
        assert_eq!(response_text(&payload).as_deref(), Some("olá"));
    }

    #[test]
    fn response_without_candidates_is_empty() {
        let payload = serde_json::json!({ "promptFeedback": {} });
        assert_eq!(response_text(&payload), None);
    }

    #[test]
    fn api_error_message_is_extracted() {
        let payload = serde_json::json!({
            "error": { "code": 404, "message": "model not found" }
        });
        assert_eq!(
            api_error_message(&payload).as_deref(),
            Some("model not found")
        );
    }

    #[test]
    fn model_names_are_collected() {
        let payload = serde_json::json!({
            "models": [ { "name": "models/gemini-2.5-flash" }, { "name": "models/gemini-2.0-flash" } ]
        });
        assert_eq!(
            model_names(&payload),
            vec!["models/gemini-2.5-flash", "models/gemini-2.0-flash"]
        );
    }

    #[tokio::test]
    async fn empty_description_is_rejected_before_any_request() {
        let client = AssistClient::new("test-key").unwrap();
        let result = client.generate_list("   ").await;
        assert!(matches!(result, Err(AssistError::EmptyPrompt)));
    }
}
