//! Assist error types.
//!
//! Remote failures and unusable model output surface through
//! [`AssistError`]; callers render them as one-line messages and let the
//! user resubmit; there is no automatic retry or backoff.

use thiserror::Error;

/// Alias for `Result<T, AssistError>`.
pub type AssistResult<T> = Result<T, AssistError>;

/// Errors surfaced by the AI assist module.
#[derive(Debug, Error)]
pub enum AssistError {
    /// The API key is missing or empty.
    #[error("generative-language api key is not configured")]
    MissingApiKey,

    /// The user description is empty.
    #[error("describe what you need before generating")]
    EmptyPrompt,

    /// Every candidate endpoint failed; carries the last failure seen.
    #[error("generation request failed (status {status}): {message}")]
    RemoteApi { status: u16, message: String },

    /// The HTTP layer failed outright (connectivity, TLS, timeouts).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response contained no usable text field.
    #[error("empty response from the model")]
    EmptyResponse,

    /// No JSON object could be extracted from the model's text output.
    #[error("could not extract json from model output: {sample}")]
    ParseFailed { sample: String },

    /// Extracted JSON is missing `listName` or a valid `items` array.
    #[error("model output is missing listName/items: {sample}")]
    InvalidStructure { sample: String },
}
