//! Error types for the Gemini Interactions transport.
//!
//! [`GeminiError`] separates HTTP-level rejections (any status other than
//! 200), network failures, and responses that parse but lack required fields.

use thiserror::Error;

/// Errors raised while talking to the Interactions endpoint.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// The API answered with a status other than 200.
    /// The response body is kept so it can be shown to the operator.
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    /// DNS, connection, TLS or timeout failure, or an undecodable body.
    #[error("network error")]
    Network(#[from] reqwest::Error),

    /// The response was valid JSON but is missing something we need.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
