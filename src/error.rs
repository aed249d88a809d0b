use thiserror::Error;

use crate::gemini::GeminiError;

/// Fatal outcomes of a research run. Each one ends the process with a
/// non-zero exit code.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("Config error: {0}")]
    Configuration(String),

    #[error("Error creating interaction")]
    Submission(#[source] GeminiError),

    #[error("Error polling interaction")]
    Transport(#[source] GeminiError),

    #[error("Research failed: {0}")]
    JobFailed(String),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error")]
    Toml(#[from] toml::de::Error),
}
