//! Turning a terminal interaction payload into something a person can read.

mod extract;
mod failure;
mod normalize;

pub use extract::extract_report;
pub use failure::describe_failure;
pub use normalize::normalize;

use serde_json::Value;

/// The text persisted as the run's report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// Report text found in the payload, already normalized.
    Extracted(String),
    /// No report text was found; the raw payload pretty-printed instead.
    RawFallback(String),
}

impl Report {
    /// Extract and normalize the report, falling back to the serialized
    /// payload when nothing recognisable is present.
    pub fn from_payload(payload: &Value) -> Self {
        match extract_report(payload) {
            Some(text) => Report::Extracted(normalize(text)),
            None => Report::RawFallback(
                serde_json::to_string_pretty(payload).unwrap_or_else(|_| payload.to_string()),
            ),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Report::Extracted(text) | Report::RawFallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Report::RawFallback(_))
    }
}
