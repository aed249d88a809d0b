use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::state::PollState;

/// Status reported by the server for an interaction.
///
/// Only `completed` and `failed` are terminal. Everything else, including
/// values this client has never seen, means the job is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionStatus {
    Completed,
    Failed,
    InProgress(String),
}

impl InteractionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            other => Self::InProgress(other.to_string()),
        }
    }

    /// Read the `status` field of an interaction payload.
    pub fn from_payload(payload: &Value) -> Self {
        match payload.get("status").and_then(Value::as_str) {
            Some(raw) => Self::parse(raw),
            None => Self::InProgress("UNKNOWN".into()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::InProgress(raw) => raw,
        }
    }
}

impl std::fmt::Display for InteractionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local tracking record for the single interaction of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedInteraction {
    pub id: String,
    pub state: PollState,
    pub state_history: Vec<PollState>,
    pub poll_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrackedInteraction {
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            state: PollState::Submitted,
            state_history: Vec::new(),
            poll_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.updated_at - self.created_at
    }
}
