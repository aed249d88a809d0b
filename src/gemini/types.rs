//! Request types for the Gemini Interactions API.
//!
//! Interaction *responses* are deliberately left as `serde_json::Value`: their
//! envelope differs between API versions and is picked apart by the report
//! extractor instead of a fixed struct.

use serde::{Deserialize, Serialize};

/// A unit of research work, fixed once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    query: String,
    format_instructions: Option<String>,
    file_search_store: Option<String>,
}

impl JobRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            format_instructions: None,
            file_search_store: None,
        }
    }

    /// Output format directive appended to the query text.
    pub fn with_format(mut self, instructions: Option<String>) -> Self {
        self.format_instructions = instructions.filter(|s| !s.trim().is_empty());
        self
    }

    /// Name of a file search store the agent may consult.
    pub fn with_file_search_store(mut self, store: Option<String>) -> Self {
        self.file_search_store = store.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The text sent as `input`. Format instructions are folded into the
    /// query rather than sent as a separate field.
    pub fn input_text(&self) -> String {
        match &self.format_instructions {
            Some(format) => format!(
                "{}\n\nFormat the output as follows:\n{format}",
                self.query
            ),
            None => self.query.clone(),
        }
    }

    /// Build the wire body for a background interaction run by `agent`.
    pub fn to_create_request(&self, agent: &str) -> CreateInteractionRequest {
        CreateInteractionRequest {
            input: self.input_text(),
            agent: agent.to_string(),
            background: true,
            tools: self
                .file_search_store
                .as_ref()
                .map(|store| vec![Tool::file_search(store)]),
        }
    }
}

/// Body of `POST {base}/interactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateInteractionRequest {
    pub input: String,
    pub agent: String,
    /// Always `true`: the job runs server-side and is polled.
    pub background: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
}

/// Tool reference attached to an interaction.
///
/// `tool_type` is serialized as `"type"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub file_search_store_names: Vec<String>,
}

impl Tool {
    pub fn file_search(store: &str) -> Self {
        Self {
            tool_type: "file_search".into(),
            file_search_store_names: vec![store.to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_query_is_sent_verbatim() {
        let req = JobRequest::new("history of the transistor");
        let body = serde_json::to_value(req.to_create_request("agent-x")).unwrap();
        assert_eq!(
            body,
            json!({
                "input": "history of the transistor",
                "agent": "agent-x",
                "background": true
            })
        );
    }

    #[test]
    fn format_instructions_are_appended_to_input() {
        let req = JobRequest::new("compare CRDT libraries")
            .with_format(Some("A table, then a summary".into()));
        assert_eq!(
            req.input_text(),
            "compare CRDT libraries\n\nFormat the output as follows:\nA table, then a summary"
        );
    }

    #[test]
    fn blank_format_is_ignored() {
        let req = JobRequest::new("q").with_format(Some("   ".into()));
        assert_eq!(req.input_text(), "q");
    }

    #[test]
    fn file_search_store_becomes_tool() {
        let req = JobRequest::new("q").with_file_search_store(Some("fileSearchStores/abc".into()));
        let body = serde_json::to_value(req.to_create_request("agent-x")).unwrap();
        assert_eq!(
            body["tools"],
            json!([{
                "type": "file_search",
                "file_search_store_names": ["fileSearchStores/abc"]
            }])
        );
    }
}
