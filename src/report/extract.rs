//! Locating the report text inside a completed interaction.
//!
//! The response envelope is not fixed across API versions, so extraction is
//! an ordered chain of permissive lookups. Any shape mismatch is a miss,
//! never an error.

use serde_json::Value;

/// How many nested `output` objects are followed before giving up.
const MAX_OUTPUT_DEPTH: usize = 4;

/// Roles whose messages carry model-produced text.
const MODEL_ROLES: &[&str] = &["model", "assistant"];

/// Find the best-available report text in a completed payload.
///
/// Tried in order: `output`, `outputs` (last entry first), top-level `text`,
/// then model `messages` (last first). Returns `None` when nothing matches.
pub fn extract_report(payload: &Value) -> Option<&str> {
    let Value::Object(_) = payload else {
        return None;
    };
    from_output(payload)
        .or_else(|| from_outputs(payload))
        .or_else(|| from_text(payload))
        .or_else(|| from_messages(payload))
}

fn from_output(payload: &Value) -> Option<&str> {
    payload.get("output").and_then(|v| text_from(v, 0))
}

fn from_outputs(payload: &Value) -> Option<&str> {
    match payload.get("outputs") {
        Some(Value::Array(items)) => items.iter().rev().find_map(|item| text_from(item, 0)),
        _ => None,
    }
}

fn from_text(payload: &Value) -> Option<&str> {
    payload.get("text").and_then(non_blank)
}

fn from_messages(payload: &Value) -> Option<&str> {
    let Some(Value::Array(messages)) = payload.get("messages") else {
        return None;
    };
    messages
        .iter()
        .rev()
        .filter(|msg| is_model_message(msg))
        .find_map(first_part_text)
}

/// Resolve a string or an object holding `text` (or a nested `output`).
fn text_from(value: &Value, depth: usize) -> Option<&str> {
    match value {
        Value::String(_) => non_blank(value),
        Value::Object(map) => map.get("text").and_then(non_blank).or_else(|| {
            if depth >= MAX_OUTPUT_DEPTH {
                return None;
            }
            map.get("output").and_then(|inner| text_from(inner, depth + 1))
        }),
        _ => None,
    }
}

fn is_model_message(msg: &Value) -> bool {
    msg.get("role")
        .and_then(Value::as_str)
        .is_some_and(|role| MODEL_ROLES.contains(&role))
}

fn first_part_text(msg: &Value) -> Option<&str> {
    match msg.get("parts") {
        Some(Value::Array(parts)) => parts
            .iter()
            .find_map(|part| part.get("text").and_then(non_blank)),
        _ => None,
    }
}

fn non_blank(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn output_object_with_text() {
        assert_eq!(extract_report(&json!({"output": {"text": "X"}})), Some("X"));
    }

    #[test]
    fn output_string() {
        assert_eq!(extract_report(&json!({"output": "X"})), Some("X"));
    }

    #[test]
    fn outputs_prefers_last_entry() {
        let payload = json!({"outputs": [{"text": "A"}, {"text": "X"}]});
        assert_eq!(extract_report(&payload), Some("X"));
    }

    #[test]
    fn outputs_skips_trailing_entries_without_text() {
        let payload = json!({"outputs": [
            {"type": "text", "text": "final report"},
            {"type": "thought_summary"},
            {"text": "   "},
            42
        ]});
        assert_eq!(extract_report(&payload), Some("final report"));
    }

    #[test]
    fn top_level_text() {
        assert_eq!(extract_report(&json!({"text": "X"})), Some("X"));
    }

    #[test]
    fn messages_from_model_only() {
        let payload = json!({"messages": [
            {"role": "user", "parts": [{"text": "Y"}]},
            {"role": "model", "parts": [{"text": "X"}]}
        ]});
        assert_eq!(extract_report(&payload), Some("X"));
    }

    #[test]
    fn messages_skip_trailing_user_message() {
        let payload = json!({"messages": [
            {"role": "model", "parts": [{"inline_data": {}}, {"text": "X"}]},
            {"role": "user", "parts": [{"text": "thanks"}]}
        ]});
        assert_eq!(extract_report(&payload), Some("X"));
    }

    #[test]
    fn assistant_role_counts_as_model() {
        let payload = json!({"messages": [{"role": "assistant", "parts": [{"text": "X"}]}]});
        assert_eq!(extract_report(&payload), Some("X"));
    }

    #[test]
    fn nested_output_indirection() {
        let payload = json!({"output": {"output": {"text": "X"}}});
        assert_eq!(extract_report(&payload), Some("X"));
    }

    #[test]
    fn runaway_output_nesting_is_a_miss() {
        let mut value = json!({"text": "deep"});
        for _ in 0..10 {
            value = json!({ "output": value });
        }
        assert_eq!(extract_report(&value), None);
    }

    #[test]
    fn priority_output_before_outputs_before_text() {
        let payload = json!({
            "text": "T",
            "outputs": [{"text": "O"}],
            "output": "P"
        });
        assert_eq!(extract_report(&payload), Some("P"));

        let payload = json!({"text": "T", "outputs": [{"text": "O"}], "output": ""});
        assert_eq!(extract_report(&payload), Some("O"));

        let payload = json!({"text": "T", "outputs": []});
        assert_eq!(extract_report(&payload), Some("T"));
    }

    #[test]
    fn empty_outputs_is_a_miss() {
        assert_eq!(extract_report(&json!({"id": "int-1", "outputs": []})), None);
    }

    #[test]
    fn type_mismatches_are_misses() {
        let payload = json!({
            "output": 12,
            "outputs": {"text": "not a list"},
            "text": ["nope"],
            "messages": "hello"
        });
        assert_eq!(extract_report(&payload), None);
        assert_eq!(extract_report(&json!("just a string")), None);
        assert_eq!(extract_report(&Value::Null), None);
    }

    #[test]
    fn malformed_messages_are_ignored() {
        let payload = json!({"messages": [
            null,
            {"role": "model"},
            {"role": "model", "parts": "text"},
            {"role": 5, "parts": [{"text": "no"}]}
        ]});
        assert_eq!(extract_report(&payload), None);
    }
}
