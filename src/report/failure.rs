use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Message keys accepted inside an `error` object, in order of preference.
const MESSAGE_KEYS: &[&str] = &["message", "msg", "detail"];

/// Turn the payload of a failed interaction into one readable line.
///
/// Never fails: empty or absent payloads give `"Unknown error"`, anything
/// unrecognised is serialized whole.
pub fn describe_failure(payload: &Value) -> String {
    match payload {
        Value::Null => UNKNOWN_ERROR.to_string(),
        Value::Object(map) if map.is_empty() => UNKNOWN_ERROR.to_string(),
        Value::Object(map) => from_error_field(map)
            .or_else(|| non_blank(map.get("message")).map(str::to_string))
            .unwrap_or_else(|| spaced_json(payload)),
        Value::String(s) if s.trim().is_empty() => UNKNOWN_ERROR.to_string(),
        Value::String(s) => s.clone(),
        other => spaced_json(other),
    }
}

fn from_error_field(map: &Map<String, Value>) -> Option<String> {
    match map.get("error")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(err) if !err.is_empty() => Some(from_error_object(err)),
        _ => None,
    }
}

fn from_error_object(err: &Map<String, Value>) -> String {
    let message = MESSAGE_KEYS.iter().find_map(|key| non_blank(err.get(*key)));
    match message {
        Some(msg) => match err.get("code").and_then(code_label) {
            Some(code) => format!("[{code}] {msg}"),
            None => msg.to_string(),
        },
        None => spaced_json(&Value::Object(err.clone())),
    }
}

// Zero, empty and null codes are treated as absent.
fn code_label(code: &Value) -> Option<String> {
    match code {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".into()),
        _ => None,
    }
}

/// Single-line JSON with a space after `,` and `:`, e.g. `{"code": 500}`.
fn spaced_json(value: &Value) -> String {
    let mut ser = serde_json::Serializer::with_formatter(Vec::new(), SpacedFormatter);
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8(ser.into_inner()).unwrap_or_else(|_| value.to_string()),
        Err(_) => value.to_string(),
    }
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}
