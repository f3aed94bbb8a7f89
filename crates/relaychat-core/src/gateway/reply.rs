use serde_json::Value;

use crate::constants::responses::ANSWER_FIELDS;

/// The shapes a relay success body is known to take.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    /// The body was not JSON at all.
    PlainText(String),
    /// A JSON object carrying one of the recognized answer fields.
    Field { field: &'static str, value: Value },
    /// A JSON string literal.
    BareString(String),
    /// Valid JSON with none of the recognized fields.
    Unrecognized(Value),
}

impl ServerReply {
    /// Classify a raw response body. Answer fields are tried in priority
    /// order and only count when their value is truthy.
    pub fn parse(body: &str) -> Self {
        let value: Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(_) => return Self::PlainText(body.to_string()),
        };

        if let Value::Object(ref map) = value {
            for &field in ANSWER_FIELDS {
                if let Some(found) = map.get(field).filter(|v| is_truthy(v)) {
                    return Self::Field {
                        field,
                        value: found.clone(),
                    };
                }
            }
        }

        match value {
            Value::String(s) => Self::BareString(s),
            other => Self::Unrecognized(other),
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::PlainText(text) | Self::BareString(text) => text,
            Self::Field { value, .. } => value_to_text(&value),
            Self::Unrecognized(value) => pretty(&value),
        }
    }
}

/// JavaScript-style truthiness: `null`, `false`, `0` and `""` are falsy.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a JSON value for display: strings as-is, scalars via their JSON
/// text, containers pretty-printed.
pub(crate) fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => pretty(value),
        other => other.to_string(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
