//! Serde helpers shared by the document input records.
//!
//! Form data arrives with numbers as either JSON strings or JSON numbers; both
//! are kept as display text.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(value_text))
}

/// A list of text-or-number cells. `null` entries stay as gaps.
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(value_text)
        .collect())
}

/// Prefixes bare amounts with the rupee spelling the built-in fonts can draw.
pub(crate) fn money(value: &str) -> String {
    let value = value.trim();
    if value.starts_with(|c: char| c.is_ascii_digit()) {
        format!("Rs. {}", value)
    } else {
        value.to_string()
    }
}
