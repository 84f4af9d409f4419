//! Forgiving field deserializers for third-party JSON feeds

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Number, or numeric string; anything else (including non-finite) is `None`
pub fn value_as_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

/// Integer, or integral numeric string
pub fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Scalar rendered as text; strings are returned unquoted
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_f64))
}

/// Strings stay strings, numbers and booleans become their text form
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// JSON null becomes `None`; every other value is kept as-is
pub fn opt_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()))
}

/// Array of strings; non-string entries are ignored, a non-array is `None`
pub fn opt_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Nested `[[[n, n], ...], ...]` arrays
///
/// Every position is kept even when it is malformed (it comes back with the
/// numeric values it had, possibly fewer than two) so that geometry
/// validation can reject the whole record instead of silently losing points.
pub fn rings_from_value(value: &Value) -> Option<Vec<Vec<Vec<f64>>>> {
    value
        .as_array()?
        .iter()
        .map(|ring| {
            ring.as_array().map(|positions| {
                positions
                    .iter()
                    .map(|position| match position {
                        Value::Array(values) => values.iter().filter_map(value_as_f64).collect(),
                        _ => Vec::new(),
                    })
                    .collect()
            })
        })
        .collect()
}
