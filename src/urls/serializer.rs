//! Parameter Serializer
//!
//! Turns a query parameter object into the query string appended after
//! `?` on every query endpoint.

use crate::error::{RdsError, Result};
use serde::Serialize;
use serde_json::Value;

/// Serialize a single scalar parameter as `name=value&`
///
/// Returns an empty string when `name` is empty or there is no value.
pub fn serialize_parameter(name: &str, value: Option<&str>) -> String {
    match value {
        Some(value) if !name.is_empty() => {
            format!("{}={}&", name, urlencoding::encode(value))
        }
        _ => String::new(),
    }
}

/// Serialize a list parameter as `name=a,b,c&`, encoding each value
///
/// Returns an empty string when `name` is empty or the list is empty.
pub fn serialize_list_parameter<S: AsRef<str>>(name: &str, values: &[S]) -> String {
    if name.is_empty() || values.is_empty() {
        return String::new();
    }

    let joined = values
        .iter()
        .map(|value| urlencoding::encode(value.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",");

    format!("{}={}&", name, joined)
}

/// Serialize a parameter object into a query string
///
/// Each field is dispatched on its serialized shape: arrays go through
/// [`serialize_list_parameter`], nulls are skipped, everything else goes
/// through [`serialize_parameter`]. The result never starts or ends with
/// `&`. `None` serializes to an empty string.
///
/// Field order follows the serialized map and must not be relied upon.
pub fn serialize_parameters<P>(parameters: Option<&P>) -> Result<String>
where
    P: Serialize + ?Sized,
{
    let Some(parameters) = parameters else {
        return Ok(String::new());
    };

    let fields = match serde_json::to_value(parameters) {
        Ok(Value::Object(fields)) => fields,
        Ok(Value::Null) => return Ok(String::new()),
        Ok(other) => {
            return Err(RdsError::InvalidParameters(format!(
                "expected a field map, got {}",
                other
            )))
        }
        Err(e) => return Err(RdsError::InvalidParameters(e.to_string())),
    };

    let mut query = String::new();
    for (name, value) in &fields {
        match value {
            Value::Array(values) => {
                let values: Vec<String> = values.iter().map(scalar_to_string).collect();
                query.push_str(&serialize_list_parameter(name, &values));
            }
            Value::Null => {}
            scalar => query.push_str(&serialize_parameter(name, Some(&scalar_to_string(scalar)))),
        }
    }

    // exactly one trailing ampersand
    if query.ends_with('&') {
        query.pop();
    }

    Ok(query)
}

/// Render a JSON value the way it appears inside a query string
fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
