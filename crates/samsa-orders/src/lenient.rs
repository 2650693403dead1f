//! Forgiving decoders for storefront input.
//!
//! Web forms post phone numbers as JSON numbers and quantities as strings.
//! These decoders accept either shape so that only a missing field can turn
//! an order away.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text field. Strings are kept as given; numbers and booleans become their
/// JSON text. `null` is absent.
pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

pub fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text(d)?.unwrap_or_default())
}

/// Numeric field. JSON numbers, or strings holding a finite number.
/// Anything else is absent.
pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(as_number(&Value::deserialize(d)?))
}

pub fn number_or_zero<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(number(d)?.unwrap_or(0.0))
}

fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}
