//! Best-effort coercion of untyped JSON values and ordered alias lookup.
//!
//! None of these functions fail: anything that cannot be coerced becomes
//! `None`. Alias resolution comes in two strengths, mirroring how loosely the
//! generator fills fields in:
//!
//! * [`first_present`] takes the first alias whose value is not `null`.
//! * [`first_truthy`] also skips empty strings, `false` and `0`.

use serde_json::Value;

/// JavaScript-style truthiness, which is what the generator's output was
/// historically checked against.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn first_present<'a>(source: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| source.get(*key))
        .find(|v| !v.is_null())
}

pub fn first_truthy<'a>(source: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| source.get(*key))
        .find(|v| is_truthy(v))
}

/// First non-null value across `(container, key)` locations, in order.
pub fn first_present_of<'a>(locations: &[(&'a Value, &str)]) -> Option<&'a Value> {
    locations
        .iter()
        .filter_map(|(container, key)| container.get(*key))
        .find(|v| !v.is_null())
}

/// First truthy value across `(container, key)` locations, in order.
pub fn first_truthy_of<'a>(locations: &[(&'a Value, &str)]) -> Option<&'a Value> {
    locations
        .iter()
        .filter_map(|(container, key)| container.get(*key))
        .find(|v| is_truthy(v))
}

/// Finite number from a number, numeric string or boolean.
pub fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Trimmed, non-empty text rendering of any non-null value.
pub fn coerce_string(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let text = value_to_text(value);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Plain text form of a value: strings verbatim, everything else as JSON.
/// Integral floats drop their fraction, so `1.0` reads `"1"`.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}
