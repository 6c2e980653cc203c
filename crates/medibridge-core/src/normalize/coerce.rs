//! Lenient scalar coercion. Never fails: anything unusable becomes `0` / `""`.

use serde_json::Value;

/// Integer coercion.
///
/// Accepts integers, finite floats (truncated toward zero), booleans and
/// strings whose trimmed text parses as an integer. Null, empty strings and
/// parse failures yield 0.
pub fn as_int(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
                f.trunc() as i64
            } else {
                0
            }
        }
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

/// String coercion: null becomes `""`, strings are trimmed, other values use
/// their (compact) JSON text.
pub fn as_str(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}
