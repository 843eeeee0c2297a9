//! Coercion of loosely typed `enabled` flags.

use serde_json::Value;

/// Interprets a stored or submitted flag as a boolean.
///
/// Accepts `true`, the strings `"1"` and `"true"` (any case, surrounding
/// whitespace ignored) and the number `1`. Everything else, including a
/// missing value, is `false`.
pub fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => {
            let s = s.trim();
            s == "1" || s.eq_ignore_ascii_case("true")
        }
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        _ => false,
    }
}
