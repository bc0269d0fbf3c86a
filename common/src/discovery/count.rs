//! # Lenient Numeric Fields
//!
//! Agents report counts in whatever shape their version happens to use. A
//! "count" may arrive as a number, as an array of items, or as an object
//! describing a single item. Everything that reads such a field goes through
//! [`coerce_count`].

use serde_json::{Number, Value};

/// Interprets a polymorphic count field.
///
/// * a non-negative number is used as-is (fractions are truncated),
/// * an array contributes its length,
/// * a non-empty object contributes `1`,
/// * anything else yields `None` so the caller can fall back.
pub fn coerce_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => number_to_count(n),
        Value::Array(items) => Some(items.len() as u64),
        Value::Object(map) if !map.is_empty() => Some(1),
        _ => None,
    }
}

/// Reads a field that is only meaningful as a plain number.
pub fn strict_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => number_to_count(n),
        _ => None,
    }
}

/// Reads a finite number of any sign.
pub fn number(value: &Value) -> Option<f64> {
    value.as_f64().filter(|n| n.is_finite())
}

fn number_to_count(n: &Number) -> Option<u64> {
    if let Some(count) = n.as_u64() {
        return Some(count);
    }
    n.as_f64()
        .filter(|f| f.is_finite() && *f >= 0.0)
        .map(|f| f.trunc() as u64)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
