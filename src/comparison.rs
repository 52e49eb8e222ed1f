use itertools::Itertools;
use serde_json::{Number, Value};
use std::cmp::Ordering;

/// JSONLogic truthiness: `0`, `""`, `[]`, `null` and `false` are falsy,
/// everything else (including `"0"`, `[0]` and `{}`) is truthy.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(_) => true,
    }
}

/// Same JSON type and same value. Numbers compare by value, so `1 === 1.0`.
pub fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(na), Value::Number(nb)) => numbers_eq(na, nb),
        _ => a == b,
    }
}

/// Equality with JSONLogic coercion.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(na), Value::Number(nb)) => numbers_eq(na, nb),
        (Value::String(sa), Value::String(sb)) => sa == sb,
        (Value::Bool(ba), Value::Bool(bb)) => ba == bb,
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            match (n.as_f64(), parse_numeric(s)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (Value::Bool(flag), other) | (other, Value::Bool(flag)) => {
            loose_eq(&Value::from(u8::from(*flag)), other)
        }
        (Value::Array(_) | Value::Object(_), Value::Array(_) | Value::Object(_)) => a == b,
        (composite @ (Value::Array(_) | Value::Object(_)), primitive)
        | (primitive, composite @ (Value::Array(_) | Value::Object(_))) => {
            loose_eq(&Value::String(stringify(composite)), primitive)
        }
    }
}

/// Relational ordering. Two strings compare lexically; anything else is
/// coerced to numbers, and a NaN on either side yields `None`.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Value::String(sa), Value::String(sb)) = (a, b) {
        return Some(sa.cmp(sb));
    }
    let (x, y) = (relational_number(a), relational_number(b));
    x.partial_cmp(&y)
}

/// Numeric coercion for arithmetic. `None` means the value has no numeric
/// reading (objects, arrays, non-numeric strings).
pub fn to_number(v: &Value) -> Option<f64> {
    match v {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Convert an f64 back into JSON, preferring integers when exact.
/// Non-finite values have no JSON form.
pub fn number_value(f: f64) -> Option<Value> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        return Some(Value::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number)
}

/// String form used by `cat`, `in` and loose equality against composites.
pub fn stringify(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            // Integral floats print as plain digits up to 1e21.
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(stringify).join(","),
        Value::Object(_) => v.to_string(),
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

// Blank strings read as zero.
fn parse_numeric(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return Some(0.0);
    }
    t.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn relational_number(v: &Value) -> f64 {
    match v {
        Value::Array(_) => parse_numeric(&stringify(v)).unwrap_or(f64::NAN),
        other => to_number(other).unwrap_or(f64::NAN),
    }
}
