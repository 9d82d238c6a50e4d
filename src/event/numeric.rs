//! Lenient numeric extraction
//!
//! Upstream feeds deliver amounts as decimal or hexadecimal strings depending
//! on the producer. The core never trusts a field to be numeric: anything
//! unparseable degrades to zero instead of aborting the event.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a string the way the feed encodes numbers: hex when it looks like
/// hex (0x prefix or all hex digits), otherwise decimal int or float.
/// Unparseable input degrades to 0.0.
pub fn parse_lenient(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let looks_hex = s.starts_with("0x") || s.chars().all(|c| c.is_ascii_hexdigit());
    if looks_hex {
        if let Some(v) = parse_hex_f64(s.strip_prefix("0x").unwrap_or(s)) {
            return v;
        }
    }

    // Decimal: float only when a dot is present, integer otherwise.
    if s.contains('.') {
        s.parse::<f64>().unwrap_or(0.0)
    } else {
        s.parse::<i128>().map(|v| v as f64).unwrap_or(0.0)
    }
}

/// Fold hex digits into an f64. Reserve balances routinely exceed u64, so
/// this accumulates in floating point rather than a fixed-width integer.
pub(crate) fn parse_hex_f64(digits: &str) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut acc = 0.0f64;
    for c in digits.chars() {
        acc = acc * 16.0 + c.to_digit(16)? as f64;
    }
    Some(acc)
}

/// Serde helper: accept numbers or numeric-looking strings, degrade to 0.0.
pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_f64(&value))
}

/// Extract an f64 from a JSON value, coercing strings and defaulting to 0.0.
pub fn value_to_f64(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_lenient(s),
        _ => 0.0,
    }
}

/// Serde helper: accept integer numbers or numeric strings as i64, 0 on junk.
/// Used for nanosecond timestamps.
pub fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_i64().unwrap_or_else(|| n.as_f64().unwrap_or(0.0) as i64),
        Value::String(s) => parse_lenient(s) as i64,
        _ => 0,
    })
}

/// Serde helper for currency decimals: numbers or numeric strings, with the
/// conventional default of 18 when the field is junk.
pub fn lenient_decimals<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match &value {
        Value::Number(n) => n.as_u64().unwrap_or(18) as u32,
        Value::String(s) => parse_lenient(s) as u32,
        _ => 18,
    })
}

/// Convert a smallest-unit amount to human-readable units.
pub fn apply_decimals(amount: f64, decimals: u32) -> f64 {
    if amount == 0.0 {
        return 0.0;
    }
    amount / 10f64.powi(decimals as i32)
}

/// Format a smallest-unit amount with decimals applied, grouped thousands,
/// and the given display precision.
pub fn format_amount(amount: f64, decimals: u32, precision: usize) -> String {
    let human = apply_decimals(amount, decimals);
    let formatted = format!("{:.*}", precision, human.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, ""));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if human < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}
