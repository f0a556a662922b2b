// src/domain/numeric.rs

use serde_json::Value;

/// Coerces a raw field into a number, falling back to `default`.
///
/// Numbers pass through, strings are parsed by [`parse_numeric_str`],
/// booleans count as 1/0. Null, arrays, objects and non-finite results all
/// yield `default`. This never fails: a malformed field must not take the
/// whole valuation down with it.
pub fn parse_numeric(value: &Value, default: f64) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

/// Parses the leading numeric prefix of a string.
///
/// Whitespace and thousands separators are ignored, so `" 1,250.5 sqm"`
/// reads as `1250.5` and `"12%"` as `12`. Returns `None` when no digits lead
/// the string.
pub fn parse_numeric_str(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let bytes = cleaned.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Optional exponent, only consumed when complete.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    cleaned[..end].parse::<f64>().ok()
}

/// Parses an assessment-level rate into a decimal fraction.
///
/// `"12%"` is a percentage (0.12), `"0.12"` is already a fraction.
/// Empty, missing or unparsable rates are 0.
pub fn parse_rate(raw: Option<&str>) -> f64 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0.0;
    };

    match raw.strip_suffix('%') {
        Some(percent) => parse_numeric_str(percent).map(|n| n / 100.0),
        None => parse_numeric_str(raw),
    }
    .filter(|n| n.is_finite())
    .unwrap_or(0.0)
}

/// Division that short-circuits to 0 on a zero denominator.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
