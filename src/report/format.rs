// src/report/format.rs
//
// Display formatting shared by the editable table and the exported document.

use serde_json::Value;

/// `1234.5` -> `"1,234.50"`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "0.00".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u128;
    let whole = group_thousands(&(cents / 100).to_string());
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };

    format!("{sign}{whole}.{:02}", cents % 100)
}

/// Areas share the currency layout.
pub fn format_area(value: f64) -> String {
    format_currency(value)
}

/// Percentages are bare numbers: `10.0` -> `"10"`, `12.5` -> `"12.5"`.
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }

    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `"total_floor_area"` -> `"Total Floor Area"`.
pub fn humanize_key(key: &str) -> String {
    key.split(|c| c == '_' || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders an arbitrary metadata value for a key/value table.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "Yes".to_string(),
        Value::Bool(false) => "No".to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Cuts text to at most `max_chars` characters. No ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency() {
        assert_eq!(format_currency(0.0), "0.00");
        assert_eq!(format_currency(12.5), "12.50");
        assert_eq!(format_currency(999.999), "1,000.00");
        assert_eq!(format_currency(1_234_567.891), "1,234,567.89");
        assert_eq!(format_currency(-90_000.0), "-90,000.00");
        assert_eq!(format_currency(-0.001), "0.00");
        assert_eq!(format_currency(f64::NAN), "0.00");
    }

    #[test]
    fn percent() {
        assert_eq!(format_percent(10.0), "10");
        assert_eq!(format_percent(12.5), "12.5");
        assert_eq!(format_percent(33.3333), "33.33");
        assert_eq!(format_percent(0.0), "0");
        assert_eq!(format_percent(-0.001), "0");
    }

    #[test]
    fn humanize() {
        assert_eq!(humanize_key("total_floor_area"), "Total Floor Area");
        assert_eq!(humanize_key("arp_no"), "Arp No");
        assert_eq!(humanize_key("owner"), "Owner");
    }

    #[test]
    fn values() {
        assert_eq!(display_value(&json!(null)), "");
        assert_eq!(display_value(&json!("Juan")), "Juan");
        assert_eq!(display_value(&json!(120.5)), "120.5");
        assert_eq!(display_value(&json!(true)), "Yes");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_chars("Reinforced Concrete", 10), "Reinforced");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("Dueñas", 4), "Dueñ");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
