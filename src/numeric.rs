//! Coercion of locale-formatted cell text into numbers, and the inverse
//! formatting used when the numbers are displayed again.

/// Converts a statement cell to a number, returning 0 for anything unparsable.
///
/// Commas and whitespace are stripped first. A parenthesised amount such as
/// `(1.234)` is an accounting negative whose dots are thousands separators.
pub fn to_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }

    if let Some(inner) = parenthesized_amount(&cleaned) {
        let digits: String = inner.chars().filter(|c| *c != '.').collect();
        return match digits.parse::<f64>() {
            Ok(n) if n.is_finite() => -n,
            _ => 0.0,
        };
    }

    match cleaned.parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => 0.0,
    }
}

fn parenthesized_amount(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('(')?.strip_suffix(')')?;
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit() || c == '.') {
        Some(inner)
    } else {
        None
    }
}

/// Coercion used for chart series: commas are stripped and the longest
/// numeric prefix is read, so `"12.5%"` gives 12.5. Placeholders such as
/// `nan` and `inf` give 0.
pub fn to_number_lenient(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() || matches!(cleaned.as_str(), "nan" | "NaN" | "inf") {
        return 0.0;
    }
    leading_number(&cleaned).unwrap_or(0.0)
}

fn leading_number(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
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
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }

    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
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

    s[..end].parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Strict numeric read of a display cell: surrounding whitespace and commas
/// are ignored, an empty cell reads as 0, anything else must parse fully.
fn parse_display_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats a statement cell with en-US thousands grouping (up to three
/// decimals). Text that is not a number is returned unchanged.
pub fn format_grouped(raw: &str) -> String {
    match parse_display_number(raw) {
        Some(n) => group_thousands(n, 3),
        None => raw.to_string(),
    }
}

/// Renders `value` rounded to at most `max_fraction_digits` decimals, with
/// trailing zeros removed and commas between thousands.
pub fn group_thousands(value: f64, max_fraction_digits: usize) -> String {
    let rendered = format!("{:.*}", max_fraction_digits, value.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (rendered.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.is_empty();
    let mut out = String::new();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Short Vietnamese magnitude form used in chart tooltips,
/// e.g. `1_500_000_000.0` becomes `"1.50 tỷ"`.
pub fn format_compact(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2} tỷ", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2} triệu", value / 1e6)
    } else if abs >= 1e3 {
        format!("{:.2} nghìn", value / 1e3)
    } else {
        format!("{:.2}", value)
    }
}

pub fn format_percent(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Formats an indicator cell (P/E, ROE, ...): missing or unparsable values
/// show as `"0"`; large magnitudes lose their decimals.
pub fn format_indicator(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "nan" || trimmed == "inf" {
        return "0".to_string();
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    let Some(n) = leading_number(&cleaned) else {
        return "0".to_string();
    };

    let abs = n.abs();
    let digits = if abs > 1_000_000.0 {
        0
    } else if abs < 100.0 {
        2
    } else {
        1
    };
    group_thousands(n, digits)
}
