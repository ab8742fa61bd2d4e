//! Value normalization shared by registry clients
//!
//! Upstream payloads are loosely typed: numbers arrive as JSON numbers or as
//! text with units, dates come in several regional layouts and tyre sizes are
//! buried in free text. Everything here is pure and total; unusable input
//! yields `None` (or a verbatim value for dates) instead of an error.

use crate::types::DateValue;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Valid production year range
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Tyre size layouts: `205/55 R16 91V`, `205/55R16`, `T 125/85 R 16`, `205x55x16`
static TYRE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:T\s*)?\d{3}/\d{2}\s*R\s*\d{2,3}(?:\s+\d{2,3}[A-Z])?|\d{3}x\d{2}x\d{2,3}",
    )
    .expect("tyre pattern literal")
});

/// Accepted date shapes; the year is always four digits
static DATE_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:\d{4}-\d{2}-\d{2}(?:[T ].*)?|\d{1,2}[./]\d{1,2}[./]\d{4}|\d{4}/\d{2}/\d{2}|\d{4})$",
    )
    .expect("date shape literal")
});

/// Day-first layouts, zero padding optional
const DAY_FIRST_FORMATS: [&str; 2] = ["%d.%m.%Y", "%d/%m/%Y"];

// ============================================================================
// Alias Lookup
// ============================================================================

/// First non-null value among `aliases`, in declaration order
pub fn first_value<'a>(data: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|key| data.get(*key))
        .find(|value| !value.is_null())
}

/// Non-blank text for the first present alias; numbers are rendered as text
pub fn text_field(data: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    first_value(data, aliases).and_then(value_as_text)
}

/// Positive integer for the first present alias
pub fn int_field(data: &Map<String, Value>, aliases: &[&str]) -> Option<u32> {
    first_value(data, aliases).and_then(value_as_int)
}

pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// JSON number, or the first digit run embedded in a string ("110 kW")
///
/// Zero is treated as unknown.
pub fn value_as_int(value: &Value) -> Option<u32> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => first_digit_run(s).and_then(|run| run.parse::<u32>().ok()),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

fn first_digit_run(text: &str) -> Option<&str> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Year in the accepted range, from a number or text
pub fn parse_year(value: &Value) -> Option<i32> {
    let year = match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }?;
    (MIN_YEAR..=MAX_YEAR).contains(&year).then_some(year)
}

/// Year taken from the first four characters of a date-like text
pub fn year_from_date_text(text: &str) -> Option<i32> {
    let prefix: String = text.trim().chars().take(4).collect();
    parse_year(&Value::String(prefix))
}

/// Uppercase and strip whitespace and hyphens
pub fn normalize_plate(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

// ============================================================================
// Fuel
// ============================================================================

/// Canonical fuel name; unknown values are lowercased verbatim
pub fn normalize_fuel(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let canonical = match lowered.as_str() {
        "benzín" | "benzin" | "petrol" => "petrol",
        "nafta" | "diesel" => "diesel",
        "lpg" => "lpg",
        "cng" => "cng",
        "elektřina" | "electric" => "electric",
        "hybrid" => "hybrid",
        _ => return lowered,
    };
    canonical.to_string()
}

// ============================================================================
// Tyres
// ============================================================================

/// Extract tyre sizes from free axle text
///
/// One left-to-right scan; whitespace inside a match collapses to single
/// spaces and letters are uppercased (the `x` separator stays lowercase).
/// Returns `None` when nothing matched.
pub fn extract_tyres(raw: &str) -> Option<BTreeSet<String>> {
    let tyres: BTreeSet<String> = TYRE_PATTERN
        .find_iter(raw)
        .map(|m| normalize_tyre(m.as_str()))
        .collect();
    (!tyres.is_empty()).then_some(tyres)
}

fn normalize_tyre(matched: &str) -> String {
    matched
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|c| match c {
            'x' | 'X' => 'x',
            other => other.to_ascii_uppercase(),
        })
        .collect()
}

// ============================================================================
// Dates
// ============================================================================

/// Normalize a date-like JSON value
///
/// Returns `None` only for null or blank input. Unparseable text, including
/// impossible calendar dates, is preserved verbatim.
pub fn normalize_date_value(value: &Value) -> Option<DateValue> {
    value_as_text(value).map(|text| normalize_date(&text))
}

/// Normalize date text to a calendar date or keep it verbatim
pub fn normalize_date(raw: &str) -> DateValue {
    let text = raw.trim();
    parse_date(text)
        .map(DateValue::Calendar)
        .unwrap_or_else(|| DateValue::Verbatim(text.to_string()))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    // chrono's %Y also takes 1-3 digit years
    if !DATE_SHAPE.is_match(text) {
        return None;
    }

    // ISO date, optionally followed by a time part
    if let Ok((date, rest)) = NaiveDate::parse_and_remainder(text, "%Y-%m-%d") {
        if rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ') {
            return Some(date);
        }
    }
    for format in DAY_FIRST_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y/%m/%d") {
        return Some(date);
    }
    if text.len() == 4 && text.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(text.parse().ok()?, 1, 1);
    }
    None
}

// ============================================================================
// Labels
// ============================================================================

/// Non-empty parts joined by " / "
pub fn join_type_label(parts: &[Option<String>]) -> Option<String> {
    let present: Vec<&str> = parts.iter().flatten().map(String::as_str).collect();
    (!present.is_empty()).then(|| present.join(" / "))
}

/// Engine summary such as "1.6 TDI 77 kW"
pub fn engine_type_label(
    displacement_cc: Option<u32>,
    fuel: Option<&str>,
    power_kw: Option<u32>,
) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(cc) = displacement_cc {
        let litres = format!("{:.1}", f64::from(cc) / 1000.0);
        let litres = litres.strip_suffix(".0").unwrap_or(&litres).to_string();
        parts.push(litres);
    }
    if let Some(fuel) = fuel {
        let tag = match fuel.to_lowercase().as_str() {
            "diesel" | "nafta" => "TDI".to_string(),
            "petrol" | "benzín" | "benzin" => "TSI".to_string(),
            other => other.to_uppercase(),
        };
        parts.push(tag);
    }
    if let Some(kw) = power_kw {
        parts.push(format!("{} kW", kw));
    }

    (!parts.is_empty()).then(|| parts.join(" "))
}
