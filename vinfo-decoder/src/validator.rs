//! VIN normalization and validation (ISO 3779)
//!
//! Validity depends only on length and character set. The weighted modulo-11
//! check digit is evaluated afterwards and a mismatch is reported as a
//! warning, because many legitimately issued VINs fail it.

use crate::types::ValidationResult;
use serde::Serialize;

/// Required VIN length
pub const VIN_LENGTH: usize = 17;

/// Zero-based position of the check character
const CHECK_DIGIT_INDEX: usize = 8;

/// Per-position multipliers for the check digit sum
const WEIGHTS: [u32; VIN_LENGTH] = [8, 7, 6, 5, 4, 3, 2, 10, 0, 9, 8, 7, 6, 5, 4, 3, 2];

/// Normalized VIN together with its validation verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VinCheck {
    pub vin: String,
    pub result: ValidationResult,
}

/// Uppercase and strip whitespace and hyphens
pub fn normalize_vin(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Normalize and validate a candidate VIN
pub fn validate_vin(raw: &str) -> VinCheck {
    let vin = normalize_vin(raw);
    let mut errors = Vec::new();

    let length = vin.chars().count();
    if length != VIN_LENGTH {
        errors.push(format!(
            "VIN must be {} characters (got {})",
            VIN_LENGTH, length
        ));
    }

    let mut offending: Vec<char> = Vec::new();
    for c in vin.chars() {
        if !is_vin_char(c) && !offending.contains(&c) {
            offending.push(c);
        }
    }
    if !offending.is_empty() {
        let listed: Vec<String> = offending.iter().map(char::to_string).collect();
        errors.push(format!(
            "VIN contains invalid characters: {}",
            listed.join(", ")
        ));
    }

    if !errors.is_empty() {
        return VinCheck {
            vin,
            result: ValidationResult::invalid(errors),
        };
    }

    let mut warnings = Vec::new();
    if let Some(expected) = expected_check_char(&vin) {
        let actual = vin.chars().nth(CHECK_DIGIT_INDEX).unwrap_or('?');
        if actual != expected {
            warnings.push(format!(
                "Check digit mismatch: expected {}, found {}",
                expected, actual
            ));
        }
    }

    VinCheck {
        vin,
        result: ValidationResult::valid(warnings),
    }
}

/// Digits and letters except I, O and Q
pub fn is_vin_char(c: char) -> bool {
    c.is_ascii_digit() || (c.is_ascii_uppercase() && !matches!(c, 'I' | 'O' | 'Q'))
}

/// Check character computed from the weighted sum, or None for a VIN that
/// has not passed the structural checks
pub fn expected_check_char(vin: &str) -> Option<char> {
    if vin.chars().count() != VIN_LENGTH {
        return None;
    }

    let mut sum = 0u32;
    for (c, weight) in vin.chars().zip(WEIGHTS) {
        sum += transliterate(c)? * weight;
    }

    match sum % 11 {
        10 => Some('X'),
        r => char::from_digit(r, 10),
    }
}

fn transliterate(c: char) -> Option<u32> {
    if let Some(d) = c.to_digit(10) {
        return Some(d);
    }
    let value = match c {
        'A' | 'J' => 1,
        'B' | 'K' | 'S' => 2,
        'C' | 'L' | 'T' => 3,
        'D' | 'M' | 'U' => 4,
        'E' | 'N' | 'V' => 5,
        'F' | 'W' => 6,
        'G' | 'P' | 'X' => 7,
        'H' | 'Y' => 8,
        'R' | 'Z' => 9,
        _ => return None,
    };
    Some(value)
}
