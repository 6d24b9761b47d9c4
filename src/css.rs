//! Helpers for reading resolved CSS values the way browsers report them.
//!
//! Computed styles arrive as strings (`"16px"`, `"rgb(17, 24, 39)"`,
//! `"0.3s"`), so extractors lean on lenient prefix parsing rather than a
//! full CSS grammar.

use regex::Regex;
use std::sync::LazyLock;

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid integer regex"));

/// Color values that count as "no color".
pub const TRANSPARENT_VALUES: [&str; 2] = ["transparent", "rgba(0, 0, 0, 0)"];

/// Parses the leading number of a CSS value (`"12.5px"` -> 12.5).
///
/// Mirrors browser `parseFloat`: leading whitespace is skipped, trailing
/// units are ignored and a value without a numeric prefix yields `None`.
pub fn parse_float(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
        }
    }
    let numeric = &s[digits_start..end];
    if numeric.is_empty() || numeric == "." {
        return None;
    }
    s[..end].parse().ok()
}

/// Parses the leading integer of a CSS value (`"8.9px"` -> 8), like `parseInt`.
pub fn parse_int(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    s[..end].parse().ok()
}

/// All unsigned integers appearing in a value, in order.
pub fn integers(value: &str) -> Vec<u32> {
    INTEGER_RE
        .find_iter(value)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Sum of every integer run in a color string, used as a crude brightness.
pub fn digit_sum(value: &str) -> u64 {
    integers(value).into_iter().map(u64::from).sum()
}

/// True for empty values and the two spellings of a fully transparent color.
pub fn is_transparent(value: &str) -> bool {
    value.is_empty() || TRANSPARENT_VALUES.contains(&value)
}

/// First three channels of an `rgb()`/`rgba()` value.
pub fn rgb_channels(value: &str) -> Option<[u8; 3]> {
    let nums = integers(value);
    if nums.len() < 3 {
        return None;
    }
    Some([
        nums[0].min(255) as u8,
        nums[1].min(255) as u8,
        nums[2].min(255) as u8,
    ])
}

/// Formats a resolved color as uppercase `#RRGGBB`.
///
/// Values that are already hex pass through; unparseable values are returned unchanged.
pub fn to_hex(value: &str) -> String {
    if value.starts_with('#') {
        return value.to_string();
    }
    match rgb_channels(value) {
        Some([r, g, b]) => format!("#{:02X}{:02X}{:02X}", r, g, b),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_float_reads_numeric_prefix() {
        assert_eq!(parse_float("12.5px"), Some(12.5));
        assert_eq!(parse_float("0.3s"), Some(0.3));
        assert_eq!(parse_float("-4px"), Some(-4.0));
        assert_eq!(parse_float("normal"), None);
        assert_eq!(parse_float(""), None);
    }

    #[test]
    fn parse_int_truncates() {
        assert_eq!(parse_int("8.9px"), Some(8));
        assert_eq!(parse_int("auto"), None);
        assert_eq!(parse_int("-2px"), Some(-2));
    }

    #[test]
    fn hex_is_uppercase_from_rgb() {
        assert_eq!(to_hex("rgb(17, 24, 39)"), "#111827");
        assert_eq!(to_hex("rgba(255, 0, 128, 0.5)"), "#FF0080");
        assert_eq!(to_hex("#abcdef"), "#abcdef");
    }

    #[test]
    fn digit_sum_counts_alpha_digits() {
        assert_eq!(digit_sum("rgb(10, 20, 30)"), 60);
        assert_eq!(digit_sum("rgba(0, 0, 0, 0.5)"), 5);
    }

    #[test]
    fn transparent_values_are_recognized() {
        assert!(is_transparent("transparent"));
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent(""));
        assert!(!is_transparent("rgb(0, 0, 0)"));
    }
}
