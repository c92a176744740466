//! Integer and decimal coercion of untyped cells.

use std::str::FromStr;

use rust_decimal::Decimal;

use super::patterns::{DECIMAL_TEXT, THOUSANDS_DOT_DECIMAL_COMMA};
use crate::sheet::Cell;

/// Coerce a cell to an integer.
///
/// Booleans become 0/1, floats and numeric text round to the nearest integer
/// (ties away from zero), and a decimal comma is accepted in text. Anything
/// else is `None`, which callers must keep distinct from an explicit `0`.
pub fn coerce_int(cell: &Cell) -> Option<i64> {
    match cell {
        Cell::Empty | Cell::Date(_) | Cell::DateTime(_) => None,
        Cell::Bool(b) => Some(i64::from(*b)),
        Cell::Int(i) => Some(*i),
        Cell::Number(f) => round_to_i64(*f),
        Cell::Text(s) => parse_int_text(s),
    }
}

/// Parse numeric text such as `"12"`, `" 3,6 "` or `"1e2"` to a rounded integer.
pub fn parse_int_text(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value: f64 = trimmed.replace(',', ".").parse().ok()?;
    round_to_i64(value)
}

fn round_to_i64(f: f64) -> Option<i64> {
    // i64::MAX is not exactly representable; stay strictly inside the range.
    if f.is_finite() && f.abs() < 9.2e18 {
        Some(f.round() as i64)
    } else {
        None
    }
}

/// Coerce a cell to a normalized decimal string, keeping the exact digits.
///
/// Text in `1.234,56` form drops the thousands dots and turns the comma into
/// the decimal point; otherwise a comma is read as the decimal point.
/// Currency symbols and spaces around the number are ignored; anything else
/// inside it makes the cell non-numeric. Returns `None` for blank and
/// non-numeric cells.
pub fn coerce_decimal_text(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Int(i) => Some(i.to_string()),
        Cell::Number(f) if f.is_finite() => Some(f.to_string()),
        Cell::Text(s) => normalize_decimal_text(s),
        _ => None,
    }
}

/// Coerce a cell to a [`Decimal`] via [`coerce_decimal_text`].
pub fn coerce_decimal(cell: &Cell) -> Option<Decimal> {
    coerce_decimal_text(cell).and_then(|s| Decimal::from_str(&s).ok())
}

fn normalize_decimal_text(s: &str) -> Option<String> {
    let cleaned = s.trim_matches(|c: char| !(c.is_ascii_digit() || matches!(c, ',' | '.' | '-')));
    if !DECIMAL_TEXT.is_match(cleaned) {
        return None;
    }

    let normalized = if THOUSANDS_DOT_DECIMAL_COMMA.is_match(cleaned) {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.replace(',', ".")
    };

    Decimal::from_str(&normalized).ok().map(|_| normalized)
}
