//! Date coercion, month labels and year hints.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::patterns::{
    DATE_DMY_LONG, DATE_DMY_SHORT, DATE_ISO, YEAR_FOUR_DIGITS, YEAR_SLASH_SHORT,
};
use crate::sheet::Cell;
use crate::text::{alpha_words, normalize};

/// Datetime text layouts tried in order before falling back to plain dates.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Earliest and latest years accepted as a year hint.
const YEAR_HINT_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Normalized month names (full and abbreviated, Portuguese and English).
const MONTHS: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("january", 1),
    ("jan", 1),
    ("fevereiro", 2),
    ("february", 2),
    ("fev", 2),
    ("feb", 2),
    ("marco", 3),
    ("march", 3),
    ("mar", 3),
    ("abril", 4),
    ("april", 4),
    ("abr", 4),
    ("apr", 4),
    ("maio", 5),
    ("may", 5),
    ("mai", 5),
    ("junho", 6),
    ("june", 6),
    ("jun", 6),
    ("julho", 7),
    ("july", 7),
    ("jul", 7),
    ("agosto", 8),
    ("august", 8),
    ("ago", 8),
    ("aug", 8),
    ("setembro", 9),
    ("september", 9),
    ("set", 9),
    ("sep", 9),
    ("sept", 9),
    ("outubro", 10),
    ("october", 10),
    ("out", 10),
    ("oct", 10),
    ("novembro", 11),
    ("november", 11),
    ("nov", 11),
    ("dezembro", 12),
    ("december", 12),
    ("dez", 12),
    ("dec", 12),
];

/// Coerce a cell to a date.
///
/// Native dates pass through (datetimes are truncated). Text is tried as
/// `dd/mm/yyyy`, `dd/mm/yy` and `yyyy-mm-dd`, in that order.
pub fn coerce_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::DateTime(dt) => Some(dt.date()),
        Cell::Text(s) => parse_date_text(s),
        _ => None,
    }
}

/// Coerce a cell to a datetime; plain dates are promoted to midnight.
pub fn coerce_datetime(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        Cell::Text(s) => parse_datetime_text(s),
        _ => None,
    }
}

/// Parse `dd/mm/yyyy`, `dd/mm/yy` or `yyyy-mm-dd` text.
pub fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Some(caps) = DATE_DMY_LONG.captures(s) {
        if let Some(date) = ymd(&caps[3], &caps[2], &caps[1]) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_DMY_SHORT.captures(s) {
        let year = expand_two_digit_year(caps[3].parse().ok()?);
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[1].parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    if let Some(caps) = DATE_ISO.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }

    None
}

/// Parse datetime text in the layouts spreadsheets and exports produce.
pub fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    // Date-only layouts, ISO first.
    if let Some(caps) = DATE_ISO.captures(s) {
        return ymd(&caps[1], &caps[2], &caps[3]).map(|d| d.and_time(NaiveTime::MIN));
    }
    if let Some(caps) = DATE_DMY_LONG.captures(s) {
        return ymd(&caps[3], &caps[2], &caps[1]).map(|d| d.and_time(NaiveTime::MIN));
    }

    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Two-digit years: 00-68 map to the 2000s, 69-99 to the 1900s.
fn expand_two_digit_year(year: i32) -> i32 {
    if year <= 68 { 2000 + year } else { 1900 + year }
}

/// Month number named by a label such as "Janeiro", "DEZ/25" or "Mar 2026".
///
/// Only whole words count, so "Market" is not read as March.
pub fn month_from_text(s: &str) -> Option<u32> {
    let normalized = normalize(s);
    alpha_words(&normalized).find_map(|word| {
        MONTHS
            .iter()
            .find(|(name, _)| *name == word)
            .map(|(_, month)| *month)
    })
}

/// Year hinted at by a title or header text.
///
/// A 4-digit token in 2000..=2100 wins; otherwise a `dd/yy` shaped token
/// gives `2000 + yy`.
pub fn year_from_text(s: &str) -> Option<i32> {
    for caps in YEAR_FOUR_DIGITS.captures_iter(s) {
        if let Ok(year) = caps[1].parse::<i32>() {
            if YEAR_HINT_RANGE.contains(&year) {
                return Some(year);
            }
        }
    }

    YEAR_SLASH_SHORT
        .captures(s)
        .and_then(|caps| caps[2].parse::<i32>().ok())
        .map(|yy| 2000 + yy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_coerce_date_formats() {
        assert_eq!(coerce_date(&text("15/01/2024")), Some(date(2024, 1, 15)));
        assert_eq!(coerce_date(&text("15/01/24")), Some(date(2024, 1, 15)));
        assert_eq!(coerce_date(&text(" 2024-01-15 ")), Some(date(2024, 1, 15)));
        assert_eq!(coerce_date(&Cell::Date(date(2024, 2, 29))), Some(date(2024, 2, 29)));
        assert_eq!(
            coerce_date(&Cell::DateTime(date(2024, 2, 29).and_hms_opt(13, 0, 0).unwrap())),
            Some(date(2024, 2, 29))
        );
    }

    #[test]
    fn test_coerce_date_rejects_garbage() {
        assert_eq!(coerce_date(&text("31/02/2024")), None);
        assert_eq!(coerce_date(&text("Janeiro")), None);
        assert_eq!(coerce_date(&text("")), None);
        assert_eq!(coerce_date(&text("15/01/2024 extra")), None);
        assert_eq!(coerce_date(&Cell::Number(45000.0)), None);
        assert_eq!(coerce_date(&Cell::Empty), None);
    }

    #[test]
    fn test_coerce_datetime() {
        let expected = date(2024, 1, 15).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(coerce_datetime(&text("15/01/2024 10:30")), Some(expected));
        assert_eq!(coerce_datetime(&text("2024-01-15 10:30")), Some(expected));
        assert_eq!(coerce_datetime(&text("2024-01-15T10:30")), Some(expected));
        assert_eq!(coerce_datetime(&text("2024-01-15T10:30:00")), Some(expected));

        let midnight = date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(coerce_datetime(&text("2024-01-15")), Some(midnight));
        assert_eq!(coerce_datetime(&text("15/01/2024")), Some(midnight));
        assert_eq!(coerce_datetime(&Cell::Date(date(2024, 1, 15))), Some(midnight));
        assert_eq!(coerce_datetime(&Cell::DateTime(expected)), Some(expected));

        assert_eq!(coerce_datetime(&text("amanhã")), None);
        assert_eq!(coerce_datetime(&Cell::Int(3)), None);
    }

    #[test]
    fn test_month_from_text() {
        assert_eq!(month_from_text("Janeiro"), Some(1));
        assert_eq!(month_from_text("MARÇO"), Some(3));
        assert_eq!(month_from_text("DEZ/25"), Some(12));
        assert_eq!(month_from_text("Nov 2025"), Some(11));
        assert_eq!(month_from_text("february"), Some(2));
        assert_eq!(month_from_text("Market"), None);
        assert_eq!(month_from_text("Janela"), None);
        assert_eq!(month_from_text("15"), None);
    }

    #[test]
    fn test_year_from_text() {
        assert_eq!(year_from_text("Plano de mídia 2025"), Some(2025));
        assert_eq!(year_from_text("2024-01-15"), Some(2024));
        assert_eq!(year_from_text("Período 01/26"), Some(2026));
        assert_eq!(year_from_text("Código 1999 / tabela 2031"), Some(2031));
        assert_eq!(year_from_text("Canal"), None);
        assert_eq!(year_from_text("123456"), None);
    }

    proptest! {
        #[test]
        fn test_date_coercers_are_total(s in any::<String>()) {
            let cell = Cell::Text(s);
            let _ = coerce_date(&cell);
            let _ = coerce_datetime(&cell);
        }

        #[test]
        fn test_date_coercers_on_date_like_text(s in "[0-9]{1,4}[/-][0-9]{1,3}[/-][0-9]{1,5}( [0-9]{1,2}:[0-9]{1,2})?") {
            let cell = Cell::Text(s);
            let _ = coerce_date(&cell);
            let _ = coerce_datetime(&cell);
        }
    }
}
