//! Creative piece code extraction.

use std::collections::BTreeSet;

use super::patterns::PIECE_CODE_SEPARATOR;
use crate::sheet::Cell;

/// Default longest token kept from an explicit piece codes column.
pub const DEFAULT_MAX_PIECE_CODE_LEN: usize = 12;

/// Default longest alphabetic calendar cell read as an inline piece code.
pub const DEFAULT_MAX_INLINE_CODE_LEN: usize = 2;

/// Extract piece codes from an explicit codes cell, e.g. `"A, B; c-d"`.
///
/// Returns the sorted, duplicate-free set of uppercased tokens of at most
/// [`DEFAULT_MAX_PIECE_CODE_LEN`] characters. The row extractor calls
/// [`split_piece_codes`] with the configured limit instead.
pub fn extract_piece_codes(cell: &Cell) -> Vec<String> {
    split_piece_codes(&cell.display_text(), DEFAULT_MAX_PIECE_CODE_LEN)
}

/// Split free text on non-alphanumeric runs into uppercased codes of at
/// most `max_len` characters.
pub fn split_piece_codes(text: &str, max_len: usize) -> Vec<String> {
    PIECE_CODE_SEPARATOR
        .split(text.trim())
        .map(str::to_uppercase)
        .filter(|token| !token.is_empty() && token.chars().count() <= max_len)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Read a calendar cell as an inline piece code.
///
/// Media plans mark which creative airs on a day by writing its letter in
/// the day cell ("A", "B", ...). A short purely alphabetic value is a code;
/// anything else is an insertion count.
pub fn inline_piece_code(cell: &Cell, max_len: usize) -> Option<String> {
    let value = cell.display_text().trim().to_uppercase();
    let len = value.chars().count();
    if len > 0 && len <= max_len && value.chars().all(char::is_alphabetic) {
        Some(value)
    } else {
        None
    }
}
