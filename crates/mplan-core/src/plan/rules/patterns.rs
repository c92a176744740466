//! Common regex patterns for media plan cells.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Year hints in title/header cells
    pub static ref YEAR_FOUR_DIGITS: Regex = Regex::new(
        r"\b(\d{4})\b"
    ).unwrap();

    pub static ref YEAR_SLASH_SHORT: Regex = Regex::new(
        r"\b(\d{2})\s*/\s*(\d{2})\b"
    ).unwrap();

    // Text dates
    pub static ref DATE_DMY_LONG: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{4})$"
    ).unwrap();

    pub static ref DATE_DMY_SHORT: Regex = Regex::new(
        r"^(\d{1,2})/(\d{1,2})/(\d{2})$"
    ).unwrap();

    pub static ref DATE_ISO: Regex = Regex::new(
        r"^(\d{4})-(\d{1,2})-(\d{1,2})$"
    ).unwrap();

    // Brazilian amounts: 1.234,56
    pub static ref THOUSANDS_DOT_DECIMAL_COMMA: Regex = Regex::new(
        r"\d+\.\d+,\d+"
    ).unwrap();

    // Whole numeric value once currency and spacing are trimmed off the edges
    pub static ref DECIMAL_TEXT: Regex = Regex::new(
        r"^-?(?:\d+(?:[.,]\d+)*|[.,]\d+)$"
    ).unwrap();

    // Piece codes in an explicit codes column
    pub static ref PIECE_CODE_SEPARATOR: Regex = Regex::new(
        r"[^A-Za-z0-9]+"
    ).unwrap();

    // Piece code as the first letter of an uploaded asset file name
    pub static ref FILENAME_CODE_WORD: Regex = Regex::new(
        r"^\s*([A-Za-z])\b"
    ).unwrap();

    pub static ref FILENAME_CODE_SEPARATED: Regex = Regex::new(
        r"^\s*([A-Za-z])[-_ ]"
    ).unwrap();
}
