//! Pure cell coercers and matching rules used by the detector and extractor.
//!
//! Every function here is total: unparsable input yields `None` or an empty
//! collection, never a panic or an error.

pub mod channels;
pub mod columns;
pub mod dates;
pub mod numbers;
pub mod patterns;
pub mod pieces;

pub use channels::{detect_media, is_section_label};
pub use columns::role_for_header;
pub use dates::{coerce_date, coerce_datetime, month_from_text, year_from_text};
pub use numbers::{coerce_decimal, coerce_decimal_text, coerce_int};
pub use pieces::{extract_piece_codes, inline_piece_code, split_piece_codes};
