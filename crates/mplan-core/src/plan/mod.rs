//! Media plan extraction.
//!
//! A workbook is processed sheet by sheet: the [`SheetDetector`] finds the
//! header row, the optional day-of-month row, the year and the column roles;
//! the [`RowExtractor`] then turns the rows below into placement lines. Piece
//! lookup tables are read from every sheet and merged by code.

pub mod detector;
pub mod extractor;
mod parser;
pub mod pieces;
pub mod rules;

pub use detector::SheetDetector;
pub use extractor::{RowExtractor, SheetRows};
pub use parser::{MediaPlanParser, PlanParser};
pub use pieces::{find_piece_table, read_piece_table, PieceCatalog, PieceTableHeader};
