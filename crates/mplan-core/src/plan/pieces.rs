//! Creative piece lookup tables.
//!
//! Besides the placement grid, a sheet may carry a small table listing the
//! creatives (code, title, seconds). It can sit anywhere in the sheet, so it
//! is located by its header tokens rather than by position.

use std::collections::HashMap;

use crate::models::config::ParserConfig;
use crate::models::plan::PieceEntry;
use crate::sheet::Sheet;
use crate::text::normalize;

use super::rules::columns::{is_piece_code_header, is_piece_seconds_header, is_piece_title_header};
use super::rules::numbers::coerce_int;

/// Position of a piece table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceTableHeader {
    pub row: usize,
    pub code_column: usize,
    pub title_column: usize,
    pub seconds_column: usize,
}

/// Find the first row holding code, title and seconds headers.
pub fn find_piece_table(sheet: &Sheet, config: &ParserConfig) -> Option<PieceTableHeader> {
    let last_row = sheet.max_row().min(config.piece_table_scan_rows);
    let last_column = sheet.max_column().min(config.piece_table_max_columns);

    for row in 1..=last_row {
        let mut code_column = None;
        let mut title_column = None;
        let mut seconds_column = None;

        for column in 1..=last_column {
            let cell = sheet.cell(row, column);
            if cell.is_blank() {
                continue;
            }
            let key = normalize(&cell.display_text());
            if code_column.is_none() && is_piece_code_header(&key) {
                code_column = Some(column);
            } else if title_column.is_none() && is_piece_title_header(&key) {
                title_column = Some(column);
            } else if seconds_column.is_none() && is_piece_seconds_header(&key) {
                seconds_column = Some(column);
            }
        }

        if let (Some(code_column), Some(title_column), Some(seconds_column)) =
            (code_column, title_column, seconds_column)
        {
            return Some(PieceTableHeader {
                row,
                code_column,
                title_column,
                seconds_column,
            });
        }
    }

    None
}

/// Read the piece table of a sheet, if it has one.
///
/// Reading stops at the first row where both code and title are blank; rows
/// with a title but no code are skipped.
pub fn read_piece_table(sheet: &Sheet, config: &ParserConfig) -> Vec<PieceEntry> {
    let Some(header) = find_piece_table(sheet, config) else {
        return Vec::new();
    };

    let last_row = sheet.max_row().min(header.row + config.piece_table_max_rows);
    let mut entries = Vec::new();

    for row in header.row + 1..=last_row {
        let code = sheet.cell(row, header.code_column).trimmed_text().to_uppercase();
        let title = sheet.cell(row, header.title_column).trimmed_text();
        if code.is_empty() && title.is_empty() {
            break;
        }
        if code.is_empty() {
            continue;
        }
        entries.push(PieceEntry {
            code,
            title,
            duration_sec: coerce_int(sheet.cell(row, header.seconds_column)),
        });
    }

    entries
}

/// Piece entries merged across sheets, keyed by code in first-seen order.
#[derive(Debug, Default)]
pub struct PieceCatalog {
    entries: Vec<PieceEntry>,
    index: HashMap<String, usize>,
}

impl PieceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A known code only gets its blank title and missing or
    /// zero duration filled in.
    pub fn merge(&mut self, entry: PieceEntry) {
        match self.index.get(&entry.code) {
            Some(&idx) => {
                let existing = &mut self.entries[idx];
                if existing.title.is_empty() {
                    existing.title = entry.title;
                }
                if matches!(existing.duration_sec, None | Some(0)) && entry.duration_sec.is_some() {
                    existing.duration_sec = entry.duration_sec;
                }
            }
            None => {
                self.index.insert(entry.code.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<PieceEntry> {
        self.entries
    }
}

impl Extend<PieceEntry> for PieceCatalog {
    fn extend<I: IntoIterator<Item = PieceEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.merge(entry);
        }
    }
}
