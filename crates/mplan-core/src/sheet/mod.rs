//! Spreadsheet cell model and workbook loading.
//!
//! Cells are held as a closed set of typed values so every coercer can
//! pattern-match instead of guessing at runtime types. Row and column
//! indices are 1-based throughout, matching what spreadsheet authors see.

#[cfg(feature = "native")]
mod reader;

#[cfg(feature = "native")]
pub use reader::CalamineReader;

use std::fmt;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::error::WorkbookError;

/// Result type for workbook loading.
pub type Result<T> = std::result::Result<T, WorkbookError>;

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
    /// True for empty cells and whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Text as the author would read it in the spreadsheet.
    pub fn display_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Number(f) => format_number(*f),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    /// Trimmed display text.
    pub fn trimmed_text(&self) -> String {
        self.display_text().trim().to_string()
    }

    /// Promote a datetime at midnight to a plain date.
    pub fn from_datetime(dt: NaiveDateTime) -> Self {
        if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
            Self::Date(dt.date())
        } else {
            Self::DateTime(dt)
        }
    }
}

fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        format!("{}", f)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<NaiveDate> for Cell {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Cell {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A named, dense grid of cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<Cell>>,
    max_column: usize,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            max_column: 0,
        }
    }

    /// Create a sheet from row vectors; `rows[0]` becomes row 1.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        let max_column = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self {
            name: name.into(),
            rows,
            max_column,
        }
    }

    /// Set a cell, growing the grid as needed. Indices are 1-based; zero
    /// indices are ignored.
    pub fn set(&mut self, row: usize, column: usize, value: impl Into<Cell>) {
        if row == 0 || column == 0 {
            return;
        }
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let cells = &mut self.rows[row - 1];
        if cells.len() < column {
            cells.resize_with(column, Cell::default);
        }
        cells[column - 1] = value.into();
        self.max_column = self.max_column.max(column);
    }

    /// Builder form of [`Sheet::set`].
    pub fn with_cell(mut self, row: usize, column: usize, value: impl Into<Cell>) -> Self {
        self.set(row, column, value);
        self
    }

    /// Fill a row from column 1 onwards.
    pub fn with_row<I, V>(mut self, row: usize, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Cell>,
    {
        for (idx, value) in values.into_iter().enumerate() {
            let cell = value.into();
            if cell != Cell::Empty {
                self.set(row, idx + 1, cell);
            }
        }
        self
    }

    /// Sheet title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last row index (0 for an empty sheet).
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Last column index (0 for an empty sheet).
    pub fn max_column(&self) -> usize {
        self.max_column
    }

    /// Cell at `(row, column)`; anything out of range reads as empty.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        if row == 0 || column == 0 {
            return &EMPTY;
        }
        self.rows
            .get(row - 1)
            .and_then(|cells| cells.get(column - 1))
            .unwrap_or(&EMPTY)
    }

    /// `(column, cell)` pairs for columns `1..=max_column` of a row.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, &Cell)> + '_ {
        (1..=self.max_column).map(move |column| (column, self.cell(row, column)))
    }

    /// True when no cell of the row holds a value.
    pub fn is_row_blank(&self, row: usize) -> bool {
        self.row(row).all(|(_, cell)| cell.is_blank())
    }
}

/// An ordered collection of sheets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder that appends a sheet.
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Sheets in workbook order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Look up a sheet by name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name() == name)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

impl From<Vec<Sheet>> for Workbook {
    fn from(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }
}

/// Trait for workbook decoders.
pub trait WorkbookReader {
    /// Load a workbook from a file.
    fn read_path(&self, path: &Path) -> Result<Workbook>;

    /// Load a workbook from in-memory bytes.
    fn read_bytes(&self, data: &[u8]) -> Result<Workbook>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_reads_empty() {
        let sheet = Sheet::new("S").with_cell(2, 3, "x");

        assert_eq!(sheet.max_row(), 2);
        assert_eq!(sheet.max_column(), 3);
        assert_eq!(sheet.cell(2, 3), &Cell::Text("x".to_string()));
        assert_eq!(sheet.cell(1, 1), &Cell::Empty);
        assert_eq!(sheet.cell(10, 10), &Cell::Empty);
        assert_eq!(sheet.cell(0, 1), &Cell::Empty);
        assert!(sheet.is_row_blank(1));
        assert!(!sheet.is_row_blank(2));
    }

    #[test]
    fn test_with_row_skips_empty_values() {
        let sheet = Sheet::new("S").with_row(1, ["Market", "", "Channel"]);

        assert_eq!(sheet.cell(1, 1).display_text(), "Market");
        assert_eq!(sheet.cell(1, 2), &Cell::Empty);
        assert_eq!(sheet.cell(1, 3).display_text(), "Channel");
        assert_eq!(sheet.row(1).count(), 3);
    }

    #[test]
    fn test_display_text() {
        assert_eq!(Cell::Number(12.0).display_text(), "12");
        assert_eq!(Cell::Number(1.5).display_text(), "1.5");
        assert_eq!(Cell::Int(-3).display_text(), "-3");
        assert_eq!(Cell::Bool(true).display_text(), "TRUE");
        assert_eq!(
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()).display_text(),
            "2024-01-05"
        );
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(!Cell::Int(0).is_blank());
    }

    #[test]
    fn test_midnight_datetime_becomes_date() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let evening = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(20, 30, 0)
            .unwrap();

        assert_eq!(Cell::from_datetime(midnight), Cell::Date(midnight.date()));
        assert_eq!(Cell::from_datetime(evening), Cell::DateTime(evening));
    }

    #[test]
    fn test_workbook_lookup() {
        let workbook = Workbook::new()
            .with_sheet(Sheet::new("TV Aberta"))
            .with_sheet(Sheet::new("Radio"));

        assert_eq!(workbook.len(), 2);
        assert!(workbook.sheet("Radio").is_some());
        assert!(workbook.sheet("OOH").is_none());
    }
}
