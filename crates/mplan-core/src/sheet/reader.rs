//! Workbook decoding using calamine.

use std::io::{Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader, Sheets};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, trace};

use super::{Cell, Result, Sheet, Workbook, WorkbookReader};
use crate::error::WorkbookError;

/// File extensions calamine can decode.
const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Workbook reader backed by calamine (xlsx, xlsm, xlsb, xls, ods).
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineReader;

impl CalamineReader {
    pub fn new() -> Self {
        Self
    }
}

impl WorkbookReader for CalamineReader {
    fn read_path(&self, path: &Path) -> Result<Workbook> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(WorkbookError::UnsupportedFormat(extension));
        }

        let mut sheets =
            open_workbook_auto(path).map_err(|e| WorkbookError::Open(e.to_string()))?;
        debug!("Opened workbook {}", path.display());

        collect_sheets(&mut sheets)
    }

    fn read_bytes(&self, data: &[u8]) -> Result<Workbook> {
        let mut sheets = open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| WorkbookError::Open(e.to_string()))?;

        collect_sheets(&mut sheets)
    }
}

fn collect_sheets<RS: Read + Seek>(sheets: &mut Sheets<RS>) -> Result<Workbook> {
    let names = sheets.sheet_names();
    if names.is_empty() {
        return Err(WorkbookError::Empty);
    }

    let mut workbook = Workbook::new();
    for name in names {
        let range = sheets
            .worksheet_range(&name)
            .map_err(|e| WorkbookError::Sheet {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        workbook.push(range_to_sheet(&name, &range));
    }

    Ok(workbook)
}

/// Copy a calamine range into a sheet, keeping absolute cell positions.
fn range_to_sheet(name: &str, range: &Range<Data>) -> Sheet {
    let mut sheet = Sheet::new(name);
    let Some((row0, col0)) = range.start() else {
        trace!("Sheet {} is empty", name);
        return sheet;
    };

    for (r, c, value) in range.used_cells() {
        let cell = convert_cell(value);
        if cell == Cell::Empty {
            continue;
        }
        sheet.set(row0 as usize + r + 1, col0 as usize + c + 1, cell);
    }

    trace!(
        "Sheet {}: {} rows x {} columns",
        name,
        sheet.max_row(),
        sheet.max_column()
    );

    sheet
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                Cell::Number(dt.as_f64())
            } else {
                dt.as_datetime()
                    .map(Cell::from_datetime)
                    .unwrap_or(Cell::Number(dt.as_f64()))
            }
        }
        Data::DateTimeIso(s) => {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
                Cell::from_datetime(dt)
            } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                Cell::Date(d)
            } else {
                Cell::from(s.as_str())
            }
        }
        Data::DurationIso(s) => Cell::from(s.as_str()),
        // Formula errors carry no usable value.
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &[u8] = include_bytes!("../../tests/fixtures/media_plan.xlsx");

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(convert_cell(&Data::Float(5.0)), Cell::Number(5.0));
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-01-15".to_string())),
            Cell::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap())
        );
        assert_eq!(
            convert_cell(&Data::DateTimeIso("2024-01-15T10:30:00".to_string())),
            Cell::DateTime(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(10, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let err = CalamineReader::new()
            .read_path(Path::new("plan.pdf"))
            .unwrap_err();
        assert!(matches!(err, WorkbookError::UnsupportedFormat(ext) if ext == "pdf"));
    }

    #[test]
    fn test_garbage_bytes_fail_to_open() {
        let err = CalamineReader::new()
            .read_bytes(b"definitely not a spreadsheet")
            .unwrap_err();
        assert!(matches!(err, WorkbookError::Open(_)));
    }

    #[test]
    fn test_read_fixture() {
        let workbook = CalamineReader::new().read_bytes(FIXTURE).unwrap();

        let names: Vec<&str> = workbook.sheets().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["TV Aberta", "Notas"]);

        let tv = workbook.sheet("TV Aberta").unwrap();
        assert_eq!(tv.cell(3, 1).display_text(), "Market");
        assert_eq!(tv.cell(3, 2).display_text(), "Channel");
        assert_eq!(tv.cell(4, 3), &Cell::Number(1.0));
        assert_eq!(tv.cell(5, 5).display_text(), "5");
        assert_eq!(tv.cell(6, 9).display_text(), "B");
    }
}
