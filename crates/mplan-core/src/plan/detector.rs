//! Sheet structure detection: header row, day row, year and column roles.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::models::config::ParserConfig;
use crate::models::plan::{ColumnRole, DateColumn, SheetDetection};
use crate::sheet::{Cell, Sheet};
use crate::text::normalize;

use super::rules::{
    channels::detect_media,
    columns::{is_channel_header, is_market_header, role_for_header},
    dates::{coerce_date, month_from_text, year_from_text},
    numbers::coerce_int,
};

/// Detects the layout of one sheet.
///
/// The detector is a pure function of the sheet content plus the reference
/// date, which supplies the fallback year and month.
pub struct SheetDetector<'a> {
    config: &'a ParserConfig,
    reference_date: NaiveDate,
}

impl<'a> SheetDetector<'a> {
    pub fn new(config: &'a ParserConfig, reference_date: NaiveDate) -> Self {
        Self {
            config,
            reference_date,
        }
    }

    /// Detect the structure of a sheet.
    ///
    /// A sheet without a header row yields a result with `header_row = None`
    /// and an `error`; it is never an `Err`.
    pub fn detect(&self, sheet: &Sheet) -> SheetDetection {
        let (media_type, media_channel) = detect_media(sheet.name());
        let mut detection = SheetDetection {
            media_type,
            media_channel,
            ..SheetDetection::default()
        };

        let Some(header_row) = self.find_header_row(sheet) else {
            warn!(
                "Sheet '{}': no market/channel header in the first {} rows",
                sheet.name(),
                self.config.header_scan_rows
            );
            detection.error = Some(format!(
                "header row with market and channel columns not found in the first {} rows",
                self.config.header_scan_rows
            ));
            return detection;
        };

        let day_row = self.find_day_row(sheet, header_row);
        let year = self.infer_year(sheet, header_row);
        let (column_map, mut date_columns) = map_columns(sheet, header_row);

        if let Some(day_row) = day_row {
            let (day_columns, warnings) = self.resolve_day_columns(sheet, header_row, day_row, year);
            date_columns.extend(day_columns);
            detection.warnings = warnings;
        }

        debug!(
            "Sheet '{}': header row {}, day row {:?}, year {}, {} roles, {} date columns",
            sheet.name(),
            header_row,
            day_row,
            year,
            column_map.len(),
            date_columns.len()
        );

        detection.header_row = Some(header_row);
        detection.day_row = day_row;
        detection.year_hint = Some(year);
        detection.column_map = column_map;
        detection.date_columns = date_columns;
        detection
    }

    /// First row holding both a market and a channel header cell.
    pub fn find_header_row(&self, sheet: &Sheet) -> Option<usize> {
        let last = sheet.max_row().min(self.config.header_scan_rows);

        (1..=last).find(|&row| {
            let mut has_market = false;
            let mut has_channel = false;
            for (_, cell) in sheet.row(row) {
                if cell.is_blank() {
                    continue;
                }
                let key = normalize(&cell.display_text());
                has_market |= is_market_header(&key);
                has_channel |= is_channel_header(&key);
            }
            has_market && has_channel
        })
    }

    /// Row near the header with the most day-of-month numbers, if it has
    /// enough of them to be a calendar axis. Ties go to the upper row.
    pub fn find_day_row(&self, sheet: &Sheet, header_row: usize) -> Option<usize> {
        let last = sheet.max_row().min(header_row + self.config.day_row_window);

        let mut best: Option<(usize, usize)> = None;
        for row in header_row..=last {
            let count = sheet
                .row(row)
                .filter(|(_, cell)| day_of_month(cell).is_some())
                .count();
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((row, count));
            }
        }

        best.filter(|&(_, count)| count >= self.config.min_day_cells)
            .map(|(row, _)| row)
    }

    /// Year named anywhere above (or in) the header row, else the reference year.
    pub fn infer_year(&self, sheet: &Sheet, header_row: usize) -> i32 {
        for row in 1..=header_row {
            for (_, cell) in sheet.row(row) {
                if cell.is_blank() {
                    continue;
                }
                if let Some(year) = year_from_text(&cell.display_text()) {
                    return year;
                }
            }
        }
        self.reference_date.year()
    }

    /// Turn day-row cells into dated columns.
    ///
    /// Each column takes the month of the nearest label at or left of it in
    /// the rows between header and day row. When the labelled months
    /// decrease, the labelled columns before that point belong to the
    /// previous year. Only the first decrease is honoured; further ones are
    /// reported as warnings. Columns without a label use the reference month
    /// and the sheet year.
    fn resolve_day_columns(
        &self,
        sheet: &Sheet,
        header_row: usize,
        day_row: usize,
        year: i32,
    ) -> (Vec<DateColumn>, Vec<String>) {
        let labels = column_months(sheet, header_row, day_row);
        let fallback = self.reference_date.month();

        let days: Vec<(usize, Option<u32>, u32)> = sheet
            .row(day_row)
            .filter_map(|(column, cell)| {
                let label = labels.get(column).copied().flatten();
                day_of_month(cell).map(|day| (column, label, day))
            })
            .collect();

        // Rollover is read from labelled months only.
        let labelled: Vec<u32> = days.iter().filter_map(|&(_, label, _)| label).collect();
        let mut rollover_at = None;
        let mut rollovers = 0;
        for (idx, pair) in labelled.windows(2).enumerate() {
            if pair[1] < pair[0] {
                rollovers += 1;
                if rollover_at.is_none() {
                    rollover_at = Some(idx + 1);
                }
            }
        }

        let mut warnings = Vec::new();
        if rollovers > 1 {
            warn!(
                "Sheet '{}': calendar crosses {} year boundaries, only the first is applied",
                sheet.name(),
                rollovers
            );
            warnings.push(format!(
                "calendar crosses {} year boundaries; only the first was applied",
                rollovers
            ));
        }

        let mut labelled_idx = 0;
        let mut date_columns = Vec::with_capacity(days.len());
        for &(column, label, day) in &days {
            let (month, column_year) = match label {
                Some(month) => {
                    let column_year = match rollover_at {
                        Some(at) if labelled_idx < at => year - 1,
                        _ => year,
                    };
                    labelled_idx += 1;
                    (month, column_year)
                }
                None => (fallback, year),
            };
            if let Some(date) = NaiveDate::from_ymd_opt(column_year, month, day) {
                date_columns.push(DateColumn { column, date });
            }
        }

        (date_columns, warnings)
    }
}

/// Roles and header-literal date columns of the header row.
///
/// When two header cells map to the same role, the rightmost one wins.
pub fn map_columns(sheet: &Sheet, header_row: usize) -> (BTreeMap<ColumnRole, usize>, Vec<DateColumn>) {
    let mut column_map = BTreeMap::new();
    let mut date_columns = Vec::new();

    for (column, cell) in sheet.row(header_row) {
        if cell.is_blank() {
            continue;
        }
        match role_for_header(&normalize(&cell.display_text())) {
            Some(role) => {
                column_map.insert(role, column);
            }
            None => {
                if let Some(date) = coerce_date(cell) {
                    date_columns.push(DateColumn { column, date });
                }
            }
        }
    }

    (column_map, date_columns)
}

/// Month label in force for each column (index = column), read from the
/// rows from the header row down to, not including, the day row. Lower rows
/// override upper ones.
fn column_months(sheet: &Sheet, header_row: usize, day_row: usize) -> Vec<Option<u32>> {
    let mut months = vec![None; sheet.max_column() + 1];

    for row in header_row..day_row {
        let mut current = None;
        for (column, cell) in sheet.row(row) {
            if !cell.is_blank() {
                if let Some(month) = month_from_text(&cell.display_text()) {
                    current = Some(month);
                }
            }
            if current.is_some() {
                months[column] = current;
            }
        }
    }

    months
}

fn day_of_month(cell: &Cell) -> Option<u32> {
    coerce_int(cell)
        .filter(|day| (1..=31).contains(day))
        .map(|day| day as u32)
}
