//! Placement row extraction from a detected sheet.

use chrono::NaiveDate;
use tracing::trace;

use crate::models::config::ParserConfig;
use crate::models::plan::{ColumnRole, ParsedPlacementRow, PlacementFields, SheetDetection};
use crate::sheet::{Cell, Sheet};

use super::rules::{
    channels::is_section_label,
    dates::coerce_datetime,
    numbers::coerce_int,
    pieces::{inline_piece_code, split_piece_codes},
};

/// Last non-blank value per categorical field, scoped to one sheet.
#[derive(Debug, Default)]
struct FillCache {
    market: String,
    channel: String,
    program: String,
    property_text: String,
    format_text: String,
}

impl FillCache {
    /// Fill blank categorical fields from the cache and remember the
    /// non-blank ones.
    fn apply(&mut self, fields: &mut PlacementFields) {
        fill(&mut self.market, &mut fields.market);
        fill(&mut self.channel, &mut fields.channel);
        fill(&mut self.program, &mut fields.program);
        fill(&mut self.property_text, &mut fields.property_text);
        fill(&mut self.format_text, &mut fields.format_text);
    }
}

fn fill(last_seen: &mut String, value: &mut String) {
    if value.is_empty() {
        value.clone_from(last_seen);
    } else {
        last_seen.clone_from(value);
    }
}

/// Rows of one sheet, as extracted.
#[derive(Debug, Default)]
pub struct SheetRows {
    /// Data rows scanned, blank ones included.
    pub scanned: usize,
    /// Rows that survived suppression.
    pub rows: Vec<ParsedPlacementRow>,
}

/// Extracts placement rows from a sheet whose structure has been detected.
pub struct RowExtractor<'a> {
    config: &'a ParserConfig,
}

impl<'a> RowExtractor<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Extract every placement row below the header (or day) row.
    ///
    /// Returns nothing for a sheet without a header row.
    pub fn extract(&self, sheet: &Sheet, detection: &SheetDetection) -> SheetRows {
        let mut out = SheetRows::default();
        let Some(first_row) = detection.day_row.or(detection.header_row).map(|r| r + 1) else {
            return out;
        };

        let mut cache = FillCache::default();
        for row in first_row..=sheet.max_row() {
            out.scanned += 1;
            if sheet.is_row_blank(row) {
                continue;
            }
            if let Some(parsed) = self.extract_row(sheet, detection, row, &mut cache) {
                out.rows.push(parsed);
            }
        }

        out
    }

    fn extract_row(
        &self,
        sheet: &Sheet,
        detection: &SheetDetection,
        row: usize,
        cache: &mut FillCache,
    ) -> Option<ParsedPlacementRow> {
        let cell = |role: ColumnRole| detection.column(role).map(|column| sheet.cell(row, column));
        let text = |role: ColumnRole| cell(role).map(Cell::trimmed_text).unwrap_or_default();

        let mut fields = PlacementFields {
            market: text(ColumnRole::Market),
            channel: text(ColumnRole::Channel),
            program: text(ColumnRole::Program),
            property_text: text(ColumnRole::PropertyText),
            format_text: text(ColumnRole::FormatText),
            ..PlacementFields::default()
        };

        let is_section = is_section_label(&fields.market);
        if is_section {
            fields.market.clear();
        }
        cache.apply(&mut fields);

        fields.duration_sec = cell(ColumnRole::DurationSec).and_then(coerce_int);
        fields.external_ref = text(ColumnRole::ExternalRef);
        fields.start_date = cell(ColumnRole::StartDate).and_then(coerce_datetime);
        fields.end_date = cell(ColumnRole::EndDate).and_then(coerce_datetime);

        let mut piece_codes = cell(ColumnRole::PieceCodes)
            .map(|codes| split_piece_codes(&codes.display_text(), self.config.max_piece_code_len))
            .unwrap_or_default();

        let mut days: Vec<(NaiveDate, u32)> = Vec::new();
        for date_column in &detection.date_columns {
            let value = sheet.cell(row, date_column.column);
            if value.is_blank() {
                continue;
            }
            if let Some(code) = inline_piece_code(value, self.config.max_inline_code_len) {
                if !piece_codes.contains(&code) {
                    piece_codes.push(code);
                }
                days.push((date_column.date, 1));
            } else if let Some(count) = coerce_int(value).filter(|n| *n > 0) {
                days.push((date_column.date, u32::try_from(count).unwrap_or(u32::MAX)));
            }
        }

        if fields.is_blank() && days.is_empty() && piece_codes.is_empty() {
            trace!("Sheet '{}' row {}: no placement data", sheet.name(), row);
            return None;
        }
        if is_section && days.is_empty() && fields.channel.is_empty() && fields.program.is_empty() {
            trace!("Sheet '{}' row {}: section label", sheet.name(), row);
            return None;
        }

        Some(ParsedPlacementRow {
            sheet: sheet.name().to_string(),
            row,
            media_type: detection.media_type,
            media_channel: detection.media_channel,
            fields,
            days,
            piece_codes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::detector::SheetDetector;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn extract(sheet: &Sheet) -> SheetRows {
        let config = ParserConfig::default();
        let detection = SheetDetector::new(&config, date(2024, 1, 1)).detect(sheet);
        RowExtractor::new(&config).extract(sheet, &detection)
    }

    /// Header in row 1 with MARKET, CHANNEL, PROGRAM and three literal dates.
    fn calendar_sheet() -> Sheet {
        Sheet::new("TV Aberta").with_row(
            1,
            ["Market", "Channel", "Programa", "01/03/2024", "02/03/2024", "03/03/2024"],
        )
    }

    #[test]
    fn test_forward_fill() {
        let sheet = calendar_sheet()
            .with_row(2, ["SP", "Globo"])
            .with_row(3, ["", "SBT"])
            .with_row(4, ["RJ", ""])
            .with_row(5, ["", "Record"]);

        let markets: Vec<String> = extract(&sheet)
            .rows
            .into_iter()
            .map(|r| r.fields.market)
            .collect();

        assert_eq!(markets, vec!["SP", "SP", "RJ", "RJ"]);
    }

    #[test]
    fn test_forward_fill_does_not_leak_between_calls() {
        let first = calendar_sheet().with_row(2, ["SP", "Globo"]);
        let second = calendar_sheet().with_row(2, ["", "Globo"]);

        assert_eq!(extract(&first).rows[0].fields.market, "SP");
        assert_eq!(extract(&second).rows[0].fields.market, "");
    }

    #[test]
    fn test_inline_codes_and_counts() {
        let sheet = calendar_sheet().with_row(2, ["SP", "Globo", "Jornal Nacional", "A", "12", "ABC"]);

        let rows = extract(&sheet).rows;

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].days,
            vec![(date(2024, 3, 1), 1), (date(2024, 3, 2), 12)]
        );
        assert_eq!(rows[0].piece_codes, vec!["A"]);
        assert_eq!(rows[0].total_insertions(), 13);
    }

    #[test]
    fn test_non_positive_counts_are_dropped() {
        let sheet = calendar_sheet()
            .with_row(2, ["SP", "Globo", "", "0", "-3", "2,5"]);

        let rows = extract(&sheet).rows;

        assert_eq!(rows[0].days, vec![(date(2024, 3, 3), 3)]);
        assert!(rows[0].piece_codes.is_empty());
    }

    #[test]
    fn test_explicit_and_inline_codes_merge() {
        let sheet = Sheet::new("Rádio")
            .with_row(1, ["Praça", "Canal", "Peça", "05/02/2024"])
            .with_row(2, ["POA", "Gaúcha", "b, A", "b"])
            .with_row(3, ["POA", "Gaúcha", "", "C"]);

        let rows = extract(&sheet).rows;

        assert_eq!(rows[0].piece_codes, vec!["A", "B"]);
        assert_eq!(rows[1].piece_codes, vec!["C"]);
        assert_eq!(rows[1].days, vec![(date(2024, 2, 5), 1)]);
    }

    #[test]
    fn test_configured_code_lengths() {
        let config = ParserConfig {
            max_piece_code_len: 3,
            max_inline_code_len: 3,
            ..ParserConfig::default()
        };
        let sheet = Sheet::new("Rádio")
            .with_row(1, ["Praça", "Canal", "Peça", "05/02/2024"])
            .with_row(2, ["POA", "Gaúcha", "VT30, RADIO", "abc"]);

        let detection = SheetDetector::new(&config, date(2024, 1, 1)).detect(&sheet);
        let rows = RowExtractor::new(&config).extract(&sheet, &detection).rows;

        assert_eq!(rows[0].piece_codes, vec!["ABC"]);
        assert_eq!(rows[0].days, vec![(date(2024, 2, 5), 1)]);
    }

    #[test]
    fn test_row_suppression() {
        let sheet = Sheet::new("TV")
            .with_row(1, ["Market", "Channel", "Total"])
            .with_row(2, ["", "", "999"])
            .with_row(3, ["", "Globo"]);

        let out = extract(&sheet);

        assert_eq!(out.scanned, 2);
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].row, 3);
        assert_eq!(out.rows[0].fields.channel, "Globo");
        assert!(out.rows[0].days.is_empty());
    }

    #[test]
    fn test_section_label_rows() {
        let sheet = calendar_sheet()
            .with_row(2, ["TT PAY TV"])
            .with_row(3, ["Curitiba", "RPC", "", "1"])
            .with_row(4, ["OPEN TV", "", "", "2"]);

        let rows = extract(&sheet).rows;

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.market, "Curitiba");
        // the labelled row keeps its days and inherits the previous market
        assert_eq!(rows[1].row, 4);
        assert_eq!(rows[1].fields.market, "Curitiba");
        assert_eq!(rows[1].fields.channel, "RPC");
        assert_eq!(rows[1].days, vec![(date(2024, 3, 1), 2)]);
    }

    #[test]
    fn test_section_label_without_data_is_dropped() {
        let config = ParserConfig::default();
        let sheet = Sheet::new("TV")
            .with_row(1, ["Market", "Channel", "Formato"])
            .with_row(2, ["TT PAY TV", "", "30s"]);
        let detection = SheetDetector::new(&config, date(2024, 1, 1)).detect(&sheet);

        let out = RowExtractor::new(&config).extract(&sheet, &detection);

        assert_eq!(out.scanned, 1);
        assert!(out.rows.is_empty());
    }

    #[test]
    fn test_typed_fields() {
        let sheet = Sheet::new("TV")
            .with_row(
                1,
                ["Market", "Channel", "Duração", "ID", "Início", "Fim", "Janela"],
            )
            .with_row(2, ["SP", "Globo", "30", " L-01 ", "01/02/2024", "2024-02-10 23:59", "Noite"])
            .with_cell(3, 2, "Globo")
            .with_cell(3, 3, "trinta")
            .with_cell(3, 5, date(2024, 3, 1));

        let rows = extract(&sheet).rows;

        assert_eq!(rows[0].fields.duration_sec, Some(30));
        assert_eq!(rows[0].fields.external_ref, "L-01");
        assert_eq!(rows[0].fields.property_text, "Noite");
        assert_eq!(rows[0].fields.start_date, Some(date(2024, 2, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert_eq!(rows[0].fields.end_date, Some(date(2024, 2, 10).and_hms_opt(23, 59, 0).unwrap()));

        assert_eq!(rows[1].fields.duration_sec, None);
        assert_eq!(rows[1].fields.property_text, "Noite");
        assert_eq!(rows[1].fields.external_ref, "");
        assert_eq!(rows[1].fields.start_date, Some(date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn test_undetected_sheet_yields_nothing() {
        let config = ParserConfig::default();
        let sheet = Sheet::new("Notas").with_row(1, ["Observações"]).with_row(2, ["x"]);
        let detection = SheetDetector::new(&config, date(2024, 1, 1)).detect(&sheet);

        let out = RowExtractor::new(&config).extract(&sheet, &detection);

        assert_eq!(out.scanned, 0);
        assert!(out.rows.is_empty());
    }
}
