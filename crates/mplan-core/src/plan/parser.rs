//! Workbook-level parsing: detection, extraction and piece merging per sheet.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::config::ParserConfig;
use crate::models::plan::MediaPlan;
use crate::sheet::{Workbook, WorkbookReader};

use super::detector::SheetDetector;
use super::extractor::RowExtractor;
use super::pieces::{read_piece_table, PieceCatalog};

/// Trait for media plan parsing.
pub trait PlanParser {
    /// Parse an already loaded workbook. Never fails: sheet-level problems
    /// are reported in [`MediaPlan::detected`].
    fn parse(&self, workbook: &Workbook) -> MediaPlan;
}

/// Heuristic parser for advertising media plan workbooks.
///
/// The parser itself is immutable. Forward-fill caches and the piece merge
/// map live only for the duration of one [`PlanParser::parse`] call, so a
/// single parser can be shared between threads.
#[derive(Debug, Clone)]
pub struct MediaPlanParser {
    config: ParserConfig,
    reference_date: Option<NaiveDate>,
}

impl MediaPlanParser {
    /// Create a parser with default thresholds, using today as reference date.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
            reference_date: None,
        }
    }

    /// Use custom scan bounds and thresholds.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Fix the date used for the default year and month.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Load a workbook file with `reader` and parse it.
    pub fn parse_path<R: WorkbookReader>(&self, reader: &R, path: &Path) -> Result<MediaPlan> {
        let workbook = reader.read_path(path)?;
        info!("Parsing {} ({} sheets)", path.display(), workbook.len());
        Ok(self.parse(&workbook))
    }

    /// Load a workbook from bytes with `reader` and parse it.
    pub fn parse_bytes<R: WorkbookReader>(&self, reader: &R, data: &[u8]) -> Result<MediaPlan> {
        let workbook = reader.read_bytes(data)?;
        info!("Parsing {} byte workbook ({} sheets)", data.len(), workbook.len());
        Ok(self.parse(&workbook))
    }

    fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for MediaPlanParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanParser for MediaPlanParser {
    fn parse(&self, workbook: &Workbook) -> MediaPlan {
        let start = Instant::now();
        let detector = SheetDetector::new(&self.config, self.reference_date());
        let extractor = RowExtractor::new(&self.config);

        let mut plan = MediaPlan {
            sheets: workbook.sheets().iter().map(|s| s.name().to_string()).collect(),
            ..MediaPlan::default()
        };
        let mut detected = BTreeMap::new();
        let mut catalog = PieceCatalog::new();

        for sheet in workbook.sheets() {
            catalog.extend(read_piece_table(sheet, &self.config));

            let detection = detector.detect(sheet);
            let extracted = extractor.extract(sheet, &detection);
            plan.total_rows += extracted.scanned;
            plan.rows.extend(extracted.rows);
            detected.insert(sheet.name().to_string(), detection);
        }

        if catalog.is_empty() {
            debug!("No piece lookup table found");
        }
        let piece_count = catalog.len();
        plan.detected = detected;
        plan.pieces = catalog.into_entries();

        debug!(
            "Parsed {} placement rows and {} pieces from {} sheets in {} ms",
            plan.rows.len(),
            piece_count,
            plan.sheets.len(),
            start.elapsed().as_millis()
        );

        plan
    }
}
