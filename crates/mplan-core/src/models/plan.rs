//! Media plan data models produced by the ingestion engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whether a placement runs on online or offline media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Online,
    Offline,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self::Online
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Media channel a sheet (and every placement on it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaChannel {
    /// Broadcast (free-to-air) television.
    TvAberta,
    /// Cable / pay television.
    Paytv,
    Radio,
    /// Out-of-home.
    Ooh,
    /// Newspaper.
    Jornal,
    Meta,
    Google,
    Youtube,
    Display,
    Search,
    Social,
    Other,
}

impl MediaChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TvAberta => "tv_aberta",
            Self::Paytv => "paytv",
            Self::Radio => "radio",
            Self::Ooh => "ooh",
            Self::Jornal => "jornal",
            Self::Meta => "meta",
            Self::Google => "google",
            Self::Youtube => "youtube",
            Self::Display => "display",
            Self::Search => "search",
            Self::Social => "social",
            Self::Other => "other",
        }
    }

    /// Media type implied by the channel.
    pub fn media_type(&self) -> MediaType {
        match self {
            Self::TvAberta | Self::Paytv | Self::Radio | Self::Ooh | Self::Jornal => {
                MediaType::Offline
            }
            _ => MediaType::Online,
        }
    }
}

impl Default for MediaChannel {
    fn default() -> Self {
        Self::Other
    }
}

impl fmt::Display for MediaChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role of a header column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Market,
    Channel,
    Program,
    PropertyText,
    FormatText,
    DurationSec,
    ExternalRef,
    StartDate,
    EndDate,
    PieceCodes,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Market => "market",
            Self::Channel => "channel",
            Self::Program => "program",
            Self::PropertyText => "property_text",
            Self::FormatText => "format_text",
            Self::DurationSec => "duration_sec",
            Self::ExternalRef => "external_ref",
            Self::StartDate => "start_date",
            Self::EndDate => "end_date",
            Self::PieceCodes => "piece_codes",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column of the sheet that carries insertions for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumn {
    /// 1-based column index.
    pub column: usize,
    /// Calendar date the column stands for.
    pub date: NaiveDate,
}

/// Per-sheet structure detection diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDetection {
    /// Media type inferred from the sheet title.
    pub media_type: MediaType,

    /// Media channel inferred from the sheet title.
    pub media_channel: MediaChannel,

    /// 1-based header row; `None` when no header was found.
    pub header_row: Option<usize>,

    /// 1-based days-of-month row, when the sheet has a daily calendar.
    pub day_row: Option<usize>,

    /// Year used to resolve day-row dates.
    pub year_hint: Option<i32>,

    /// Column index (1-based) per semantic role.
    pub column_map: BTreeMap<ColumnRole, usize>,

    /// Date columns in discovery order.
    pub date_columns: Vec<DateColumn>,

    /// Human readable reason when header detection failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Non-fatal findings (e.g. unsupported calendar shapes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl SheetDetection {
    /// Whether a header row was found and rows can be extracted.
    pub fn is_detected(&self) -> bool {
        self.header_row.is_some()
    }

    /// Column mapped to a role, if any.
    pub fn column(&self, role: ColumnRole) -> Option<usize> {
        self.column_map.get(&role).copied()
    }
}

/// Tracked fields of a placement line. Empty strings mean "not present".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementFields {
    pub market: String,
    pub channel: String,
    pub program: String,
    pub property_text: String,
    pub format_text: String,
    pub duration_sec: Option<i64>,
    pub external_ref: String,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

impl PlacementFields {
    /// True when every text field that identifies a placement is blank.
    pub fn is_blank(&self) -> bool {
        [
            &self.market,
            &self.channel,
            &self.program,
            &self.property_text,
            &self.format_text,
            &self.external_ref,
        ]
        .iter()
        .all(|v| v.trim().is_empty())
    }
}

/// One placement line extracted from a data row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPlacementRow {
    /// Sheet the row came from.
    pub sheet: String,

    /// 1-based source row.
    pub row: usize,

    pub media_type: MediaType,
    pub media_channel: MediaChannel,

    pub fields: PlacementFields,

    /// `(date, insertions)` pairs, insertions always positive.
    pub days: Vec<(NaiveDate, u32)>,

    /// Creative piece codes referenced by the row, without duplicates.
    pub piece_codes: Vec<String>,
}

impl ParsedPlacementRow {
    /// Sum of insertions over all days.
    pub fn total_insertions(&self) -> u64 {
        self.days.iter().map(|(_, n)| u64::from(*n)).sum()
    }
}

/// An entry of a sheet's creative piece lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceEntry {
    /// Uppercased piece code.
    pub code: String,
    pub title: String,
    pub duration_sec: Option<i64>,
}

/// Everything extracted from one workbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaPlan {
    /// Sheet names in workbook order.
    pub sheets: Vec<String>,

    /// Rows scanned below the header (or day) row, blank rows included.
    pub total_rows: usize,

    /// Detection diagnostics per sheet name.
    pub detected: BTreeMap<String, SheetDetection>,

    /// Placement rows in sheet order, then row order.
    pub rows: Vec<ParsedPlacementRow>,

    /// Piece lookup entries merged across sheets.
    pub pieces: Vec<PieceEntry>,
}

impl MediaPlan {
    /// Detection diagnostics for a sheet.
    pub fn detection(&self, sheet: &str) -> Option<&SheetDetection> {
        self.detected.get(sheet)
    }

    /// Human readable problems worth showing to whoever uploaded the plan.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        for sheet in &self.sheets {
            let Some(detection) = self.detected.get(sheet) else {
                continue;
            };
            if let Some(error) = &detection.error {
                warnings.push(format!("{}: {}", sheet, error));
            }
            for warning in &detection.warnings {
                warnings.push(format!("{}: {}", sheet, warning));
            }
        }

        if self.rows.is_empty() {
            warnings.push("no valid placement rows detected".to_string());
        }

        warnings
    }

    /// Aggregate counts over the extracted rows.
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary {
            placement_lines: self.rows.len(),
            ..PlanSummary::default()
        };

        let mut codes = BTreeSet::new();
        for row in &self.rows {
            summary.placement_days += row.days.len();
            summary.total_insertions += row.total_insertions();
            *summary.lines_by_channel.entry(row.media_channel).or_insert(0) += 1;
            codes.extend(row.piece_codes.iter().cloned());
        }
        summary.piece_codes = codes.into_iter().collect();

        summary
    }
}

/// Counts describing an extracted plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub placement_lines: usize,
    pub placement_days: usize,
    pub total_insertions: u64,
    /// Distinct piece codes referenced by placement rows, sorted.
    pub piece_codes: Vec<String>,
    pub lines_by_channel: BTreeMap<MediaChannel, usize>,
}
