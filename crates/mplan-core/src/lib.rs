//! Core library for media plan spreadsheet ingestion.
//!
//! This crate provides:
//! - A typed cell/workbook model and a calamine-backed workbook loader
//! - Sheet structure detection (header row, day-of-month row, year, column roles)
//! - Placement row extraction with forward fill and inline piece codes
//! - Cell coercers for integers, decimals, dates and piece codes
//! - Helpers for creative asset files

pub mod assets;
pub mod error;
pub mod models;
pub mod plan;
pub mod sheet;
pub mod text;

pub use error::{MplanError, Result, WorkbookError};
pub use models::config::{MplanConfig, OutputConfig, ParserConfig};
pub use models::plan::{
    ColumnRole, DateColumn, MediaChannel, MediaPlan, MediaType, ParsedPlacementRow, PieceEntry,
    PlacementFields, PlanSummary, SheetDetection,
};
pub use plan::{MediaPlanParser, PlanParser};
pub use sheet::{Cell, Sheet, Workbook, WorkbookReader};
#[cfg(feature = "native")]
pub use sheet::CalamineReader;
pub use text::normalize;
