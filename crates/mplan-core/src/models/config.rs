//! Configuration structures for the ingestion pipeline.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MplanError, Result};
use crate::plan::rules::pieces::{DEFAULT_MAX_INLINE_CODE_LEN, DEFAULT_MAX_PIECE_CODE_LEN};

/// Main configuration for mplan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MplanConfig {
    /// Sheet detection and row extraction tuning.
    pub parser: ParserConfig,

    /// Output rendering options.
    pub output: OutputConfig,
}

/// Scan bounds and thresholds used by the sheet detector and row extractor.
///
/// The defaults are empirical tunings taken from real media plans. Every
/// bounded scan in the parser reads its limit from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Rows searched (from the top) for the MARKET/CHANNEL header row.
    pub header_scan_rows: usize,

    /// Rows below the header row searched for a days-of-month row.
    pub day_row_window: usize,

    /// Minimum number of 1..=31 cells for a row to count as a day row.
    pub min_day_cells: usize,

    /// Rows searched (from the top) for the piece lookup table header.
    pub piece_table_scan_rows: usize,

    /// Maximum body rows read from the piece lookup table.
    pub piece_table_max_rows: usize,

    /// Columns inspected when searching for the piece lookup table.
    pub piece_table_max_columns: usize,

    /// Longest token accepted from an explicit piece codes column.
    pub max_piece_code_len: usize,

    /// Longest alphabetic date cell read as an inline piece code.
    pub max_inline_code_len: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 200,
            day_row_window: 12,
            min_day_cells: 7,
            piece_table_scan_rows: 120,
            piece_table_max_rows: 80,
            piece_table_max_columns: 200,
            max_piece_code_len: DEFAULT_MAX_PIECE_CODE_LEN,
            max_inline_code_len: DEFAULT_MAX_INLINE_CODE_LEN,
        }
    }
}

/// Output rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty_json: bool,

    /// Include per-sheet detection diagnostics in text output.
    pub include_detection: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty_json: false,
            include_detection: true,
        }
    }
}

impl MplanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MplanError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| MplanError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: MplanConfig =
            serde_json::from_str(r#"{"parser": {"header_scan_rows": 50}}"#).unwrap();

        assert_eq!(config.parser.header_scan_rows, 50);
        assert_eq!(config.parser.day_row_window, 12);
        assert_eq!(config.parser.min_day_cells, 7);
        assert_eq!(config.parser.max_piece_code_len, 12);
        assert_eq!(config.parser.max_inline_code_len, 2);
        assert!(config.output.include_detection);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("mplan-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let mut config = MplanConfig::default();
        config.parser.piece_table_max_rows = 40;
        config.output.pretty_json = true;
        config.save(&path).unwrap();

        let loaded = MplanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.parser, config.parser);
        assert!(loaded.output.pretty_json);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = std::env::temp_dir().join(format!("mplan-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(MplanConfig::from_file(&path), Err(MplanError::Config(_))));
        assert!(matches!(
            MplanConfig::from_file(&dir.join("missing.json")),
            Err(MplanError::Io(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
