//! Error types for the mplan-core library.

use thiserror::Error;

/// Main error type for the mplan library.
#[derive(Error, Debug)]
pub enum MplanError {
    /// Workbook could not be loaded.
    #[error("workbook error: {0}")]
    Workbook(#[from] WorkbookError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while opening or decoding a workbook.
///
/// These are the only hard failures of a parse: once a workbook is loaded,
/// problems inside individual sheets are reported as detection diagnostics.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// The file is corrupt, truncated or not a spreadsheet.
    #[error("failed to open workbook: {0}")]
    Open(String),

    /// The file extension is not a supported spreadsheet format.
    #[error("unsupported workbook format: {0}")]
    UnsupportedFormat(String),

    /// A single sheet could not be decoded.
    #[error("failed to read sheet {name}: {reason}")]
    Sheet { name: String, reason: String },

    /// The workbook contains no sheets.
    #[error("workbook has no sheets")]
    Empty,
}

/// Result type for the mplan library.
pub type Result<T> = std::result::Result<T, MplanError>;
