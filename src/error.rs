// src/error.rs

use std::path::PathBuf;

/// Rejections raised while building a `Measurement`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasurementError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },
    #[error("frequency must be positive, got {0} Hz")]
    NonPositiveFrequency(f64),
    #[error("output voltage must not be negative, got {0} V")]
    NegativeVoltage(f64),
    #[error("phase shift must lie within [-180, 180] degrees, got {0}")]
    PhaseOutOfRange(f64),
}

/// Domain errors of the gain transform: log10 is undefined for non-positive ratios.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GainError {
    #[error("input voltage must be positive to compute gain, got {0} V")]
    NonPositiveInput(f64),
    #[error("output voltage must be positive to compute gain, got {0} V")]
    NonPositiveOutput(f64),
    #[error("gain is not a finite number for {output_v} V / {input_v} V")]
    NotFinite { input_v: f64, output_v: f64 },
}

/// Failures of the CSV and PNG exports (and of the CSV import).
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: the session has no measurements")]
    EmptySession,
    #[error("invalid file name '{0}': names must not be empty or contain path separators")]
    InvalidFileName(String),
    #[error("could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error for {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} of {path}: {source}")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: MeasurementError,
    },
    #[error("no valid gain values to plot")]
    NoValidGain,
    #[error("could not render plot {path}: {message}")]
    Plot { path: PathBuf, message: String },
}

/// Problems with a line typed into the interactive form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}' (type 'help' for the list)")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("'{value}' is not a valid number for {field}")]
    NotANumber { field: &'static str, value: String },
    #[error("{field} must lie within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },
    #[error("unknown phase display '{0}' (expected hidden, overlay or separate)")]
    UnknownPhaseDisplay(String),
}

// src/error.rs
