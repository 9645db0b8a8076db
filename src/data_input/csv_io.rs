// src/data_input/csv_io.rs

use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::data_analysis::response::DerivedRow;
use crate::data_input::measurement::Measurement;
use crate::error::ExportError;

/// One CSV line. Column names match the headers shown in the measurement table.
/// Empty `Phase Shift` means no phase was recorded; empty `Gain (dB)` means the gain
/// was undefined for that row.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Frequency")]
    frequency: f64,
    #[serde(rename = "Output Voltage")]
    output_voltage: f64,
    #[serde(rename = "Phase Shift", default)]
    phase_shift: Option<f64>,
    #[serde(rename = "Gain (dB)", default)]
    gain_db: Option<f64>,
}

impl From<&DerivedRow> for CsvRow {
    fn from(row: &DerivedRow) -> Self {
        Self {
            frequency: row.measurement.frequency_hz(),
            output_voltage: row.measurement.output_voltage_v(),
            phase_shift: row.measurement.phase_shift_deg(),
            gain_db: row.valid_gain_db(),
        }
    }
}

/// Writes the curve to `path`, one row per measurement, in the order given.
///
/// The file is flushed and closed before returning.
pub fn write_csv(path: &Path, curve: &[DerivedRow]) -> Result<(), ExportError> {
    let csv_err = |source: csv::Error| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(csv_err)?;
    for row in curve {
        writer.serialize(CsvRow::from(row)).map_err(csv_err)?;
    }
    writer.flush().map_err(|e| csv_err(e.into()))?;
    Ok(())
}

/// Reads measurements back from a CSV written by [`write_csv`].
///
/// The gain column is ignored (it depends on the input voltage and is recomputed).
/// Every row is re-validated; the first invalid row aborts the read.
pub fn read_csv(path: &Path) -> Result<Vec<Measurement>, ExportError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let mut measurements = Vec::new();
    for (row_index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(|source| ExportError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let measurement = Measurement::new(row.frequency, row.output_voltage, row.phase_shift)
            .map_err(|source| ExportError::InvalidRow {
                path: path.to_path_buf(),
                row: row_index + 1,
                source,
            })?;
        measurements.push(measurement);
    }
    Ok(measurements)
}
