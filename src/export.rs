// src/export.rs

use log::info;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CSV_DIR_NAME, PNG_DIR_NAME};
use crate::data_analysis::response::{compute_curve, estimate_cutoff};
use crate::data_input::csv_io::write_csv;
use crate::data_input::session::Session;
use crate::error::ExportError;
use crate::plot_functions::plot_bode::{plot_bode, PhaseDisplay};

/// Where exports land: `<base>/saved_png` and `<base>/saved_csv`.
#[derive(Debug, Clone)]
pub struct ExportDirs {
    pub png_dir: PathBuf,
    pub csv_dir: PathBuf,
}

impl ExportDirs {
    pub fn under(base: &Path) -> Self {
        Self {
            png_dir: base.join(PNG_DIR_NAME),
            csv_dir: base.join(CSV_DIR_NAME),
        }
    }
}

impl Default for ExportDirs {
    fn default() -> Self {
        Self::under(Path::new("."))
    }
}

/// Writes the frequency-sorted session, gains included, to `<csv_dir>/<file_name>`.
///
/// A name without an extension gets `.csv`. Independent of [`save_plot`]: a failure here
/// leaves any earlier plot export and the session untouched.
pub fn save_csv(
    session: &Session,
    input_voltage_v: f64,
    dirs: &ExportDirs,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    if session.is_empty() {
        return Err(ExportError::EmptySession);
    }
    let file_name = checked_file_name(file_name, "csv")?;
    ensure_dir(&dirs.csv_dir)?;

    let curve = compute_curve(&session.all_sorted(), input_voltage_v);
    let path = dirs.csv_dir.join(file_name);
    write_csv(&path, &curve)?;
    info!("Saved {} measurements to {}", curve.len(), path.display());
    Ok(path)
}

/// Renders the Bode diagram of the session to `<png_dir>/<file_name>.png`.
pub fn save_plot(
    session: &Session,
    input_voltage_v: f64,
    phase_display: PhaseDisplay,
    dirs: &ExportDirs,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    if session.is_empty() {
        return Err(ExportError::EmptySession);
    }
    let file_name = checked_file_name(file_name, "png")?;

    let curve = compute_curve(&session.all_sorted(), input_voltage_v);
    let cutoff = estimate_cutoff(&curve).ok_or(ExportError::NoValidGain)?;

    ensure_dir(&dirs.png_dir)?;
    let path = dirs.png_dir.join(file_name);
    plot_bode(&path, &curve, &cutoff, phase_display).map_err(|e| ExportError::Plot {
        path: path.clone(),
        message: e.to_string(),
    })?;
    info!("Saved plot to {}", path.display());
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Validates a user-supplied file name and appends `extension` when the name has none
/// (for png, whenever it does not already end in `.png`).
fn checked_file_name(name: &str, extension: &str) -> Result<String, ExportError> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains(|c: char| c == '/' || c == '\\') {
        return Err(ExportError::InvalidFileName(name.to_string()));
    }

    let current = Path::new(name).extension().and_then(|e| e.to_str());
    let keep = match current {
        Some(ext) if extension == "png" => ext.eq_ignore_ascii_case("png"),
        Some(_) => true,
        None => false,
    };
    if keep {
        Ok(name.to_string())
    } else {
        Ok(format!("{}.{}", name, extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_input::measurement::Measurement;

    fn sample_session() -> Session {
        let mut session = Session::new();
        session.append(Measurement::new(100.0, 0.1, None).unwrap());
        session.append(Measurement::new(1.0, 1.0, None).unwrap());
        session
    }

    #[test]
    fn test_checked_file_name() {
        assert_eq!(checked_file_name("combined_plot", "png").unwrap(), "combined_plot.png");
        assert_eq!(checked_file_name("a.png", "png").unwrap(), "a.png");
        assert_eq!(checked_file_name("run.v2", "png").unwrap(), "run.v2.png");
        assert_eq!(checked_file_name("measurements.csv", "csv").unwrap(), "measurements.csv");
        assert_eq!(checked_file_name("sweep", "csv").unwrap(), "sweep.csv");
        assert!(checked_file_name("../evil", "csv").is_err());
        assert!(checked_file_name("  ", "csv").is_err());
    }

    #[test]
    fn test_empty_session_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = ExportDirs::under(dir.path());
        let session = Session::new();

        assert!(matches!(
            save_csv(&session, 1.0, &dirs, "x.csv"),
            Err(ExportError::EmptySession)
        ));
        assert!(matches!(
            save_plot(&session, 1.0, PhaseDisplay::Hidden, &dirs, "x"),
            Err(ExportError::EmptySession)
        ));
        assert!(!dirs.csv_dir.exists());
        assert!(!dirs.png_dir.exists());
    }

    #[test]
    fn test_save_csv_creates_directory_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = ExportDirs::under(dir.path());

        let path = save_csv(&sample_session(), 1.0, &dirs, "sweep").unwrap();
        assert_eq!(path, dirs.csv_dir.join("sweep.csv"));

        let text = fs::read_to_string(&path).unwrap();
        let first_data_line = text.lines().nth(1).unwrap();
        assert!(first_data_line.starts_with("1.0,"));
    }

    #[test]
    fn test_plot_needs_a_valid_gain() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = ExportDirs::under(dir.path());

        // Zero input voltage leaves every gain undefined
        assert!(matches!(
            save_plot(&sample_session(), 0.0, PhaseDisplay::Hidden, &dirs, "p"),
            Err(ExportError::NoValidGain)
        ));
    }
}
