// src/data_analysis/response.rs

use log::warn;

use crate::constants::CUTOFF_OFFSET_DB;
use crate::data_analysis::gain::gain_db;
use crate::data_input::measurement::Measurement;
use crate::error::GainError;

/// A measurement together with its gain against the current input voltage.
///
/// Rows whose gain is undefined stay in the curve with the error attached,
/// so one bad reading never hides the rest of the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRow {
    pub measurement: Measurement,
    pub gain_db: Result<f64, GainError>,
}

impl DerivedRow {
    pub fn frequency_hz(&self) -> f64 {
        self.measurement.frequency_hz()
    }

    /// The gain if it is defined.
    pub fn valid_gain_db(&self) -> Option<f64> {
        self.gain_db.as_ref().ok().copied()
    }
}

/// Result of the -3 dB search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutoffEstimate {
    pub frequency_hz: f64,
    pub max_gain_db: f64,
    /// `max_gain_db - 3`, the level the reference line is drawn at.
    pub target_gain_db: f64,
}

/// Coarse shape of the measured response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Lowpass,
    Highpass,
    Indeterminate,
}

impl ResponseKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseKind::Lowpass => "Lowpass",
            ResponseKind::Highpass => "Highpass",
            ResponseKind::Indeterminate => "Indeterminate",
        }
    }
}

/// Computes the gain of every measurement, keeping the order of `measurements`.
///
/// Pass the frequency-sorted sequence from `Session::all_sorted`; the cutoff search
/// relies on that order.
pub fn compute_curve(measurements: &[Measurement], input_voltage_v: f64) -> Vec<DerivedRow> {
    measurements
        .iter()
        .map(|&measurement| {
            let gain = gain_db(input_voltage_v, measurement.output_voltage_v());
            if let Err(e) = &gain {
                warn!("No gain for {} Hz: {}", measurement.frequency_hz(), e);
            }
            DerivedRow {
                measurement,
                gain_db: gain,
            }
        })
        .collect()
}

/// Estimates the -3 dB frequency of a curve.
///
/// The target level is the maximum valid gain minus 3 dB. Gain is treated as the
/// independent variable and frequency is interpolated linearly between the two samples
/// bracketing the target. Valid samples are sorted by ascending frequency (stable, so
/// equal frequencies keep curve order), then adjacent samples are scanned and the
/// first bracketing segment wins, so the answer is only meaningful when gain is monotonic
/// over the sweep (a single-pole lowpass or highpass measured in ascending frequency).
/// If the target lies below every sample the frequency of the minimum-gain sample is
/// returned; nothing is extrapolated.
///
/// Rows with an undefined gain are skipped. Returns `None` if no row has a valid gain.
pub fn estimate_cutoff(curve: &[DerivedRow]) -> Option<CutoffEstimate> {
    let mut samples: Vec<(f64, f64)> = curve
        .iter()
        .filter_map(|row| row.valid_gain_db().map(|g| (g, row.frequency_hz())))
        .collect();
    // Ascending frequency whatever order the curve arrives in; stable for equal frequencies.
    samples.sort_by(|a, b| a.1.total_cmp(&b.1));

    let max_gain_db = samples
        .iter()
        .map(|&(g, _)| g)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_gain_db.is_finite() {
        return None;
    }
    let target_gain_db = max_gain_db - CUTOFF_OFFSET_DB;

    let frequency_hz = interpolate_crossing(&samples, target_gain_db)
        .or_else(|| min_gain_frequency(&samples))?;

    Some(CutoffEstimate {
        frequency_hz,
        max_gain_db,
        target_gain_db,
    })
}

/// Cutoff frequency only; see [`estimate_cutoff`].
pub fn estimate_cutoff_frequency(curve: &[DerivedRow]) -> Option<f64> {
    estimate_cutoff(curve).map(|estimate| estimate.frequency_hz)
}

/// Decides whether the sweep looks like a lowpass or a highpass by comparing the gain
/// at the lowest and highest measured frequency.
pub fn classify_response(curve: &[DerivedRow]) -> ResponseKind {
    let valid = curve
        .iter()
        .filter_map(|row| row.valid_gain_db().map(|g| (row.frequency_hz(), g)));

    let mut lowest: Option<(f64, f64)> = None;
    let mut highest: Option<(f64, f64)> = None;
    for (freq, gain) in valid {
        if lowest.map_or(true, |(f, _)| freq < f) {
            lowest = Some((freq, gain));
        }
        if highest.map_or(true, |(f, _)| freq > f) {
            highest = Some((freq, gain));
        }
    }

    match (lowest, highest) {
        (Some((f_lo, g_lo)), Some((f_hi, g_hi))) if f_hi > f_lo => {
            if g_lo - g_hi >= CUTOFF_OFFSET_DB {
                ResponseKind::Lowpass
            } else if g_hi - g_lo >= CUTOFF_OFFSET_DB {
                ResponseKind::Highpass
            } else {
                ResponseKind::Indeterminate
            }
        }
        _ => ResponseKind::Indeterminate,
    }
}

/// Linear interpolation of frequency at `target` over the first (gain, frequency)
/// segment whose gain interval contains it.
fn interpolate_crossing(samples: &[(f64, f64)], target: f64) -> Option<f64> {
    if let [(g, f)] = samples {
        return (*g == target).then_some(*f);
    }

    samples.windows(2).find_map(|pair| {
        let (g1, f1) = pair[0];
        let (g2, f2) = pair[1];
        if target < g1.min(g2) || target > g1.max(g2) {
            return None;
        }
        if g1 == g2 {
            return Some(f1);
        }
        let t = (target - g1) / (g2 - g1);
        Some(f1 + t * (f2 - f1))
    })
}

/// Frequency of the first sample holding the minimum gain.
fn min_gain_frequency(samples: &[(f64, f64)]) -> Option<f64> {
    samples
        .iter()
        .copied()
        .reduce(|best, s| if s.0 < best.0 { s } else { best })
        .map(|(_, f)| f)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(freq: f64, gain: f64) -> DerivedRow {
        DerivedRow {
            measurement: Measurement::new(freq, 1.0, None).unwrap(),
            gain_db: Ok(gain),
        }
    }

    fn invalid_row(freq: f64) -> DerivedRow {
        DerivedRow {
            measurement: Measurement::new(freq, 0.0, None).unwrap(),
            gain_db: Err(GainError::NonPositiveOutput(0.0)),
        }
    }

    #[test]
    fn test_exact_sample_at_target() {
        let curve = vec![row(1.0, 0.0), row(10.0, -3.0), row(100.0, -20.0)];
        let estimate = estimate_cutoff(&curve).unwrap();
        assert_eq!(estimate.max_gain_db, 0.0);
        assert_eq!(estimate.target_gain_db, -3.0);
        assert_eq!(estimate.frequency_hz, 10.0);
    }

    #[test]
    fn test_interpolates_between_samples() {
        // -3 dB sits halfway between 0 and -6 dB
        let curve = vec![row(100.0, 0.0), row(300.0, -6.0)];
        let freq = estimate_cutoff_frequency(&curve).unwrap();
        assert!((freq - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_to_min_gain_sample() {
        // Target -3 dB is below every sample
        let curve = vec![row(1.0, 0.0), row(10.0, -1.0), row(100.0, -2.0)];
        assert_eq!(estimate_cutoff_frequency(&curve), Some(100.0));
    }

    #[test]
    fn test_highpass_curve() {
        let curve = vec![row(10.0, -20.0), row(100.0, -6.0), row(1000.0, 0.0)];
        let freq = estimate_cutoff_frequency(&curve).unwrap();
        // Between 100 Hz (-6 dB) and 1000 Hz (0 dB), halfway in gain
        assert!((freq - 550.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample_returns_its_frequency() {
        let curve = vec![row(42.0, -1.5)];
        assert_eq!(estimate_cutoff_frequency(&curve), Some(42.0));
    }

    #[test]
    fn test_non_monotonic_uses_first_crossing() {
        let curve = vec![
            row(1.0, 0.0),
            row(2.0, -6.0),
            row(3.0, 0.0),
            row(4.0, -6.0),
        ];
        let freq = estimate_cutoff_frequency(&curve).unwrap();
        assert!((freq - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_unsorted_curve_is_sorted_before_interpolating() {
        let sorted = vec![row(1.0, 0.0), row(10.0, -3.0), row(100.0, -20.0)];
        let shuffled = vec![row(100.0, -20.0), row(1.0, 0.0), row(10.0, -3.0)];
        assert_eq!(estimate_cutoff_frequency(&sorted), Some(10.0));
        assert_eq!(estimate_cutoff_frequency(&shuffled), Some(10.0));

        let reversed = vec![row(300.0, -6.0), row(100.0, 0.0)];
        let freq = estimate_cutoff_frequency(&reversed).unwrap();
        assert!((freq - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_rows_are_skipped() {
        let curve = vec![row(1.0, 0.0), invalid_row(5.0), row(10.0, -6.0)];
        let freq = estimate_cutoff_frequency(&curve).unwrap();
        assert!((freq - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_valid_rows() {
        assert_eq!(estimate_cutoff(&[]), None);
        assert_eq!(estimate_cutoff(&[invalid_row(1.0), invalid_row(2.0)]), None);
    }

    #[test]
    fn test_compute_curve_preserves_order_and_flags_invalid() {
        let measurements = vec![
            Measurement::new(1.0, 1.0, None).unwrap(),
            Measurement::new(10.0, 0.0, None).unwrap(),
            Measurement::new(100.0, 0.1, None).unwrap(),
        ];
        let curve = compute_curve(&measurements, 1.0);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].valid_gain_db(), Some(0.0));
        assert_eq!(curve[1].gain_db, Err(GainError::NonPositiveOutput(0.0)));
        assert!((curve[2].valid_gain_db().unwrap() + 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_input_voltage_invalidates_every_row() {
        let measurements = vec![Measurement::new(1.0, 1.0, None).unwrap()];
        let curve = compute_curve(&measurements, 0.0);
        assert_eq!(curve[0].gain_db, Err(GainError::NonPositiveInput(0.0)));
        assert_eq!(estimate_cutoff(&curve), None);
    }

    #[test]
    fn test_classify_response() {
        let lowpass = vec![row(1.0, 0.0), row(100.0, -20.0)];
        let highpass = vec![row(1.0, -20.0), row(100.0, 0.0)];
        let flat = vec![row(1.0, 0.0), row(100.0, -1.0)];
        assert_eq!(classify_response(&lowpass), ResponseKind::Lowpass);
        assert_eq!(classify_response(&highpass), ResponseKind::Highpass);
        assert_eq!(classify_response(&flat), ResponseKind::Indeterminate);
        assert_eq!(classify_response(&[row(5.0, 0.0)]), ResponseKind::Indeterminate);
    }
}
