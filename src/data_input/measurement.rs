// src/data_input/measurement.rs

use crate::error::MeasurementError;

/// One manually recorded point of a frequency-response sweep.
///
/// Built only through [`Measurement::new`], which rejects values that would make the
/// record meaningless (non-positive frequency, negative voltage, phase outside ±180°).
/// Fields are private so a recorded measurement cannot change afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    frequency_hz: f64,
    output_voltage_v: f64,
    phase_shift_deg: Option<f64>,
}

impl Measurement {
    pub fn new(
        frequency_hz: f64,
        output_voltage_v: f64,
        phase_shift_deg: Option<f64>,
    ) -> Result<Self, MeasurementError> {
        if !frequency_hz.is_finite() {
            return Err(MeasurementError::NotFinite { field: "frequency" });
        }
        if frequency_hz <= 0.0 {
            return Err(MeasurementError::NonPositiveFrequency(frequency_hz));
        }
        if !output_voltage_v.is_finite() {
            return Err(MeasurementError::NotFinite {
                field: "output voltage",
            });
        }
        if output_voltage_v < 0.0 {
            return Err(MeasurementError::NegativeVoltage(output_voltage_v));
        }
        if let Some(phase) = phase_shift_deg {
            if !phase.is_finite() {
                return Err(MeasurementError::NotFinite {
                    field: "phase shift",
                });
            }
            if !(-180.0..=180.0).contains(&phase) {
                return Err(MeasurementError::PhaseOutOfRange(phase));
            }
        }

        Ok(Self {
            frequency_hz,
            output_voltage_v,
            phase_shift_deg,
        })
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn output_voltage_v(&self) -> f64 {
        self.output_voltage_v
    }

    /// Phase shift in degrees, if one was recorded.
    pub fn phase_shift_deg(&self) -> Option<f64> {
        self.phase_shift_deg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_measurement() {
        let m = Measurement::new(1000.0, 0.707, Some(-45.0)).unwrap();
        assert_eq!(m.frequency_hz(), 1000.0);
        assert_eq!(m.output_voltage_v(), 0.707);
        assert_eq!(m.phase_shift_deg(), Some(-45.0));
    }

    #[test]
    fn test_phase_is_optional() {
        let m = Measurement::new(10.0, 1.0, None).unwrap();
        assert_eq!(m.phase_shift_deg(), None);
    }

    #[test]
    fn test_zero_output_voltage_is_recordable() {
        // A dead output is a valid reading; only the gain of it is undefined.
        assert!(Measurement::new(10.0, 0.0, None).is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            Measurement::new(0.0, 1.0, None),
            Err(MeasurementError::NonPositiveFrequency(0.0))
        );
        assert_eq!(
            Measurement::new(10.0, -0.5, None),
            Err(MeasurementError::NegativeVoltage(-0.5))
        );
        assert_eq!(
            Measurement::new(10.0, 1.0, Some(180.5)),
            Err(MeasurementError::PhaseOutOfRange(180.5))
        );
        assert!(matches!(
            Measurement::new(f64::NAN, 1.0, None),
            Err(MeasurementError::NotFinite { .. })
        ));
        assert!(matches!(
            Measurement::new(10.0, f64::INFINITY, None),
            Err(MeasurementError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_phase_bounds_are_inclusive() {
        assert!(Measurement::new(10.0, 1.0, Some(-180.0)).is_ok());
        assert!(Measurement::new(10.0, 1.0, Some(180.0)).is_ok());
    }
}
