// src/data_analysis/gain.rs

use crate::error::GainError;

/// Gain in dB of an output amplitude relative to the input amplitude: `20 * log10(out / in)`.
///
/// Both voltages must be strictly positive; the logarithm is undefined otherwise.
pub fn gain_db(input_voltage_v: f64, output_voltage_v: f64) -> Result<f64, GainError> {
    if input_voltage_v.is_nan() || input_voltage_v <= 0.0 {
        return Err(GainError::NonPositiveInput(input_voltage_v));
    }
    if output_voltage_v.is_nan() || output_voltage_v <= 0.0 {
        return Err(GainError::NonPositiveOutput(output_voltage_v));
    }

    let gain = 20.0 * (output_voltage_v / input_voltage_v).log10();
    if gain.is_finite() {
        Ok(gain)
    } else {
        Err(GainError::NotFinite {
            input_v: input_voltage_v,
            output_v: output_voltage_v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unity_gain_is_zero_db() {
        for v in [0.01, 1.0, 3.3, 24.0] {
            assert_eq!(gain_db(v, v).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_known_ratios() {
        assert!((gain_db(1.0, 10.0).unwrap() - 20.0).abs() < 1e-12);
        assert!((gain_db(1.0, 0.1).unwrap() + 20.0).abs() < 1e-12);
        // Half-power point of a first-order filter
        let half_power = gain_db(1.0, std::f64::consts::FRAC_1_SQRT_2).unwrap();
        assert!((half_power + 3.0103).abs() < 1e-4);
    }

    #[test]
    fn test_matches_formula() {
        let (v_in, v_out): (f64, f64) = (2.5, 0.8);
        let expected = 20.0 * (v_out / v_in).log10();
        assert!((gain_db(v_in, v_out).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_non_positive_voltages_are_domain_errors() {
        assert_eq!(gain_db(0.0, 1.0), Err(GainError::NonPositiveInput(0.0)));
        assert_eq!(gain_db(-1.0, 1.0), Err(GainError::NonPositiveInput(-1.0)));
        assert_eq!(gain_db(1.0, 0.0), Err(GainError::NonPositiveOutput(0.0)));
        assert!(gain_db(f64::NAN, 1.0).is_err());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any pair of positive voltages follows 20 * log10(out / in)
        #[test]
        fn test_gain_matches_formula(v_in in 1e-3f64..24.0, v_out in 1e-3f64..24.0) {
            let expected = 20.0 * (v_out / v_in).log10();
            let gain = gain_db(v_in, v_out).unwrap();
            prop_assert!((gain - expected).abs() < 1e-9);
        }

        /// Equal voltages give exactly 0 dB
        #[test]
        fn test_equal_voltages_are_zero_db(v in 1e-3f64..24.0) {
            prop_assert_eq!(gain_db(v, v).unwrap(), 0.0);
        }

        /// Non-positive voltages never produce a gain
        #[test]
        fn test_non_positive_is_rejected(v_bad in -24.0f64..=0.0, v_ok in 1e-3f64..24.0) {
            prop_assert!(gain_db(v_bad, v_ok).is_err());
            prop_assert!(gain_db(v_ok, v_bad).is_err());
        }
    }
}
