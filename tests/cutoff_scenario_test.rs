// tests/cutoff_scenario_test.rs

use bode_bench::data_analysis::gain::gain_db;
use bode_bench::data_analysis::response::{
    classify_response, compute_curve, estimate_cutoff, estimate_cutoff_frequency, DerivedRow,
    ResponseKind,
};
use bode_bench::data_input::measurement::Measurement;
use bode_bench::data_input::session::Session;

fn rows_from_gains(points: &[(f64, f64)]) -> Vec<DerivedRow> {
    points
        .iter()
        .map(|&(freq, gain)| DerivedRow {
            measurement: Measurement::new(freq, 1.0, None).unwrap(),
            gain_db: Ok(gain),
        })
        .collect()
}

#[test]
fn test_lowpass_sweep_scenario() {
    let mut session = Session::new();
    session.append(Measurement::new(1.0, 1.0, None).unwrap());
    session.append(Measurement::new(10.0, 0.707, None).unwrap());
    session.append(Measurement::new(100.0, 0.1, None).unwrap());

    let curve = compute_curve(&session.all_sorted(), 1.0);
    let gains: Vec<f64> = curve.iter().map(|r| r.valid_gain_db().unwrap()).collect();
    assert!(gains[0].abs() < 1e-12);
    assert!((gains[1] + 3.01).abs() < 0.01);
    assert!((gains[2] + 20.0).abs() < 1e-9);

    let cutoff = estimate_cutoff_frequency(&curve).unwrap();
    assert!((cutoff - 10.0).abs() < 0.1, "cutoff was {}", cutoff);
    assert_eq!(classify_response(&curve), ResponseKind::Lowpass);
}

#[test]
fn test_unsorted_entry_gives_same_result() {
    let mut session = Session::new();
    session.append(Measurement::new(100.0, 0.1, None).unwrap());
    session.append(Measurement::new(10.0, 0.707, None).unwrap());
    session.append(Measurement::new(1.0, 1.0, None).unwrap());

    let curve = compute_curve(&session.all_sorted(), 1.0);
    let cutoff = estimate_cutoff_frequency(&curve).unwrap();
    assert!((cutoff - 10.0).abs() < 0.1);
}

#[test]
fn test_exact_cutoff_on_sample() {
    let curve = rows_from_gains(&[(1.0, 0.0), (10.0, -3.0), (100.0, -20.0)]);
    assert_eq!(estimate_cutoff_frequency(&curve), Some(10.0));
}

#[test]
fn test_clamps_without_extrapolating() {
    let curve = rows_from_gains(&[(1.0, 0.5), (10.0, -0.5), (100.0, -1.0)]);
    let estimate = estimate_cutoff(&curve).unwrap();
    assert_eq!(estimate.max_gain_db, 0.5);
    assert_eq!(estimate.target_gain_db, -2.5);
    assert_eq!(estimate.frequency_hz, 100.0);
}

#[test]
fn test_input_voltage_scales_gain_not_cutoff() {
    let measurements = vec![
        Measurement::new(1.0, 2.0, None).unwrap(),
        Measurement::new(10.0, 1.414, None).unwrap(),
        Measurement::new(100.0, 0.2, None).unwrap(),
    ];
    let curve = compute_curve(&measurements, 2.0);
    assert_eq!(curve[0].valid_gain_db(), Some(0.0));
    let cutoff = estimate_cutoff_frequency(&curve).unwrap();
    assert!((cutoff - 10.0).abs() < 0.1);
}

#[test]
fn test_gain_identity() {
    for v in [0.001, 0.5, 1.0, 12.0, 24.0] {
        assert_eq!(gain_db(v, v), Ok(0.0));
    }
}
