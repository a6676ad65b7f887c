//! Float assertions with a tolerance.

#![allow(dead_code)]

/// Tolerance used when none is given
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Assert `|actual - expected| <= epsilon`
pub fn assert_approx_eq(actual: f64, expected: f64, epsilon: Option<f64>) {
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    let diff = (actual - expected).abs();
    assert!(
        diff <= epsilon,
        "{} != {} (diff {}, epsilon {})",
        actual,
        expected,
        diff,
        epsilon
    );
}

/// Element-wise [`assert_approx_eq`] over slices of equal length
pub fn assert_array_approx_eq(actual: &[f64], expected: &[f64], epsilon: Option<f64>) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    let epsilon = epsilon.unwrap_or(DEFAULT_EPSILON);
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= epsilon,
            "index {}: {} != {} (epsilon {})",
            i,
            a,
            e,
            epsilon
        );
    }
}

/// Assert `min <= actual <= max`
pub fn assert_in_range(actual: f64, min: f64, max: f64) {
    assert!(
        (min..=max).contains(&actual),
        "{} not in [{}, {}]",
        actual,
        min,
        max
    );
}
