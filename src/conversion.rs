use crate::constants::{Degree, DEG2RAD};

/// Reduce an angle in degrees to the interval `[0, 360)`.
///
/// The number of whole turns is taken by truncation toward zero, then decremented once
/// for negative inputs so that the remainder is non-negative. A last fold handles the
/// two inputs where this leaves exactly `360.0`: negative multiples of a full turn and
/// tiny negative values that round up to `360.0`.
///
/// Arguments
/// ---------
/// * `angle`: any angle in degrees
///
/// Return
/// ------
/// * the equivalent angle in `[0, 360)`; NaN and infinities yield NaN
pub fn normalize_to_360(angle: Degree) -> Degree {
    let mut turns = (angle / 360.0).trunc();
    if angle < 0.0 {
        turns -= 1.0;
    }
    let reduced = angle - turns * 360.0;

    if reduced >= 360.0 {
        reduced - 360.0
    } else if reduced < 0.0 {
        reduced + 360.0
    } else {
        reduced
    }
}

/// Map an angle in `[0, 360)` to `[-180, 180)`.
///
/// Values at or above 180° are shifted down by a full turn, everything else is left
/// untouched.
#[inline]
pub fn convert_range_to_180(angle: Degree) -> Degree {
    if angle >= 180.0 {
        angle - 360.0
    } else {
        angle
    }
}

/// Hammer–Aitoff equal-area projection.
///
/// Arguments
/// ---------
/// * `lon`: longitude-like angle in degrees, `[-180, 180)`
/// * `lat`: latitude-like angle in degrees, `[-90, 90]`
///
/// Return
/// ------
/// * `(x, y)` projected coordinates, still expressed in "degrees": `x ∈ [-180, 180]`,
///   `y ∈ [-90, 90]`, so that the projected map keeps the frame of the input
pub fn project_hammer_aitoff(lon: Degree, lat: Degree) -> (Degree, Degree) {
    let (sin_lat, cos_lat) = (lat * DEG2RAD).sin_cos();
    let half_lon = lon * DEG2RAD / 2.0;
    let z = (1.0 + cos_lat * half_lon.cos()).sqrt();

    (180.0 * cos_lat * half_lon.sin() / z, 90.0 * sin_lat / z)
}

#[cfg(test)]
mod conversion_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sample_angles() -> Vec<f64> {
        let mut angles = vec![
            0.0, -0.0, 1e-12, -1e-12, -1e-20, 359.999999, 360.0, 720.0, -360.0, -720.0, 180.0,
            -180.0, 45.5, -45.5, 1234.5678, -98765.4321, 1.0e7,
        ];
        angles.extend((-50..50).map(|k| k as f64 * 37.3));
        angles
    }

    #[test]
    fn test_normalize_to_360_values() {
        assert_eq!(normalize_to_360(370.0), 10.0);
        assert_eq!(normalize_to_360(-10.0), 350.0);
        assert_eq!(normalize_to_360(0.0), 0.0);
        assert_eq!(normalize_to_360(360.0), 0.0);
        assert_eq!(normalize_to_360(-360.0), 0.0);
        assert_eq!(normalize_to_360(-1e-20), 0.0);
        assert_abs_diff_eq!(normalize_to_360(-725.0), 355.0, epsilon = 1e-12);
    }

    #[test]
    fn test_normalize_to_360_range_and_idempotence() {
        for a in sample_angles() {
            let n = normalize_to_360(a);
            assert!((0.0..360.0).contains(&n), "{a} -> {n}");
            assert_eq!(normalize_to_360(n), n, "not idempotent for {a}");
        }
    }

    #[test]
    fn test_normalize_non_finite() {
        assert!(normalize_to_360(f64::NAN).is_nan());
        assert!(normalize_to_360(f64::INFINITY).is_nan());
    }

    #[test]
    fn test_convert_range_to_180() {
        assert_eq!(convert_range_to_180(0.0), 0.0);
        assert_eq!(convert_range_to_180(179.9), 179.9);
        assert_eq!(convert_range_to_180(180.0), -180.0);
        assert_eq!(convert_range_to_180(308.0), -52.0);

        for a in sample_angles() {
            let c = convert_range_to_180(normalize_to_360(a));
            assert!((-180.0..180.0).contains(&c), "{a} -> {c}");
        }
    }

    #[test]
    fn test_hammer_aitoff() {
        let (x, y) = project_hammer_aitoff(0.0, 0.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);

        // poles collapse onto the vertical axis
        let (x, y) = project_hammer_aitoff(120.0, 90.0);
        assert_abs_diff_eq!(x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 90.0, epsilon = 1e-12);

        // map edge at the equator
        let (x, y) = project_hammer_aitoff(180.0, 0.0);
        assert_abs_diff_eq!(x, 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-12);

        // symmetry
        let (x1, y1) = project_hammer_aitoff(-63.0, -21.0);
        let (x2, y2) = project_hammer_aitoff(63.0, 21.0);
        assert_abs_diff_eq!(x1, -x2, epsilon = 1e-12);
        assert_abs_diff_eq!(y1, -y2, epsilon = 1e-12);
    }
}
