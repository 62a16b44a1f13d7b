/// Chicago design storm (Keifer & Chu, 1957).
///
/// Built from a Sherman curve i = a/(t + b)^c with a = k·T^m, b = c_sherman
/// and exponent c = n. With the peak at r·D, intensity at a distance ts
/// (scaled by r before the peak and 1 − r after it) is
/// a·[(1 − c)·ts + b] / (ts + b)^(c + 1).
/// Durations in minutes; depths are scaled to the requested total.

use crate::error::{HydroError, HydroResult, require_positive, require_within};
use crate::idf::ShermanCoefficients;

/// Default advancement coefficient r.
pub const DEFAULT_ADVANCEMENT: f64 = 0.375;

fn instantaneous(a: f64, b: f64, c: f64, ts: f64) -> f64 {
    a * ((1.0 - c) * ts + b) / (ts + b).powf(c + 1.0)
}

fn check_sherman(coefficients: &ShermanCoefficients) -> HydroResult<()> {
    require_positive("Sherman k", coefficients.k)?;
    require_positive("Sherman c (min)", coefficients.c)?;
    if !(coefficients.n > 0.0 && coefficients.n < 1.0) {
        return Err(HydroError::out_of_range(
            "Sherman n",
            coefficients.n,
            "0 < n < 1 for a Chicago storm",
        ));
    }
    Ok(())
}

/// Unscaled depths of `n` intervals over a window, peak at `advancement`.
fn chicago_shape(
    coefficients: &ShermanCoefficients,
    return_period: f64,
    n: usize,
    dt_min: f64,
    advancement: f64,
) -> Vec<f64> {
    let a = coefficients.k * return_period.powf(coefficients.m);
    let b = coefficients.c;
    let c = coefficients.n;
    let peak_min = advancement * n as f64 * dt_min;

    (0..n)
        .map(|i| {
            let t = (i as f64 + 0.5) * dt_min;
            let intensity = if t <= peak_min {
                if advancement > 0.0 {
                    instantaneous(a, b, c, (peak_min - t) / advancement)
                } else {
                    0.0
                }
            } else if advancement < 1.0 {
                instantaneous(a, b, c, (t - peak_min) / (1.0 - advancement))
            } else {
                0.0
            };
            intensity * dt_min / 60.0
        })
        .collect()
}

fn scale_to(mut depths: Vec<f64>, total: f64) -> HydroResult<Vec<f64>> {
    let sum: f64 = depths.iter().sum();
    if !(sum > 0.0) {
        return Err(HydroError::series("Chicago storm produced no rainfall"));
    }
    let factor = total / sum;
    depths.iter_mut().for_each(|d| *d *= factor);
    Ok(depths)
}

/// Chicago storm depths (mm) for `n` intervals, summing to `total_depth`.
pub fn chicago(
    coefficients: &ShermanCoefficients,
    return_period: f64,
    total_depth: f64,
    n: usize,
    dt_min: f64,
    advancement: f64,
) -> HydroResult<Vec<f64>> {
    check_sherman(coefficients)?;
    require_positive("return period T (years)", return_period)?;
    require_positive("total depth (mm)", total_depth)?;
    require_within("advancement r", advancement, 0.0, 1.0, "0 <= r <= 1")?;
    let shape = chicago_shape(coefficients, return_period, n, dt_min, advancement);
    scale_to(shape, total_depth)
}

/// Two Chicago storms in adjacent windows split halfway between the peaks.
///
/// `first_peak` and `second_peak` are fractions of the whole duration. Each
/// sub-storm gets its share of `total_depth` and is confined to its own
/// window, so the two peaks stay separated by a trough for any split.
#[allow(clippy::too_many_arguments)]
pub fn bimodal_chicago(
    coefficients: &ShermanCoefficients,
    return_period: f64,
    total_depth: f64,
    n: usize,
    dt_min: f64,
    first_peak: f64,
    second_peak: f64,
    volume_split: f64,
) -> HydroResult<Vec<f64>> {
    check_sherman(coefficients)?;
    require_positive("return period T (years)", return_period)?;
    require_positive("total depth (mm)", total_depth)?;
    validate_peaks(first_peak, second_peak, volume_split)?;

    let duration = n as f64 * dt_min;
    let (p1, p2) = (first_peak * duration, second_peak * duration);
    if p2 - p1 < 3.0 * dt_min {
        return Err(HydroError::out_of_range(
            "peak separation (min)",
            p2 - p1,
            "at least three time steps",
        ));
    }

    let split_index = (((p1 + p2) / 2.0) / dt_min).round() as usize;
    let split_min = split_index as f64 * dt_min;
    let n2 = n - split_index;

    let r1 = p1 / split_min;
    let r2 = (p2 - split_min) / (n2 as f64 * dt_min);
    let first = chicago_shape(coefficients, return_period, split_index, dt_min, r1);
    let second = chicago_shape(coefficients, return_period, n2, dt_min, r2);

    let mut depths = scale_to(first, total_depth * volume_split)?;
    depths.extend(scale_to(second, total_depth * (1.0 - volume_split))?);
    Ok(depths)
}

/// Shared check for two-peak storms: 0 < p1 < p2 < 1 and 0 < split < 1.
pub(crate) fn validate_peaks(first_peak: f64, second_peak: f64, volume_split: f64) -> HydroResult<()> {
    if !(first_peak > 0.0 && first_peak < 1.0) {
        return Err(HydroError::out_of_range("first peak position", first_peak, "0 < p1 < 1"));
    }
    if !(second_peak > first_peak && second_peak < 1.0) {
        return Err(HydroError::out_of_range(
            "second peak position",
            second_peak,
            "p1 < p2 < 1",
        ));
    }
    if !(volume_split > 0.0 && volume_split < 1.0) {
        return Err(HydroError::out_of_range("volume split", volume_split, "0 < split < 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coeffs() -> ShermanCoefficients {
        ShermanCoefficients { k: 1200.0, m: 0.18, c: 12.0, n: 0.78 }
    }

    #[test]
    fn test_chicago_sums_to_total_and_peaks_at_advancement() {
        let depths = chicago(&coeffs(), 10.0, 60.0, 24, 5.0, 0.375).unwrap();
        let total: f64 = depths.iter().sum();
        assert!((total - 60.0).abs() < 1e-9);
        let peak = depths
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // peak at 0.375 * 120 = 45 min, inside interval 8 (40-45) or 9 (45-50)
        assert!(peak == 8 || peak == 9);
    }

    #[test]
    fn test_chicago_rejects_bad_exponent_and_advancement() {
        let mut bad = coeffs();
        bad.n = 1.2;
        assert!(chicago(&bad, 10.0, 60.0, 24, 5.0, 0.4).is_err());
        assert!(chicago(&coeffs(), 10.0, 60.0, 24, 5.0, 1.5).is_err());
    }

    #[test]
    fn test_chicago_edge_advancements() {
        let front = chicago(&coeffs(), 10.0, 50.0, 12, 10.0, 0.0).unwrap();
        assert!(front.windows(2).all(|w| w[0] >= w[1]));
        let back = chicago(&coeffs(), 10.0, 50.0, 12, 10.0, 1.0).unwrap();
        assert!(back.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_bimodal_chicago_splits_volume() {
        let depths = bimodal_chicago(&coeffs(), 10.0, 80.0, 72, 5.0, 0.25, 0.75, 0.3).unwrap();
        assert_eq!(depths.len(), 72);
        let first: f64 = depths[..36].iter().sum();
        let second: f64 = depths[36..].iter().sum();
        assert!((first - 24.0).abs() < 1e-9);
        assert!((second - 56.0).abs() < 1e-9);
    }

    #[test]
    fn test_bimodal_chicago_rejects_close_peaks() {
        assert!(bimodal_chicago(&coeffs(), 10.0, 80.0, 12, 5.0, 0.45, 0.5, 0.5).is_err());
        assert!(bimodal_chicago(&coeffs(), 10.0, 80.0, 72, 5.0, 0.75, 0.25, 0.5).is_err());
        assert!(bimodal_chicago(&coeffs(), 10.0, 80.0, 72, 5.0, 0.25, 0.75, 1.0).is_err());
    }
}
