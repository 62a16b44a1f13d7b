/// Two-peak triangular storm.
///
/// Each peak is a triangle of half-width `peak_width·D` centred on its
/// fractional position, sampled at interval centres and scaled so the first
/// carries `volume_split` of the total depth and the second the rest.

use crate::error::{HydroError, HydroResult, require_positive};
use crate::storm::chicago::validate_peaks;

pub const DEFAULT_FIRST_PEAK: f64 = 0.25;
pub const DEFAULT_SECOND_PEAK: f64 = 0.75;
pub const DEFAULT_VOLUME_SPLIT: f64 = 0.5;
pub const DEFAULT_PEAK_WIDTH: f64 = 0.15;

fn triangle(n: usize, dt_min: f64, centre_min: f64, half_width_min: f64) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = (i as f64 + 0.5) * dt_min;
            (1.0 - (t - centre_min).abs() / half_width_min).max(0.0)
        })
        .collect()
}

/// Bimodal depths (mm) for `n` intervals of `dt_min`.
///
/// The triangles may not overlap (p2 − p1 ≥ 2·width) and each half-width
/// must cover at least one step, so a trough lower than both peaks sits
/// between them whatever the volume split.
pub fn bimodal(
    total_depth: f64,
    n: usize,
    dt_min: f64,
    first_peak: f64,
    second_peak: f64,
    volume_split: f64,
    peak_width: f64,
) -> HydroResult<Vec<f64>> {
    require_positive("total depth (mm)", total_depth)?;
    validate_peaks(first_peak, second_peak, volume_split)?;
    require_positive("peak width", peak_width)?;

    let duration = n as f64 * dt_min;
    let half_width = peak_width * duration;
    if half_width < dt_min {
        return Err(HydroError::out_of_range(
            "peak width",
            peak_width,
            "half-width of at least one time step",
        ));
    }
    if second_peak - first_peak < 2.0 * peak_width - 1.0e-12 {
        return Err(HydroError::out_of_range(
            "peak separation",
            second_peak - first_peak,
            "at least twice the peak width",
        ));
    }

    let first = triangle(n, dt_min, first_peak * duration, half_width);
    let second = triangle(n, dt_min, second_peak * duration, half_width);
    let first_sum: f64 = first.iter().sum();
    let second_sum: f64 = second.iter().sum();

    let v1 = total_depth * volume_split;
    let v2 = total_depth - v1;
    Ok(first
        .iter()
        .zip(&second)
        .map(|(a, b)| v1 * a / first_sum + v2 * b / second_sum)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argmax(values: &[f64]) -> usize {
        let mut best = 0;
        for (i, v) in values.iter().enumerate() {
            if *v > values[best] {
                best = i;
            }
        }
        best
    }

    /// Some interval strictly between the two peaks is lower than both.
    fn has_valley(depths: &[f64], first_peak: f64, second_peak: f64) -> bool {
        let mid = ((first_peak + second_peak) / 2.0 * depths.len() as f64) as usize;
        let i1 = argmax(&depths[..mid]);
        let i2 = mid + argmax(&depths[mid..]);
        let floor = depths[i1].min(depths[i2]);
        depths[i1 + 1..i2].iter().any(|v| *v < floor)
    }

    #[test]
    fn test_bimodal_conserves_depth() {
        let depths = bimodal(80.0, 36, 10.0, 0.25, 0.75, 0.4, 0.15).unwrap();
        let total: f64 = depths.iter().sum();
        assert!((total - 80.0).abs() < 1e-9);
        assert!(depths.iter().all(|d| *d >= 0.0));
    }

    #[test]
    fn test_valley_for_every_split() {
        for k in 1..20 {
            let split = k as f64 * 0.05;
            let wide = bimodal(80.0, 36, 10.0, 0.25, 0.75, split, 0.15).unwrap();
            assert!(has_valley(&wide, 0.25, 0.75), "split {split}");
            // triangles touching end to end
            let tight = bimodal(80.0, 36, 10.0, 0.3, 0.6, split, 0.15).unwrap();
            assert!(has_valley(&tight, 0.3, 0.6), "tight split {split}");
        }
    }

    #[test]
    fn test_coarse_step_keeps_two_peaks() {
        // 6 h at 30 min: the 54 min half-width spans under two steps
        let depths = bimodal(80.0, 12, 30.0, 0.25, 0.75, 0.5, 0.15).unwrap();
        let total: f64 = depths.iter().sum();
        assert!((total - 80.0).abs() < 1e-9);
        assert!(has_valley(&depths, 0.25, 0.75));
        // 60 min steps are wider than the half-width
        assert!(bimodal(80.0, 6, 60.0, 0.25, 0.75, 0.5, 0.15).is_err());
    }

    #[test]
    fn test_rejects_overlapping_or_thin_peaks() {
        assert!(bimodal(80.0, 36, 10.0, 0.4, 0.6, 0.5, 0.15).is_err());
        assert!(bimodal(80.0, 36, 10.0, 0.25, 0.75, 0.5, 0.02).is_err());
        assert!(bimodal(80.0, 36, 10.0, 0.25, 0.75, 0.0, 0.15).is_err());
        assert!(bimodal(80.0, 36, 10.0, 0.75, 0.25, 0.5, 0.15).is_err());
    }
}
