/// Storms built from a given total depth instead of an IDF lookup, plus
/// measured events.

use crate::error::{HydroError, HydroResult, require_positive, require_within};
use crate::model::Hyetograph;

pub fn uniform(total_depth: f64, n: usize) -> HydroResult<Vec<f64>> {
    require_positive("total depth (mm)", total_depth)?;
    if n == 0 {
        return Err(HydroError::series("uniform storm needs at least one interval"));
    }
    Ok(vec![total_depth / n as f64; n])
}

/// Single triangle rising from zero at t = 0 to its apex at p·D and back to
/// zero at D, sampled at interval centres.
pub fn triangular(total_depth: f64, n: usize, peak_position: f64) -> HydroResult<Vec<f64>> {
    require_positive("total depth (mm)", total_depth)?;
    require_within("peak position", peak_position, 0.0, 1.0, "0 <= p <= 1")?;
    if n == 0 {
        return Err(HydroError::series("triangular storm needs at least one interval"));
    }

    let weights: Vec<f64> = (0..n)
        .map(|i| {
            let x = (i as f64 + 0.5) / n as f64;
            if x <= peak_position {
                x / peak_position
            } else {
                (1.0 - x) / (1.0 - peak_position)
            }
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    Ok(weights.iter().map(|w| total_depth * w / sum).collect())
}

/// Hyetograph from a recorded event.
///
/// `times_min` are the ends of equally spaced intervals; the step is taken
/// from the first two and the series is rebased to start at zero.
pub fn measured_event(times_min: &[f64], depths_mm: &[f64]) -> HydroResult<Hyetograph> {
    if times_min.len() != depths_mm.len() {
        return Err(HydroError::series(format!(
            "{} times but {} depths",
            times_min.len(),
            depths_mm.len()
        )));
    }
    if times_min.len() < 2 {
        return Err(HydroError::series("a measured event needs at least two records"));
    }

    let step = times_min[1] - times_min[0];
    require_positive("measured time step (min)", step)?;
    for (i, pair) in times_min.windows(2).enumerate() {
        if ((pair[1] - pair[0]) - step).abs() > 1.0e-6 * step {
            return Err(HydroError::series(format!(
                "irregular spacing at record {}: {} min instead of {} min",
                i + 1,
                pair[1] - pair[0],
                step
            )));
        }
    }

    Hyetograph::from_depths("measured", step, depths_mm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_and_triangular() {
        assert_eq!(uniform(12.0, 4).unwrap(), vec![3.0; 4]);
        let tri = triangular(50.0, 10, 0.5).unwrap();
        let total: f64 = tri.iter().sum();
        assert!((total - 50.0).abs() < 1e-9);
        assert!((tri[4] - tri[5]).abs() < 1e-12);
        assert!(tri[0] < tri[4]);
        // p = 0 gives a falling limb only
        let front = triangular(50.0, 10, 0.0).unwrap();
        assert!(front.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_measured_event() {
        let h = measured_event(&[10.0, 20.0, 30.0], &[2.0, 6.0, 1.0]).unwrap();
        assert_eq!(h.step_min, 10.0);
        assert_eq!(h.peak_index(), 1);
        assert!((h.total_depth() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_measured_event_rejects_bad_records() {
        assert!(measured_event(&[10.0], &[2.0]).is_err());
        assert!(measured_event(&[10.0, 20.0], &[2.0]).is_err());
        assert!(measured_event(&[10.0, 20.0, 35.0], &[2.0, 1.0, 1.0]).is_err());
        assert!(measured_event(&[10.0, 20.0], &[2.0, -1.0]).is_err());
    }
}
