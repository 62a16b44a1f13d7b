/// Discrete convolution of excess rainfall with a unit hydrograph, and the
/// summary values read off the resulting discharge series.

use tracing::debug;

use crate::error::{HydroError, HydroResult};
use crate::model::{HydrographResult, UnitHydrograph};
use crate::runoff::ExcessSeries;

/// Relative tolerance when comparing the excess step with the UH step.
const STEP_TOLERANCE: f64 = 1e-9;

/// `output[k] = Σ excess[j]·unit[k − j]` over every valid j; the output has
/// `m + n − 1` ordinates.
pub fn convolve(excess_mm: &[f64], unit: &[f64]) -> HydroResult<Vec<f64>> {
    if excess_mm.is_empty() || unit.is_empty() {
        return Err(HydroError::series("convolution needs non-empty excess and unit series"));
    }
    let mut output = vec![0.0; excess_mm.len() + unit.len() - 1];
    for (j, &pe) in excess_mm.iter().enumerate() {
        if pe == 0.0 {
            continue;
        }
        for (i, &u) in unit.iter().enumerate() {
            output[j + i] += pe * u;
        }
    }
    Ok(output)
}

/// Trapezoidal volume (m³) of a discharge series sampled every `step_hr`.
pub fn trapezoid_volume(flows_m3s: &[f64], step_hr: f64) -> f64 {
    flows_m3s
        .windows(2)
        .map(|w| (w[0] + w[1]) / 2.0 * step_hr * 3600.0)
        .sum()
}

/// Convolves `excess` with `unit` and derives peak, time to peak, volume and
/// time base from the convolved series. Ordinate k sits at k·dt.
pub fn build_hydrograph(
    excess: &ExcessSeries,
    unit: &UnitHydrograph,
    return_period: f64,
    area_ha: f64,
    shape_factor: Option<f64>,
) -> HydroResult<HydrographResult> {
    let excess_step_hr = excess.step_min / 60.0;
    if (excess_step_hr - unit.step_hr).abs() > STEP_TOLERANCE * unit.step_hr.max(1.0) {
        return Err(HydroError::series(format!(
            "excess step {excess_step_hr} h does not match unit hydrograph step {} h",
            unit.step_hr
        )));
    }

    let flows = convolve(&excess.excess_mm, &unit.ordinates)?;
    let times: Vec<f64> = (0..flows.len()).map(|k| k as f64 * unit.step_hr).collect();

    let mut peak_index = 0;
    for (k, q) in flows.iter().enumerate() {
        if *q > flows[peak_index] {
            peak_index = k;
        }
    }
    let last_flowing = flows.iter().rposition(|q| *q > 0.0).unwrap_or(0);
    let volume_m3 = trapezoid_volume(&flows, unit.step_hr);

    debug!(
        method = %unit.method,
        peak_m3s = flows[peak_index],
        volume_m3,
        "convolved hydrograph"
    );

    Ok(HydrographResult {
        method: unit.method.clone(),
        return_period,
        shape_factor,
        area_ha,
        step_hr: unit.step_hr,
        peak_flow_m3s: flows[peak_index],
        time_to_peak_hr: times[peak_index],
        time_base_hr: times[last_flowing],
        volume_m3,
        rainfall_depth_mm: excess.rainfall_mm,
        runoff_depth_mm: excess.total_excess_mm,
        times_hr: times,
        flows_m3s: flows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected} ± {tol}, got {actual}"
        );
    }

    fn excess(values: &[f64], step_min: f64) -> ExcessSeries {
        let total: f64 = values.iter().sum();
        ExcessSeries {
            method: "rational".to_string(),
            step_min,
            excess_mm: values.to_vec(),
            rainfall_mm: total * 2.0,
            total_excess_mm: total,
            runoff_ratio: 0.5,
            coefficient: Some(0.5),
            curve_number: None,
            retention_mm: None,
            initial_abstraction_mm: None,
            min_infiltration_mmhr: None,
        }
    }

    fn unit(ordinates: &[f64], step_hr: f64) -> UnitHydrograph {
        UnitHydrograph {
            method: "test".to_string(),
            step_hr,
            area_km2: 1.0,
            time_to_peak_hr: step_hr,
            time_base_hr: step_hr * (ordinates.len() - 1) as f64,
            peak_m3s_per_mm: 1.0,
            ordinates: ordinates.to_vec(),
        }
    }

    #[test]
    fn test_convolution_length_and_alignment() {
        let out = convolve(&[1.0, 2.0], &[0.0, 1.0, 0.5, 0.0]).unwrap();
        assert_eq!(out, vec![0.0, 1.0, 2.5, 1.0, 0.0]);
    }

    #[test]
    fn test_single_pulse_reproduces_unit() {
        let u = [0.0, 0.3, 0.7, 0.2, 0.0];
        let out = convolve(&[0.0, 2.0, 0.0], &u).unwrap();
        assert_eq!(out.len(), 7);
        assert_eq!(out[0], 0.0);
        for (i, v) in u.iter().enumerate() {
            assert_approx(out[i + 1], 2.0 * v, 1e-12);
        }
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(convolve(&[], &[1.0]).is_err());
        assert!(convolve(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_trapezoid_volume() {
        // triangle 0 → 2 → 0 over two half-hour steps: 0.5 h·2 m³/s = 3600 m³
        assert_approx(trapezoid_volume(&[0.0, 2.0, 0.0], 0.5), 3600.0, 1e-9);
    }

    #[test]
    fn test_hydrograph_summary_values() {
        // 1 km², ordinates hold 1 mm: Σu·dt·3600 = 1000 m³
        let step_hr = 0.25;
        let scale = 1000.0 / (3600.0 * step_hr) / 4.0;
        let ordinates: Vec<f64> = [0.0, 1.0, 2.0, 1.0, 0.0].iter().map(|v| v * scale).collect();
        let u = unit(&ordinates, step_hr);
        assert_approx(u.volume_m3(), 1000.0, 1e-9);

        let result = build_hydrograph(&excess(&[2.0, 6.0, 2.0], 15.0), &u, 10.0, 100.0, None).unwrap();
        assert_eq!(result.flows_m3s.len(), 7);
        assert_approx(result.volume_m3, 10.0 * 1000.0, 1e-6);
        assert_approx(result.time_to_peak_hr, 0.75, 1e-12);
        assert_approx(result.time_base_hr, 1.25, 1e-12);
        assert_eq!(result.runoff_depth_mm, 10.0);
        assert_eq!(result.rainfall_depth_mm, 20.0);
    }

    #[test]
    fn test_step_mismatch_is_rejected() {
        let u = unit(&[0.0, 1.0, 0.0], 0.25);
        let err = build_hydrograph(&excess(&[1.0], 10.0), &u, 10.0, 100.0, None).unwrap_err();
        assert!(matches!(err, HydroError::InvalidSeries(_)));
    }
}
