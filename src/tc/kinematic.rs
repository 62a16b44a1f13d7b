/// Kinematic wave overland-flow time.
///
/// tc = 6.99·(n·L)^0.6 / (i^0.4·S^0.3) minutes, with L in m, i in mm/h and
/// S in m/m. Tc depends on the intensity, which in turn depends on Tc
/// through the IDF curve; `kinematic_wave_with_idf` solves that fixed point.

use tracing::debug;

use crate::error::{HydroError, HydroResult, require_positive};
use crate::idf::IdfCurve;

const MAX_ITERATIONS: usize = 50;
/// Convergence tolerance on Tc (h), about 0.6 s.
const TOLERANCE_HR: f64 = 1.0e-4;

/// Closed form for a known design intensity. Returns hours.
pub fn kinematic_wave(length_m: f64, manning_n: f64, slope: f64, intensity_mmhr: f64) -> HydroResult<f64> {
    require_positive("length (m)", length_m)?;
    require_positive("Manning n", manning_n)?;
    require_positive("slope (m/m)", slope)?;
    require_positive("intensity (mm/h)", intensity_mmhr)?;
    let tc_min = 6.99 * (manning_n * length_m).powf(0.6)
        / (intensity_mmhr.powf(0.4) * slope.powf(0.3));
    Ok(tc_min / 60.0)
}

/// Iterates Tc ← f(i(Tc)) on `curve` at `return_period`. Returns hours.
pub fn kinematic_wave_with_idf(
    length_m: f64,
    manning_n: f64,
    slope: f64,
    curve: &IdfCurve,
    return_period: f64,
) -> HydroResult<f64> {
    let mut tc = 1.0;
    for iteration in 0..MAX_ITERATIONS {
        let intensity = curve.evaluate(return_period, tc)?.intensity_mmhr;
        let next = kinematic_wave(length_m, manning_n, slope, intensity)?;
        if (next - tc).abs() < TOLERANCE_HR {
            debug!(iteration, tc_hr = next, intensity, "kinematic wave converged");
            return Ok(next);
        }
        tc = next;
    }
    Err(HydroError::series(format!(
        "kinematic wave Tc did not converge in {MAX_ITERATIONS} iterations (last {tc:.4} h)"
    )))
}
