/// Regional (DINAGUA, Uruguay) IDF formula.
///
/// Rainfall is scaled from a single reference depth, the 3-hour 10-year
/// depth P3,10, by a return-period factor CT and an areal reduction factor
/// CA. The duration curve has two branches that meet at three hours.
///
/// Units: durations in hours, area in km², depths in mm.

use tracing::warn;

use crate::error::{HydroError, HydroResult, require_positive};
use crate::model::IdfResult;

/// Areal reduction only applies above this area (km²).
pub const AREA_THRESHOLD_KM2: f64 = 1.0;
/// The regional curves were fitted on catchments up to this size (km²).
pub const AREA_CALIBRATION_LIMIT_KM2: f64 = 300.0;
/// Shortest duration used inside the area factor (h).
const CA_MIN_DURATION_HR: f64 = 0.083;
/// Branch point between the short and long duration formulas (h).
const LONG_DURATION_HR: f64 = 3.0;

// ---------------------------------------------------------------------------
// P3,10 by department
// ---------------------------------------------------------------------------

/// Reference 3-hour 10-year depth (mm) for each department of Uruguay.
pub static P3_10_BY_DEPARTMENT: &[(&str, f64)] = &[
    ("artigas", 83.0),
    ("canelones", 75.0),
    ("cerro_largo", 82.0),
    ("colonia", 73.0),
    ("durazno", 78.0),
    ("flores", 75.0),
    ("florida", 76.0),
    ("lavalleja", 78.0),
    ("maldonado", 76.0),
    ("montevideo", 78.0),
    ("paysandu", 79.0),
    ("rio_negro", 76.0),
    ("rivera", 84.0),
    ("rocha", 77.0),
    ("salto", 81.0),
    ("san_jose", 74.0),
    ("soriano", 74.0),
    ("tacuarembo", 82.0),
    ("treinta_y_tres", 80.0),
];

/// Looks up P3,10 by department name ("Cerro Largo", "cerro_largo", ...).
pub fn p3_10_for_department(name: &str) -> HydroResult<f64> {
    let key = name.trim().to_lowercase().replace(' ', "_");
    P3_10_BY_DEPARTMENT
        .iter()
        .find(|(dept, _)| *dept == key)
        .map(|(_, p)| *p)
        .ok_or_else(|| HydroError::unknown("department", name))
}

// ---------------------------------------------------------------------------
// Correction factors
// ---------------------------------------------------------------------------

fn ct_raw(return_period: f64) -> f64 {
    0.5786 - 0.4312 * (return_period / (return_period - 1.0)).ln().log10()
}

/// Return-period factor CT(Tr), normalized so that CT(10) = 1.
pub fn return_period_factor(return_period: f64) -> HydroResult<f64> {
    if !return_period.is_finite() || return_period < 2.0 {
        return Err(HydroError::out_of_range(
            "return period Tr (years)",
            return_period,
            "Tr >= 2",
        ));
    }
    Ok(ct_raw(return_period) / ct_raw(10.0))
}

/// Areal reduction factor CA(A, d). `None` means a point rainfall.
pub fn area_factor(area_km2: Option<f64>, duration_hr: f64) -> HydroResult<f64> {
    require_positive("duration (h)", duration_hr)?;
    let Some(area) = area_km2 else {
        return Ok(1.0);
    };
    require_positive("area (km2)", area)?;
    if area > AREA_CALIBRATION_LIMIT_KM2 {
        warn!(area_km2 = area, "area exceeds the regional IDF calibration range");
    }
    if area <= AREA_THRESHOLD_KM2 {
        return Ok(1.0);
    }

    let d = duration_hr.max(CA_MIN_DURATION_HR);
    let ca = 1.0 - 0.3549 * d.powf(-0.4272) * (1.0 - (-0.005792 * area).exp());
    Ok(ca.min(1.0))
}

// ---------------------------------------------------------------------------
// Intensity
// ---------------------------------------------------------------------------

/// Design intensity and depth from the regional curve.
pub fn regional_intensity(
    p3_10: f64,
    return_period: f64,
    duration_hr: f64,
    area_km2: Option<f64>,
) -> HydroResult<IdfResult> {
    require_positive("P3,10 (mm)", p3_10)?;
    require_positive("duration (h)", duration_hr)?;
    if !(50.0..=120.0).contains(&p3_10) {
        warn!(p3_10, "P3,10 outside the usual 50-120 mm range for Uruguay");
    }

    let ct = return_period_factor(return_period)?;
    let ca = area_factor(area_km2, duration_hr)?;

    let d = duration_hr;
    let shape = if d < LONG_DURATION_HR {
        0.6208 / (d + 0.0137).powf(0.5639)
    } else {
        1.0287 / (d + 1.0293).powf(0.8083)
    };
    let intensity = p3_10 * ct * ca * shape;

    Ok(IdfResult {
        return_period,
        duration_hr,
        intensity_mmhr: intensity,
        depth_mm: intensity * duration_hr,
        ct,
        ca,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual} (tol {tol})"
        );
    }

    #[test]
    fn test_ct_is_exactly_one_at_ten_years() {
        assert_eq!(return_period_factor(10.0).unwrap(), 1.0);
    }

    #[test]
    fn test_ct_hundred_years() {
        assert_approx(return_period_factor(100.0).unwrap(), 1.440, 0.002);
    }

    #[test]
    fn test_ct_rejects_short_return_periods() {
        assert!(return_period_factor(1.0).is_err());
        assert!(return_period_factor(1.5).is_err());
        assert!(return_period_factor(f64::NAN).is_err());
        assert!(return_period_factor(2.0).is_ok());
    }

    #[test]
    fn test_ca_is_one_for_small_or_missing_area() {
        assert_eq!(area_factor(None, 1.0).unwrap(), 1.0);
        assert_eq!(area_factor(Some(0.25), 1.0).unwrap(), 1.0);
        assert_eq!(area_factor(Some(1.0), 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_ca_rejects_non_positive_area() {
        assert!(area_factor(Some(0.0), 1.0).is_err());
        assert!(area_factor(Some(-5.0), 1.0).is_err());
    }

    #[test]
    fn test_ca_monotonic_in_area_and_duration() {
        let small = area_factor(Some(10.0), 2.0).unwrap();
        let large = area_factor(Some(200.0), 2.0).unwrap();
        assert!(large < small);

        let short = area_factor(Some(50.0), 1.0).unwrap();
        let long = area_factor(Some(50.0), 24.0).unwrap();
        assert!(long > short);
        assert!(long <= 1.0);
    }

    #[test]
    fn test_regional_scenario_factors() {
        let r = regional_intensity(83.0, 100.0, 6.0, Some(25.0)).unwrap();
        assert_approx(r.ca, 0.979, 0.002);
        assert_approx(r.ct, 1.440, 0.002);
        assert_approx(r.depth_mm, r.intensity_mmhr * 6.0, 1e-9);
    }

    #[test]
    fn test_regional_three_hour_depth_matches_reference() {
        // At d = 3 h, Tr = 10 and point rainfall the depth is P3,10.
        let r = regional_intensity(78.0, 10.0, 3.0, None).unwrap();
        assert_approx(r.depth_mm, 78.0, 0.1);
    }

    #[test]
    fn test_intensity_decreases_with_duration() {
        let i1 = regional_intensity(78.0, 10.0, 1.0, None).unwrap().intensity_mmhr;
        let i3 = regional_intensity(78.0, 10.0, 3.0, None).unwrap().intensity_mmhr;
        let i6 = regional_intensity(78.0, 10.0, 6.0, None).unwrap().intensity_mmhr;
        assert!(i1 > i3 && i3 > i6);
    }

    #[test]
    fn test_intensity_increases_with_return_period() {
        let periods = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0];
        let values: Vec<f64> = periods
            .iter()
            .map(|&tr| regional_intensity(78.0, tr, 1.0, None).unwrap().intensity_mmhr)
            .collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_department_lookup() {
        assert_eq!(p3_10_for_department("Montevideo").unwrap(), 78.0);
        assert_eq!(p3_10_for_department("Treinta y Tres").unwrap(), 80.0);
        assert_eq!(p3_10_for_department("cerro_largo").unwrap(), 82.0);
        assert!(p3_10_for_department("atlantis").is_err());
    }
}
