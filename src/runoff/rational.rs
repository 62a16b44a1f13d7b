/// Rational method: Q = 0.00278·Cf·C·i·A with Q in m³/s, i in mm/h and A
/// in hectares. Cf is the FHWA frequency factor; Cf·C is capped at 1.

use crate::error::{HydroResult, require_coefficient, require_positive};
use crate::runoff::tables::frequency_factor;

/// Unit factor for mm/h × ha → m³/s (1/360).
pub const RATIONAL_UNIT_FACTOR: f64 = 0.00278;

pub fn rational_peak_flow(c: f64, intensity_mmhr: f64, area_ha: f64, return_period: f64) -> HydroResult<f64> {
    require_coefficient(c)?;
    require_positive("intensity (mm/h)", intensity_mmhr)?;
    require_positive("area (ha)", area_ha)?;
    require_positive("return period T (years)", return_period)?;
    let effective = (frequency_factor(return_period) * c).min(1.0);
    Ok(RATIONAL_UNIT_FACTOR * effective * intensity_mmhr * area_ha)
}

/// Excess per interval as a fixed fraction of the rainfall.
pub fn coefficient_excess(depths_mm: &[f64], c: f64) -> HydroResult<Vec<f64>> {
    require_coefficient(c)?;
    Ok(depths_mm.iter().map(|d| c * d).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_flow() {
        // 0.00278 * 0.65 * 100 * 25 = 4.5175
        let q = rational_peak_flow(0.65, 100.0, 25.0, 10.0).unwrap();
        assert!((q - 4.5175).abs() < 1e-9);
        // Cf = 1.25 at 100 years, 0.9 * 1.25 capped at 1
        let q = rational_peak_flow(0.9, 100.0, 25.0, 100.0).unwrap();
        assert!((q - 0.00278 * 100.0 * 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(rational_peak_flow(0.0, 100.0, 25.0, 10.0).is_err());
        assert!(rational_peak_flow(1.1, 100.0, 25.0, 10.0).is_err());
        assert!(rational_peak_flow(0.5, 100.0, -1.0, 10.0).is_err());
    }

    #[test]
    fn test_coefficient_excess() {
        let excess = coefficient_excess(&[2.0, 4.0, 0.0], 0.5).unwrap();
        assert_eq!(excess, vec![1.0, 2.0, 0.0]);
    }
}
