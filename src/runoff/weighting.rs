/// Area-weighted composite runoff parameters: Σ(value·area)/Σarea.

use crate::error::{HydroError, HydroResult, require_coefficient, require_curve_number};

/// One part of a catchment and its C or CN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubArea {
    pub area_ha: f64,
    pub value: f64,
}

impl SubArea {
    pub fn new(area_ha: f64, value: f64) -> Self {
        SubArea { area_ha, value }
    }
}

fn area_weighted(parts: &[SubArea]) -> HydroResult<f64> {
    if parts.is_empty() {
        return Err(HydroError::series("no sub-areas to weight"));
    }
    if let Some(bad) = parts.iter().find(|p| !p.area_ha.is_finite() || p.area_ha < 0.0) {
        return Err(HydroError::out_of_range("sub-area (ha)", bad.area_ha, ">= 0"));
    }
    let total: f64 = parts.iter().map(|p| p.area_ha).sum();
    if total <= 0.0 {
        return Err(HydroError::out_of_range("total sub-area (ha)", total, "> 0"));
    }
    Ok(parts.iter().map(|p| p.value * p.area_ha).sum::<f64>() / total)
}

pub fn weighted_c(parts: &[SubArea]) -> HydroResult<f64> {
    for part in parts {
        require_coefficient(part.value)?;
    }
    area_weighted(parts)
}

pub fn weighted_cn(parts: &[SubArea]) -> HydroResult<f64> {
    for part in parts {
        require_curve_number(part.value)?;
    }
    area_weighted(parts)
}

/// Pairs parallel area and value slices.
pub fn sub_areas(areas_ha: &[f64], values: &[f64]) -> HydroResult<Vec<SubArea>> {
    if areas_ha.len() != values.len() {
        return Err(HydroError::series(format!(
            "{} areas but {} values",
            areas_ha.len(),
            values.len()
        )));
    }
    Ok(areas_ha.iter().zip(values).map(|(a, v)| SubArea::new(*a, *v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_cn() {
        let parts = sub_areas(&[200.0, 150.0, 100.0, 50.0], &[72.0, 69.0, 55.0, 82.0]).unwrap();
        let cn = weighted_cn(&parts).unwrap();
        assert!((cn - 68.7).abs() < 1e-9);
    }

    #[test]
    fn test_composite_c() {
        let parts = [SubArea::new(3.0, 0.9), SubArea::new(1.0, 0.1)];
        assert!((weighted_c(&parts).unwrap() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_parts() {
        assert!(sub_areas(&[1.0, 2.0], &[70.0]).is_err());
        assert!(weighted_cn(&[]).is_err());
        assert!(weighted_cn(&[SubArea::new(0.0, 70.0)]).is_err());
        assert!(weighted_cn(&[SubArea::new(10.0, 20.0)]).is_err());
        assert!(weighted_c(&[SubArea::new(10.0, 1.5)]).is_err());
    }
}
