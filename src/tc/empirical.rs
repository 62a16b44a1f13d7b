/// Closed-form Tc formulas. Every function returns hours.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{HydroError, HydroResult, require_coefficient, require_positive};

const M_TO_FT: f64 = 3.28084;
const KM_TO_MI: f64 = 0.621371;

/// Surface correction applied to Kirpich.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KirpichSurface {
    #[default]
    Natural,
    Grassy,
    Concrete,
    ConcreteChannel,
}

impl KirpichSurface {
    pub fn factor(&self) -> f64 {
        match self {
            KirpichSurface::Natural => 1.0,
            KirpichSurface::Grassy => 2.0,
            KirpichSurface::Concrete => 0.4,
            KirpichSurface::ConcreteChannel => 0.2,
        }
    }
}

impl FromStr for KirpichSurface {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "natural" => Ok(KirpichSurface::Natural),
            "grassy" => Ok(KirpichSurface::Grassy),
            "concrete" => Ok(KirpichSurface::Concrete),
            "concrete_channel" => Ok(KirpichSurface::ConcreteChannel),
            other => Err(HydroError::unknown("Kirpich surface", other)),
        }
    }
}

/// Kirpich (1940). Length in m, slope in m/m.
///
/// tc = 0.0195·L^0.77·S^−0.385 minutes, scaled by the surface factor.
pub fn kirpich(length_m: f64, slope: f64, surface: KirpichSurface) -> HydroResult<f64> {
    require_positive("length (m)", length_m)?;
    require_positive("slope (m/m)", slope)?;
    let tc_min = 0.0195 * length_m.powf(0.77) * slope.powf(-0.385) * surface.factor();
    Ok(tc_min / 60.0)
}

/// Témez. Length in km, slope in m/m.
pub fn temez(length_km: f64, slope: f64) -> HydroResult<f64> {
    require_positive("length (km)", length_km)?;
    require_positive("slope (m/m)", slope)?;
    Ok(0.3 * (length_km / slope.powf(0.25)).powf(0.76))
}

/// California Culverts Practice (1942). Length in km, elevation drop in m.
pub fn california_culverts(length_km: f64, elevation_drop_m: f64) -> HydroResult<f64> {
    require_positive("length (km)", length_km)?;
    require_positive("elevation drop (m)", elevation_drop_m)?;
    let length_mi = length_km * KM_TO_MI;
    let drop_ft = elevation_drop_m * M_TO_FT;
    let tc_min = 60.0 * (11.9 * length_mi.powi(3) / drop_ft).powf(0.385);
    Ok(tc_min / 60.0)
}

/// FAA overland flow. Length in m, slope in %, C in (0, 1].
pub fn faa(length_m: f64, slope_pct: f64, c: f64) -> HydroResult<f64> {
    require_positive("length (m)", length_m)?;
    require_positive("slope (%)", slope_pct)?;
    require_coefficient(c)?;
    let length_ft = length_m * M_TO_FT;
    let tc_min = 1.8 * (1.1 - c) * length_ft.sqrt() / slope_pct.powf(0.333);
    Ok(tc_min / 60.0)
}

/// Desbordes (urban catchments). Area in ha, slope in %, C in (0, 1], t0 in min.
///
/// tc = t0 + 6.625·A^0.3·S^−0.39·C^−0.45 minutes.
pub fn desbordes(area_ha: f64, slope_pct: f64, c: f64, entry_time_min: f64) -> HydroResult<f64> {
    require_positive("area (ha)", area_ha)?;
    require_positive("slope (%)", slope_pct)?;
    require_coefficient(c)?;
    if !entry_time_min.is_finite() || entry_time_min < 0.0 {
        return Err(HydroError::out_of_range("entry time t0 (min)", entry_time_min, ">= 0"));
    }
    let tc_min = entry_time_min
        + 6.625 * area_ha.powf(0.3) * slope_pct.powf(-0.39) * c.powf(-0.45);
    Ok(tc_min / 60.0)
}
