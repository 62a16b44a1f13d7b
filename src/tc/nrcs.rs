/// NRCS (TR-55) velocity method.
///
/// Tc is the sum of travel times along the flow path, split into sheet,
/// shallow concentrated and channel flow. Lengths in m, slopes in m/m,
/// results in hours.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{HydroError, HydroResult, require_positive};

/// Sheet flow is limited to short overland distances (m).
pub const MAX_SHEET_LENGTH_M: f64 = 100.0;
/// 2-year 24-hour depth used when a sheet segment does not give one (mm).
pub const DEFAULT_P2_MM: f64 = 50.0;

const M_TO_FT: f64 = 3.28084;
const MM_TO_IN: f64 = 1.0 / 25.4;

/// Manning n for sheet flow by surface cover (TR-55 table 3-1).
pub static SHEET_FLOW_N: &[(&str, f64)] = &[
    ("smooth", 0.011),
    ("fallow", 0.05),
    ("cultivated_low_residue", 0.06),
    ("cultivated_high_residue", 0.17),
    ("short_grass", 0.15),
    ("dense_grass", 0.24),
    ("bermuda_grass", 0.41),
    ("range", 0.13),
    ("light_woods", 0.40),
    ("dense_woods", 0.80),
];

pub fn sheet_flow_n(cover: &str) -> HydroResult<f64> {
    let key = cover.trim().to_lowercase().replace(' ', "_");
    SHEET_FLOW_N
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, n)| *n)
        .ok_or_else(|| HydroError::unknown("sheet flow cover", cover))
}

/// Surface for shallow concentrated flow; selects k in V = k·√S (m/s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShallowSurface {
    Paved,
    #[default]
    Unpaved,
    Grassed,
    ShortGrass,
}

impl ShallowSurface {
    pub fn velocity_coefficient(&self) -> f64 {
        match self {
            ShallowSurface::Paved => 6.196,
            ShallowSurface::Unpaved => 4.918,
            ShallowSurface::Grassed => 4.572,
            ShallowSurface::ShortGrass => 2.134,
        }
    }
}

/// One reach of the flow path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum FlowSegment {
    Sheet {
        length_m: f64,
        manning_n: f64,
        slope: f64,
        #[serde(default)]
        p2_mm: Option<f64>,
    },
    Shallow {
        length_m: f64,
        slope: f64,
        #[serde(default)]
        surface: ShallowSurface,
    },
    Channel {
        length_m: f64,
        manning_n: f64,
        slope: f64,
        hydraulic_radius_m: f64,
    },
}

impl FlowSegment {
    pub fn regime(&self) -> &'static str {
        match self {
            FlowSegment::Sheet { .. } => "sheet",
            FlowSegment::Shallow { .. } => "shallow",
            FlowSegment::Channel { .. } => "channel",
        }
    }

    /// Travel time through this segment (h).
    pub fn travel_time(&self) -> HydroResult<f64> {
        match *self {
            FlowSegment::Sheet { length_m, manning_n, slope, p2_mm } => {
                sheet_flow_time(length_m, manning_n, slope, p2_mm.unwrap_or(DEFAULT_P2_MM))
            }
            FlowSegment::Shallow { length_m, slope, surface } => {
                shallow_flow_time(length_m, slope, surface)
            }
            FlowSegment::Channel { length_m, manning_n, slope, hydraulic_radius_m } => {
                channel_flow_time(length_m, manning_n, slope, hydraulic_radius_m)
            }
        }
    }
}

/// Sheet flow, TR-55 eq. 3-3 evaluated in US units.
pub fn sheet_flow_time(length_m: f64, manning_n: f64, slope: f64, p2_mm: f64) -> HydroResult<f64> {
    require_positive("sheet flow length (m)", length_m)?;
    if length_m > MAX_SHEET_LENGTH_M {
        return Err(HydroError::out_of_range(
            "sheet flow length (m)",
            length_m,
            "<= 100 m",
        ));
    }
    require_positive("Manning n", manning_n)?;
    require_positive("slope (m/m)", slope)?;
    require_positive("P2 (mm)", p2_mm)?;

    let length_ft = length_m * M_TO_FT;
    let p2_in = p2_mm * MM_TO_IN;
    Ok(0.007 * (manning_n * length_ft).powf(0.8) / (p2_in.sqrt() * slope.powf(0.4)))
}

pub fn shallow_flow_time(length_m: f64, slope: f64, surface: ShallowSurface) -> HydroResult<f64> {
    require_positive("shallow flow length (m)", length_m)?;
    require_positive("slope (m/m)", slope)?;
    let velocity = surface.velocity_coefficient() * slope.sqrt();
    Ok(length_m / (velocity * 3600.0))
}

/// Channel flow with Manning velocity V = R^(2/3)·S^(1/2)/n.
pub fn channel_flow_time(length_m: f64, manning_n: f64, slope: f64, hydraulic_radius_m: f64) -> HydroResult<f64> {
    require_positive("channel length (m)", length_m)?;
    require_positive("Manning n", manning_n)?;
    require_positive("slope (m/m)", slope)?;
    require_positive("hydraulic radius (m)", hydraulic_radius_m)?;
    let velocity = hydraulic_radius_m.powf(2.0 / 3.0) * slope.sqrt() / manning_n;
    if velocity > 5.0 {
        warn!(velocity_ms = velocity, "unusually high channel velocity");
    }
    Ok(length_m / (velocity * 3600.0))
}

/// Sums travel times over 1 to 3 segments, at most one per flow regime.
pub fn velocity_method(segments: &[FlowSegment]) -> HydroResult<f64> {
    if segments.is_empty() {
        return Err(HydroError::missing("flow_segments", "NRCS velocity method"));
    }
    if segments.len() > 3 {
        return Err(HydroError::series(format!(
            "NRCS velocity method takes at most 3 segments, got {}",
            segments.len()
        )));
    }
    for (i, a) in segments.iter().enumerate() {
        if segments[i + 1..].iter().any(|b| b.regime() == a.regime()) {
            return Err(HydroError::series(format!(
                "duplicate {} flow segment",
                a.regime()
            )));
        }
    }

    segments.iter().map(FlowSegment::travel_time).sum()
}
