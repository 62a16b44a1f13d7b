/// Shared value types passed between pipeline stages.
///
/// Every type here is produced once by one stage and then only read. Units
/// are fixed per field and carried in the field name: depths in mm,
/// intensities in mm/h, catchment area in hectares, discharge in m³/s,
/// volume in m³. Methods that need another unit convert at their own
/// boundary (see `CatchmentParameters::area_km2`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{HydroError, HydroResult, require_positive};
use crate::runoff::SoilGroup;
use crate::tc::{FlowSegment, KirpichSurface};

// ---------------------------------------------------------------------------
// Antecedent moisture
// ---------------------------------------------------------------------------

/// Antecedent moisture condition (AMC I/II/III).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AntecedentMoisture {
    Dry,
    #[default]
    Average,
    Wet,
}

impl AntecedentMoisture {
    pub fn as_str(&self) -> &'static str {
        match self {
            AntecedentMoisture::Dry => "dry",
            AntecedentMoisture::Average => "average",
            AntecedentMoisture::Wet => "wet",
        }
    }
}

impl FromStr for AntecedentMoisture {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dry" | "i" | "1" => Ok(AntecedentMoisture::Dry),
            "average" | "ii" | "2" => Ok(AntecedentMoisture::Average),
            "wet" | "iii" | "3" => Ok(AntecedentMoisture::Wet),
            other => Err(HydroError::unknown("antecedent moisture class", other)),
        }
    }
}

impl fmt::Display for AntecedentMoisture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Catchment
// ---------------------------------------------------------------------------

/// Physical description of a single lumped catchment.
///
/// Required geometry is always present; everything a particular method
/// needs on top of that is optional and checked by the method itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentParameters {
    #[serde(default)]
    pub name: String,
    /// Drainage area (ha).
    pub area_ha: f64,
    /// Mean slope of the main channel (%).
    pub slope_pct: f64,
    /// Length of the main channel (m).
    pub length_m: f64,
    /// 3-hour, 10-year design rainfall depth (mm).
    pub p3_10: f64,

    pub runoff_coefficient: Option<f64>,
    pub curve_number: Option<f64>,
    #[serde(default)]
    pub amc: AntecedentMoisture,
    /// Hydrologic soil group, reported with curve-number runoff.
    #[serde(default)]
    pub soil_group: Option<SoilGroup>,

    /// Elevation drop along the main channel (m), California Culverts method.
    #[serde(default)]
    pub elevation_drop_m: Option<f64>,
    /// Overland Manning roughness, kinematic wave method.
    #[serde(default)]
    pub manning_n: Option<f64>,
    /// Design intensity for the closed-form kinematic wave (mm/h).
    #[serde(default)]
    pub design_intensity_mmhr: Option<f64>,
    /// Distance along the channel from outlet to the centroid (m), Snyder.
    #[serde(default)]
    pub centroid_length_m: Option<f64>,
    /// Entry time for Desbordes (min).
    #[serde(default)]
    pub entry_time_min: Option<f64>,
    #[serde(default)]
    pub kirpich_surface: KirpichSurface,
    /// Flow path segments for the NRCS velocity method.
    #[serde(default)]
    pub flow_segments: Vec<FlowSegment>,
}

impl CatchmentParameters {
    /// Minimal catchment with the four required quantities.
    pub fn new(name: &str, area_ha: f64, slope_pct: f64, length_m: f64, p3_10: f64) -> Self {
        CatchmentParameters {
            name: name.to_string(),
            area_ha,
            slope_pct,
            length_m,
            p3_10,
            runoff_coefficient: None,
            curve_number: None,
            amc: AntecedentMoisture::Average,
            soil_group: None,
            elevation_drop_m: None,
            manning_n: None,
            design_intensity_mmhr: None,
            centroid_length_m: None,
            entry_time_min: None,
            kirpich_surface: KirpichSurface::Natural,
            flow_segments: Vec::new(),
        }
    }

    pub fn with_coefficient(mut self, c: f64) -> Self {
        self.runoff_coefficient = Some(c);
        self
    }

    pub fn with_curve_number(mut self, cn: f64, amc: AntecedentMoisture) -> Self {
        self.curve_number = Some(cn);
        self.amc = amc;
        self
    }

    /// Rejects non-positive geometry and base depth.
    pub fn validate(&self) -> HydroResult<()> {
        require_positive("area_ha", self.area_ha)?;
        require_positive("slope_pct", self.slope_pct)?;
        require_positive("length_m", self.length_m)?;
        require_positive("p3_10", self.p3_10)?;
        Ok(())
    }

    /// 1 km² = 100 ha.
    pub fn area_km2(&self) -> f64 {
        self.area_ha / 100.0
    }

    pub fn area_m2(&self) -> f64 {
        self.area_ha * 10_000.0
    }

    /// Slope as a ratio (m/m).
    pub fn slope_ratio(&self) -> f64 {
        self.slope_pct / 100.0
    }

    pub fn length_km(&self) -> f64 {
        self.length_m / 1000.0
    }
}

// ---------------------------------------------------------------------------
// IDF
// ---------------------------------------------------------------------------

/// Intensity and depth of the design rainfall for one (Tr, d) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IdfResult {
    pub return_period: f64,
    pub duration_hr: f64,
    pub intensity_mmhr: f64,
    pub depth_mm: f64,
    /// Return-period correction factor (1.0 for curves that have none).
    pub ct: f64,
    /// Areal reduction factor (1.0 for curves that have none).
    pub ca: f64,
}

// ---------------------------------------------------------------------------
// Time of concentration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TcResult {
    pub method: String,
    pub tc_hr: f64,
    pub tc_min: f64,
    /// Method inputs after unit conversion, for reporting.
    pub parameters: BTreeMap<String, f64>,
}

impl TcResult {
    pub fn from_hours(method: &str, tc_hr: f64, parameters: BTreeMap<String, f64>) -> Self {
        TcResult {
            method: method.to_string(),
            tc_hr,
            tc_min: tc_hr * 60.0,
            parameters,
        }
    }
}

// ---------------------------------------------------------------------------
// Hyetograph
// ---------------------------------------------------------------------------

/// One interval of a hyetograph. `time_min` is the end of the interval and
/// `cumulative_mm` is the depth fallen up to that instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyetographStep {
    pub time_min: f64,
    pub depth_mm: f64,
    pub intensity_mmhr: f64,
    pub cumulative_mm: f64,
}

/// Rainfall time series at a fixed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyetograph {
    pub method: String,
    pub step_min: f64,
    pub steps: Vec<HyetographStep>,
}

impl Hyetograph {
    /// Builds the series from incremental depths. Intensity is depth·60/dt.
    pub fn from_depths(method: &str, step_min: f64, depths: &[f64]) -> HydroResult<Self> {
        require_positive("time step dt (min)", step_min)?;
        if depths.is_empty() {
            return Err(HydroError::series("hyetograph needs at least one interval"));
        }
        if let Some(bad) = depths.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(HydroError::out_of_range(
                "incremental depth (mm)",
                *bad,
                ">= 0",
            ));
        }

        let mut cumulative = 0.0;
        let steps = depths
            .iter()
            .enumerate()
            .map(|(i, &depth)| {
                cumulative += depth;
                HyetographStep {
                    time_min: (i + 1) as f64 * step_min,
                    depth_mm: depth,
                    intensity_mmhr: depth * 60.0 / step_min,
                    cumulative_mm: cumulative,
                }
            })
            .collect();

        Ok(Hyetograph {
            method: method.to_string(),
            step_min,
            steps,
        })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn duration_min(&self) -> f64 {
        self.steps.len() as f64 * self.step_min
    }

    pub fn total_depth(&self) -> f64 {
        self.steps.last().map(|s| s.cumulative_mm).unwrap_or(0.0)
    }

    pub fn depths(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.depth_mm).collect()
    }

    pub fn intensities(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.intensity_mmhr).collect()
    }

    pub fn cumulative(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.cumulative_mm).collect()
    }

    /// Index of the wettest interval; ties go to the earliest.
    pub fn peak_index(&self) -> usize {
        let mut best = 0;
        for (i, step) in self.steps.iter().enumerate() {
            if step.depth_mm > self.steps[best].depth_mm {
                best = i;
            }
        }
        best
    }

    pub fn peak_intensity(&self) -> f64 {
        self.steps
            .get(self.peak_index())
            .map(|s| s.intensity_mmhr)
            .unwrap_or(0.0)
    }
}

/// Storm summary handed to report/persistence collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StormResult {
    pub method: String,
    pub return_period: f64,
    pub duration_hr: f64,
    pub step_min: f64,
    pub total_depth_mm: f64,
    pub peak_intensity_mmhr: f64,
    pub times_min: Vec<f64>,
    pub intensities_mmhr: Vec<f64>,
}

impl StormResult {
    pub fn from_hyetograph(hyetograph: &Hyetograph, return_period: f64) -> Self {
        StormResult {
            method: hyetograph.method.clone(),
            return_period,
            duration_hr: hyetograph.duration_min() / 60.0,
            step_min: hyetograph.step_min,
            total_depth_mm: hyetograph.total_depth(),
            peak_intensity_mmhr: hyetograph.peak_intensity(),
            times_min: hyetograph.steps.iter().map(|s| s.time_min).collect(),
            intensities_mmhr: hyetograph.intensities(),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit hydrograph and final hydrograph
// ---------------------------------------------------------------------------

/// Response to 1 mm of excess over the catchment, sampled at `k·step_hr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitHydrograph {
    pub method: String,
    pub step_hr: f64,
    pub area_km2: f64,
    /// Time to peak of the continuous shape.
    pub time_to_peak_hr: f64,
    /// Time of the final (zero) ordinate.
    pub time_base_hr: f64,
    /// Largest ordinate after normalization (m³/s per mm).
    pub peak_m3s_per_mm: f64,
    /// Discharge ordinates (m³/s per mm), starting and ending at zero.
    pub ordinates: Vec<f64>,
}

impl UnitHydrograph {
    pub fn times_hr(&self) -> Vec<f64> {
        (0..self.ordinates.len())
            .map(|k| k as f64 * self.step_hr)
            .collect()
    }

    /// Volume represented by the ordinates (m³); 1 mm over the area when normalized.
    pub fn volume_m3(&self) -> f64 {
        self.ordinates.iter().sum::<f64>() * self.step_hr * 3600.0
    }
}

/// Final discharge series and the scalars derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrographResult {
    pub method: String,
    pub return_period: f64,
    pub shape_factor: Option<f64>,
    pub area_ha: f64,
    pub step_hr: f64,
    pub peak_flow_m3s: f64,
    pub time_to_peak_hr: f64,
    pub time_base_hr: f64,
    pub volume_m3: f64,
    pub rainfall_depth_mm: f64,
    pub runoff_depth_mm: f64,
    pub times_hr: Vec<f64>,
    pub flows_m3s: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amc_parses_names_and_roman_classes() {
        assert_eq!("dry".parse::<AntecedentMoisture>().unwrap(), AntecedentMoisture::Dry);
        assert_eq!("III".parse::<AntecedentMoisture>().unwrap(), AntecedentMoisture::Wet);
        assert!("soggy".parse::<AntecedentMoisture>().is_err());
    }

    #[test]
    fn test_catchment_unit_conversions() {
        let c = CatchmentParameters::new("test", 250.0, 2.5, 800.0, 78.0);
        assert_eq!(c.area_km2(), 2.5);
        assert_eq!(c.area_m2(), 2_500_000.0);
        assert!((c.slope_ratio() - 0.025).abs() < 1e-12);
        assert!((c.length_km() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_catchment_validate_rejects_zero_slope() {
        let c = CatchmentParameters::new("flat", 25.0, 0.0, 800.0, 45.0);
        assert!(matches!(c.validate(), Err(HydroError::OutOfRange { .. })));
    }

    #[test]
    fn test_hyetograph_from_depths() {
        let h = Hyetograph::from_depths("test", 10.0, &[1.0, 4.0, 2.0]).unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h.total_depth(), 7.0);
        assert_eq!(h.duration_min(), 30.0);
        assert_eq!(h.steps[1].intensity_mmhr, 24.0);
        assert_eq!(h.steps[2].time_min, 30.0);
        assert_eq!(h.cumulative(), vec![1.0, 5.0, 7.0]);
        assert_eq!(h.peak_index(), 1);
    }

    #[test]
    fn test_hyetograph_rejects_negative_depths() {
        assert!(Hyetograph::from_depths("bad", 5.0, &[1.0, -0.5]).is_err());
        assert!(Hyetograph::from_depths("empty", 5.0, &[]).is_err());
    }

    #[test]
    fn test_peak_index_ties_go_to_earliest() {
        let h = Hyetograph::from_depths("tie", 5.0, &[1.0, 3.0, 3.0, 1.0]).unwrap();
        assert_eq!(h.peak_index(), 1);
    }
}
