/// Synthetic unit-hydrograph shapes as continuous functions of time.
///
/// Each shape gives discharge per mm of excess (m³/s/mm) for a catchment
/// area in km², with times in hours. The values here are the textbook
/// forms; `super::unit_hydrograph` samples them and rescales the samples
/// to exactly one millimetre of runoff.

use crate::error::{HydroResult, require_positive, require_within};
use crate::storm::curves::interpolate;

/// Standard SCS triangular shape factor (tb = 2.67·tp).
pub const STANDARD_X: f64 = 1.67;
/// Gamma shape parameter matching the SCS curvilinear hydrograph (PRF 484).
pub const DEFAULT_GAMMA_M: f64 = 3.7;
pub const DEFAULT_SNYDER_CT: f64 = 2.0;
pub const DEFAULT_SNYDER_CP: f64 = 0.6;

const KM_TO_MI: f64 = 0.621371;
const KM2_TO_MI2: f64 = 0.386102;
const CFS_TO_M3S: f64 = 0.0283168;
const MM_PER_INCH: f64 = 25.4;

/// Continuous shape: peak time, base time and q(t).
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub time_to_peak_hr: f64,
    pub time_base_hr: f64,
    pub peak_m3s_per_mm: f64,
    /// (t, q) breakpoints, linear in between, zero outside.
    pub points: Vec<(f64, f64)>,
}

impl Shape {
    pub fn discharge(&self, t_hr: f64) -> f64 {
        if t_hr <= 0.0 || t_hr >= self.time_base_hr {
            return 0.0;
        }
        interpolate(&self.points, t_hr)
    }
}

/// SCS lag relation tp = dt/2 + 0.6·Tc (h).
pub fn scs_time_to_peak(tc_hr: f64, dt_hr: f64) -> HydroResult<f64> {
    require_positive("Tc (h)", tc_hr)?;
    require_positive("time step (h)", dt_hr)?;
    Ok(dt_hr / 2.0 + 0.6 * tc_hr)
}

/// Triangle with tb = (1 + X)·tp and qp = (A/3.6)·2/((1 + X)·tp).
///
/// X = 1.67 gives the SCS triangle (qp = 0.208·A/tp); lower X sharpens
/// the peak, higher X flattens it.
pub fn triangular(area_km2: f64, tc_hr: f64, dt_hr: f64, x: f64) -> HydroResult<Shape> {
    require_positive("area (km²)", area_km2)?;
    require_positive("shape factor X", x)?;
    let tp = scs_time_to_peak(tc_hr, dt_hr)?;
    let tb = (1.0 + x) * tp;
    let qp = area_km2 / 3.6 * 2.0 / tb;
    Ok(Shape {
        time_to_peak_hr: tp,
        time_base_hr: tb,
        peak_m3s_per_mm: qp,
        points: vec![(0.0, 0.0), (tp, qp), (tb, 0.0)],
    })
}

/// NRCS dimensionless curvilinear hydrograph, (t/tp, q/qp).
static SCS_DIMENSIONLESS: &[(f64, f64)] = &[
    (0.0, 0.000), (0.1, 0.030), (0.2, 0.100), (0.3, 0.190), (0.4, 0.310),
    (0.5, 0.470), (0.6, 0.660), (0.7, 0.820), (0.8, 0.930), (0.9, 0.990),
    (1.0, 1.000), (1.1, 0.990), (1.2, 0.930), (1.3, 0.860), (1.4, 0.780),
    (1.5, 0.680), (1.6, 0.560), (1.7, 0.460), (1.8, 0.390), (1.9, 0.330),
    (2.0, 0.280), (2.2, 0.207), (2.4, 0.147), (2.6, 0.107), (2.8, 0.077),
    (3.0, 0.055), (3.2, 0.040), (3.4, 0.029), (3.6, 0.021), (3.8, 0.015),
    (4.0, 0.011), (4.5, 0.005), (5.0, 0.000),
];

pub fn curvilinear(area_km2: f64, tc_hr: f64, dt_hr: f64) -> HydroResult<Shape> {
    require_positive("area (km²)", area_km2)?;
    let tp = scs_time_to_peak(tc_hr, dt_hr)?;
    let qp = 0.208 * area_km2 / tp;
    Ok(Shape {
        time_to_peak_hr: tp,
        time_base_hr: 5.0 * tp,
        peak_m3s_per_mm: qp,
        points: SCS_DIMENSIONLESS.iter().map(|(x, y)| (x * tp, y * qp)).collect(),
    })
}

/// Gamma shape q/qp = (t/tp)^m·e^(m(1 − t/tp)), tabulated every 0.05·tp
/// until it drops below 0.1 % of the peak.
pub fn gamma(area_km2: f64, tc_hr: f64, dt_hr: f64, m: f64) -> HydroResult<Shape> {
    require_positive("area (km²)", area_km2)?;
    require_within("gamma shape m", m, 0.5, 20.0, "0.5 <= m <= 20")?;
    let tp = scs_time_to_peak(tc_hr, dt_hr)?;
    let qp = 0.208 * area_km2 / tp;

    let mut points = Vec::new();
    let mut x: f64 = 0.0;
    loop {
        let ratio = x.powf(m) * (m * (1.0 - x)).exp();
        points.push((x * tp, ratio * qp));
        if (x > 1.0 && ratio < 1.0e-3) || x >= 20.0 {
            break;
        }
        x += 0.05;
    }
    if let Some(last) = points.last_mut() {
        last.1 = 0.0;
    }
    let tb = points.last().map(|p| p.0).unwrap_or(tp);
    Ok(Shape { time_to_peak_hr: tp, time_base_hr: tb, peak_m3s_per_mm: qp, points })
}

/// Snyder (1938) synthetic hydrograph from channel length and centroid
/// distance (km).
///
/// tp = Ct·(L·Lc)^0.3 and qp = 640·Cp·A/tp in US units; the shape runs
/// through the W50 and W75 widths, one third before the peak, and ends at
/// tp + 3·W50.
pub fn snyder(area_km2: f64, length_km: f64, centroid_km: f64, ct: f64, cp: f64) -> HydroResult<Shape> {
    require_positive("area (km²)", area_km2)?;
    require_positive("channel length (km)", length_km)?;
    require_positive("centroid distance (km)", centroid_km)?;
    require_positive("Snyder Ct", ct)?;
    require_within("Snyder Cp", cp, 0.05, 1.0, "0.05 <= Cp <= 1")?;

    let tp = ct * (length_km * KM_TO_MI * centroid_km * KM_TO_MI).powf(0.3);
    let area_mi2 = area_km2 * KM2_TO_MI2;
    let qp_cfs_per_inch = 640.0 * cp * area_mi2 / tp;
    let qp = qp_cfs_per_inch * CFS_TO_M3S / MM_PER_INCH;

    let unit_peak = qp_cfs_per_inch / area_mi2;
    let w50 = 770.0 * unit_peak.powf(-1.08);
    let w75 = 440.0 * unit_peak.powf(-1.08);

    let rise_50 = (tp - w50 / 3.0).max(0.25 * tp);
    let rise_75 = (tp - w75 / 3.0).max((rise_50 + tp) / 2.0);
    let tb = tp + 3.0 * w50;
    Ok(Shape {
        time_to_peak_hr: tp,
        time_base_hr: tb,
        peak_m3s_per_mm: qp,
        points: vec![
            (0.0, 0.0),
            (rise_50, 0.5 * qp),
            (rise_75, 0.75 * qp),
            (tp, qp),
            (tp + 2.0 * w75 / 3.0, 0.75 * qp),
            (tp + 2.0 * w50 / 3.0, 0.5 * qp),
            (tb, 0.0),
        ],
    })
}
