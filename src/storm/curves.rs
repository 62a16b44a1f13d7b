/// Dimensionless cumulative-mass curves.
///
/// SCS/NRCS 24-hour distributions (Types I, IA, II, III) and Huff (1967)
/// quartile curves at the 10, 50 and 90 % probability levels. Tables are
/// embedded; all are non-decreasing and end at 1.0, and are read with
/// piecewise-linear interpolation, which keeps them non-decreasing.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{HydroError, HydroResult};

// ---------------------------------------------------------------------------
// SCS 24-hour distributions: (hour, P/P24)
// ---------------------------------------------------------------------------

static SCS_TYPE_I: &[(f64, f64)] = &[
    (0.0, 0.000), (1.0, 0.017), (2.0, 0.035), (3.0, 0.054), (4.0, 0.076),
    (5.0, 0.100), (6.0, 0.125), (7.0, 0.156), (8.0, 0.194), (9.0, 0.254),
    (9.5, 0.303), (9.75, 0.362), (10.0, 0.515), (10.5, 0.583), (11.0, 0.624),
    (12.0, 0.682), (13.0, 0.727), (14.0, 0.767), (15.0, 0.800), (16.0, 0.830),
    (17.0, 0.856), (18.0, 0.880), (19.0, 0.903), (20.0, 0.925), (21.0, 0.945),
    (22.0, 0.964), (23.0, 0.982), (24.0, 1.000),
];

static SCS_TYPE_IA: &[(f64, f64)] = &[
    (0.0, 0.000), (1.0, 0.020), (2.0, 0.050), (3.0, 0.082), (4.0, 0.116),
    (5.0, 0.156), (6.0, 0.206), (7.0, 0.268), (7.5, 0.310), (7.75, 0.354),
    (8.0, 0.425), (8.5, 0.480), (9.0, 0.520), (10.0, 0.577), (11.0, 0.624),
    (12.0, 0.664), (13.0, 0.701), (14.0, 0.736), (15.0, 0.768), (16.0, 0.800),
    (17.0, 0.830), (18.0, 0.858), (19.0, 0.884), (20.0, 0.908), (21.0, 0.932),
    (22.0, 0.955), (23.0, 0.978), (24.0, 1.000),
];

static SCS_TYPE_II: &[(f64, f64)] = &[
    (0.0, 0.000), (1.0, 0.010), (2.0, 0.022), (3.0, 0.035), (4.0, 0.049),
    (5.0, 0.063), (6.0, 0.080), (7.0, 0.098), (8.0, 0.120), (9.0, 0.147),
    (10.0, 0.181), (11.0, 0.235), (11.5, 0.283), (11.75, 0.357), (12.0, 0.663),
    (12.5, 0.735), (13.0, 0.772), (14.0, 0.820), (15.0, 0.854), (16.0, 0.880),
    (17.0, 0.902), (18.0, 0.921), (19.0, 0.938), (20.0, 0.953), (21.0, 0.966),
    (22.0, 0.978), (23.0, 0.989), (24.0, 1.000),
];

static SCS_TYPE_III: &[(f64, f64)] = &[
    (0.0, 0.000), (1.0, 0.010), (2.0, 0.020), (3.0, 0.031), (4.0, 0.043),
    (5.0, 0.057), (6.0, 0.072), (7.0, 0.089), (8.0, 0.115), (9.0, 0.148),
    (10.0, 0.189), (11.0, 0.250), (11.5, 0.298), (11.75, 0.339), (12.0, 0.500),
    (12.5, 0.702), (13.0, 0.751), (14.0, 0.811), (15.0, 0.849), (16.0, 0.886),
    (17.0, 0.904), (18.0, 0.926), (19.0, 0.945), (20.0, 0.961), (21.0, 0.974),
    (22.0, 0.986), (23.0, 0.993), (24.0, 1.000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScsType {
    #[serde(rename = "type_i")]
    I,
    #[serde(rename = "type_ia")]
    IA,
    #[serde(rename = "type_ii")]
    II,
    #[serde(rename = "type_iii")]
    III,
}

impl ScsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScsType::I => "scs_type_i",
            ScsType::IA => "scs_type_ia",
            ScsType::II => "scs_type_ii",
            ScsType::III => "scs_type_iii",
        }
    }

    /// (hour of 24, cumulative fraction)
    pub fn table(&self) -> &'static [(f64, f64)] {
        match self {
            ScsType::I => SCS_TYPE_I,
            ScsType::IA => SCS_TYPE_IA,
            ScsType::II => SCS_TYPE_II,
            ScsType::III => SCS_TYPE_III,
        }
    }

    /// Cumulative fraction at `t` ∈ [0, 1] of the storm duration.
    pub fn fraction(&self, t: f64) -> f64 {
        interpolate(self.table(), t * 24.0)
    }
}

impl FromStr for ScsType {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_start_matches("scs_").trim_start_matches("type_") {
            "i" => Ok(ScsType::I),
            "ia" => Ok(ScsType::IA),
            "ii" => Ok(ScsType::II),
            "iii" => Ok(ScsType::III),
            _ => Err(HydroError::unknown("SCS distribution", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// Huff curves: cumulative % rain at 0, 10, ..., 100 % of the duration
// ---------------------------------------------------------------------------

/// Indexed [quartile][probability 10/50/90].
static HUFF_CURVES: [[[f64; 11]; 3]; 4] = [
    [
        [0.0, 42.0, 70.0, 82.0, 88.0, 91.0, 94.0, 96.0, 97.0, 99.0, 100.0],
        [0.0, 26.0, 52.0, 67.0, 75.0, 81.0, 86.0, 90.0, 94.0, 97.0, 100.0],
        [0.0, 12.0, 28.0, 44.0, 56.0, 65.0, 73.0, 80.0, 87.0, 94.0, 100.0],
    ],
    [
        [0.0, 13.0, 30.0, 55.0, 76.0, 86.0, 91.0, 94.0, 96.0, 98.0, 100.0],
        [0.0, 8.0, 17.0, 31.0, 53.0, 70.0, 80.0, 87.0, 92.0, 96.0, 100.0],
        [0.0, 5.0, 12.0, 22.0, 36.0, 52.0, 66.0, 77.0, 86.0, 94.0, 100.0],
    ],
    [
        [0.0, 10.0, 20.0, 30.0, 42.0, 58.0, 78.0, 90.0, 95.0, 98.0, 100.0],
        [0.0, 6.0, 12.0, 18.0, 26.0, 37.0, 57.0, 77.0, 89.0, 96.0, 100.0],
        [0.0, 4.0, 8.0, 13.0, 19.0, 26.0, 38.0, 56.0, 74.0, 88.0, 100.0],
    ],
    [
        [0.0, 8.0, 16.0, 24.0, 32.0, 40.0, 50.0, 60.0, 75.0, 92.0, 100.0],
        [0.0, 5.0, 10.0, 15.0, 20.0, 26.0, 33.0, 42.0, 56.0, 80.0, 100.0],
        [0.0, 2.0, 5.0, 8.0, 11.0, 15.0, 20.0, 26.0, 35.0, 57.0, 100.0],
    ],
];

/// Quarter of the storm holding the heaviest rainfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuffQuartile {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl HuffQuartile {
    pub fn as_str(&self) -> &'static str {
        match self {
            HuffQuartile::Q1 => "q1",
            HuffQuartile::Q2 => "q2",
            HuffQuartile::Q3 => "q3",
            HuffQuartile::Q4 => "q4",
        }
    }

    fn index(&self) -> usize {
        match self {
            HuffQuartile::Q1 => 0,
            HuffQuartile::Q2 => 1,
            HuffQuartile::Q3 => 2,
            HuffQuartile::Q4 => 3,
        }
    }

    pub fn from_number(q: u8) -> HydroResult<Self> {
        match q {
            1 => Ok(HuffQuartile::Q1),
            2 => Ok(HuffQuartile::Q2),
            3 => Ok(HuffQuartile::Q3),
            4 => Ok(HuffQuartile::Q4),
            _ => Err(HydroError::out_of_range("Huff quartile", q as f64, "1, 2, 3 or 4")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuffProbability {
    P10,
    #[default]
    P50,
    P90,
}

impl HuffProbability {
    fn index(&self) -> usize {
        match self {
            HuffProbability::P10 => 0,
            HuffProbability::P50 => 1,
            HuffProbability::P90 => 2,
        }
    }

    pub fn percent(&self) -> u8 {
        match self {
            HuffProbability::P10 => 10,
            HuffProbability::P50 => 50,
            HuffProbability::P90 => 90,
        }
    }

    pub fn from_percent(p: u8) -> HydroResult<Self> {
        match p {
            10 => Ok(HuffProbability::P10),
            50 => Ok(HuffProbability::P50),
            90 => Ok(HuffProbability::P90),
            _ => Err(HydroError::out_of_range("Huff probability (%)", p as f64, "10, 50 or 90")),
        }
    }
}

/// Cumulative fraction at `t` ∈ [0, 1] on the Huff curve.
pub fn huff_fraction(quartile: HuffQuartile, probability: HuffProbability, t: f64) -> f64 {
    let row = &HUFF_CURVES[quartile.index()][probability.index()];
    let pos = (t.clamp(0.0, 1.0) * 10.0).min(10.0);
    let i = (pos.floor() as usize).min(9);
    let frac = pos - i as f64;
    (row[i] + (row[i + 1] - row[i]) * frac) / 100.0
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Linear interpolation on a table sorted by x, clamped at the ends.
pub fn interpolate(table: &[(f64, f64)], x: f64) -> f64 {
    let Some(&(x0, y0)) = table.first() else {
        return 0.0;
    };
    if x <= x0 {
        return y0;
    }
    for pair in table.windows(2) {
        let (xa, ya) = pair[0];
        let (xb, yb) = pair[1];
        if x <= xb {
            return ya + (yb - ya) * (x - xa) / (xb - xa);
        }
    }
    table[table.len() - 1].1
}

/// Incremental depths for `n` equal steps of a cumulative mass curve.
pub fn mass_curve_depths<F>(total_depth: f64, n: usize, fraction: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    let mut depths = Vec::with_capacity(n);
    let mut previous = fraction(0.0) * total_depth;
    for k in 1..=n {
        let current = fraction(k as f64 / n as f64) * total_depth;
        depths.push((current - previous).max(0.0));
        previous = current;
    }
    depths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scs_tables_are_monotonic_and_complete() {
        for kind in [ScsType::I, ScsType::IA, ScsType::II, ScsType::III] {
            let table = kind.table();
            assert_eq!(table.first().unwrap().1, 0.0);
            assert_eq!(table.last().unwrap(), &(24.0, 1.0));
            assert!(table.windows(2).all(|w| w[0].0 < w[1].0 && w[0].1 <= w[1].1));
        }
    }

    #[test]
    fn test_huff_curves_are_monotonic() {
        for quartile in HUFF_CURVES.iter() {
            for row in quartile.iter() {
                assert_eq!(row[0], 0.0);
                assert_eq!(row[10], 100.0);
                assert!(row.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }

    #[test]
    fn test_huff_quartile_holds_heaviest_rain() {
        let quartiles = [HuffQuartile::Q1, HuffQuartile::Q2, HuffQuartile::Q3, HuffQuartile::Q4];
        let levels = [HuffProbability::P10, HuffProbability::P50, HuffProbability::P90];
        for (q, quartile) in quartiles.iter().enumerate() {
            for level in levels {
                let quarter_depth = |k: usize| {
                    huff_fraction(*quartile, level, (k + 1) as f64 / 4.0)
                        - huff_fraction(*quartile, level, k as f64 / 4.0)
                };
                let best = (0..4)
                    .max_by(|a, b| quarter_depth(*a).total_cmp(&quarter_depth(*b)))
                    .unwrap();
                assert_eq!(best, q, "Q{} at P{} should peak in its own quarter", q + 1, level.percent());
            }
        }
    }

    #[test]
    fn test_interpolate_between_and_beyond_points() {
        let table = [(0.0, 0.0), (10.0, 1.0)];
        assert_eq!(interpolate(&table, 5.0), 0.5);
        assert_eq!(interpolate(&table, -1.0), 0.0);
        assert_eq!(interpolate(&table, 20.0), 1.0);
    }

    #[test]
    fn test_type_ii_peaks_near_noon() {
        let depths = mass_curve_depths(100.0, 48, |t| ScsType::II.fraction(t));
        let peak = depths
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 23); // 11:30 to 12:00
        let total: f64 = depths.iter().sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_scs_type_from_str() {
        assert_eq!("II".parse::<ScsType>().unwrap(), ScsType::II);
        assert_eq!("scs_type_ia".parse::<ScsType>().unwrap(), ScsType::IA);
        assert!("iv".parse::<ScsType>().is_err());
    }

    #[test]
    fn test_huff_from_numbers() {
        assert_eq!(HuffQuartile::from_number(3).unwrap(), HuffQuartile::Q3);
        assert!(HuffQuartile::from_number(5).is_err());
        assert_eq!(HuffProbability::from_percent(90).unwrap(), HuffProbability::P90);
        assert!(HuffProbability::from_percent(75).is_err());
    }
}
