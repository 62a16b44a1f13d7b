/// Embedded runoff coefficient and curve-number tables.
///
/// Ven Te Chow (Applied Hydrology, table 5.5.2) gives C per return period;
/// FHWA HEC-22 gives a base C for Tr ≤ 10 years and a frequency factor
/// above that; TR-55 gives CN per hydrologic soil group. Tables are static
/// and read-only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{HydroError, HydroResult, require_positive};

/// Return periods (years) of the Chow columns and the Tr adjustment factors.
pub const TABLE_RETURN_PERIODS: [f64; 6] = [2.0, 5.0, 10.0, 25.0, 50.0, 100.0];

// ---------------------------------------------------------------------------
// Hydrologic soil group
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilGroup {
    A,
    B,
    C,
    D,
}

impl SoilGroup {
    fn column(&self) -> usize {
        match self {
            SoilGroup::A => 0,
            SoilGroup::B => 1,
            SoilGroup::C => 2,
            SoilGroup::D => 3,
        }
    }

    /// Long-term saturated infiltration rate fc (mm/h).
    pub fn min_infiltration_rate(&self) -> f64 {
        match self {
            SoilGroup::A => 2.4,
            SoilGroup::B | SoilGroup::C | SoilGroup::D => 1.2,
        }
    }
}

impl FromStr for SoilGroup {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(SoilGroup::A),
            "B" => Ok(SoilGroup::B),
            "C" => Ok(SoilGroup::C),
            "D" => Ok(SoilGroup::D),
            _ => Err(HydroError::unknown("hydrologic soil group", s)),
        }
    }
}

impl fmt::Display for SoilGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = ["A", "B", "C", "D"][self.column()];
        f.write_str(letter)
    }
}

// ---------------------------------------------------------------------------
// Runoff coefficient C
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChowEntry {
    pub category: &'static str,
    pub description: &'static str,
    /// C at Tr 2, 5, 10, 25, 50, 100 years.
    pub c: [f64; 6],
}

pub static CHOW_C_TABLE: &[ChowEntry] = &[
    ChowEntry { category: "commercial", description: "dense downtown", c: [0.75, 0.80, 0.85, 0.88, 0.90, 0.95] },
    ChowEntry { category: "commercial", description: "neighbourhood", c: [0.50, 0.55, 0.60, 0.65, 0.70, 0.75] },
    ChowEntry { category: "residential", description: "single family", c: [0.25, 0.30, 0.35, 0.40, 0.45, 0.50] },
    ChowEntry { category: "residential", description: "multi-unit detached", c: [0.35, 0.40, 0.45, 0.50, 0.55, 0.60] },
    ChowEntry { category: "residential", description: "multi-unit attached", c: [0.45, 0.50, 0.55, 0.60, 0.65, 0.70] },
    ChowEntry { category: "residential", description: "suburban", c: [0.20, 0.25, 0.30, 0.35, 0.40, 0.45] },
    ChowEntry { category: "residential", description: "apartments", c: [0.50, 0.55, 0.60, 0.65, 0.70, 0.75] },
    ChowEntry { category: "industrial", description: "light", c: [0.50, 0.55, 0.60, 0.65, 0.70, 0.80] },
    ChowEntry { category: "industrial", description: "heavy", c: [0.60, 0.65, 0.70, 0.75, 0.80, 0.85] },
    ChowEntry { category: "surfaces", description: "asphalt pavement", c: [0.70, 0.75, 0.80, 0.85, 0.90, 0.95] },
    ChowEntry { category: "surfaces", description: "concrete pavement", c: [0.75, 0.80, 0.85, 0.90, 0.92, 0.95] },
    ChowEntry { category: "surfaces", description: "roofs", c: [0.75, 0.80, 0.85, 0.90, 0.92, 0.95] },
    ChowEntry { category: "surfaces", description: "jointed pavers", c: [0.50, 0.55, 0.60, 0.65, 0.70, 0.75] },
    ChowEntry { category: "surfaces", description: "gravel/macadam", c: [0.25, 0.30, 0.35, 0.40, 0.45, 0.50] },
    ChowEntry { category: "lawn, sandy soil", description: "flat (<2%)", c: [0.05, 0.08, 0.10, 0.13, 0.15, 0.18] },
    ChowEntry { category: "lawn, sandy soil", description: "average (2-7%)", c: [0.10, 0.13, 0.16, 0.19, 0.22, 0.25] },
    ChowEntry { category: "lawn, sandy soil", description: "steep (>7%)", c: [0.15, 0.18, 0.21, 0.25, 0.29, 0.32] },
    ChowEntry { category: "lawn, heavy soil", description: "flat (<2%)", c: [0.13, 0.16, 0.19, 0.23, 0.26, 0.29] },
    ChowEntry { category: "lawn, heavy soil", description: "average (2-7%)", c: [0.18, 0.21, 0.25, 0.29, 0.34, 0.37] },
    ChowEntry { category: "lawn, heavy soil", description: "steep (>7%)", c: [0.25, 0.29, 0.34, 0.40, 0.44, 0.50] },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FhwaEntry {
    pub category: &'static str,
    pub description: &'static str,
    /// C for Tr up to 10 years.
    pub c_base: f64,
}

pub static FHWA_C_TABLE: &[FhwaEntry] = &[
    FhwaEntry { category: "commercial", description: "downtown", c_base: 0.85 },
    FhwaEntry { category: "commercial", description: "neighbourhood", c_base: 0.60 },
    FhwaEntry { category: "industrial", description: "light", c_base: 0.65 },
    FhwaEntry { category: "industrial", description: "heavy", c_base: 0.75 },
    FhwaEntry { category: "residential", description: "single family (lots >1000 m2)", c_base: 0.40 },
    FhwaEntry { category: "residential", description: "single family (lots 500-1000 m2)", c_base: 0.50 },
    FhwaEntry { category: "residential", description: "single family (lots <500 m2)", c_base: 0.60 },
    FhwaEntry { category: "residential", description: "multi-family/apartments", c_base: 0.70 },
    FhwaEntry { category: "residential", description: "condominiums/townhouses", c_base: 0.60 },
    FhwaEntry { category: "surfaces", description: "asphalt/concrete", c_base: 0.85 },
    FhwaEntry { category: "surfaces", description: "brick pavers", c_base: 0.78 },
    FhwaEntry { category: "surfaces", description: "roofs", c_base: 0.85 },
    FhwaEntry { category: "surfaces", description: "gravel", c_base: 0.32 },
    FhwaEntry { category: "lawn, sandy soil", description: "flat (<2%)", c_base: 0.08 },
    FhwaEntry { category: "lawn, sandy soil", description: "average (2-7%)", c_base: 0.12 },
    FhwaEntry { category: "lawn, sandy soil", description: "steep (>7%)", c_base: 0.18 },
    FhwaEntry { category: "lawn, clay soil", description: "flat (<2%)", c_base: 0.15 },
    FhwaEntry { category: "lawn, clay soil", description: "average (2-7%)", c_base: 0.20 },
    FhwaEntry { category: "lawn, clay soil", description: "steep (>7%)", c_base: 0.28 },
];

/// Piecewise-linear in Tr, held constant outside the table.
fn interpolate_by_tr(points: &[(f64, f64)], return_period: f64) -> f64 {
    let (first, last) = (points[0], points[points.len() - 1]);
    if return_period <= first.0 {
        return first.1;
    }
    if return_period >= last.0 {
        return last.1;
    }
    for pair in points.windows(2) {
        let ((t1, v1), (t2, v2)) = (pair[0], pair[1]);
        if return_period <= t2 {
            return v1 + (v2 - v1) * (return_period - t1) / (t2 - t1);
        }
    }
    last.1
}

impl ChowEntry {
    pub fn c_for(&self, return_period: f64) -> f64 {
        let points: Vec<(f64, f64)> = TABLE_RETURN_PERIODS.iter().copied().zip(self.c).collect();
        interpolate_by_tr(&points, return_period)
    }
}

/// Frequency factor Cf: 1.0 up to 10 years, 1.1 at 25, 1.2 at 50, 1.25 at 100.
pub fn frequency_factor(return_period: f64) -> f64 {
    interpolate_by_tr(&[(10.0, 1.0), (25.0, 1.1), (50.0, 1.2), (100.0, 1.25)], return_period)
}

impl FhwaEntry {
    /// Base C times the frequency factor, capped at 1.
    pub fn c_for(&self, return_period: f64) -> f64 {
        (self.c_base * frequency_factor(return_period)).min(1.0)
    }
}

pub fn chow_c(index: usize, return_period: f64) -> HydroResult<f64> {
    require_positive("return period T (years)", return_period)?;
    CHOW_C_TABLE
        .get(index)
        .map(|entry| entry.c_for(return_period))
        .ok_or_else(|| HydroError::unknown("Chow C table entry", index.to_string()))
}

pub fn fhwa_c(index: usize, return_period: f64) -> HydroResult<f64> {
    require_positive("return period T (years)", return_period)?;
    FHWA_C_TABLE
        .get(index)
        .map(|entry| entry.c_for(return_period))
        .ok_or_else(|| HydroError::unknown("FHWA C table entry", index.to_string()))
}

static C_TR_FACTORS: [(f64, f64); 6] = [
    (2.0, 1.00),
    (5.0, 1.17),
    (10.0, 1.33),
    (25.0, 1.50),
    (50.0, 1.66),
    (100.0, 1.84),
];

/// Rescales a C known at `base_return_period` to `return_period` with the
/// mean Chow ratios. Use a table lookup instead when the cover is known.
pub fn adjust_c_for_tr(c: f64, return_period: f64, base_return_period: f64) -> HydroResult<f64> {
    crate::error::require_coefficient(c)?;
    require_positive("return period T (years)", return_period)?;
    require_positive("base return period (years)", base_return_period)?;
    let factor = interpolate_by_tr(&C_TR_FACTORS, return_period)
        / interpolate_by_tr(&C_TR_FACTORS, base_return_period);
    Ok((c * factor).min(1.0))
}

// ---------------------------------------------------------------------------
// Curve number (TR-55)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CnEntry {
    pub category: &'static str,
    pub description: &'static str,
    pub condition: &'static str,
    /// CN for soil groups A, B, C, D.
    pub cn: [u8; 4],
}

impl CnEntry {
    pub fn cn_for(&self, group: SoilGroup) -> f64 {
        self.cn[group.column()] as f64
    }
}

pub static TR55_CN_TABLE: &[CnEntry] = &[
    CnEntry { category: "residential", description: "500 m2 lots (65% impervious)", condition: "n/a", cn: [77, 85, 90, 92] },
    CnEntry { category: "residential", description: "1000 m2 lots (38% impervious)", condition: "n/a", cn: [61, 75, 83, 87] },
    CnEntry { category: "residential", description: "1500 m2 lots (30% impervious)", condition: "n/a", cn: [57, 72, 81, 86] },
    CnEntry { category: "residential", description: "2000 m2 lots (25% impervious)", condition: "n/a", cn: [54, 70, 80, 85] },
    CnEntry { category: "residential", description: "4000 m2 lots (20% impervious)", condition: "n/a", cn: [51, 68, 79, 84] },
    CnEntry { category: "commercial", description: "business districts (85% impervious)", condition: "n/a", cn: [89, 92, 94, 95] },
    CnEntry { category: "industrial", description: "industrial districts (72% impervious)", condition: "n/a", cn: [81, 88, 91, 93] },
    CnEntry { category: "surfaces", description: "impervious pavement", condition: "n/a", cn: [98, 98, 98, 98] },
    CnEntry { category: "surfaces", description: "gravel", condition: "n/a", cn: [76, 85, 89, 91] },
    CnEntry { category: "surfaces", description: "dirt", condition: "n/a", cn: [72, 82, 87, 89] },
    CnEntry { category: "open space", description: "grass cover >75%", condition: "good", cn: [39, 61, 74, 80] },
    CnEntry { category: "open space", description: "grass cover 50-75%", condition: "fair", cn: [49, 69, 79, 84] },
    CnEntry { category: "open space", description: "grass cover <50%", condition: "poor", cn: [68, 79, 86, 89] },
    CnEntry { category: "fallow", description: "bare soil", condition: "n/a", cn: [77, 86, 91, 94] },
    CnEntry { category: "row crops", description: "straight row", condition: "poor", cn: [72, 81, 88, 91] },
    CnEntry { category: "row crops", description: "straight row", condition: "good", cn: [67, 78, 85, 89] },
    CnEntry { category: "row crops", description: "contoured", condition: "poor", cn: [70, 79, 84, 88] },
    CnEntry { category: "row crops", description: "contoured", condition: "good", cn: [65, 75, 82, 86] },
    CnEntry { category: "row crops", description: "terraced", condition: "poor", cn: [66, 74, 80, 82] },
    CnEntry { category: "row crops", description: "terraced", condition: "good", cn: [62, 71, 78, 81] },
    CnEntry { category: "pasture", description: "continuous", condition: "poor", cn: [68, 79, 86, 89] },
    CnEntry { category: "pasture", description: "continuous", condition: "fair", cn: [49, 69, 79, 84] },
    CnEntry { category: "pasture", description: "continuous", condition: "good", cn: [39, 61, 74, 80] },
    CnEntry { category: "meadow", description: "natural", condition: "good", cn: [30, 58, 71, 78] },
    CnEntry { category: "woods", description: "with litter", condition: "poor", cn: [45, 66, 77, 83] },
    CnEntry { category: "woods", description: "with litter", condition: "fair", cn: [36, 60, 73, 79] },
    CnEntry { category: "woods", description: "with litter", condition: "good", cn: [30, 55, 70, 77] },
];

pub fn table_cn(index: usize, group: SoilGroup) -> HydroResult<f64> {
    TR55_CN_TABLE
        .get(index)
        .map(|entry| entry.cn_for(group))
        .ok_or_else(|| HydroError::unknown("TR-55 CN table entry", index.to_string()))
}

/// First TR-55 entry matching category, description and condition
/// (case-insensitive).
pub fn find_cn(category: &str, description: &str, condition: &str, group: SoilGroup) -> HydroResult<f64> {
    TR55_CN_TABLE
        .iter()
        .find(|e| {
            e.category.eq_ignore_ascii_case(category.trim())
                && e.description.eq_ignore_ascii_case(description.trim())
                && e.condition.eq_ignore_ascii_case(condition.trim())
        })
        .map(|e| e.cn_for(group))
        .ok_or_else(|| HydroError::unknown("TR-55 cover", format!("{category}/{description}/{condition}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chow_interpolates_between_columns() {
        // single family: 0.35 at 10 years, 0.40 at 25
        let entry = &CHOW_C_TABLE[2];
        assert!((entry.c_for(10.0) - 0.35).abs() < 1e-12);
        assert!((entry.c_for(17.5) - 0.375).abs() < 1e-12);
        assert_eq!(entry.c_for(1.5), 0.25);
        assert_eq!(entry.c_for(500.0), 0.50);
    }

    #[test]
    fn test_fhwa_factor_is_capped() {
        assert_eq!(frequency_factor(5.0), 1.0);
        assert!((frequency_factor(25.0) - 1.1).abs() < 1e-12);
        assert_eq!(frequency_factor(200.0), 1.25);
        // 0.85 * 1.25 > 1
        assert_eq!(fhwa_c(0, 100.0).unwrap(), 1.0);
        assert!(fhwa_c(99, 10.0).is_err());
    }

    #[test]
    fn test_adjust_c_for_tr() {
        assert!((adjust_c_for_tr(0.5, 10.0, 2.0).unwrap() - 0.665).abs() < 1e-12);
        assert_eq!(adjust_c_for_tr(0.5, 2.0, 2.0).unwrap(), 0.5);
        assert_eq!(adjust_c_for_tr(0.9, 100.0, 2.0).unwrap(), 1.0);
        assert!(adjust_c_for_tr(1.2, 10.0, 2.0).is_err());
    }

    #[test]
    fn test_cn_lookup() {
        assert_eq!(find_cn("Pasture", "continuous", "fair", SoilGroup::B).unwrap(), 69.0);
        assert_eq!(table_cn(7, SoilGroup::A).unwrap(), 98.0);
        assert!(find_cn("pasture", "continuous", "excellent", SoilGroup::B).is_err());
        for entry in TR55_CN_TABLE {
            assert!(entry.cn.windows(2).all(|w| w[0] <= w[1]), "{}", entry.description);
        }
    }

    #[test]
    fn test_soil_group_infiltration() {
        assert_eq!("a".parse::<SoilGroup>().unwrap().min_infiltration_rate(), 2.4);
        assert_eq!(SoilGroup::D.min_infiltration_rate(), 1.2);
        assert!("E".parse::<SoilGroup>().is_err());
    }
}
