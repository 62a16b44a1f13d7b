/// Generic IDF formulas fitted elsewhere (durations in minutes).
///
/// - Sherman:       i = k·T^m / (t + c)^n
/// - Bernard:       i = a·T^m / t^n
/// - Koutsoyiannis: i = (μ + σ·y_T) / (t + θ)^η,  y_T = −ln(−ln(1 − 1/T))
///
/// Each formula has its own coefficient type; handing a set to the wrong
/// formula is a `MethodMismatch`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{HydroError, HydroResult, require_positive};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShermanCoefficients {
    pub k: f64,
    pub m: f64,
    pub c: f64,
    pub n: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BernardCoefficients {
    pub a: f64,
    pub m: f64,
    pub n: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KoutsoyiannisCoefficients {
    pub mu: f64,
    pub sigma: f64,
    pub theta: f64,
    pub eta: f64,
}

/// Formula selector, parsed from a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdfFormula {
    Sherman,
    Bernard,
    Koutsoyiannis,
}

impl IdfFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdfFormula::Sherman => "sherman",
            IdfFormula::Bernard => "bernard",
            IdfFormula::Koutsoyiannis => "koutsoyiannis",
        }
    }
}

impl FromStr for IdfFormula {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sherman" => Ok(IdfFormula::Sherman),
            "bernard" => Ok(IdfFormula::Bernard),
            "koutsoyiannis" => Ok(IdfFormula::Koutsoyiannis),
            other => Err(HydroError::unknown("IDF formula", other)),
        }
    }
}

/// Coefficient set tagged with the formula it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "formula", rename_all = "snake_case")]
pub enum IdfCoefficients {
    Sherman(ShermanCoefficients),
    Bernard(BernardCoefficients),
    Koutsoyiannis(KoutsoyiannisCoefficients),
}

impl IdfCoefficients {
    pub fn formula(&self) -> IdfFormula {
        match self {
            IdfCoefficients::Sherman(_) => IdfFormula::Sherman,
            IdfCoefficients::Bernard(_) => IdfFormula::Bernard,
            IdfCoefficients::Koutsoyiannis(_) => IdfFormula::Koutsoyiannis,
        }
    }

    /// Intensity (mm/h) for return period `t_years` and duration `duration_min`.
    pub fn intensity(&self, t_years: f64, duration_min: f64) -> HydroResult<f64> {
        require_positive("duration (min)", duration_min)?;
        match self {
            IdfCoefficients::Sherman(c) => sherman_intensity(c, t_years, duration_min),
            IdfCoefficients::Bernard(c) => bernard_intensity(c, t_years, duration_min),
            IdfCoefficients::Koutsoyiannis(c) => koutsoyiannis_intensity(c, t_years, duration_min),
        }
    }
}

/// Evaluates `formula` with `coefficients`, rejecting mismatched pairs.
pub fn international_intensity(
    formula: IdfFormula,
    coefficients: &IdfCoefficients,
    t_years: f64,
    duration_min: f64,
) -> HydroResult<f64> {
    if coefficients.formula() != formula {
        return Err(HydroError::MethodMismatch {
            expected: formula.as_str(),
            found: coefficients.formula().as_str(),
        });
    }
    coefficients.intensity(t_years, duration_min)
}

// ---------------------------------------------------------------------------
// Formulas
// ---------------------------------------------------------------------------

pub fn sherman_intensity(c: &ShermanCoefficients, t_years: f64, duration_min: f64) -> HydroResult<f64> {
    require_positive("return period T (years)", t_years)?;
    require_positive("Sherman k", c.k)?;
    let base = duration_min + c.c;
    require_positive("t + c (min)", base)?;
    Ok(c.k * t_years.powf(c.m) / base.powf(c.n))
}

pub fn bernard_intensity(c: &BernardCoefficients, t_years: f64, duration_min: f64) -> HydroResult<f64> {
    require_positive("return period T (years)", t_years)?;
    require_positive("Bernard a", c.a)?;
    Ok(c.a * t_years.powf(c.m) / duration_min.powf(c.n))
}

/// Gumbel reduced variate for return period T.
pub fn gumbel_variate(t_years: f64) -> HydroResult<f64> {
    if !t_years.is_finite() || t_years <= 1.0 {
        return Err(HydroError::out_of_range("return period T (years)", t_years, "T > 1"));
    }
    Ok(-(-(1.0 - 1.0 / t_years).ln()).ln())
}

pub fn koutsoyiannis_intensity(
    c: &KoutsoyiannisCoefficients,
    t_years: f64,
    duration_min: f64,
) -> HydroResult<f64> {
    let y = gumbel_variate(t_years)?;
    let numerator = c.mu + c.sigma * y;
    require_positive("mu + sigma*y_T", numerator)?;
    let base = duration_min + c.theta;
    require_positive("t + theta (min)", base)?;
    Ok(numerator / base.powf(c.eta))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sherman() -> IdfCoefficients {
        IdfCoefficients::Sherman(ShermanCoefficients { k: 1000.0, m: 0.2, c: 10.0, n: 0.75 })
    }

    #[test]
    fn test_sherman_value() {
        // 1000 * 10^0.2 / 70^0.75
        let i = sherman().intensity(10.0, 60.0).unwrap();
        let expected = 1000.0 * 10f64.powf(0.2) / 70f64.powf(0.75);
        assert!((i - expected).abs() < 1e-9);
    }

    #[test]
    fn test_bernard_decreases_with_duration() {
        let b = IdfCoefficients::Bernard(BernardCoefficients { a: 500.0, m: 0.18, n: 0.6 });
        let short = b.intensity(10.0, 10.0).unwrap();
        let long = b.intensity(10.0, 120.0).unwrap();
        assert!(short > long);
    }

    #[test]
    fn test_koutsoyiannis_requires_t_above_one() {
        let k = IdfCoefficients::Koutsoyiannis(KoutsoyiannisCoefficients {
            mu: 300.0,
            sigma: 90.0,
            theta: 8.0,
            eta: 0.7,
        });
        assert!(k.intensity(1.0, 60.0).is_err());
        let i10 = k.intensity(10.0, 60.0).unwrap();
        let i100 = k.intensity(100.0, 60.0).unwrap();
        assert!(i100 > i10);
    }

    #[test]
    fn test_gumbel_variate_ten_years() {
        let y = gumbel_variate(10.0).unwrap();
        assert!((y - 2.2504).abs() < 1e-3);
    }

    #[test]
    fn test_mismatched_coefficients_are_rejected() {
        let err = international_intensity(IdfFormula::Bernard, &sherman(), 10.0, 60.0).unwrap_err();
        assert_eq!(
            err,
            HydroError::MethodMismatch { expected: "bernard", found: "sherman" }
        );
        assert!(international_intensity(IdfFormula::Sherman, &sherman(), 10.0, 60.0).is_ok());
    }

    #[test]
    fn test_formula_from_str() {
        assert_eq!("Sherman".parse::<IdfFormula>().unwrap(), IdfFormula::Sherman);
        assert!("talbot".parse::<IdfFormula>().is_err());
    }

    #[test]
    fn test_coefficients_deserialize_with_tag() {
        let json = r#"{"formula":"bernard","a":500.0,"m":0.18,"n":0.6}"#;
        let parsed: IdfCoefficients = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.formula(), IdfFormula::Bernard);
    }
}
