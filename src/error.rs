/// Error taxonomy for the hydrologic core.
///
/// Every formula validates its own inputs and fails immediately with one of
/// these variants. Nothing here is retried: an error always means the caller
/// handed in a value outside the domain of the method it asked for.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type HydroResult<T> = Result<T, HydroError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydroError {
    // ------------------------------------------------------------------------
    // Range violations
    // ------------------------------------------------------------------------
    /// Input outside the domain of a formula (CN outside [30,100], C outside
    /// (0,1], non-positive geometry, Tr below the formula's minimum, ...).
    #[error("{parameter} = {value} is out of range (expected {expected})")]
    OutOfRange {
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },

    // ------------------------------------------------------------------------
    // Missing parameters
    // ------------------------------------------------------------------------
    /// A method was requested without an input it cannot run without.
    #[error("missing parameter '{parameter}' required by {context}")]
    MissingParameter {
        parameter: &'static str,
        context: &'static str,
    },

    // ------------------------------------------------------------------------
    // Method mismatch / dispatch
    // ------------------------------------------------------------------------
    /// A coefficient set or curve type was handed to the wrong formula.
    #[error("method mismatch: expected {expected}, found {found}")]
    MethodMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Unknown tag when building a method enum from its name.
    #[error("unknown {kind} '{name}'")]
    UnknownMethod { kind: &'static str, name: String },

    // ------------------------------------------------------------------------
    // Series construction
    // ------------------------------------------------------------------------
    /// A time series could not be built or combined (empty input, step
    /// mismatch, duration not a whole number of steps, ...).
    #[error("invalid series: {0}")]
    InvalidSeries(String),
}

impl HydroError {
    pub fn out_of_range(parameter: &'static str, value: f64, expected: &'static str) -> Self {
        HydroError::OutOfRange { parameter, value, expected }
    }

    pub fn missing(parameter: &'static str, context: &'static str) -> Self {
        HydroError::MissingParameter { parameter, context }
    }

    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        HydroError::UnknownMethod { kind, name: name.into() }
    }

    pub fn series(message: impl Into<String>) -> Self {
        HydroError::InvalidSeries(message.into())
    }
}

/// Fails unless `value` is finite and strictly positive.
pub fn require_positive(parameter: &'static str, value: f64) -> HydroResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(HydroError::out_of_range(parameter, value, "> 0"))
    }
}

/// Fails unless `lo <= value <= hi`.
pub fn require_within(
    parameter: &'static str,
    value: f64,
    lo: f64,
    hi: f64,
    expected: &'static str,
) -> HydroResult<f64> {
    if value.is_finite() && value >= lo && value <= hi {
        Ok(value)
    } else {
        Err(HydroError::out_of_range(parameter, value, expected))
    }
}

/// Runoff coefficient domain: (0, 1].
pub fn require_coefficient(value: f64) -> HydroResult<f64> {
    if value.is_finite() && value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(HydroError::out_of_range("runoff coefficient C", value, "0 < C <= 1"))
    }
}

/// Curve number domain: [30, 100].
pub fn require_curve_number(value: f64) -> HydroResult<f64> {
    require_within("curve number CN", value, 30.0, 100.0, "30 <= CN <= 100")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive_rejects_zero_and_nan() {
        assert!(require_positive("slope", 0.0).is_err());
        assert!(require_positive("slope", -1.0).is_err());
        assert!(require_positive("slope", f64::NAN).is_err());
        assert_eq!(require_positive("slope", 0.02).unwrap(), 0.02);
    }

    #[test]
    fn test_coefficient_bounds_are_half_open() {
        assert!(require_coefficient(0.0).is_err());
        assert!(require_coefficient(1.0).is_ok());
        assert!(require_coefficient(1.01).is_err());
    }

    #[test]
    fn test_curve_number_bounds_are_closed() {
        assert!(require_curve_number(30.0).is_ok());
        assert!(require_curve_number(100.0).is_ok());
        assert!(require_curve_number(29.9).is_err());
        assert!(require_curve_number(100.1).is_err());
    }

    #[test]
    fn test_display_names_the_violated_parameter() {
        let err = HydroError::out_of_range("return period Tr", 1.0, ">= 2");
        let msg = err.to_string();
        assert!(msg.contains("return period Tr"));
        assert!(msg.contains(">= 2"));

        let err = HydroError::missing("curve_number", "SCS runoff");
        assert!(err.to_string().contains("curve_number"));
    }
}
