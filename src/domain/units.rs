//! Unit conversion for laboratory values.
//!
//! Cholesterol and glucose arrive either in mg/dL (US convention) or mmol/L
//! (SI convention). The risk formula is calibrated in mg/dL, so every value is
//! standardized before any arithmetic.

use serde::{Deserialize, Serialize};

/// mg/dL → mmol/L factor for cholesterol.
pub const CHOLESTEROL_MG_DL_TO_MMOL_L: f64 = 0.02586;

/// mmol/L → mg/dL factor for cholesterol.
pub const CHOLESTEROL_MMOL_L_TO_MG_DL: f64 = 38.67;

/// mg/dL → mmol/L factor for glucose.
pub const GLUCOSE_MG_DL_TO_MMOL_L: f64 = 0.05551;

/// mmol/L → mg/dL factor for glucose.
pub const GLUCOSE_MMOL_L_TO_MG_DL: f64 = 18.018;

/// Error type for unit conversions.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Invalid number for unit conversion: {0}")]
    InvalidNumber(f64),
}

/// Concentration unit for a laboratory value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeasurementUnit {
    /// Milligrams per decilitre
    #[default]
    #[serde(rename = "mg/dL")]
    MgDl,
    /// Millimoles per litre
    #[serde(rename = "mmol/L")]
    MmolL,
}

impl MeasurementUnit {
    /// Unit label as shown to users and serialized.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::MgDl => "mg/dL",
            Self::MmolL => "mmol/L",
        }
    }
}

impl std::fmt::Display for MeasurementUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed interval of medically plausible values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceRange {
    pub min: f64,
    pub max: f64,
}

impl ReferenceRange {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies inside the inclusive bounds.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (self.min..=self.max).contains(&value)
    }
}

pub const TOTAL_CHOLESTEROL_MG_DL: ReferenceRange = ReferenceRange::new(100.0, 400.0);
pub const TOTAL_CHOLESTEROL_MMOL_L: ReferenceRange = ReferenceRange::new(2.6, 10.3);
pub const HDL_CHOLESTEROL_MG_DL: ReferenceRange = ReferenceRange::new(20.0, 100.0);
pub const HDL_CHOLESTEROL_MMOL_L: ReferenceRange = ReferenceRange::new(0.5, 2.6);
pub const FASTING_GLUCOSE_MG_DL: ReferenceRange = ReferenceRange::new(70.0, 400.0);
pub const FASTING_GLUCOSE_MMOL_L: ReferenceRange = ReferenceRange::new(3.9, 22.2);
pub const ANY_GLUCOSE_MG_DL: ReferenceRange = ReferenceRange::new(50.0, 400.0);
pub const ANY_GLUCOSE_MMOL_L: ReferenceRange = ReferenceRange::new(2.8, 22.2);

/// Which glucose envelope a caller checks against.
///
/// `Fasting` excludes hypoglycemic readings; `Any` admits them down to
/// 50 mg/dL so a low reading is reported rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlucoseContext {
    #[default]
    Fasting,
    Any,
}

/// Canonical total-cholesterol range for `unit`.
#[must_use]
pub fn total_cholesterol_range(unit: MeasurementUnit) -> ReferenceRange {
    match unit {
        MeasurementUnit::MgDl => TOTAL_CHOLESTEROL_MG_DL,
        MeasurementUnit::MmolL => TOTAL_CHOLESTEROL_MMOL_L,
    }
}

/// Canonical HDL range for `unit`.
#[must_use]
pub fn hdl_cholesterol_range(unit: MeasurementUnit) -> ReferenceRange {
    match unit {
        MeasurementUnit::MgDl => HDL_CHOLESTEROL_MG_DL,
        MeasurementUnit::MmolL => HDL_CHOLESTEROL_MMOL_L,
    }
}

/// Glucose range for `unit` under `context`.
#[must_use]
pub fn glucose_range(unit: MeasurementUnit, context: GlucoseContext) -> ReferenceRange {
    match (unit, context) {
        (MeasurementUnit::MgDl, GlucoseContext::Fasting) => FASTING_GLUCOSE_MG_DL,
        (MeasurementUnit::MmolL, GlucoseContext::Fasting) => FASTING_GLUCOSE_MMOL_L,
        (MeasurementUnit::MgDl, GlucoseContext::Any) => ANY_GLUCOSE_MG_DL,
        (MeasurementUnit::MmolL, GlucoseContext::Any) => ANY_GLUCOSE_MMOL_L,
    }
}

/// Round `value` to `decimals` places (half away from zero).
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn finite(value: f64) -> Result<f64, ConversionError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConversionError::InvalidNumber(value))
    }
}

/// Convert cholesterol from mg/dL to mmol/L, rounded to 2 decimals.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn cholesterol_mg_dl_to_mmol_l(value: f64) -> Result<f64, ConversionError> {
    Ok(round_to(finite(value)? * CHOLESTEROL_MG_DL_TO_MMOL_L, 2))
}

/// Convert cholesterol from mmol/L to mg/dL, rounded to the nearest integer.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn cholesterol_mmol_l_to_mg_dl(value: f64) -> Result<f64, ConversionError> {
    Ok((finite(value)? * CHOLESTEROL_MMOL_L_TO_MG_DL).round())
}

/// Convert glucose from mg/dL to mmol/L, rounded to 1 decimal.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn glucose_mg_dl_to_mmol_l(value: f64) -> Result<f64, ConversionError> {
    Ok(round_to(finite(value)? * GLUCOSE_MG_DL_TO_MMOL_L, 1))
}

/// Convert glucose from mmol/L to mg/dL, rounded to the nearest integer.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn glucose_mmol_l_to_mg_dl(value: f64) -> Result<f64, ConversionError> {
    Ok((finite(value)? * GLUCOSE_MMOL_L_TO_MG_DL).round())
}

/// Express a cholesterol value in mg/dL.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn standardize_cholesterol(value: f64, unit: MeasurementUnit) -> Result<f64, ConversionError> {
    match unit {
        MeasurementUnit::MgDl => finite(value),
        MeasurementUnit::MmolL => cholesterol_mmol_l_to_mg_dl(value),
    }
}

/// Express a glucose value in mg/dL.
///
/// # Errors
/// Returns `ConversionError::InvalidNumber` for NaN or infinite input.
pub fn standardize_glucose(value: f64, unit: MeasurementUnit) -> Result<f64, ConversionError> {
    match unit {
        MeasurementUnit::MgDl => finite(value),
        MeasurementUnit::MmolL => glucose_mmol_l_to_mg_dl(value),
    }
}

/// Whether a total-cholesterol value is inside the canonical envelope.
#[must_use]
pub fn is_valid_cholesterol_range(value: f64, unit: MeasurementUnit) -> bool {
    total_cholesterol_range(unit).contains(value)
}

/// Whether an HDL value is inside the canonical envelope.
#[must_use]
pub fn is_valid_hdl_range(value: f64, unit: MeasurementUnit) -> bool {
    hdl_cholesterol_range(unit).contains(value)
}

/// Whether a glucose value is inside the fasting envelope.
#[must_use]
pub fn is_valid_glucose_range(value: f64, unit: MeasurementUnit) -> bool {
    glucose_range(unit, GlucoseContext::Fasting).contains(value)
}

/// Format a cholesterol value for display (`"200 mg/dL"`, `"5.17 mmol/L"`).
#[must_use]
pub fn format_cholesterol(value: f64, unit: MeasurementUnit) -> String {
    match unit {
        MeasurementUnit::MgDl => format!("{value:.0} {unit}"),
        MeasurementUnit::MmolL => format!("{value:.2} {unit}"),
    }
}

/// Format a glucose value for display (`"99 mg/dL"`, `"5.5 mmol/L"`).
#[must_use]
pub fn format_glucose(value: f64, unit: MeasurementUnit) -> String {
    match unit {
        MeasurementUnit::MgDl => format!("{value:.0} {unit}"),
        MeasurementUnit::MmolL => format!("{value:.1} {unit}"),
    }
}
