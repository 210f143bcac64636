//! Patient input types for cardiovascular risk estimation.
//!
//! Two shapes of the same record exist:
//! - [`PartialPatientInput`]: what a form submits, every field optional and
//!   selections kept as raw strings so they can be validated.
//! - [`PatientInput`]: the typed, complete record the risk engine consumes.

use serde::{Deserialize, Serialize};

use super::framingham::RiskError;
use super::units::MeasurementUnit;
use super::validation::{blocking_errors, validate_all, ValidationError};

/// Biological sex; selects the coefficient set of the risk formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse an exact selection value (`"male"` or `"female"`).
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "male" => Some(Self::Male),
            "female" => Some(Self::Female),
            _ => None,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tobacco use. Only `Current` contributes to the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmokingStatus {
    Never,
    Former,
    Current,
}

impl SmokingStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Former => "former",
            Self::Current => "current",
        }
    }

    /// Parse an exact selection value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "never" => Some(Self::Never),
            "former" => Some(Self::Former),
            "current" => Some(Self::Current),
            _ => None,
        }
    }
}

impl std::fmt::Display for SmokingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete clinical record for one risk calculation.
///
/// Blood pressure is in mmHg. Cholesterol values share `cholesterol_unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientInput {
    /// Age in whole years (30-79 for the published formula)
    pub age: u32,

    pub gender: Gender,

    pub total_cholesterol: f64,

    /// Must be strictly below total cholesterol
    pub hdl_cholesterol: f64,

    pub cholesterol_unit: MeasurementUnit,

    #[serde(rename = "systolicBP")]
    pub systolic_bp: f64,

    #[serde(rename = "diastolicBP")]
    pub diastolic_bp: f64,

    /// Treated hypertension carries a different systolic coefficient
    #[serde(rename = "onBPMedication")]
    pub on_bp_medication: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_glucose: Option<f64>,

    #[serde(default)]
    pub glucose_unit: MeasurementUnit,

    pub smoking_status: SmokingStatus,

    pub has_diabetes: bool,

    pub family_history: bool,
}

/// Possibly incomplete record as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPatientInput {
    #[serde(default)]
    pub age: Option<f64>,

    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub total_cholesterol: Option<f64>,

    #[serde(default)]
    pub hdl_cholesterol: Option<f64>,

    #[serde(default)]
    pub cholesterol_unit: MeasurementUnit,

    #[serde(default, rename = "systolicBP")]
    pub systolic_bp: Option<f64>,

    #[serde(default, rename = "diastolicBP")]
    pub diastolic_bp: Option<f64>,

    #[serde(default, rename = "onBPMedication")]
    pub on_bp_medication: Option<bool>,

    #[serde(default)]
    pub blood_glucose: Option<f64>,

    #[serde(default)]
    pub glucose_unit: MeasurementUnit,

    #[serde(default)]
    pub smoking_status: Option<String>,

    #[serde(default)]
    pub has_diabetes: Option<bool>,

    #[serde(default)]
    pub family_history: Option<bool>,
}

impl From<&PatientInput> for PartialPatientInput {
    fn from(input: &PatientInput) -> Self {
        Self {
            age: Some(f64::from(input.age)),
            gender: Some(input.gender.as_str().to_string()),
            total_cholesterol: Some(input.total_cholesterol),
            hdl_cholesterol: Some(input.hdl_cholesterol),
            cholesterol_unit: input.cholesterol_unit,
            systolic_bp: Some(input.systolic_bp),
            diastolic_bp: Some(input.diastolic_bp),
            on_bp_medication: Some(input.on_bp_medication),
            blood_glucose: input.blood_glucose,
            glucose_unit: input.glucose_unit,
            smoking_status: Some(input.smoking_status.as_str().to_string()),
            has_diabetes: Some(input.has_diabetes),
            family_history: Some(input.family_history),
        }
    }
}

impl PatientInput {
    /// Promote a partial record using findings already produced by
    /// [`validate_all`] for that same record.
    ///
    /// A decimal age is rounded to whole years.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidInput` with the blocking findings, if any.
    pub fn from_validated(
        partial: &PartialPatientInput,
        findings: &[ValidationError],
    ) -> Result<Self, RiskError> {
        let blocking = blocking_errors(findings);
        if !blocking.is_empty() {
            return Err(RiskError::InvalidInput(blocking));
        }

        let missing = || RiskError::InvalidInput(Vec::new());
        let gender = partial.gender.as_deref().and_then(Gender::parse);
        let smoking_status = partial.smoking_status.as_deref().and_then(SmokingStatus::parse);

        Ok(Self {
            age: partial.age.map(|a| a.round() as u32).ok_or_else(missing)?,
            gender: gender.ok_or_else(missing)?,
            total_cholesterol: partial.total_cholesterol.ok_or_else(missing)?,
            hdl_cholesterol: partial.hdl_cholesterol.ok_or_else(missing)?,
            cholesterol_unit: partial.cholesterol_unit,
            systolic_bp: partial.systolic_bp.ok_or_else(missing)?,
            diastolic_bp: partial.diastolic_bp.ok_or_else(missing)?,
            on_bp_medication: partial.on_bp_medication.ok_or_else(missing)?,
            blood_glucose: partial.blood_glucose,
            glucose_unit: partial.glucose_unit,
            smoking_status: smoking_status.ok_or_else(missing)?,
            has_diabetes: partial.has_diabetes.ok_or_else(missing)?,
            family_history: partial.family_history.ok_or_else(missing)?,
        })
    }
}

impl TryFrom<&PartialPatientInput> for PatientInput {
    type Error = RiskError;

    /// Promote a partial record once it carries no blocking validation errors.
    fn try_from(partial: &PartialPatientInput) -> Result<Self, Self::Error> {
        Self::from_validated(partial, &validate_all(partial))
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::reference_male;
    use super::*;
    use crate::domain::validation::validate_age;

    #[test]
    fn test_selection_parsing_is_exact() {
        assert_eq!(Gender::parse("female"), Some(Gender::Female));
        assert_eq!(Gender::parse("Female"), None);
        assert_eq!(SmokingStatus::parse("former"), Some(SmokingStatus::Former));
        assert_eq!(SmokingStatus::parse("sometimes"), None);
    }

    #[test]
    fn test_partial_round_trip_through_typed() {
        let input = reference_male();
        let partial = PartialPatientInput::from(&input);
        let back = PatientInput::try_from(&partial).expect("Should promote");
        assert_eq!(back, input);
    }

    #[test]
    fn test_decimal_age_is_rounded_on_promotion() {
        let mut partial = PartialPatientInput::from(&reference_male());
        partial.age = Some(54.6);
        let input = PatientInput::try_from(&partial).expect("Decimal age is only a warning");
        assert_eq!(input.age, 55);
    }

    #[test]
    fn test_incomplete_partial_is_rejected() {
        let mut partial = PartialPatientInput::from(&reference_male());
        partial.has_diabetes = None;
        match PatientInput::try_from(&partial) {
            Err(RiskError::InvalidInput(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_from_validated_uses_supplied_findings() {
        let partial = PartialPatientInput::from(&reference_male());

        let promoted = PatientInput::from_validated(&partial, &[]).expect("Should promote");
        assert_eq!(promoted, reference_male());

        // The supplied findings decide, not a fresh validation of the record
        let blocking = validate_age(Some(-1.0)).expect("Should flag");
        match PatientInput::from_validated(&partial, &[blocking.clone()]) {
            Err(RiskError::InvalidInput(errors)) => assert_eq!(errors, vec![blocking]),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_serde_field_names() {
        let json = serde_json::to_value(reference_male()).expect("Should serialize");
        assert_eq!(json["systolicBP"], 140.0);
        assert_eq!(json["onBPMedication"], false);
        assert_eq!(json["cholesterolUnit"], "mg/dL");
        assert_eq!(json["smokingStatus"], "never");
        assert!(json.get("bloodGlucose").is_none());
    }
}
