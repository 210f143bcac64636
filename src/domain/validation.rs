//! Field-level and cross-field validation of patient input.
//!
//! Findings are returned as data, never as `Err`: each per-field check yields
//! at most one [`ValidationError`], and [`validate_all`] concatenates them with
//! the cross-field medical-consistency checks. Only `Severity::Error` findings
//! block a calculation.

use serde::{Deserialize, Serialize};

use super::patient::{Gender, PartialPatientInput, SmokingStatus};
use super::units::{
    glucose_range, hdl_cholesterol_range, standardize_cholesterol, standardize_glucose,
    total_cholesterol_range, GlucoseContext, MeasurementUnit, ReferenceRange,
};

/// Canonical age envelope of the published formula.
pub const MIN_AGE: f64 = 30.0;
pub const MAX_AGE: f64 = 79.0;

/// Ages in 20-29 or 80-90 are accepted with a warning.
const EXTENDED_MIN_AGE: f64 = 20.0;
const EXTENDED_MAX_AGE: f64 = 90.0;
const MAX_PLAUSIBLE_AGE: f64 = 150.0;

const SYSTOLIC_PLAUSIBLE: ReferenceRange = ReferenceRange::new(50.0, 300.0);
const DIASTOLIC_PLAUSIBLE: ReferenceRange = ReferenceRange::new(30.0, 200.0);
const PULSE_PRESSURE_NORMAL: ReferenceRange = ReferenceRange::new(20.0, 100.0);
const HDL_RATIO_NORMAL: ReferenceRange = ReferenceRange::new(0.1, 0.6);

/// Fraction beyond a boundary that still only warns.
const BOUNDARY_TOLERANCE: f64 = 0.2;

/// How strongly a finding affects the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks calculation
    Error,
    /// Shown to the user, calculation proceeds
    Warning,
    /// Advisory note
    Info,
}

/// Machine-readable reason for a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCode {
    RequiredField,
    InvalidNumber,
    NegativeValue,
    DecimalValue,
    ExtremeValue,
    BoundaryValue,
    UnitConfusion,
    LogicalInconsistency,
    UnusualValue,
    MedicalInconsistency,
    MedicalAdvisory,
    GenderUnusual,
}

/// Input field a finding is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "totalCholesterol")]
    TotalCholesterol,
    #[serde(rename = "hdlCholesterol")]
    HdlCholesterol,
    #[serde(rename = "systolicBP")]
    SystolicBp,
    #[serde(rename = "diastolicBP")]
    DiastolicBp,
    #[serde(rename = "onBPMedication")]
    OnBpMedication,
    #[serde(rename = "bloodGlucose")]
    BloodGlucose,
    #[serde(rename = "smokingStatus")]
    SmokingStatus,
    #[serde(rename = "hasDiabetes")]
    HasDiabetes,
    #[serde(rename = "familyHistory")]
    FamilyHistory,
}

impl Field {
    /// Serialized field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Gender => "gender",
            Self::TotalCholesterol => "totalCholesterol",
            Self::HdlCholesterol => "hdlCholesterol",
            Self::SystolicBp => "systolicBP",
            Self::DiastolicBp => "diastolicBP",
            Self::OnBpMedication => "onBPMedication",
            Self::BloodGlucose => "bloodGlucose",
            Self::SmokingStatus => "smokingStatus",
            Self::HasDiabetes => "hasDiabetes",
            Self::FamilyHistory => "familyHistory",
        }
    }

    /// Human-readable label used in messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Gender => "Gender",
            Self::TotalCholesterol => "Total cholesterol",
            Self::HdlCholesterol => "HDL cholesterol",
            Self::SystolicBp => "Systolic blood pressure",
            Self::DiastolicBp => "Diastolic blood pressure",
            Self::OnBpMedication => "Blood pressure medication",
            Self::BloodGlucose => "Blood glucose",
            Self::SmokingStatus => "Smoking status",
            Self::HasDiabetes => "Diabetes status",
            Self::FamilyHistory => "Family history",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The offending value, echoed back for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Flag(bool),
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
    pub code: ValidationCode,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldValue>,
}

impl ValidationError {
    fn new(
        field: Field,
        code: ValidationCode,
        severity: Severity,
        message: impl Into<String>,
        value: Option<FieldValue>,
    ) -> Self {
        Self {
            field,
            message: message.into(),
            code,
            severity,
            value,
        }
    }

    fn error(field: Field, code: ValidationCode, message: impl Into<String>, value: f64) -> Self {
        Self::new(field, code, Severity::Error, message, Some(FieldValue::Number(value)))
    }

    fn warning(field: Field, code: ValidationCode, message: impl Into<String>, value: f64) -> Self {
        Self::new(field, code, Severity::Warning, message, Some(FieldValue::Number(value)))
    }

    fn required(field: Field, value: Option<FieldValue>) -> Self {
        Self::new(
            field,
            ValidationCode::RequiredField,
            Severity::Error,
            format!("{} is required", field.label()),
            value,
        )
    }

    /// Whether this finding prevents calculation.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Extract the blocking findings from a list.
#[must_use]
pub fn blocking_errors(findings: &[ValidationError]) -> Vec<ValidationError> {
    findings.iter().filter(|f| f.is_blocking()).cloned().collect()
}

/// Missing, non-finite and negative checks shared by every numeric field.
fn check_number(field: Field, value: Option<f64>) -> Result<f64, ValidationError> {
    let value = match value {
        Some(v) if !v.is_nan() => v,
        other => return Err(ValidationError::required(field, other.map(FieldValue::Number))),
    };
    if !value.is_finite() {
        return Err(ValidationError::error(
            field,
            ValidationCode::InvalidNumber,
            format!("{} must be a valid number", field.label()),
            value,
        ));
    }
    if value < 0.0 {
        return Err(ValidationError::error(
            field,
            ValidationCode::NegativeValue,
            format!("{} cannot be negative", field.label()),
            value,
        ));
    }
    Ok(value)
}

fn is_whole(value: f64) -> bool {
    value.fract() == 0.0
}

/// Validate age in years.
#[must_use]
pub fn validate_age(age: Option<f64>) -> Option<ValidationError> {
    let field = Field::Age;
    let age = match check_number(field, age) {
        Ok(v) => v,
        Err(e) => return Some(e),
    };

    if age > MAX_PLAUSIBLE_AGE {
        return Some(ValidationError::error(
            field,
            ValidationCode::ExtremeValue,
            format!("Age of {age} years is not plausible"),
            age,
        ));
    }

    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        let severity = if (EXTENDED_MIN_AGE..MIN_AGE).contains(&age)
            || (age > MAX_AGE && age <= EXTENDED_MAX_AGE)
        {
            Severity::Warning
        } else {
            Severity::Error
        };
        return Some(ValidationError::new(
            field,
            ValidationCode::BoundaryValue,
            severity,
            format!(
                "Age must be between {MIN_AGE} and {MAX_AGE} years for this risk calculation"
            ),
            Some(FieldValue::Number(age)),
        ));
    }

    if !is_whole(age) {
        return Some(ValidationError::warning(
            field,
            ValidationCode::DecimalValue,
            format!("Age will be rounded to {} years", age.round()),
            age,
        ));
    }

    None
}

/// Envelope and unit-confusion thresholds for one laboratory field.
struct LabProfile {
    field: Field,
    range: ReferenceRange,
    /// mg/dL values below this look like mmol/L entries
    mg_dl_confusion_below: f64,
    /// mmol/L values above this look like mg/dL entries
    mmol_l_confusion_above: f64,
}

impl LabProfile {
    fn total_cholesterol(unit: MeasurementUnit) -> Self {
        Self {
            field: Field::TotalCholesterol,
            range: total_cholesterol_range(unit),
            mg_dl_confusion_below: 10.0,
            mmol_l_confusion_above: 20.0,
        }
    }

    fn hdl_cholesterol(unit: MeasurementUnit) -> Self {
        Self {
            field: Field::HdlCholesterol,
            range: hdl_cholesterol_range(unit),
            mg_dl_confusion_below: 10.0,
            mmol_l_confusion_above: 20.0,
        }
    }

    fn glucose(unit: MeasurementUnit) -> Self {
        Self {
            field: Field::BloodGlucose,
            range: glucose_range(unit, GlucoseContext::Any),
            mg_dl_confusion_below: 10.0,
            mmol_l_confusion_above: 40.0,
        }
    }
}

fn validate_lab_value(
    profile: &LabProfile,
    value: Option<f64>,
    unit: MeasurementUnit,
) -> Option<ValidationError> {
    let field = profile.field;
    let value = match check_number(field, value) {
        Ok(v) => v,
        Err(e) => return Some(e),
    };

    if value == 0.0 {
        return Some(ValidationError::warning(
            field,
            ValidationCode::UnusualValue,
            format!("{} of zero is unusual; please double-check", field.label()),
            value,
        ));
    }

    match unit {
        MeasurementUnit::MgDl if value < profile.mg_dl_confusion_below => {
            return Some(ValidationError::warning(
                field,
                ValidationCode::UnitConfusion,
                format!("{value} mg/dL is very low; did you mean mmol/L?"),
                value,
            ));
        }
        MeasurementUnit::MmolL if value > profile.mmol_l_confusion_above => {
            return Some(ValidationError::warning(
                field,
                ValidationCode::UnitConfusion,
                format!("{value} mmol/L is very high; did you mean mg/dL?"),
                value,
            ));
        }
        _ => {}
    }

    let range = profile.range;
    if value > range.max * 2.0 {
        return Some(ValidationError::error(
            field,
            ValidationCode::ExtremeValue,
            format!("{} of {value} {unit} is not plausible", field.label()),
            value,
        ));
    }

    if !range.contains(value) {
        let near_boundary = value >= range.min * (1.0 - BOUNDARY_TOLERANCE)
            && value <= range.max * (1.0 + BOUNDARY_TOLERANCE);
        let severity = if near_boundary {
            Severity::Warning
        } else {
            Severity::Error
        };
        return Some(ValidationError::new(
            field,
            ValidationCode::BoundaryValue,
            severity,
            format!(
                "{} should be between {} and {} {unit}",
                field.label(),
                range.min,
                range.max
            ),
            Some(FieldValue::Number(value)),
        ));
    }

    None
}

/// Validate total cholesterol in `unit`.
#[must_use]
pub fn validate_total_cholesterol(
    value: Option<f64>,
    unit: MeasurementUnit,
) -> Option<ValidationError> {
    validate_lab_value(&LabProfile::total_cholesterol(unit), value, unit)
}

/// Validate HDL cholesterol in `unit`.
#[must_use]
pub fn validate_hdl_cholesterol(
    value: Option<f64>,
    unit: MeasurementUnit,
) -> Option<ValidationError> {
    validate_lab_value(&LabProfile::hdl_cholesterol(unit), value, unit)
}

/// Validate blood glucose. Absent glucose is valid.
#[must_use]
pub fn validate_glucose(value: Option<f64>, unit: MeasurementUnit) -> Option<ValidationError> {
    match value {
        None => None,
        Some(v) if v.is_nan() => Some(ValidationError::error(
            Field::BloodGlucose,
            ValidationCode::InvalidNumber,
            "Blood glucose must be a valid number",
            v,
        )),
        Some(_) => validate_lab_value(&LabProfile::glucose(unit), value, unit),
    }
}

fn validate_pressure(
    field: Field,
    value: Option<f64>,
    plausible: ReferenceRange,
) -> Option<ValidationError> {
    let value = match check_number(field, value) {
        Ok(v) => v,
        Err(e) => return Some(e),
    };

    if !plausible.contains(value) {
        return Some(ValidationError::error(
            field,
            ValidationCode::ExtremeValue,
            format!(
                "{} must be between {} and {} mmHg",
                field.label(),
                plausible.min,
                plausible.max
            ),
            value,
        ));
    }

    if !is_whole(value) {
        return Some(ValidationError::warning(
            field,
            ValidationCode::DecimalValue,
            format!("{} is normally recorded in whole mmHg", field.label()),
            value,
        ));
    }

    None
}

/// Validate systolic pressure on its own.
#[must_use]
pub fn validate_systolic(value: Option<f64>) -> Option<ValidationError> {
    validate_pressure(Field::SystolicBp, value, SYSTOLIC_PLAUSIBLE)
}

/// Validate diastolic pressure on its own.
#[must_use]
pub fn validate_diastolic(value: Option<f64>) -> Option<ValidationError> {
    validate_pressure(Field::DiastolicBp, value, DIASTOLIC_PLAUSIBLE)
}

/// Check the systolic/diastolic pair for ordering and pulse pressure.
///
/// Runs only when both readings are present and finite.
#[must_use]
pub fn validate_blood_pressure(
    systolic: Option<f64>,
    diastolic: Option<f64>,
) -> Option<ValidationError> {
    let (systolic, diastolic) = match (systolic, diastolic) {
        (Some(s), Some(d)) if s.is_finite() && d.is_finite() => (s, d),
        _ => return None,
    };

    if diastolic >= systolic {
        return Some(ValidationError::error(
            Field::DiastolicBp,
            ValidationCode::LogicalInconsistency,
            format!(
                "Diastolic pressure ({diastolic}) must be lower than systolic pressure \
                 ({systolic})"
            ),
            diastolic,
        ));
    }

    let pulse_pressure = systolic - diastolic;
    if !PULSE_PRESSURE_NORMAL.contains(pulse_pressure) {
        return Some(ValidationError::warning(
            Field::SystolicBp,
            ValidationCode::UnusualValue,
            format!(
                "Pulse pressure of {pulse_pressure} mmHg is unusual; please verify both readings"
            ),
            systolic,
        ));
    }

    None
}

/// Validate the gender selection.
#[must_use]
pub fn validate_gender(gender: Option<&str>) -> Option<ValidationError> {
    match gender {
        Some(g) if Gender::parse(g).is_some() => None,
        Some(g) => Some(ValidationError::new(
            Field::Gender,
            ValidationCode::RequiredField,
            Severity::Error,
            "Please select male or female",
            Some(FieldValue::Text(g.to_string())),
        )),
        None => Some(ValidationError::required(Field::Gender, None)),
    }
}

/// Validate the smoking status selection.
#[must_use]
pub fn validate_smoking_status(status: Option<&str>) -> Option<ValidationError> {
    match status {
        Some(s) if SmokingStatus::parse(s).is_some() => None,
        Some(s) => Some(ValidationError::new(
            Field::SmokingStatus,
            ValidationCode::RequiredField,
            Severity::Error,
            "Please select never, former or current",
            Some(FieldValue::Text(s.to_string())),
        )),
        None => Some(ValidationError::required(Field::SmokingStatus, None)),
    }
}

/// Validate a required yes/no answer.
#[must_use]
pub fn validate_flag(field: Field, value: Option<bool>) -> Option<ValidationError> {
    match value {
        Some(_) => None,
        None => Some(ValidationError::required(field, None)),
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Medical-consistency checks that span several fields.
#[must_use]
pub fn validate_cross_field(input: &PartialPatientInput) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let unit = input.cholesterol_unit;

    if let (Some(total), Some(hdl)) = (
        finite(input.total_cholesterol),
        finite(input.hdl_cholesterol),
    ) {
        if hdl >= total {
            findings.push(ValidationError::error(
                Field::HdlCholesterol,
                ValidationCode::LogicalInconsistency,
                "HDL cholesterol must be lower than total cholesterol",
                hdl,
            ));
        } else if total > 0.0 && !HDL_RATIO_NORMAL.contains(hdl / total) {
            findings.push(ValidationError::warning(
                Field::HdlCholesterol,
                ValidationCode::UnusualValue,
                format!(
                    "HDL is {:.0}% of total cholesterol; typical values are 10-60%",
                    hdl / total * 100.0
                ),
                hdl,
            ));
        }
    }

    if let (Some(glucose), Some(has_diabetes)) = (finite(input.blood_glucose), input.has_diabetes) {
        if let Ok(mg_dl) = standardize_glucose(glucose, input.glucose_unit) {
            if has_diabetes && mg_dl < 100.0 {
                findings.push(ValidationError::warning(
                    Field::BloodGlucose,
                    ValidationCode::MedicalInconsistency,
                    "Glucose is in the normal range although diabetes is reported",
                    glucose,
                ));
            } else if !has_diabetes && mg_dl > 200.0 {
                findings.push(ValidationError::new(
                    Field::HasDiabetes,
                    ValidationCode::MedicalInconsistency,
                    Severity::Warning,
                    "Glucose above 200 mg/dL suggests diabetes; please confirm diabetes status",
                    Some(FieldValue::Flag(has_diabetes)),
                ));
            }
        }
    }

    if let (Some(age), Some(true)) = (finite(input.age), input.family_history) {
        if age < 35.0 {
            findings.push(ValidationError::new(
                Field::FamilyHistory,
                ValidationCode::MedicalAdvisory,
                Severity::Info,
                "Early family history of heart disease warrants discussion with a doctor even \
                 at a young age",
                Some(FieldValue::Flag(true)),
            ));
        }
    }

    let gender = input.gender.as_deref().and_then(Gender::parse);
    if let (Some(gender), Some(hdl)) = (gender, finite(input.hdl_cholesterol)) {
        if let Ok(hdl_mg_dl) = standardize_cholesterol(hdl, unit) {
            let unusual = match gender {
                Gender::Male => hdl_mg_dl > 80.0,
                Gender::Female => hdl_mg_dl < 30.0,
            };
            if unusual {
                findings.push(ValidationError::warning(
                    Field::HdlCholesterol,
                    ValidationCode::GenderUnusual,
                    format!("HDL of {hdl_mg_dl:.0} mg/dL is unusual for a {gender} patient"),
                    hdl,
                ));
            }
        }
    }

    findings
}

/// Run every field check plus the cross-field checks.
#[must_use]
pub fn validate_all(input: &PartialPatientInput) -> Vec<ValidationError> {
    let unit = input.cholesterol_unit;
    let mut findings: Vec<ValidationError> = [
        validate_age(input.age),
        validate_gender(input.gender.as_deref()),
        validate_total_cholesterol(input.total_cholesterol, unit),
        validate_hdl_cholesterol(input.hdl_cholesterol, unit),
        validate_systolic(input.systolic_bp),
        validate_diastolic(input.diastolic_bp),
        validate_blood_pressure(input.systolic_bp, input.diastolic_bp),
        validate_flag(Field::OnBpMedication, input.on_bp_medication),
        validate_glucose(input.blood_glucose, input.glucose_unit),
        validate_smoking_status(input.smoking_status.as_deref()),
        validate_flag(Field::HasDiabetes, input.has_diabetes),
        validate_flag(Field::FamilyHistory, input.family_history),
    ]
    .into_iter()
    .flatten()
    .collect();

    findings.extend(validate_cross_field(input));
    findings
}

/// True when no blocking error is present; warnings and info do not count.
#[must_use]
pub fn is_complete(input: &PartialPatientInput) -> bool {
    !validate_all(input).iter().any(ValidationError::is_blocking)
}
