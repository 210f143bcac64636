//! Framingham general cardiovascular risk score (D'Agostino et al., 2008).
//!
//! Log-linear proportional-hazards model:
//!
//! ```text
//! score = Σ βᵢ·xᵢ          (x = ln(age), ln(TC), ln(HDL), ln(SBP), smoker, diabetic)
//! risk  = 1 − S0^exp(score − mean)
//! ```
//!
//! `S0` (10-year baseline survival) and `mean` are sex-specific constants of
//! the published cohort. The +0.2 family-history term of
//! [`ModelVariant::FamilyHistoryExtended`] is a local extension and is not part
//! of the published coefficient set.

use serde::{Deserialize, Serialize};

use super::patient::{Gender, PatientInput, SmokingStatus};
use super::units::{round_to, standardize_cholesterol};
use super::validation::{Field, ValidationError};

/// Cholesterol above this (mg/dL, after standardization) is not calculable.
pub const CALCULABLE_CHOLESTEROL_CEILING_MG_DL: f64 = 1000.0;

/// Additive log-hazard modifier for a positive family history.
pub const FAMILY_HISTORY_MODIFIER: f64 = 0.2;

/// Error type for risk computation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RiskError {
    #[error("Invalid input: {} blocking validation error(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),

    #[error("Algorithm error: {0}")]
    AlgorithmError(String),

    #[error("{field} value {value} is outside the calculable range")]
    OutOfRange { field: Field, value: f64 },
}

/// Regression coefficients and baseline for one sex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSet {
    pub ln_age: f64,
    pub ln_total_cholesterol: f64,
    pub ln_hdl_cholesterol: f64,
    pub ln_systolic_untreated: f64,
    pub ln_systolic_treated: f64,
    pub smoker: f64,
    pub diabetes: f64,
    /// 10-year baseline survival (S0)
    pub baseline_survival: f64,
    /// Cohort mean of the total score
    pub mean_score: f64,
}

pub const MALE_COEFFICIENTS: CoefficientSet = CoefficientSet {
    ln_age: 3.06117,
    ln_total_cholesterol: 1.12370,
    ln_hdl_cholesterol: -0.93263,
    ln_systolic_untreated: 1.93303,
    ln_systolic_treated: 1.99881,
    smoker: 0.65451,
    diabetes: 0.57367,
    baseline_survival: 0.88936,
    mean_score: 23.9802,
};

pub const FEMALE_COEFFICIENTS: CoefficientSet = CoefficientSet {
    ln_age: 2.32888,
    ln_total_cholesterol: 1.20904,
    ln_hdl_cholesterol: -0.70833,
    ln_systolic_untreated: 2.76157,
    ln_systolic_treated: 2.82263,
    smoker: 0.52873,
    diabetes: 0.69154,
    baseline_survival: 0.95012,
    mean_score: 26.1931,
};

impl CoefficientSet {
    /// Coefficient set selected by sex.
    #[must_use]
    pub fn for_gender(gender: Gender) -> &'static Self {
        match gender {
            Gender::Male => &MALE_COEFFICIENTS,
            Gender::Female => &FEMALE_COEFFICIENTS,
        }
    }
}

/// Which formula variant to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelVariant {
    /// Published coefficients only
    Published,
    /// Published coefficients plus the family-history modifier
    #[default]
    FamilyHistoryExtended,
}

impl ModelVariant {
    /// Version string recorded on every result.
    #[must_use]
    pub fn algorithm_version(&self) -> &'static str {
        match self {
            Self::Published => "framingham-2008",
            Self::FamilyHistoryExtended => "framingham-2008+family-history",
        }
    }

    fn family_history_weight(&self) -> f64 {
        match self {
            Self::Published => 0.0,
            Self::FamilyHistoryExtended => FAMILY_HISTORY_MODIFIER,
        }
    }
}

/// Per-factor contributions on the log-hazard scale.
///
/// These explain the score; they are not a decomposition of the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactorBreakdown {
    pub age: f64,
    /// Always zero: sex acts through the coefficient set
    pub gender: f64,
    pub cholesterol: f64,
    pub blood_pressure: f64,
    pub smoking: f64,
    pub diabetes: f64,
    pub family_history: f64,
}

impl RiskFactorBreakdown {
    /// Sum of all contributions.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.age
            + self.gender
            + self.cholesterol
            + self.blood_pressure
            + self.smoking
            + self.diabetes
            + self.family_history
    }
}

/// Outcome of the scoring step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskScore {
    /// 10-year risk in percent, one decimal, within [0, 100]
    pub ten_year_risk: f64,
    pub factors: RiskFactorBreakdown,
    pub total_score: f64,
}

fn positive_ln(field: Field, value: f64) -> Result<f64, RiskError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(RiskError::OutOfRange { field, value });
    }
    Ok(value.ln())
}

fn standardized_cholesterol(
    field: Field,
    value: f64,
    input: &PatientInput,
) -> Result<f64, RiskError> {
    let mg_dl = standardize_cholesterol(value, input.cholesterol_unit)
        .map_err(|e| RiskError::AlgorithmError(e.to_string()))?;
    if mg_dl > CALCULABLE_CHOLESTEROL_CEILING_MG_DL {
        return Err(RiskError::OutOfRange { field, value: mg_dl });
    }
    Ok(mg_dl)
}

fn ensure_finite(what: &str, value: f64) -> Result<f64, RiskError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RiskError::AlgorithmError(format!("{what} is not finite: {value}")))
    }
}

/// Convert a total score into a 10-year risk percentage.
///
/// Clamped to [0, 100] and rounded to one decimal.
///
/// # Errors
/// Returns `RiskError::AlgorithmError` if the transform is not finite.
pub fn ten_year_risk(total_score: f64, coefficients: &CoefficientSet) -> Result<f64, RiskError> {
    let relative_hazard = ensure_finite(
        "relative hazard",
        (total_score - coefficients.mean_score).exp(),
    )?;
    let probability = ensure_finite(
        "risk probability",
        1.0 - coefficients.baseline_survival.powf(relative_hazard),
    )?;
    Ok(round_to((probability * 100.0).clamp(0.0, 100.0), 1))
}

/// Score a patient. Input is assumed to have passed validation.
///
/// # Errors
/// Returns `RiskError::OutOfRange` when a logarithm argument is not positive or
/// cholesterol exceeds the calculable ceiling, and `RiskError::AlgorithmError`
/// when any intermediate value is not finite.
pub fn score(input: &PatientInput, variant: ModelVariant) -> Result<RiskScore, RiskError> {
    let coefficients = CoefficientSet::for_gender(input.gender);

    let total_cholesterol =
        standardized_cholesterol(Field::TotalCholesterol, input.total_cholesterol, input)?;
    let hdl_cholesterol =
        standardized_cholesterol(Field::HdlCholesterol, input.hdl_cholesterol, input)?;

    let ln_age = positive_ln(Field::Age, f64::from(input.age))?;
    let ln_total = positive_ln(Field::TotalCholesterol, total_cholesterol)?;
    let ln_hdl = positive_ln(Field::HdlCholesterol, hdl_cholesterol)?;
    let ln_systolic = positive_ln(Field::SystolicBp, input.systolic_bp)?;

    let systolic_coefficient = if input.on_bp_medication {
        coefficients.ln_systolic_treated
    } else {
        coefficients.ln_systolic_untreated
    };

    let factors = RiskFactorBreakdown {
        age: coefficients.ln_age * ln_age,
        gender: 0.0,
        cholesterol: coefficients.ln_total_cholesterol * ln_total
            + coefficients.ln_hdl_cholesterol * ln_hdl,
        blood_pressure: systolic_coefficient * ln_systolic,
        smoking: if input.smoking_status == SmokingStatus::Current {
            coefficients.smoker
        } else {
            0.0
        },
        diabetes: if input.has_diabetes {
            coefficients.diabetes
        } else {
            0.0
        },
        family_history: if input.family_history {
            variant.family_history_weight()
        } else {
            0.0
        },
    };

    let total_score = ensure_finite("total score", factors.total())?;
    let ten_year_risk = ten_year_risk(total_score, coefficients)?;

    Ok(RiskScore {
        ten_year_risk,
        factors,
        total_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::fixtures::{high_risk_male, reference_male, young_female};
    use crate::domain::units::MeasurementUnit;

    fn risk(input: &PatientInput) -> f64 {
        score(input, ModelVariant::default())
            .expect("Should score")
            .ten_year_risk
    }

    #[test]
    fn test_reference_male() {
        let result = score(&reference_male(), ModelVariant::default()).expect("Should score");
        assert!((result.ten_year_risk - 13.9).abs() < 0.2, "got {}", result.ten_year_risk);
        assert!(result.ten_year_risk > 5.0 && result.ten_year_risk < 25.0);
    }

    #[test]
    fn test_young_female_is_low() {
        assert!(risk(&young_female()) < 10.0);
    }

    #[test]
    fn test_high_risk_male_is_high() {
        assert!(risk(&high_risk_male()) > 20.0);
    }

    #[test]
    fn test_breakdown_matches_formula() {
        let input = reference_male();
        let result = score(&input, ModelVariant::default()).expect("Should score");
        let factors = result.factors;

        assert!((factors.age - 3.06117 * 55f64.ln()).abs() < 1e-12);
        assert_eq!(factors.gender, 0.0);
        assert_eq!(factors.smoking, 0.0);
        assert_eq!(factors.family_history, 0.0);
        assert!((factors.total() - result.total_score).abs() < 1e-12);
    }

    #[test]
    fn test_treated_blood_pressure_uses_treated_coefficient() {
        let mut input = reference_male();
        input.on_bp_medication = true;
        let result = score(&input, ModelVariant::default()).expect("Should score");
        assert!((result.factors.blood_pressure - 1.99881 * 140f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_family_history_extension_is_optional() {
        let mut input = reference_male();
        input.family_history = true;

        let extended = score(&input, ModelVariant::FamilyHistoryExtended).expect("Should score");
        let published = score(&input, ModelVariant::Published).expect("Should score");

        assert!((extended.factors.family_history - FAMILY_HISTORY_MODIFIER).abs() < f64::EPSILON);
        assert_eq!(published.factors.family_history, 0.0);
        assert!(extended.ten_year_risk > published.ten_year_risk);
    }

    #[test]
    fn test_mmol_input_matches_mg_dl() {
        let mg = reference_male();
        let mmol = PatientInput {
            total_cholesterol: 5.17,
            hdl_cholesterol: 1.16,
            cholesterol_unit: MeasurementUnit::MmolL,
            ..reference_male()
        };
        assert!((risk(&mg) - risk(&mmol)).abs() < 0.1);
    }

    #[test]
    fn test_zero_hdl_is_out_of_range() {
        let input = PatientInput {
            hdl_cholesterol: 0.0,
            ..reference_male()
        };
        assert_eq!(
            score(&input, ModelVariant::default()),
            Err(RiskError::OutOfRange {
                field: Field::HdlCholesterol,
                value: 0.0
            })
        );
    }

    #[test]
    fn test_cholesterol_ceiling() {
        let input = PatientInput {
            total_cholesterol: 500.0,
            hdl_cholesterol: 50.0,
            cholesterol_unit: MeasurementUnit::MmolL,
            ..reference_male()
        };
        assert!(matches!(
            score(&input, ModelVariant::default()),
            Err(RiskError::OutOfRange {
                field: Field::TotalCholesterol,
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let input = PatientInput {
            systolic_bp: f64::NAN,
            ..reference_male()
        };
        assert!(matches!(
            score(&input, ModelVariant::default()),
            Err(RiskError::OutOfRange { .. })
        ));

        assert!(matches!(
            ten_year_risk(f64::INFINITY, &MALE_COEFFICIENTS),
            Err(RiskError::AlgorithmError(_))
        ));
    }

    #[test]
    fn test_risk_transform_is_clamped() {
        assert_eq!(ten_year_risk(-1000.0, &MALE_COEFFICIENTS), Ok(0.0));
        assert_eq!(ten_year_risk(40.0, &FEMALE_COEFFICIENTS), Ok(100.0));
    }
}
