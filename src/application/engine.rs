//! Risk engine: Orchestrates validation, scoring and recommendations.
//!
//! Pipeline for one request:
//! 1. Validate (blocking errors refuse the calculation)
//! 2. Score with the configured Framingham variant
//! 3. Categorize the percentage
//! 4. Build recommendations and comparison baselines

use chrono::{DateTime, Utc};

use crate::domain::comparison::compare;
use crate::domain::framingham::score;
use crate::domain::validation::blocking_errors;
use crate::domain::{
    categorize, recommend, validate_all, Assessment, PartialPatientInput, PatientInput,
    RiskError, RiskResult, ValidationError,
};
use crate::ports::Clock;

use super::EngineConfig;

/// Service computing cardiovascular risk results.
///
/// Holds no per-request state; a single engine can serve concurrent callers.
pub struct RiskEngine<C>
where
    C: Clock,
{
    clock: C,
    config: EngineConfig,
}

impl<C: Clock> RiskEngine<C> {
    /// Create an engine with an explicit clock and configuration.
    pub fn with_clock(clock: C, config: EngineConfig) -> Self {
        Self { clock, config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the risk result for a complete patient record.
    ///
    /// Non-blocking findings are logged and do not stop the calculation.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidInput` if validation reports any blocking
    /// error, `RiskError::OutOfRange` or `RiskError::AlgorithmError` if the
    /// formula cannot be evaluated.
    pub fn compute(&self, input: &PatientInput) -> Result<RiskResult, RiskError> {
        let calculated_at = self.clock.now();
        let findings = validate_all(&PartialPatientInput::from(input));
        refuse_blocking(&findings)?;
        self.compute_checked(input, &findings, calculated_at)
    }

    /// Validate a submitted record and, if it is complete, compute its result.
    ///
    /// The returned `Assessment` carries the warnings and advisory notes the
    /// caller should show alongside the result.
    ///
    /// # Errors
    /// Returns `RiskError::InvalidInput` with the blocking findings if the
    /// record is incomplete, otherwise the errors of [`RiskEngine::compute`].
    pub fn assess(&self, input: &PartialPatientInput) -> Result<Assessment, RiskError> {
        let calculated_at = self.clock.now();
        let findings = validate_all(input);
        refuse_blocking(&findings)?;

        let patient = PatientInput::from_validated(input, &findings)?;
        let result = self.compute_checked(&patient, &findings, calculated_at)?;

        Ok(Assessment {
            result,
            notices: findings,
        })
    }

    /// Score a record whose findings carry no blocking error.
    fn compute_checked(
        &self,
        input: &PatientInput,
        findings: &[ValidationError],
        calculated_at: DateTime<Utc>,
    ) -> Result<RiskResult, RiskError> {
        if !findings.is_empty() {
            tracing::warn!(
                notice_count = findings.len(),
                "Calculating risk despite validation warnings"
            );
        }

        let model = self.config.model;
        tracing::debug!("Scoring with {}", model.algorithm_version());
        let scored = score(input, model).inspect_err(log_score_failure)?;

        let risk_category = categorize(scored.ten_year_risk);
        let recommendations = recommend(risk_category, scored.ten_year_risk, input);
        let comparison_data = compare(input.gender, input.age);

        tracing::info!(
            "Risk calculation complete: risk={:.1}%, category={}, recommendations={}, algorithm={}",
            scored.ten_year_risk,
            risk_category,
            recommendations.len(),
            model.algorithm_version()
        );

        Ok(RiskResult {
            ten_year_risk: scored.ten_year_risk,
            risk_category,
            risk_factors: scored.factors,
            comparison_data,
            recommendations,
            calculated_at,
            algorithm_version: model.algorithm_version().to_string(),
        })
    }
}

fn refuse_blocking(findings: &[ValidationError]) -> Result<(), RiskError> {
    let blocking = blocking_errors(findings);
    if blocking.is_empty() {
        return Ok(());
    }
    tracing::warn!(
        error_count = blocking.len(),
        "Refusing risk calculation: input has blocking validation errors"
    );
    Err(RiskError::InvalidInput(blocking))
}

/// Log a scoring failure by kind and field only; the offending value stays out
/// of the log.
fn log_score_failure(error: &RiskError) {
    match error {
        RiskError::OutOfRange { field, .. } => tracing::warn!(
            field = %field,
            "Risk score could not be evaluated: value outside calculable range"
        ),
        RiskError::AlgorithmError(_) => {
            tracing::warn!("Risk score could not be evaluated: non-finite intermediate result")
        }
        RiskError::InvalidInput(errors) => tracing::warn!(
            error_count = errors.len(),
            "Risk score could not be evaluated: invalid input"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sanitize::SanitizingMakeWriter;
    use crate::adapters::FixedClock;
    use crate::domain::fixtures::{high_risk_male, reference_male, young_female};
    use crate::domain::{
        Field, MeasurementUnit, ModelVariant, Priority, RiskCategory, Severity, ValidationCode,
    };
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink shared with the test.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().expect("Log buffer")).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("Log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn instant() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .expect("Valid timestamp")
            .with_timezone(&Utc)
    }

    fn create_test_engine() -> RiskEngine<FixedClock> {
        RiskEngine::with_clock(FixedClock(instant()), EngineConfig::default())
    }

    #[test]
    fn test_reference_male_scenario() {
        let result = create_test_engine()
            .compute(&reference_male())
            .expect("Should compute");

        assert!(result.ten_year_risk > 5.0 && result.ten_year_risk < 25.0);
        assert_eq!(result.risk_category, categorize(result.ten_year_risk));
        assert_eq!(result.risk_category, RiskCategory::Moderate);
        assert_eq!(result.calculated_at, instant());
        assert_eq!(result.algorithm_version, "framingham-2008+family-history");
        assert_eq!(result.comparison_data.average_for_age, 13.0);
    }

    #[test]
    fn test_young_female_scenario() {
        let result = create_test_engine()
            .compute(&young_female())
            .expect("Should compute");
        assert!(result.ten_year_risk < 10.0);
        assert_eq!(result.risk_category, RiskCategory::Low);
    }

    #[test]
    fn test_high_risk_scenario() {
        let result = create_test_engine()
            .compute(&high_risk_male())
            .expect("Should compute");

        assert!(result.ten_year_risk > 20.0);
        assert_eq!(result.risk_category, RiskCategory::High);

        let priority_of = |title: &str| {
            result
                .recommendations
                .iter()
                .find(|r| r.title == title)
                .map(|r| r.priority)
        };
        assert_eq!(priority_of("Smoking Cessation Plan"), Some(Priority::High));
        assert_eq!(priority_of("Diabetes Management"), Some(Priority::High));
        assert_eq!(priority_of("Blood Pressure Management"), Some(Priority::High));
        assert_eq!(priority_of("Cholesterol Management"), Some(Priority::High));
    }

    #[test]
    fn test_inverted_blood_pressure_is_refused() {
        let input = PatientInput {
            systolic_bp: 80.0,
            diastolic_bp: 90.0,
            ..reference_male()
        };
        match create_test_engine().compute(&input) {
            Err(RiskError::InvalidInput(errors)) => {
                assert!(errors.iter().any(|e| e.field == Field::DiastolicBp
                    && e.code == ValidationCode::LogicalInconsistency));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_unit_equivalence_scenario() {
        let engine = create_test_engine();
        let mg = engine.compute(&reference_male()).expect("Should compute");
        let mmol = engine
            .compute(&PatientInput {
                total_cholesterol: 5.17,
                hdl_cholesterol: 1.16,
                cholesterol_unit: MeasurementUnit::MmolL,
                ..reference_male()
            })
            .expect("Should compute");
        assert!((mg.ten_year_risk - mmol.ten_year_risk).abs() < 0.1);
    }

    #[test]
    fn test_warnings_do_not_block_compute() {
        let input = PatientInput {
            age: 84,
            ..reference_male()
        };
        let result = create_test_engine().compute(&input).expect("Warnings only");
        assert!(result.ten_year_risk > 0.0);
    }

    #[test]
    fn test_zero_hdl_passes_validation_but_not_scoring() {
        let input = PatientInput {
            hdl_cholesterol: 0.0,
            ..reference_male()
        };
        assert!(matches!(
            create_test_engine().compute(&input),
            Err(RiskError::OutOfRange {
                field: Field::HdlCholesterol,
                ..
            })
        ));
    }

    #[test]
    fn test_score_failure_log_omits_value() {
        // Read as a unit mix-up (warning), then 500 mmol/L standardizes to 19335 mg/dL
        let input = PatientInput {
            total_cholesterol: 500.0,
            hdl_cholesterol: 1.16,
            cholesterol_unit: MeasurementUnit::MmolL,
            ..reference_male()
        };

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(SanitizingMakeWriter::new(logs.clone()))
            .finish();
        let result = tracing::subscriber::with_default(subscriber, || {
            create_test_engine().compute(&input)
        });

        assert!(matches!(
            result,
            Err(RiskError::OutOfRange {
                field: Field::TotalCholesterol,
                value,
            }) if value == 19335.0
        ));

        let text = logs.text();
        assert!(text.contains("Risk score could not be evaluated"));
        assert!(text.contains("totalCholesterol"));
        assert!(!text.contains("19335"));
    }

    #[test]
    fn test_published_variant() {
        let engine = RiskEngine::with_clock(
            FixedClock(instant()),
            EngineConfig {
                model: ModelVariant::Published,
            },
        );
        let input = PatientInput {
            family_history: true,
            ..reference_male()
        };
        let result = engine.compute(&input).expect("Should compute");
        assert_eq!(result.algorithm_version, "framingham-2008");
        assert_eq!(result.risk_factors.family_history, 0.0);
    }

    #[test]
    fn test_assess_returns_notices() {
        let mut input = PartialPatientInput::from(&reference_male());
        input.age = Some(32.0);
        input.family_history = Some(true);

        let assessment = create_test_engine().assess(&input).expect("Should assess");
        assert_eq!(assessment.notices.len(), 1);
        assert_eq!(assessment.notices[0].severity, Severity::Info);
        assert_eq!(assessment.result.calculated_at, instant());
    }

    #[test]
    fn test_assess_rejects_incomplete_input() {
        let result = create_test_engine().assess(&PartialPatientInput::default());
        assert!(matches!(result, Err(RiskError::InvalidInput(errors)) if errors.len() == 10));
    }

    #[test]
    fn test_result_serialization() {
        let result = create_test_engine()
            .compute(&reference_male())
            .expect("Should compute");
        let json = serde_json::to_value(&result).expect("Should serialize");

        assert_eq!(json["riskCategory"], "moderate");
        assert_eq!(json["calculatedAt"], "2024-03-01T12:00:00Z");
        assert!(json["riskFactors"]["bloodPressure"].is_number());
        assert!(json["comparisonData"]["averageForAge"].is_number());

        let back: RiskResult = serde_json::from_value(json).expect("Should deserialize");
        assert_eq!(back.ten_year_risk, result.ten_year_risk);
        assert_eq!(back.calculated_at, result.calculated_at);
        assert_eq!(back.recommendations, result.recommendations);
    }
}

/// Property-based tests using proptest
#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::adapters::FixedClock;
    use crate::domain::{is_complete, Gender, MeasurementUnit, RiskCategory, SmokingStatus};
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    fn engine() -> RiskEngine<FixedClock> {
        RiskEngine::with_clock(
            FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            EngineConfig::default(),
        )
    }

    prop_compose! {
        fn valid_patient()(
            age in 30u32..=79,
            male in any::<bool>(),
            total in 150.0..300.0f64,
            hdl in 30.0..75.0f64,
            systolic in 100u32..=180,
            pulse_pressure in 30u32..=60,
            treated in any::<bool>(),
            smoking in prop::sample::select(vec![
                SmokingStatus::Never,
                SmokingStatus::Former,
                SmokingStatus::Current,
            ]),
            diabetic in any::<bool>(),
            family_history in any::<bool>(),
        ) -> PatientInput {
            PatientInput {
                age,
                gender: if male { Gender::Male } else { Gender::Female },
                total_cholesterol: total.round(),
                hdl_cholesterol: hdl.round(),
                cholesterol_unit: MeasurementUnit::MgDl,
                systolic_bp: f64::from(systolic),
                diastolic_bp: f64::from(systolic - pulse_pressure),
                on_bp_medication: treated,
                blood_glucose: None,
                glucose_unit: MeasurementUnit::MgDl,
                smoking_status: smoking,
                has_diabetes: diabetic,
                family_history,
            }
        }
    }

    fn risk(input: &PatientInput) -> f64 {
        engine().compute(input).expect("valid input").ten_year_risk
    }

    proptest! {
        /// Generated inputs are complete and always compute
        #[test]
        fn complete_inputs_compute(input in valid_patient()) {
            prop_assert!(is_complete(&PartialPatientInput::from(&input)));
            prop_assert!(engine().compute(&input).is_ok());
        }

        /// Risk stays within [0, 100]
        #[test]
        fn risk_is_bounded(input in valid_patient()) {
            let r = risk(&input);
            prop_assert!((0.0..=100.0).contains(&r), "risk {}", r);
        }

        /// Same input, same numbers
        #[test]
        fn compute_is_deterministic(input in valid_patient()) {
            let first = engine().compute(&input).expect("valid input");
            let second = engine().compute(&input).expect("valid input");
            prop_assert_eq!(first.ten_year_risk.to_bits(), second.ten_year_risk.to_bits());
            prop_assert_eq!(first.risk_category, second.risk_category);
        }

        /// Category always agrees with the thresholds
        #[test]
        fn category_matches_thresholds(input in valid_patient()) {
            let result = engine().compute(&input).expect("valid input");
            let expected = if result.ten_year_risk >= 20.0 {
                RiskCategory::High
            } else if result.ten_year_risk >= 10.0 {
                RiskCategory::Moderate
            } else {
                RiskCategory::Low
            };
            prop_assert_eq!(result.risk_category, expected);
        }

        /// Adding a risk factor never lowers the risk
        #[test]
        fn risk_factors_are_monotonic(input in valid_patient()) {
            let baseline = PatientInput {
                smoking_status: SmokingStatus::Never,
                has_diabetes: false,
                family_history: false,
                on_bp_medication: false,
                ..input.clone()
            };
            let base = risk(&baseline);

            let smoker = PatientInput {
                smoking_status: SmokingStatus::Current,
                ..baseline.clone()
            };
            let diabetic = PatientInput {
                has_diabetes: true,
                ..baseline.clone()
            };
            let family = PatientInput {
                family_history: true,
                ..baseline.clone()
            };
            let treated = PatientInput {
                on_bp_medication: true,
                ..baseline.clone()
            };

            prop_assert!(risk(&smoker) >= base);
            prop_assert!(risk(&diabetic) >= base);
            prop_assert!(risk(&family) >= base);
            prop_assert!(risk(&treated) >= base);

            if baseline.age < 79 {
                let older = PatientInput {
                    age: baseline.age + 1,
                    ..baseline.clone()
                };
                prop_assert!(risk(&older) >= base);
            }
        }

        /// Inverted blood pressure is always refused
        #[test]
        fn incomplete_inputs_are_refused(input in valid_patient(), gap in 0u32..=20) {
            let inverted = PatientInput {
                diastolic_bp: input.systolic_bp + f64::from(gap),
                ..input
            };
            prop_assert!(!is_complete(&PartialPatientInput::from(&inverted)));
            let refused = matches!(engine().compute(&inverted), Err(RiskError::InvalidInput(_)));
            prop_assert!(refused);
        }
    }
}
