//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O, no clock reads and no
//! logging. All types are serializable and every computation is deterministic.

mod assessment;
pub mod comparison;
pub mod framingham;
mod patient;
pub mod recommendation;
pub mod units;
pub mod validation;

pub use assessment::{
    categorize, Assessment, RiskCategory, RiskResult, HIGH_RISK_THRESHOLD,
    MODERATE_RISK_THRESHOLD,
};
pub use comparison::ComparisonData;
pub use framingham::{ModelVariant, RiskError, RiskFactorBreakdown};
pub use patient::{Gender, PartialPatientInput, PatientInput, SmokingStatus};
pub use recommendation::{recommend, Priority, Recommendation, RecommendationCategory, Resource};
pub use units::{ConversionError, MeasurementUnit};
pub use validation::{is_complete, validate_all, Field, Severity, ValidationCode, ValidationError};

#[cfg(test)]
pub(crate) use patient::fixtures;
