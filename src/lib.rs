//! # cardiorisk
//!
//! 10-year cardiovascular risk estimation using the Framingham general CVD
//! risk score.
//!
//! This crate provides:
//! - Unit conversion between mg/dL and mmol/L for cholesterol and glucose
//! - Medical-domain validation with severity-graded findings
//! - The log-linear risk score and its baseline-survival transform
//! - Risk categorization and rule-based recommendations
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Pure business types and computations
//! - `ports`: Trait definitions for external operations (the clock)
//! - `adapters`: Concrete implementations (clocks, JSON, log sanitization)
//! - `application`: The risk engine orchestrating the pipeline
//!
//! ```no_run
//! use cardiorisk::adapters::SystemClock;
//! use cardiorisk::application::{EngineConfig, RiskEngine};
//! use cardiorisk::domain::PartialPatientInput;
//!
//! # fn run(input: PartialPatientInput) -> cardiorisk::Result<()> {
//! let engine = RiskEngine::with_clock(SystemClock, EngineConfig::from_env_or_default());
//! let assessment = engine.assess(&input)?;
//! println!("{}% ({})", assessment.result.ten_year_risk, assessment.result.risk_category);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use domain::{
    PatientInput, PartialPatientInput, RiskCategory, RiskError, RiskResult, ValidationError,
};

/// Result type for cardiorisk operations
pub type Result<T> = std::result::Result<T, CardioRiskError>;

/// Main error type for cardiorisk
#[derive(Debug, thiserror::Error)]
pub enum CardioRiskError {
    #[error("Risk calculation failed: {0}")]
    Risk(#[from] domain::RiskError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
