//! Risk classification and the composed result of one calculation.

use serde::{Deserialize, Serialize};

use super::comparison::ComparisonData;
use super::framingham::RiskFactorBreakdown;
use super::recommendation::Recommendation;
use super::validation::ValidationError;

/// Lower bound (%) of the moderate category.
pub const MODERATE_RISK_THRESHOLD: f64 = 10.0;

/// Lower bound (%) of the high category.
pub const HIGH_RISK_THRESHOLD: f64 = 20.0;

/// 10-year cardiovascular risk classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskCategory {
    /// Below 10%
    Low,
    /// 10% up to, not including, 20%
    Moderate,
    /// 20% and above
    High,
}

impl RiskCategory {
    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "Low risk - Maintain current healthy habits",
            Self::Moderate => "Moderate risk - Discuss prevention with a doctor",
            Self::High => "High risk - Prompt medical evaluation advised",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classify a 10-year risk percentage.
///
/// Lower bounds are inclusive: 10.0 is moderate and 20.0 is high.
#[must_use]
pub fn categorize(risk: f64) -> RiskCategory {
    if risk >= HIGH_RISK_THRESHOLD {
        RiskCategory::High
    } else if risk >= MODERATE_RISK_THRESHOLD {
        RiskCategory::Moderate
    } else {
        RiskCategory::Low
    }
}

/// Complete outcome of one risk calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    /// Percent, one decimal, within [0, 100]
    pub ten_year_risk: f64,

    pub risk_category: RiskCategory,

    pub risk_factors: RiskFactorBreakdown,

    pub comparison_data: ComparisonData,

    pub recommendations: Vec<Recommendation>,

    /// Metadata only; never influences the numbers
    pub calculated_at: chrono::DateTime<chrono::Utc>,

    pub algorithm_version: String,
}

/// A result together with the non-blocking findings it was computed despite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub result: RiskResult,

    /// Warnings and advisory notes to show the user
    pub notices: Vec<ValidationError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_thresholds() {
        assert_eq!(categorize(0.0), RiskCategory::Low);
        assert_eq!(categorize(9.9), RiskCategory::Low);
        assert_eq!(categorize(10.0), RiskCategory::Moderate);
        assert_eq!(categorize(19.9), RiskCategory::Moderate);
        assert_eq!(categorize(20.0), RiskCategory::High);
        assert_eq!(categorize(100.0), RiskCategory::High);
    }

    #[test]
    fn test_category_display_and_serde() {
        assert_eq!(RiskCategory::Moderate.to_string(), "MODERATE");
        let json = serde_json::to_string(&RiskCategory::High).expect("Should serialize");
        assert_eq!(json, "\"high\"");
    }
}
