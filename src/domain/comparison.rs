//! Population comparison baselines.
//!
//! Approximate 10-year risk averages by sex and age band. These are
//! illustrative reference figures for context only: they are not derived from
//! the Framingham regression and can be replaced without affecting the score.

use serde::{Deserialize, Serialize};

use super::patient::Gender;

/// One age band of the reference table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBand {
    /// Inclusive lower age; the band extends to the next band's lower age
    pub from_age: u32,
    /// Approximate average 10-year risk (%)
    pub average: f64,
    /// Risk (%) of a same-age person with optimal risk factors
    pub ideal: f64,
}

impl AgeBand {
    const fn new(from_age: u32, average: f64, ideal: f64) -> Self {
        Self {
            from_age,
            average,
            ideal,
        }
    }
}

/// Reference figures for one sex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonTable {
    pub bands: &'static [AgeBand],
    /// Average across all ages (%)
    pub overall_average: f64,
}

const MALE_BANDS: [AgeBand; 5] = [
    AgeBand::new(0, 3.0, 1.0),
    AgeBand::new(40, 7.0, 2.0),
    AgeBand::new(50, 13.0, 4.0),
    AgeBand::new(60, 21.0, 7.0),
    AgeBand::new(70, 30.0, 11.0),
];

const FEMALE_BANDS: [AgeBand; 5] = [
    AgeBand::new(0, 1.0, 0.5),
    AgeBand::new(40, 3.0, 1.0),
    AgeBand::new(50, 6.5, 2.0),
    AgeBand::new(60, 11.0, 4.0),
    AgeBand::new(70, 18.0, 7.0),
];

pub const MALE_COMPARISON: ComparisonTable = ComparisonTable {
    bands: &MALE_BANDS,
    overall_average: 12.0,
};

pub const FEMALE_COMPARISON: ComparisonTable = ComparisonTable {
    bands: &FEMALE_BANDS,
    overall_average: 7.0,
};

impl ComparisonTable {
    #[must_use]
    pub fn for_gender(gender: Gender) -> &'static Self {
        match gender {
            Gender::Male => &MALE_COMPARISON,
            Gender::Female => &FEMALE_COMPARISON,
        }
    }

    /// Band containing `age`. Ages past the last band use the last band.
    #[must_use]
    pub fn band(&self, age: u32) -> AgeBand {
        self.bands
            .iter()
            .rev()
            .find(|band| age >= band.from_age)
            .or_else(|| self.bands.first())
            .copied()
            .unwrap_or(AgeBand {
                from_age: 0,
                average: self.overall_average,
                ideal: self.overall_average,
            })
    }
}

/// Context figures shown next to a patient's own risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonData {
    pub average_for_age: f64,
    pub average_for_gender: f64,
    pub ideal_risk: f64,
}

/// Look up the comparison baselines for a patient.
#[must_use]
pub fn compare(gender: Gender, age: u32) -> ComparisonData {
    let table = ComparisonTable::for_gender(gender);
    let band = table.band(age);
    ComparisonData {
        average_for_age: band.average,
        average_for_gender: table.overall_average,
        ideal_risk: band.ideal,
    }
}
