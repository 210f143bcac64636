//! Rule-based recommendations.
//!
//! A fixed base set per risk category is extended with personalized entries
//! gated on individual risk factors, then ordered by priority and kind.

use serde::{Deserialize, Serialize};

use super::assessment::RiskCategory;
use super::patient::{PatientInput, SmokingStatus};
use super::units::standardize_cholesterol;

/// Systolic pressure (mmHg) at which BP management is recommended.
const HYPERTENSION_SYSTOLIC: f64 = 140.0;
/// Diastolic pressure (mmHg) at which BP management is recommended.
const HYPERTENSION_DIASTOLIC: f64 = 90.0;
/// Total cholesterol (mg/dL) considered high.
const HIGH_TOTAL_CHOLESTEROL_MG_DL: f64 = 240.0;
/// HDL (mg/dL) considered low.
const LOW_HDL_MG_DL: f64 = 40.0;
/// Age from which age-related monitoring is suggested.
const SENIOR_AGE: u32 = 65;

/// Kind of recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Medical,
    Lifestyle,
    Monitoring,
}

impl RecommendationCategory {
    /// Sort rank; higher sorts first.
    fn rank(&self) -> u8 {
        match self {
            Self::Medical => 2,
            Self::Lifestyle => 1,
            Self::Monitoring => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Sort rank; higher sorts first.
    fn rank(&self) -> u8 {
        match self {
            Self::High => 2,
            Self::Medium => 1,
            Self::Low => 0,
        }
    }
}

/// External reading material attached to a recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
    pub description: String,
}

impl Resource {
    fn new(title: &str, url: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            url: url.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub action_items: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
}

impl Recommendation {
    fn new(
        category: RecommendationCategory,
        priority: Priority,
        title: &str,
        description: String,
        action_items: &[&str],
    ) -> Self {
        Self {
            category,
            priority,
            title: title.to_string(),
            description,
            action_items: action_items.iter().map(|s| (*s).to_string()).collect(),
            resources: None,
        }
    }

    fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.get_or_insert_with(Vec::new).push(resource);
        self
    }
}

fn healthy_living() -> Resource {
    Resource::new(
        "Healthy Living",
        "https://www.heart.org/en/healthy-living",
        "American Heart Association guidance on diet, activity and weight",
    )
}

fn base_recommendations(category: RiskCategory, risk: f64) -> Vec<Recommendation> {
    use Priority::{High, Low, Medium};
    use RecommendationCategory::{Lifestyle, Medical, Monitoring};

    match category {
        RiskCategory::Low => vec![
            Recommendation::new(
                Lifestyle,
                Medium,
                "Maintain a Heart-Healthy Lifestyle",
                format!(
                    "Your estimated 10-year cardiovascular risk is {risk:.1}%, which is low. \
                     Keeping your current habits helps it stay that way."
                ),
                &[
                    "Get at least 150 minutes of moderate activity per week",
                    "Eat a diet rich in vegetables, fruit, whole grains and fish",
                    "Maintain a healthy weight",
                    "Limit alcohol and avoid tobacco",
                ],
            )
            .with_resource(healthy_living()),
            Recommendation::new(
                Monitoring,
                Low,
                "Routine Health Checks",
                "Reassess your cardiovascular risk every 4-6 years or when your health changes."
                    .to_string(),
                &[
                    "Check blood pressure at least every 2 years",
                    "Check cholesterol every 4-6 years",
                ],
            ),
        ],
        RiskCategory::Moderate => vec![
            Recommendation::new(
                Medical,
                High,
                "Consult Your Healthcare Provider",
                format!(
                    "Your estimated 10-year cardiovascular risk is {risk:.1}%, which is moderate. \
                     A clinician can decide whether preventive treatment is appropriate."
                ),
                &[
                    "Schedule an appointment to review this result",
                    "Ask whether statin therapy is appropriate for you",
                    "Review any current medications",
                ],
            ),
            Recommendation::new(
                Lifestyle,
                High,
                "Intensify Lifestyle Changes",
                "Targeted changes in diet and activity can measurably lower a moderate risk."
                    .to_string(),
                &[
                    "Aim for 30 minutes of exercise on most days",
                    "Reduce saturated fat, salt and added sugar",
                    "Lose 5-10% of body weight if overweight",
                ],
            )
            .with_resource(healthy_living()),
            Recommendation::new(
                Monitoring,
                Medium,
                "Enhanced Monitoring",
                "Track your risk factors more closely to catch changes early.".to_string(),
                &[
                    "Check blood pressure every 6 months",
                    "Repeat a lipid panel every 1-2 years",
                    "Reassess cardiovascular risk annually",
                ],
            ),
        ],
        RiskCategory::High => vec![
            Recommendation::new(
                Medical,
                High,
                "Urgent Medical Evaluation",
                format!(
                    "Your estimated 10-year cardiovascular risk is {risk:.1}%, which is high. \
                     Please see a doctor soon to discuss treatment options."
                ),
                &[
                    "Book an appointment within the next few weeks",
                    "Discuss statin and blood pressure therapy",
                    "Ask about aspirin or other preventive medication",
                    "Learn the warning signs of heart attack and stroke",
                ],
            ),
            Recommendation::new(
                Lifestyle,
                High,
                "Aggressive Lifestyle Modification",
                "Comprehensive lifestyle change is essential alongside medical treatment."
                    .to_string(),
                &[
                    "Follow a structured diet plan such as DASH or Mediterranean",
                    "Start a supervised exercise program",
                    "Eliminate tobacco use completely",
                ],
            )
            .with_resource(healthy_living()),
            Recommendation::new(
                Monitoring,
                High,
                "Intensive Monitoring",
                "Frequent measurement helps you and your doctor judge treatment response."
                    .to_string(),
                &[
                    "Monitor blood pressure at home several times a week",
                    "Repeat blood tests as your doctor advises",
                    "Keep a log of readings to bring to appointments",
                ],
            ),
        ],
    }
}

fn personalized_recommendations(
    category: RiskCategory,
    input: &PatientInput,
) -> Vec<Recommendation> {
    use Priority::{High, Medium};
    use RecommendationCategory::{Lifestyle, Medical, Monitoring};

    let mut recommendations = Vec::new();
    let escalated = if category == RiskCategory::High { High } else { Medium };

    match input.smoking_status {
        SmokingStatus::Current => recommendations.push(
            Recommendation::new(
                Lifestyle,
                High,
                "Smoking Cessation Plan",
                "Smoking is one of the strongest modifiable cardiovascular risk factors. \
                 Quitting lowers risk within the first year."
                    .to_string(),
                &[
                    "Set a quit date within the next two weeks",
                    "Ask your doctor about nicotine replacement or medication",
                    "Call a quit line or join a support program",
                ],
            )
            .with_resource(Resource::new(
                "Smokefree.gov",
                "https://smokefree.gov/",
                "Free tools and support for quitting smoking",
            )),
        ),
        SmokingStatus::Former => recommendations.push(Recommendation::new(
            Lifestyle,
            Medium,
            "Stay Smoke-Free",
            "Quitting smoking was a major step. Your risk continues to fall the longer you \
             stay smoke-free."
                .to_string(),
            &["Avoid situations that trigger cravings", "Avoid second-hand smoke"],
        )),
        SmokingStatus::Never => {}
    }

    if input.has_diabetes {
        recommendations.push(
            Recommendation::new(
                Medical,
                High,
                "Diabetes Management",
                "Diabetes substantially increases cardiovascular risk; good glucose control \
                 reduces it."
                    .to_string(),
                &[
                    "Keep HbA1c within the target agreed with your doctor",
                    "Monitor blood glucose regularly",
                    "Have an annual diabetes review",
                ],
            )
            .with_resource(Resource::new(
                "American Diabetes Association",
                "https://diabetes.org/",
                "Living with diabetes and heart health",
            )),
        );
    }

    if input.systolic_bp >= HYPERTENSION_SYSTOLIC || input.diastolic_bp >= HYPERTENSION_DIASTOLIC {
        recommendations.push(
            Recommendation::new(
                Medical,
                escalated,
                "Blood Pressure Management",
                format!(
                    "Your blood pressure of {:.0}/{:.0} mmHg is in the hypertensive range.",
                    input.systolic_bp, input.diastolic_bp
                ),
                &[
                    "Discuss blood pressure treatment with your doctor",
                    "Limit sodium to less than 1,500 mg per day",
                    "Measure blood pressure at home regularly",
                ],
            )
            .with_resource(Resource::new(
                "High Blood Pressure",
                "https://www.heart.org/en/health-topics/high-blood-pressure",
                "Understanding and managing hypertension",
            )),
        );
    }

    let unit = input.cholesterol_unit;
    let high_total = standardize_cholesterol(input.total_cholesterol, unit)
        .is_ok_and(|tc| tc >= HIGH_TOTAL_CHOLESTEROL_MG_DL);
    let low_hdl = standardize_cholesterol(input.hdl_cholesterol, unit)
        .is_ok_and(|hdl| hdl < LOW_HDL_MG_DL);
    if high_total || low_hdl {
        recommendations.push(
            Recommendation::new(
                Medical,
                escalated,
                "Cholesterol Management",
                "Your cholesterol profile raises your cardiovascular risk.".to_string(),
                &[
                    "Discuss lipid-lowering therapy with your doctor",
                    "Replace saturated fats with unsaturated fats",
                    "Increase soluble fiber intake",
                ],
            )
            .with_resource(Resource::new(
                "CDC: Cholesterol",
                "https://www.cdc.gov/cholesterol/",
                "What cholesterol numbers mean and how to lower them",
            )),
        );
    }

    if input.age >= SENIOR_AGE {
        recommendations.push(Recommendation::new(
            Monitoring,
            Medium,
            "Age-Related Monitoring",
            "Cardiovascular risk rises with age, so regular check-ups matter more.".to_string(),
            &[
                "Have a yearly cardiovascular check-up",
                "Ask about screening for atrial fibrillation",
            ],
        ));
    }

    if input.family_history {
        recommendations.push(
            Recommendation::new(
                Monitoring,
                Medium,
                "Family History Awareness",
                "A family history of early heart disease increases your risk beyond what this \
                 score captures."
                    .to_string(),
                &[
                    "Tell your doctor which relatives were affected and at what age",
                    "Consider earlier and more frequent screening",
                ],
            )
            .with_resource(Resource::new(
                "CDC: Heart Disease",
                "https://www.cdc.gov/heart-disease/",
                "Heart disease risk factors, including family history",
            )),
        );
    }

    recommendations
}

/// Build the ordered recommendation list for a result.
///
/// Sorted by priority (high first), then kind (medical, lifestyle,
/// monitoring). The sort is stable, so equal entries keep insertion order.
#[must_use]
pub fn recommend(category: RiskCategory, risk: f64, input: &PatientInput) -> Vec<Recommendation> {
    let mut recommendations = base_recommendations(category, risk);

    for rec in personalized_recommendations(category, input) {
        if !recommendations.iter().any(|r| r.title == rec.title) {
            recommendations.push(rec);
        }
    }

    recommendations.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| b.category.rank().cmp(&a.category.rank()))
    });
    recommendations
}
