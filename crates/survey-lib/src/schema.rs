//! Survey feature schema
//!
//! The classifier was trained on 19 columns in a fixed order with fixed
//! categorical encodings. This module is the single place that order and
//! those encodings live; the encoder and the artifact loader both read it.

use serde::Serialize;

/// Version tag of the feature contract, recorded alongside the model
pub const SCHEMA_VERSION: &str = "diabetes-survey-19/v1";

/// Number of features the classifier consumes
pub const NUM_FEATURES: usize = 19;

/// Number of classes the classifier scores
pub const NUM_CLASSES: usize = 3;

/// Class labels in model output order
pub const CLASS_LABELS: [&str; NUM_CLASSES] = ["No Diabetes", "Prediabetes", "Diabetes"];

pub const AGE_LABELS: [&str; 13] = [
    "18-24",
    "25-29",
    "30-34",
    "35-39",
    "40-44",
    "45-49",
    "50-54",
    "55-59",
    "60-64",
    "65-69",
    "70-74",
    "75-79",
    "Over 80 Years",
];

pub const EDUCATION_LABELS: [&str; 6] = [
    "Never attended school or only kindergarten",
    "Elementary",
    "Some High school",
    "High school graduate",
    "Some college",
    "College graduate",
];

pub const INCOME_LABELS: [&str; 8] = [
    "Less than $10000",
    "$10000-15000",
    "$15000-20000",
    "$20000-25000",
    "$25000-35000",
    "$35000-50000",
    "$50000-75000",
    "Over $75000",
];

/// Allowed values for a single survey field
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldDomain {
    /// Two labels encoded as 0 and 1
    Binary {
        negative: &'static str,
        positive: &'static str,
    },
    /// Ranked labels encoded as 1..=labels.len()
    Ordinal { labels: &'static [&'static str] },
    /// Whole number passed through, inclusive bounds
    Scale { min: f32, max: f32 },
}

const YES_NO: FieldDomain = FieldDomain::Binary {
    negative: "No",
    positive: "Yes",
};

/// Survey fields, one per model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureField {
    Sex,
    Age,
    Education,
    Income,
    HighBP,
    HighChol,
    CholCheck,
    Bmi,
    HealthScore,
    Smoker,
    Stroke,
    HeartDiseaseorAttack,
    HvyAlcoholConsump,
    AnyHealthcare,
    NoDocbcCost,
    DiffWalk,
    GenHlth,
    MentHlth,
    PhysHlth,
}

/// Column order the classifier was trained on. Frozen.
pub const FEATURE_ORDER: [FeatureField; NUM_FEATURES] = [
    FeatureField::Sex,
    FeatureField::Age,
    FeatureField::Education,
    FeatureField::Income,
    FeatureField::HighBP,
    FeatureField::HighChol,
    FeatureField::CholCheck,
    FeatureField::Bmi,
    FeatureField::HealthScore,
    FeatureField::Smoker,
    FeatureField::Stroke,
    FeatureField::HeartDiseaseorAttack,
    FeatureField::HvyAlcoholConsump,
    FeatureField::AnyHealthcare,
    FeatureField::NoDocbcCost,
    FeatureField::DiffWalk,
    FeatureField::GenHlth,
    FeatureField::MentHlth,
    FeatureField::PhysHlth,
];

impl FeatureField {
    /// Column name used in training data and JSON payloads
    pub fn name(self) -> &'static str {
        match self {
            FeatureField::Sex => "Sex",
            FeatureField::Age => "Age",
            FeatureField::Education => "Education",
            FeatureField::Income => "Income",
            FeatureField::HighBP => "HighBP",
            FeatureField::HighChol => "HighChol",
            FeatureField::CholCheck => "CholCheck",
            FeatureField::Bmi => "BMI",
            FeatureField::HealthScore => "HealthScore",
            FeatureField::Smoker => "Smoker",
            FeatureField::Stroke => "Stroke",
            FeatureField::HeartDiseaseorAttack => "HeartDiseaseorAttack",
            FeatureField::HvyAlcoholConsump => "HvyAlcoholConsump",
            FeatureField::AnyHealthcare => "AnyHealthcare",
            FeatureField::NoDocbcCost => "NoDocbcCost",
            FeatureField::DiffWalk => "DiffWalk",
            FeatureField::GenHlth => "GenHlth",
            FeatureField::MentHlth => "MentHlth",
            FeatureField::PhysHlth => "PhysHlth",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            FeatureField::Sex => "Sex",
            FeatureField::Age => "Age",
            FeatureField::Education => "Education level",
            FeatureField::Income => "Income level",
            FeatureField::HighBP => "Do you have high blood pressure?",
            FeatureField::HighChol => "Do you have high cholesterol?",
            FeatureField::CholCheck => "Have you had your cholesterol checked?",
            FeatureField::Bmi => "What is your BMI?",
            FeatureField::HealthScore => "What is your health score?",
            FeatureField::Smoker => "Are you a smoker?",
            FeatureField::Stroke => "Have you had a stroke?",
            FeatureField::HeartDiseaseorAttack => "Have you had heart disease or attack?",
            FeatureField::HvyAlcoholConsump => "Do you consume heavy amounts of alcohol?",
            FeatureField::AnyHealthcare => "Do you have any healthcare coverage?",
            FeatureField::NoDocbcCost => "Have you been unable to see a doctor because of cost?",
            FeatureField::DiffWalk => "Do you have difficulty walking?",
            FeatureField::GenHlth => "How is your general health? (1=Excellent, 5=Poor)",
            FeatureField::MentHlth => "Number of days with poor mental health in the past month",
            FeatureField::PhysHlth => {
                "Number of days with poor physical health in the past month"
            }
        }
    }

    pub fn domain(self) -> FieldDomain {
        match self {
            FeatureField::Sex => FieldDomain::Binary {
                negative: "Female",
                positive: "Male",
            },
            FeatureField::Age => FieldDomain::Ordinal {
                labels: &AGE_LABELS,
            },
            FeatureField::Education => FieldDomain::Ordinal {
                labels: &EDUCATION_LABELS,
            },
            FeatureField::Income => FieldDomain::Ordinal {
                labels: &INCOME_LABELS,
            },
            FeatureField::Bmi => FieldDomain::Scale {
                min: 10.0,
                max: 50.0,
            },
            FeatureField::HealthScore => FieldDomain::Scale {
                min: 1.0,
                max: 22.0,
            },
            FeatureField::GenHlth => FieldDomain::Scale { min: 1.0, max: 5.0 },
            FeatureField::MentHlth | FeatureField::PhysHlth => FieldDomain::Scale {
                min: 0.0,
                max: 30.0,
            },
            FeatureField::HighBP
            | FeatureField::HighChol
            | FeatureField::CholCheck
            | FeatureField::Smoker
            | FeatureField::Stroke
            | FeatureField::HeartDiseaseorAttack
            | FeatureField::HvyAlcoholConsump
            | FeatureField::AnyHealthcare
            | FeatureField::NoDocbcCost
            | FeatureField::DiffWalk => YES_NO,
        }
    }

    /// Position of this field in the feature vector
    pub fn index(self) -> usize {
        FEATURE_ORDER
            .iter()
            .position(|f| *f == self)
            .unwrap_or_else(|| unreachable!("every field is listed in FEATURE_ORDER"))
    }
}

impl FieldDomain {
    /// Human-readable list of accepted answers, used in error messages
    pub fn describe(&self) -> String {
        match self {
            FieldDomain::Binary { negative, positive } => format!("{}, {}", negative, positive),
            FieldDomain::Ordinal { labels } => labels.join(", "),
            FieldDomain::Scale { min, max } => format!("{}..={}", min, max),
        }
    }
}

/// Serializable description of one field, served to clients
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub question: &'static str,
    pub domain: FieldDomain,
}

/// Serializable description of the whole input contract
#[derive(Debug, Clone, Serialize)]
pub struct FeatureSchema {
    pub version: &'static str,
    pub classes: [&'static str; NUM_CLASSES],
    pub fields: Vec<FieldSpec>,
}

impl FeatureSchema {
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION,
            classes: CLASS_LABELS,
            fields: FEATURE_ORDER
                .iter()
                .map(|f| FieldSpec {
                    name: f.name(),
                    question: f.question(),
                    domain: f.domain(),
                })
                .collect(),
        }
    }

    /// Column names in model order
    pub fn feature_names() -> [&'static str; NUM_FEATURES] {
        FEATURE_ORDER.map(FeatureField::name)
    }

    /// Check an artifact's declared column order against the frozen contract
    pub fn check_feature_order(names: &[String]) -> Result<(), String> {
        if names.len() != NUM_FEATURES {
            return Err(format!(
                "artifact declares {} features, expected {}",
                names.len(),
                NUM_FEATURES
            ));
        }
        for (i, (got, field)) in names.iter().zip(FEATURE_ORDER.iter()).enumerate() {
            if got != field.name() {
                return Err(format!(
                    "feature {} is {:?}, expected {:?}",
                    i,
                    got,
                    field.name()
                ));
            }
        }
        Ok(())
    }

    pub fn check_classes(classes: &[String]) -> Result<(), String> {
        if classes.len() != NUM_CLASSES
            || classes.iter().zip(CLASS_LABELS.iter()).any(|(a, b)| a != b)
        {
            return Err(format!(
                "artifact classes {:?} do not match {:?}",
                classes, CLASS_LABELS
            ));
        }
        Ok(())
    }
}
