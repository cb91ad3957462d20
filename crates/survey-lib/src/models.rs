//! Core data models for survey prediction

use crate::error::InferenceError;
use crate::schema::{FeatureField, CLASS_LABELS, NUM_CLASSES, NUM_FEATURES};
use serde::{Deserialize, Serialize};

/// Tolerance for the sum of a probability distribution
pub const PROBABILITY_SUM_TOLERANCE: f32 = 1e-4;

/// Raw questionnaire answers, keyed by training column name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age")]
    pub age: String,
    #[serde(rename = "Education")]
    pub education: String,
    #[serde(rename = "Income")]
    pub income: String,
    #[serde(rename = "HighBP")]
    pub high_bp: String,
    #[serde(rename = "HighChol")]
    pub high_chol: String,
    #[serde(rename = "CholCheck")]
    pub chol_check: String,
    #[serde(rename = "BMI")]
    pub bmi: f32,
    #[serde(rename = "HealthScore")]
    pub health_score: f32,
    #[serde(rename = "Smoker")]
    pub smoker: String,
    #[serde(rename = "Stroke")]
    pub stroke: String,
    #[serde(rename = "HeartDiseaseorAttack")]
    pub heart_disease_or_attack: String,
    #[serde(rename = "HvyAlcoholConsump")]
    pub hvy_alcohol_consump: String,
    #[serde(rename = "AnyHealthcare")]
    pub any_healthcare: String,
    #[serde(rename = "NoDocbcCost")]
    pub no_docbc_cost: String,
    #[serde(rename = "DiffWalk")]
    pub diff_walk: String,
    #[serde(rename = "GenHlth")]
    pub gen_hlth: f32,
    #[serde(rename = "MentHlth")]
    pub ment_hlth: f32,
    #[serde(rename = "PhysHlth")]
    pub phys_hlth: f32,
}

/// A single answer as given, before encoding
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Answer<'a> {
    Label(&'a str),
    Number(f32),
}

impl SurveyResponse {
    /// Look up the answer for one field
    pub fn answer(&self, field: FeatureField) -> Answer<'_> {
        match field {
            FeatureField::Sex => Answer::Label(&self.sex),
            FeatureField::Age => Answer::Label(&self.age),
            FeatureField::Education => Answer::Label(&self.education),
            FeatureField::Income => Answer::Label(&self.income),
            FeatureField::HighBP => Answer::Label(&self.high_bp),
            FeatureField::HighChol => Answer::Label(&self.high_chol),
            FeatureField::CholCheck => Answer::Label(&self.chol_check),
            FeatureField::Bmi => Answer::Number(self.bmi),
            FeatureField::HealthScore => Answer::Number(self.health_score),
            FeatureField::Smoker => Answer::Label(&self.smoker),
            FeatureField::Stroke => Answer::Label(&self.stroke),
            FeatureField::HeartDiseaseorAttack => Answer::Label(&self.heart_disease_or_attack),
            FeatureField::HvyAlcoholConsump => Answer::Label(&self.hvy_alcohol_consump),
            FeatureField::AnyHealthcare => Answer::Label(&self.any_healthcare),
            FeatureField::NoDocbcCost => Answer::Label(&self.no_docbc_cost),
            FeatureField::DiffWalk => Answer::Label(&self.diff_walk),
            FeatureField::GenHlth => Answer::Number(self.gen_hlth),
            FeatureField::MentHlth => Answer::Number(self.ment_hlth),
            FeatureField::PhysHlth => Answer::Number(self.phys_hlth),
        }
    }
}

/// Encoded model input in schema order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f32; NUM_FEATURES]);

impl FeatureVector {
    pub fn new(values: [f32; NUM_FEATURES]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f32; NUM_FEATURES] {
        &self.0
    }

    pub fn get(&self, field: FeatureField) -> f32 {
        self.0[field.index()]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Class probabilities returned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityDistribution {
    pub no_diabetes: f32,
    pub prediabetes: f32,
    pub diabetes: f32,
}

impl ProbabilityDistribution {
    /// Build a distribution from raw model output, checking it is well formed
    pub fn from_model_output(values: &[f32]) -> Result<Self, InferenceError> {
        if values.len() != NUM_CLASSES {
            return Err(InferenceError::InvalidOutput(format!(
                "expected {} class probabilities, got {}",
                NUM_CLASSES,
                values.len()
            )));
        }
        if let Some(bad) = values
            .iter()
            .find(|p| !p.is_finite() || **p < 0.0 || **p > 1.0)
        {
            return Err(InferenceError::InvalidOutput(format!(
                "probability {} is not in [0, 1]",
                bad
            )));
        }
        let sum: f32 = values.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(InferenceError::InvalidOutput(format!(
                "probabilities sum to {}, expected 1",
                sum
            )));
        }
        Ok(Self {
            no_diabetes: values[0],
            prediabetes: values[1],
            diabetes: values[2],
        })
    }

    /// Probabilities in class order
    pub fn as_array(&self) -> [f32; NUM_CLASSES] {
        [self.no_diabetes, self.prediabetes, self.diabetes]
    }

    pub fn sum(&self) -> f32 {
        self.as_array().iter().sum()
    }

    /// (label, probability) pairs in class order
    pub fn labelled(&self) -> impl Iterator<Item = (&'static str, f32)> {
        CLASS_LABELS.into_iter().zip(self.as_array())
    }

    /// Highest-probability class; ties resolve to the earlier class
    pub fn most_likely(&self) -> (&'static str, f32) {
        self.labelled()
            .fold(("", f32::NEG_INFINITY), |best, (label, p)| {
                if p > best.1 {
                    (label, p)
                } else {
                    best
                }
            })
    }
}
