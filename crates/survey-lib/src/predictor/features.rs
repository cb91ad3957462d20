//! Feature encoding for ML inference
//!
//! Maps questionnaire answers onto the numeric encoding the classifier was
//! trained with: binary answers to 0/1, ordinal answers to their 1-based
//! rank, scale answers passed through after a range and whole-number check.
//! Encoding is a pure function of the response.

use crate::error::ValidationError;
use crate::models::{Answer, FeatureVector, SurveyResponse};
use crate::schema::{FeatureField, FieldDomain, FEATURE_ORDER, NUM_FEATURES};

/// Encode a complete response, failing on the first invalid field
pub fn encode(response: &SurveyResponse) -> Result<FeatureVector, ValidationError> {
    let mut values = [0.0f32; NUM_FEATURES];
    for (slot, field) in values.iter_mut().zip(FEATURE_ORDER.iter()) {
        *slot = encode_field(*field, response.answer(*field))?;
    }
    Ok(FeatureVector::new(values))
}

/// Collect every field error in the response
pub fn validate(response: &SurveyResponse) -> Vec<ValidationError> {
    FEATURE_ORDER
        .iter()
        .filter_map(|field| encode_field(*field, response.answer(*field)).err())
        .collect()
}

/// Encode one answer against its field's domain
pub fn encode_field(field: FeatureField, answer: Answer<'_>) -> Result<f32, ValidationError> {
    let domain = field.domain();
    match (domain, answer) {
        (FieldDomain::Binary { negative, positive }, Answer::Label(label)) => {
            if label == negative {
                Ok(0.0)
            } else if label == positive {
                Ok(1.0)
            } else {
                Err(unmapped(field, &domain, label))
            }
        }
        (FieldDomain::Ordinal { labels }, Answer::Label(label)) => labels
            .iter()
            .position(|l| *l == label)
            .map(|i| (i + 1) as f32)
            .ok_or_else(|| unmapped(field, &domain, label)),
        (FieldDomain::Scale { min, max }, Answer::Number(value)) => {
            if !value.is_finite() {
                return Err(ValidationError::NotFinite {
                    field: field.name(),
                });
            }
            if value < min || value > max {
                return Err(ValidationError::OutOfRange {
                    field: field.name(),
                    value,
                    min,
                    max,
                });
            }
            if value.fract() != 0.0 {
                return Err(ValidationError::NotInteger {
                    field: field.name(),
                    value,
                });
            }
            Ok(value)
        }
        (_, Answer::Number(value)) => Err(unmapped(field, &domain, &value.to_string())),
        (_, Answer::Label(label)) => Err(unmapped(field, &domain, label)),
    }
}

fn unmapped(field: FeatureField, domain: &FieldDomain, value: &str) -> ValidationError {
    ValidationError::UnmappedLabel {
        field: field.name(),
        value: value.to_string(),
        allowed: domain.describe(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AGE_LABELS, EDUCATION_LABELS, INCOME_LABELS};

    fn example_response() -> SurveyResponse {
        SurveyResponse {
            sex: "Male".to_string(),
            age: "40-44".to_string(),
            education: "College graduate".to_string(),
            income: "Over $75000".to_string(),
            high_bp: "No".to_string(),
            high_chol: "No".to_string(),
            chol_check: "Yes".to_string(),
            bmi: 22.0,
            health_score: 5.0,
            smoker: "No".to_string(),
            stroke: "No".to_string(),
            heart_disease_or_attack: "No".to_string(),
            hvy_alcohol_consump: "No".to_string(),
            any_healthcare: "Yes".to_string(),
            no_docbc_cost: "No".to_string(),
            diff_walk: "No".to_string(),
            gen_hlth: 1.0,
            ment_hlth: 0.0,
            phys_hlth: 0.0,
        }
    }

    #[test]
    fn test_example_response_encoding() {
        let vector = encode(&example_response()).unwrap();
        assert_eq!(
            vector.values(),
            &[
                1.0, 5.0, 6.0, 8.0, 0.0, 0.0, 1.0, 22.0, 5.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0,
                1.0, 0.0, 0.0
            ]
        );
        assert_eq!(vector.len(), NUM_FEATURES);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let response = example_response();
        assert_eq!(encode(&response).unwrap(), encode(&response).unwrap());
    }

    #[test]
    fn test_ordinal_ranks() {
        for (i, label) in AGE_LABELS.iter().enumerate() {
            let v = encode_field(FeatureField::Age, Answer::Label(label)).unwrap();
            assert_eq!(v, (i + 1) as f32, "Age {}", label);
        }
        for (i, label) in EDUCATION_LABELS.iter().enumerate() {
            let v = encode_field(FeatureField::Education, Answer::Label(label)).unwrap();
            assert_eq!(v, (i + 1) as f32, "Education {}", label);
        }
        for (i, label) in INCOME_LABELS.iter().enumerate() {
            let v = encode_field(FeatureField::Income, Answer::Label(label)).unwrap();
            assert_eq!(v, (i + 1) as f32, "Income {}", label);
        }
    }

    #[test]
    fn test_documented_ranks() {
        assert_eq!(
            encode_field(FeatureField::Age, Answer::Label("30-34")).unwrap(),
            3.0
        );
        assert_eq!(
            encode_field(FeatureField::Education, Answer::Label("College graduate")).unwrap(),
            6.0
        );
        assert_eq!(
            encode_field(FeatureField::Income, Answer::Label("$20000-25000")).unwrap(),
            4.0
        );
        assert_eq!(
            encode_field(FeatureField::Age, Answer::Label("Over 80 Years")).unwrap(),
            13.0
        );
    }

    #[test]
    fn test_binary_mapping() {
        assert_eq!(encode_field(FeatureField::Sex, Answer::Label("Female")).unwrap(), 0.0);
        assert_eq!(encode_field(FeatureField::Sex, Answer::Label("Male")).unwrap(), 1.0);
        assert_eq!(encode_field(FeatureField::Stroke, Answer::Label("No")).unwrap(), 0.0);
        assert_eq!(encode_field(FeatureField::Stroke, Answer::Label("Yes")).unwrap(), 1.0);
        // Sex labels are not valid yes/no answers and vice versa
        assert!(encode_field(FeatureField::Stroke, Answer::Label("Male")).is_err());
        assert!(encode_field(FeatureField::Sex, Answer::Label("Yes")).is_err());
    }

    #[test]
    fn test_empty_age_is_rejected() {
        let mut response = example_response();
        response.age = String::new();
        let err = encode(&response).unwrap_err();
        assert_eq!(err.field(), "Age");
        assert!(matches!(err, ValidationError::UnmappedLabel { .. }));
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(encode_field(FeatureField::HighBP, Answer::Label("yes")).is_err());
        assert!(encode_field(FeatureField::Age, Answer::Label("over 80 years")).is_err());
    }

    #[test]
    fn test_scale_bounds_inclusive() {
        assert_eq!(encode_field(FeatureField::Bmi, Answer::Number(10.0)).unwrap(), 10.0);
        assert_eq!(encode_field(FeatureField::Bmi, Answer::Number(50.0)).unwrap(), 50.0);
        assert_eq!(encode_field(FeatureField::MentHlth, Answer::Number(0.0)).unwrap(), 0.0);
        assert_eq!(encode_field(FeatureField::PhysHlth, Answer::Number(30.0)).unwrap(), 30.0);
        assert_eq!(encode_field(FeatureField::Bmi, Answer::Number(27.0)).unwrap(), 27.0);
    }

    #[test]
    fn test_scale_rejects_fractions() {
        let cases = [
            (FeatureField::GenHlth, 2.5),
            (FeatureField::MentHlth, 0.3),
            (FeatureField::Bmi, 27.5),
        ];
        for (field, value) in cases {
            let err = encode_field(field, Answer::Number(value)).unwrap_err();
            assert_eq!(
                err,
                ValidationError::NotInteger {
                    field: field.name(),
                    value
                }
            );
        }
    }

    #[test]
    fn test_scale_out_of_range() {
        let cases = [
            (FeatureField::Bmi, 9.9),
            (FeatureField::Bmi, 50.1),
            (FeatureField::HealthScore, 0.0),
            (FeatureField::HealthScore, 23.0),
            (FeatureField::GenHlth, 6.0),
            (FeatureField::MentHlth, -1.0),
            (FeatureField::PhysHlth, 31.0),
        ];
        for (field, value) in cases {
            let err = encode_field(field, Answer::Number(value)).unwrap_err();
            assert!(
                matches!(err, ValidationError::OutOfRange { .. }),
                "{} = {} gave {:?}",
                field.name(),
                value,
                err
            );
        }
    }

    #[test]
    fn test_scale_not_finite() {
        let err = encode_field(FeatureField::Bmi, Answer::Number(f32::NAN)).unwrap_err();
        assert_eq!(err, ValidationError::NotFinite { field: "BMI" });
    }

    #[test]
    fn test_validate_reports_every_error() {
        let mut response = example_response();
        response.age = String::new();
        response.income = "lots".to_string();
        response.bmi = 80.0;
        let errors = validate(&response);
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["Age", "Income", "BMI"]);
    }

    #[test]
    fn test_validate_clean_response() {
        assert!(validate(&example_response()).is_empty());
    }
}
