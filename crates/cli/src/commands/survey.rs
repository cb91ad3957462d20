//! Survey commands: list questions, encode answers, request predictions

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use survey_lib::predictor::format_distribution;
use survey_lib::schema::{FeatureSchema, FEATURE_ORDER};
use survey_lib::{FeatureVector, SurveyResponse};
use tabled::Tabled;

use crate::client::{ApiClient, PredictResponse};
use crate::output::{color_probability, print_error, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct QuestionRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Question")]
    question: &'static str,
    #[tabled(rename = "Accepted answers")]
    answers: String,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    feature: &'static str,
    #[tabled(rename = "Value")]
    value: f32,
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    feature_order: Vec<&'static str>,
    features: &'a FeatureVector,
}

/// List the survey questions in model input order
pub fn show_questions(format: OutputFormat) -> Result<()> {
    let schema = FeatureSchema::current();

    match format {
        OutputFormat::Json => print_json(&schema)?,
        OutputFormat::Table => {
            println!("{} ({})", "Survey Questions".bold(), schema.version);
            let rows: Vec<QuestionRow> = schema
                .fields
                .iter()
                .enumerate()
                .map(|(i, f)| QuestionRow {
                    position: i + 1,
                    field: f.name,
                    question: f.question,
                    answers: f.domain.describe(),
                })
                .collect();
            print_table(rows);
        }
    }

    Ok(())
}

/// Validate answers and print the encoded feature vector
pub fn encode_answers(input: &Path, format: OutputFormat) -> Result<()> {
    let response = read_response(input)?;
    let features = encode_checked(&response)?;

    match format {
        OutputFormat::Json => print_json(&EncodedOutput {
            feature_order: FeatureSchema::feature_names().to_vec(),
            features: &features,
        })?,
        OutputFormat::Table => {
            let rows: Vec<FeatureRow> = FEATURE_ORDER
                .iter()
                .map(|&f| FeatureRow {
                    feature: f.name(),
                    value: features.get(f),
                })
                .collect();
            print_table(rows);
        }
    }

    Ok(())
}

/// Submit answers to the server and print class probabilities
pub async fn predict(client: &ApiClient, input: &Path, format: OutputFormat) -> Result<()> {
    let response = read_response(input)?;
    // Reject locally first so every bad field is reported without a round trip
    encode_checked(&response)?;

    let result: PredictResponse = client.post("api/v1/predict", &response).await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            println!("{}", "Prediction".bold());
            println!("{}", "=".repeat(40));
            let probabilities = result.probabilities.as_array();
            for (line, probability) in format_distribution(&result.probabilities)
                .lines()
                .zip(probabilities)
            {
                println!("{}", color_probability(probability, line));
            }
            println!();
            println!("Most likely:  {}", result.most_likely.cyan());
            println!("Model:        {}", result.model_version);
        }
    }

    Ok(())
}

fn encode_checked(response: &SurveyResponse) -> Result<FeatureVector> {
    let errors = survey_lib::validate(response);
    if !errors.is_empty() {
        for err in &errors {
            print_error(&err.to_string());
        }
        anyhow::bail!("{} invalid answer(s)", errors.len());
    }
    Ok(survey_lib::encode(response)?)
}

fn read_response(input: &Path) -> Result<SurveyResponse> {
    let content = if input == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read answers from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };

    serde_json::from_str(&content).context("Failed to parse survey answers")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ANSWERS: &str = r#"{
        "Sex": "Male", "Age": "40-44", "Education": "College graduate",
        "Income": "Over $75000", "HighBP": "No", "HighChol": "No", "CholCheck": "Yes",
        "BMI": 22, "HealthScore": 5, "Smoker": "No", "Stroke": "No",
        "HeartDiseaseorAttack": "No", "HvyAlcoholConsump": "No", "AnyHealthcare": "Yes",
        "NoDocbcCost": "No", "DiffWalk": "No", "GenHlth": 1, "MentHlth": 0, "PhysHlth": 0
    }"#;

    #[test]
    fn test_read_and_encode_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, ANSWERS).unwrap();

        let response = read_response(&path).unwrap();
        let features = encode_checked(&response).unwrap();
        assert_eq!(
            features.values(),
            &[1.0, 5.0, 6.0, 8.0, 0.0, 0.0, 1.0, 22.0, 5.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_encode_checked_reports_all_errors() {
        let mut response: SurveyResponse = serde_json::from_str(ANSWERS).unwrap();
        response.age = String::new();
        response.bmi = -1.0;

        let err = encode_checked(&response).unwrap_err();
        assert_eq!(err.to_string(), "2 invalid answer(s)");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(read_response(&dir.path().join("nope.json")).is_err());
    }
}
