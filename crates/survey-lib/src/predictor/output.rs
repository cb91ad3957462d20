//! Prediction output formatting
//!
//! Turns a probability distribution into the labelled percentages shown to
//! the person who filled in the survey.

use crate::models::ProbabilityDistribution;
use serde::{Deserialize, Serialize};

/// Decimal places used for displayed percentages
pub const DISPLAY_DECIMALS: usize = 2;

/// One labelled line of output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f32,
    pub display: String,
}

/// Formats probability distributions for display
pub struct OutputFormatter {
    decimals: usize,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            decimals: DISPLAY_DECIMALS,
        }
    }

    /// Format a probability as a percentage, e.g. `0.8712` -> `87.12%`
    pub fn percentage(&self, probability: f32) -> String {
        format!("{:.*}%", self.decimals, probability as f64 * 100.0)
    }

    /// One `"<Class>: <pct>%"` line per class, in class order
    pub fn lines(&self, distribution: &ProbabilityDistribution) -> Vec<String> {
        distribution
            .labelled()
            .map(|(label, p)| format!("{}: {}", label, self.percentage(p)))
            .collect()
    }

    pub fn classes(&self, distribution: &ProbabilityDistribution) -> Vec<ClassProbability> {
        distribution
            .labelled()
            .map(|(label, p)| ClassProbability {
                label: label.to_string(),
                probability: p,
                display: self.percentage(p),
            })
            .collect()
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a distribution as three lines with two-decimal percentages
pub fn format_distribution(distribution: &ProbabilityDistribution) -> String {
    OutputFormatter::new().lines(distribution).join("\n")
}
