//! Diagnosis result types.
//!
//! Represents the output of the heart disease classifier for one form
//! submission.

use serde::{Deserialize, Serialize};

use super::patient::PatientInput;

/// Probability at or above which a case is classified as high risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

/// Probability at or above which a case is classified as moderate risk.
pub const MODERATE_RISK_THRESHOLD: f64 = 0.4;

/// Risk level classification for heart disease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Probability below 0.4
    Low,
    /// Probability in [0.4, 0.7)
    Moderate,
    /// Probability of 0.7 or more
    High,
}

impl RiskLevel {
    /// Classify a positive-class probability.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability >= HIGH_RISK_THRESHOLD {
            Self::High
        } else if probability >= MODERATE_RISK_THRESHOLD {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    /// Headline shown above the echo table.
    #[must_use]
    pub fn headline(&self) -> &'static str {
        match self {
            Self::Low => "Low risk of heart disease",
            Self::Moderate => "Moderate risk of heart disease",
            Self::High => "High risk of heart disease!",
        }
    }

    /// Get a human-readable description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Low => "No significant indicators",
            Self::Moderate => "Follow-up recommended",
            Self::High => "Consultation with a cardiologist advised",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald (#10B981)
            Self::Moderate => (251, 191, 36), // Amber (#FBBF24)
            Self::High => (244, 63, 94),      // Rose (#F43F5E)
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low risk"),
            Self::Moderate => write!(f, "Moderate risk"),
            Self::High => write!(f, "High risk"),
        }
    }
}

/// Raw classifier output for one case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    /// Probability of the positive ("disease present") class, 0.0 to 1.0
    pub probability: f64,

    /// Predicted class label
    pub prediction: i32,
}

impl DiagnosisResult {
    #[must_use]
    pub fn new(probability: f64, prediction: i32) -> Self {
        Self {
            probability,
            prediction,
        }
    }

    #[must_use]
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_probability(self.probability)
    }

    /// Probability as a percentage with two decimals, e.g. `85.00%`.
    #[must_use]
    pub fn percent(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Complete diagnosis for one form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnosis {
    /// The values the prediction was computed from
    pub input: PatientInput,

    /// The classifier output
    pub result: DiagnosisResult,

    /// Risk classification
    pub risk_level: RiskLevel,

    /// Timestamp of diagnosis
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Diagnosis {
    #[must_use]
    pub fn new(input: PatientInput, result: DiagnosisResult) -> Self {
        Self {
            input,
            risk_level: result.risk_level(),
            result,
            created_at: chrono::Utc::now(),
        }
    }

    /// Risk message with the probability, e.g.
    /// `High risk of heart disease! (85.00% confidence)`.
    #[must_use]
    pub fn message(&self) -> String {
        format!(
            "{} ({} confidence)",
            self.risk_level.headline(),
            self.result.percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_thresholds() {
        let cases = [
            (0.0, RiskLevel::Low),
            (0.39, RiskLevel::Low),
            (0.4, RiskLevel::Moderate),
            (0.69, RiskLevel::Moderate),
            (0.7, RiskLevel::High),
            (1.0, RiskLevel::High),
        ];
        for (p, expected) in cases {
            assert_eq!(RiskLevel::from_probability(p), expected, "p = {p}");
        }
    }

    #[test]
    fn test_high_risk_message() {
        let diagnosis = Diagnosis::new(PatientInput::default(), DiagnosisResult::new(0.85, 1));
        assert_eq!(diagnosis.risk_level, RiskLevel::High);
        assert_eq!(diagnosis.risk_level.to_string(), "High risk");
        assert_eq!(diagnosis.result.percent(), "85.00%");
        assert_eq!(
            diagnosis.message(),
            "High risk of heart disease! (85.00% confidence)"
        );
    }

    #[test]
    fn test_low_and_moderate_messages() {
        let low = Diagnosis::new(PatientInput::default(), DiagnosisResult::new(0.123, 0));
        assert_eq!(low.message(), "Low risk of heart disease (12.30% confidence)");

        let moderate = Diagnosis::new(PatientInput::default(), DiagnosisResult::new(0.5, 1));
        assert_eq!(
            moderate.message(),
            "Moderate risk of heart disease (50.00% confidence)"
        );
    }
}
