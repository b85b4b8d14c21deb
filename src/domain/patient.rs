//! Patient input and the ordered feature vector for heart disease prediction.
//!
//! Based on the UCI / Kaggle heart disease dataset (13 clinical features).

use serde::{Deserialize, Serialize};

use super::choice::{ChestPain, Choice, MajorVessels, RestingEcg, Sex, StSlope, Thalassemia, YesNo};

/// Number of features consumed by the classifier.
pub const FEATURE_COUNT: usize = 13;

/// Dataset column names in feature-vector order.
///
/// The trained model indexes features by position, so this order must match
/// both the training CSV (label column removed) and `PatientInput::encode`.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal",
];

/// Name of the binary outcome column in the training dataset.
pub const LABEL_COLUMN: &str = "target";

/// Slider bounds for a numeric form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl NumericRange {
    /// Clamp a value into the slider range. NaN falls back to the default.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Move `value` by `steps` slider increments, snapping to the step grid.
    #[must_use]
    pub fn adjust(&self, value: f64, steps: i32) -> f64 {
        let ticks = ((value - self.min) / self.step).round() + f64::from(steps);
        // Divide by the inverse step so 0.1 increments land on 1.1, not 1.1000000000000001.
        self.clamp(self.min + ticks / (1.0 / self.step))
    }
}

/// Age in years.
pub const AGE_RANGE: NumericRange = NumericRange { min: 20.0, max: 80.0, step: 1.0, default: 50.0 };
/// Resting blood pressure in mmHg.
pub const RESTING_BP_RANGE: NumericRange = NumericRange { min: 90.0, max: 200.0, step: 1.0, default: 120.0 };
/// Serum cholesterol in mg/dl.
pub const CHOLESTEROL_RANGE: NumericRange = NumericRange { min: 100.0, max: 600.0, step: 1.0, default: 200.0 };
/// Maximum heart rate achieved in bpm.
pub const MAX_HEART_RATE_RANGE: NumericRange = NumericRange { min: 60.0, max: 220.0, step: 1.0, default: 150.0 };
/// ST depression induced by exercise relative to rest (oldpeak).
pub const ST_DEPRESSION_RANGE: NumericRange = NumericRange { min: 0.0, max: 6.0, step: 0.1, default: 1.0 };

/// Ordered numeric encoding of one case, as consumed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Build a vector from a slice.
    ///
    /// # Errors
    /// Returns error if the slice length is not 13.
    pub fn from_slice(values: &[f64]) -> Result<Self, String> {
        let array: [f64; FEATURE_COUNT] = values
            .try_into()
            .map_err(|_| format!("Expected {FEATURE_COUNT} features, got {}", values.len()))?;
        Ok(Self(array))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Value of a named feature.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|idx| self.0[idx])
    }
}

/// Values collected from the form, before encoding.
///
/// Numeric fields hold raw slider values; categorical fields hold the
/// selected option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub age: f64,
    pub sex: Sex,
    pub chest_pain: ChestPain,
    pub resting_bp: f64,
    pub cholesterol: f64,
    pub fasting_blood_sugar: YesNo,
    pub resting_ecg: RestingEcg,
    pub max_heart_rate: f64,
    pub exercise_angina: YesNo,
    pub st_depression: f64,
    pub st_slope: StSlope,
    pub major_vessels: MajorVessels,
    pub thalassemia: Thalassemia,
}

impl Default for PatientInput {
    fn default() -> Self {
        Self {
            age: AGE_RANGE.default,
            sex: Sex::default(),
            chest_pain: ChestPain::default(),
            resting_bp: RESTING_BP_RANGE.default,
            cholesterol: CHOLESTEROL_RANGE.default,
            fasting_blood_sugar: YesNo::default(),
            resting_ecg: RestingEcg::default(),
            max_heart_rate: MAX_HEART_RATE_RANGE.default,
            exercise_angina: YesNo::default(),
            st_depression: ST_DEPRESSION_RANGE.default,
            st_slope: StSlope::default(),
            major_vessels: MajorVessels::default(),
            thalassemia: Thalassemia::default(),
        }
    }
}

impl PatientInput {
    /// Copy of this input with every numeric field clamped to its slider range.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.age = AGE_RANGE.clamp(self.age);
        self.resting_bp = RESTING_BP_RANGE.clamp(self.resting_bp);
        self.cholesterol = CHOLESTEROL_RANGE.clamp(self.cholesterol);
        self.max_heart_rate = MAX_HEART_RATE_RANGE.clamp(self.max_heart_rate);
        self.st_depression = ST_DEPRESSION_RANGE.clamp(self.st_depression);
        self
    }

    /// Encode into the 13-element vector in `FEATURE_NAMES` order.
    #[must_use]
    pub fn encode(&self) -> FeatureVector {
        let input = self.clamped();
        FeatureVector([
            input.age,
            f64::from(input.sex.code()),
            f64::from(input.chest_pain.code()),
            input.resting_bp,
            input.cholesterol,
            f64::from(input.fasting_blood_sugar.code()),
            f64::from(input.resting_ecg.code()),
            input.max_heart_rate,
            f64::from(input.exercise_angina.code()),
            input.st_depression,
            f64::from(input.st_slope.code()),
            f64::from(input.major_vessels.code()),
            f64::from(input.thalassemia.code()),
        ])
    }

    /// Echo table rows: (column, human-readable value) in feature order.
    #[must_use]
    pub fn summary(&self) -> Vec<(&'static str, String)> {
        let input = self.clamped();
        vec![
            ("Age", format!("{:.0}", input.age)),
            ("Sex", input.sex.label().to_string()),
            ("Chest Pain", input.chest_pain.label().to_string()),
            ("Resting BP", format!("{:.0}", input.resting_bp)),
            ("Cholesterol", format!("{:.0}", input.cholesterol)),
            ("FBS", input.fasting_blood_sugar.label().to_string()),
            ("Rest ECG", input.resting_ecg.label().to_string()),
            ("Max HR", format!("{:.0}", input.max_heart_rate)),
            ("Exercise Angina", input.exercise_angina.label().to_string()),
            ("Oldpeak", format!("{:.1}", input.st_depression)),
            ("Slope", input.st_slope.label().to_string()),
            ("CA", input.major_vessels.label().to_string()),
            ("Thal", input.thalassemia.label().to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_input() -> PatientInput {
        PatientInput {
            age: 50.0,
            sex: Sex::Male,
            chest_pain: ChestPain::Asymptomatic,
            resting_bp: 120.0,
            cholesterol: 200.0,
            fasting_blood_sugar: YesNo::No,
            resting_ecg: RestingEcg::Normal,
            max_heart_rate: 150.0,
            exercise_angina: YesNo::No,
            st_depression: 1.0,
            st_slope: StSlope::Flat,
            major_vessels: MajorVessels::None,
            thalassemia: Thalassemia::Normal,
        }
    }

    #[test]
    fn test_encode_scenario() {
        let vector = scenario_input().encode();
        assert_eq!(
            vector.as_slice(),
            &[50.0, 1.0, 3.0, 120.0, 200.0, 0.0, 0.0, 150.0, 0.0, 1.0, 1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_encode_preserves_feature_order() {
        let input = PatientInput {
            age: 63.0,
            sex: Sex::Female,
            chest_pain: ChestPain::NonAnginalPain,
            resting_bp: 145.0,
            cholesterol: 233.0,
            fasting_blood_sugar: YesNo::Yes,
            resting_ecg: RestingEcg::LeftVentricularHypertrophy,
            max_heart_rate: 99.0,
            exercise_angina: YesNo::Yes,
            st_depression: 2.3,
            st_slope: StSlope::Downsloping,
            major_vessels: MajorVessels::Two,
            thalassemia: Thalassemia::ReversibleDefect,
        };
        let vector = input.encode();

        assert_eq!(vector.as_slice().len(), FEATURE_COUNT);
        assert_eq!(vector.get("age"), Some(63.0));
        assert_eq!(vector.get("sex"), Some(0.0));
        assert_eq!(vector.get("cp"), Some(2.0));
        assert_eq!(vector.get("trestbps"), Some(145.0));
        assert_eq!(vector.get("chol"), Some(233.0));
        assert_eq!(vector.get("fbs"), Some(1.0));
        assert_eq!(vector.get("restecg"), Some(2.0));
        assert_eq!(vector.get("thalach"), Some(99.0));
        assert_eq!(vector.get("exang"), Some(1.0));
        assert_eq!(vector.get("oldpeak"), Some(2.3));
        assert_eq!(vector.get("slope"), Some(2.0));
        assert_eq!(vector.get("ca"), Some(2.0));
        assert_eq!(vector.get("thal"), Some(3.0));
        assert_eq!(vector.get("target"), None);
    }

    #[test]
    fn test_encode_clamps_numeric_fields() {
        let input = PatientInput {
            age: 95.0,
            resting_bp: 10.0,
            cholesterol: 900.0,
            max_heart_rate: f64::NAN,
            st_depression: -1.0,
            ..PatientInput::default()
        };
        let vector = input.encode();
        assert_eq!(vector.get("age"), Some(80.0));
        assert_eq!(vector.get("trestbps"), Some(90.0));
        assert_eq!(vector.get("chol"), Some(600.0));
        assert_eq!(vector.get("thalach"), Some(150.0));
        assert_eq!(vector.get("oldpeak"), Some(0.0));
    }

    #[test]
    fn test_range_adjust_snaps_to_step() {
        assert_eq!(ST_DEPRESSION_RANGE.adjust(1.0, 1), 1.1);
        assert_eq!(ST_DEPRESSION_RANGE.adjust(1.0, -3), 0.7);
        assert_eq!(ST_DEPRESSION_RANGE.adjust(5.95, 10), 6.0);
        assert_eq!(AGE_RANGE.adjust(50.0, -100), 20.0);
        assert_eq!(CHOLESTEROL_RANGE.adjust(200.0, 10), 210.0);
    }

    #[test]
    fn test_from_slice_length() {
        assert!(FeatureVector::from_slice(&[0.0; 13]).is_ok());
        let err = FeatureVector::from_slice(&[0.0; 12]).expect_err("must reject");
        assert!(err.contains("Expected 13"));
    }

    #[test]
    fn test_summary_is_human_readable() {
        let summary = scenario_input().summary();
        assert_eq!(summary.len(), FEATURE_COUNT);
        assert_eq!(summary[0], ("Age", "50".to_string()));
        assert_eq!(summary[1], ("Sex", "Male".to_string()));
        assert_eq!(summary[2], ("Chest Pain", "Asymptomatic (No Pain)".to_string()));
        assert_eq!(summary[9], ("Oldpeak", "1.0".to_string()));
        assert_eq!(summary[12], ("Thal", "Normal".to_string()));
    }
}
