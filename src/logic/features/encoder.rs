//! Feature Encoder - Raw profile → scaled model input
//!
//! Mirrors the preprocessing used at training time:
//! 1. Build the ordered record (FEATURE_LAYOUT order)
//! 2. Label-encode every categorical column with its fitted encoder
//! 3. Run the fitted scaler over the numeric row

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

use crate::logic::profile::ValidatedProfile;
use super::layout::{self, FeatureKind, FEATURE_COUNT, FEATURE_LAYOUT};
use super::vector::FeatureVector;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// Value never seen while the encoder was fitted
    UnknownCategory { field: String, value: String },
    /// Categorical column without a fitted encoder
    MissingEncoder(String),
    /// Scaler parameters do not cover the feature layout
    ShapeMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for EncodingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodingError::UnknownCategory { field, value } => {
                write!(f, "EncodingError: unseen label '{}' for column '{}'", value, field)
            }
            EncodingError::MissingEncoder(field) => {
                write!(f, "EncodingError: no encoder fitted for column '{}'", field)
            }
            EncodingError::ShapeMismatch { expected, actual } => {
                write!(f, "EncodingError: expected {} features, scaler has {}", expected, actual)
            }
        }
    }
}

impl std::error::Error for EncodingError {}

// ============================================================================
// RAW RECORD
// ============================================================================

/// One column of the raw record before encoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Numeric(f32),
    Categorical(&'static str),
}

/// Ordered record built from a validated profile
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub values: [RawValue; FEATURE_COUNT],
}

impl FeatureRecord {
    pub fn from_profile(profile: &ValidatedProfile) -> Self {
        Self {
            values: [
                RawValue::Numeric(profile.age() as f32),
                RawValue::Categorical(profile.gender().label()),
                RawValue::Categorical(profile.education().label()),
                RawValue::Categorical(profile.job_title().label()),
                RawValue::Numeric(profile.experience_years() as f32),
            ],
        }
    }

    /// (column name, value) pairs in layout order
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, &RawValue)> {
        FEATURE_LAYOUT.iter().copied().zip(self.values.iter())
    }
}

// ============================================================================
// LABEL ENCODER
// ============================================================================

/// Fitted label encoder: code = position in `classes`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit on the given labels (sorted + deduplicated, like training)
    #[cfg(test)]
    pub fn fit<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut classes: Vec<String> = labels.into_iter().map(Into::into).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn transform(&self, field: &str, value: &str) -> Result<f32, EncodingError> {
        self.classes
            .iter()
            .position(|c| c == value)
            .map(|i| i as f32)
            .ok_or_else(|| EncodingError::UnknownCategory {
                field: field.to_string(),
                value: value.to_string(),
            })
    }

    #[cfg(test)]
    pub fn inverse_transform(&self, code: f32) -> Option<&str> {
        if code < 0.0 || code.fract() != 0.0 {
            return None;
        }
        self.classes.get(code as usize).map(String::as_str)
    }
}

/// Encoders keyed by column name
pub type Encoders = BTreeMap<String, LabelEncoder>;

// ============================================================================
// SCALER
// ============================================================================

/// Fitted scaler parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// (x - mean) / scale
    Standard {
        mean: Vec<f32>,
        scale: Vec<f32>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
    /// (x - min) / (max - min)
    MinMax {
        min_vals: Vec<f32>,
        max_vals: Vec<f32>,
        #[serde(default)]
        feature_names: Option<Vec<String>>,
    },
}

impl Scaler {
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Scaler::Standard { feature_names, .. } | Scaler::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            }
        }
    }

    /// Number of columns the scaler was fitted on
    pub fn dimension(&self) -> usize {
        match self {
            Scaler::Standard { mean, scale, .. } => mean.len().min(scale.len()),
            Scaler::MinMax { min_vals, max_vals, .. } => min_vals.len().min(max_vals.len()),
        }
    }

    /// Check parameters against the feature layout
    pub fn check_shape(&self) -> Result<(), EncodingError> {
        let actual = self.dimension();
        if actual != FEATURE_COUNT {
            return Err(EncodingError::ShapeMismatch { expected: FEATURE_COUNT, actual });
        }
        Ok(())
    }

    pub fn transform(&self, row: &[f32; FEATURE_COUNT]) -> Result<[f32; FEATURE_COUNT], EncodingError> {
        self.check_shape()?;

        let mut scaled = [0.0f32; FEATURE_COUNT];
        for i in 0..FEATURE_COUNT {
            scaled[i] = match self {
                Scaler::Standard { mean, scale, .. } => {
                    // zero variance columns are left unscaled
                    let s = if scale[i].abs() < 1e-8 { 1.0 } else { scale[i] };
                    (row[i] - mean[i]) / s
                }
                Scaler::MinMax { min_vals, max_vals, .. } => {
                    let range = (max_vals[i] - min_vals[i]).max(1e-8);
                    (row[i] - min_vals[i]) / range
                }
            };
        }

        Ok(scaled)
    }
}

// ============================================================================
// FEATURE ENCODER
// ============================================================================

/// Encoders + scaler, applied in training order
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    encoders: Encoders,
    scaler: Scaler,
}

impl FeatureEncoder {
    pub fn new(encoders: Encoders, scaler: Scaler) -> Self {
        Self { encoders, scaler }
    }

    #[cfg(test)]
    pub fn encoders(&self) -> &Encoders {
        &self.encoders
    }

    #[cfg(test)]
    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    /// Label-encode categorical columns; numeric columns pass through
    pub fn encode_record(&self, record: &FeatureRecord) -> Result<[f32; FEATURE_COUNT], EncodingError> {
        let mut row = [0.0f32; FEATURE_COUNT];

        for (i, (name, value)) in record.columns().enumerate() {
            row[i] = match value {
                RawValue::Numeric(v) => *v,
                RawValue::Categorical(label) => {
                    let encoder = self.encoders
                        .get(name)
                        .ok_or_else(|| EncodingError::MissingEncoder(name.to_string()))?;
                    encoder.transform(name, label)?
                }
            };
        }

        Ok(row)
    }

    /// Full pipeline: record → encoded row → scaled vector
    pub fn encode(&self, profile: &ValidatedProfile) -> Result<FeatureVector, EncodingError> {
        let record = FeatureRecord::from_profile(profile);
        let row = self.encode_record(&record)?;
        let scaled = self.scaler.transform(&row)?;
        Ok(FeatureVector::from_values(scaled))
    }

    /// Categorical columns that have no fitted encoder
    pub fn missing_encoders(&self) -> Vec<&'static str> {
        FEATURE_LAYOUT
            .iter()
            .enumerate()
            .filter(|(i, _)| layout::feature_kind(*i) == Some(FeatureKind::Categorical))
            .map(|(_, name)| *name)
            .filter(|name| !self.encoders.contains_key(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_encoder_fit_sorts_classes() {
        let encoder = LabelEncoder::fit(["Male", "Female", "Male"]);
        assert_eq!(encoder.classes, vec!["Female".to_string(), "Male".to_string()]);
        assert_eq!(encoder.transform("Gender", "Female"), Ok(0.0));
        assert_eq!(encoder.transform("Gender", "Male"), Ok(1.0));
    }

    #[test]
    fn test_label_encoder_round_trip() {
        let encoder = LabelEncoder::fit(["PhD", "Bachelor's", "Master's", "High School"]);
        for class in &encoder.classes {
            let code = encoder.transform("Education Level", class).unwrap();
            assert_eq!(encoder.inverse_transform(code), Some(class.as_str()));
        }
        assert_eq!(encoder.inverse_transform(99.0), None);
        assert_eq!(encoder.inverse_transform(0.5), None);
    }

    #[test]
    fn test_label_encoder_unknown_category() {
        let encoder = LabelEncoder::fit(["HR", "Manager"]);
        assert_eq!(
            encoder.transform("Job Title", "Data Scientist"),
            Err(EncodingError::UnknownCategory {
                field: "Job Title".to_string(),
                value: "Data Scientist".to_string(),
            })
        );
    }

    #[test]
    fn test_standard_scaler() {
        let scaler = Scaler::Standard {
            mean: vec![30.0, 0.5, 2.0, 2.5, 10.0],
            scale: vec![10.0, 0.5, 1.0, 0.0, 5.0],
            feature_names: None,
        };
        let scaled = scaler.transform(&[40.0, 1.0, 2.0, 3.0, 5.0]).unwrap();
        assert!((scaled[0] - 1.0).abs() < 1e-6);
        assert!((scaled[1] - 1.0).abs() < 1e-6);
        assert!(scaled[2].abs() < 1e-6);
        // zero scale keeps the centered value
        assert!((scaled[3] - 0.5).abs() < 1e-6);
        assert!((scaled[4] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_min_max_scaler() {
        let scaler = Scaler::MinMax {
            min_vals: vec![18.0, 0.0, 0.0, 0.0, 0.0],
            max_vals: vec![65.0, 1.0, 4.0, 5.0, 40.0],
            feature_names: None,
        };
        let scaled = scaler.transform(&[65.0, 0.0, 2.0, 5.0, 10.0]).unwrap();
        assert!((scaled[0] - 1.0).abs() < 1e-6);
        assert!((scaled[2] - 0.5).abs() < 1e-6);
        assert!((scaled[4] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_scaler_shape_mismatch() {
        let scaler = Scaler::Standard {
            mean: vec![0.0; 3],
            scale: vec![1.0; 3],
            feature_names: None,
        };
        assert_eq!(
            scaler.transform(&[0.0; FEATURE_COUNT]),
            Err(EncodingError::ShapeMismatch { expected: FEATURE_COUNT, actual: 3 })
        );
    }

    #[test]
    fn test_scaler_json_format() {
        let json = r#"{"kind":"standard","mean":[1,2,3,4,5],"scale":[1,1,1,1,1]}"#;
        let scaler: Scaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.dimension(), 5);
        assert!(scaler.feature_names().is_none());

        let json = r#"{"kind":"min_max","min_vals":[0,0,0,0,0],"max_vals":[1,1,1,1,1],
            "feature_names":["Age","Gender","Education Level","Job Title","Years of Experience"]}"#;
        let scaler: Scaler = serde_json::from_str(json).unwrap();
        assert_eq!(scaler.feature_names().map(|n| n.len()), Some(5));
    }
}
