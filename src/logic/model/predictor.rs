//! Predictor - Common interface of the real and mock backends
//!
//! The backend is picked once when the service starts (real model if the
//! bundle loaded, mock otherwise), never per request.

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::logic::features::EncodingError;
use crate::logic::profile::{ValidatedProfile, ValidationError};
use super::artifacts::ModelBundle;
use super::onnx::InferenceError;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Which implementation produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Onnx,
    Mock,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Onnx => "onnx",
            Backend::Mock => "mock",
        }
    }
}

/// Salary level class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalaryLevel {
    Low,
    Medium,
    High,
    /// Class index outside the trained label map
    Unknown,
}

impl SalaryLevel {
    /// Label map used when the classifier was trained
    pub fn from_class_index(index: i64) -> Self {
        match index {
            0 => SalaryLevel::Low,
            1 => SalaryLevel::Medium,
            2 => SalaryLevel::High,
            _ => SalaryLevel::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SalaryLevel::Low => "Low",
            SalaryLevel::Medium => "Medium",
            SalaryLevel::High => "High",
            SalaryLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for SalaryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Level output of a backend; confidence is a fraction (0.0 - 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelPrediction {
    pub label: SalaryLevel,
    pub confidence: f32,
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Required field unselected or out of range
    Validation(ValidationError),
    /// Unseen category, missing encoder, scaler shape
    Encoding(EncodingError),
    /// Anything else raised on the real-model path
    Model(String),
}

impl fmt::Display for PredictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionError::Validation(e) => write!(f, "{}", e),
            PredictionError::Encoding(e) => write!(f, "Prediction error: {}", e),
            PredictionError::Model(msg) => write!(f, "Prediction error: {}", msg),
        }
    }
}

impl std::error::Error for PredictionError {}

impl From<ValidationError> for PredictionError {
    fn from(e: ValidationError) -> Self {
        PredictionError::Validation(e)
    }
}

impl From<EncodingError> for PredictionError {
    fn from(e: EncodingError) -> Self {
        PredictionError::Encoding(e)
    }
}

impl From<InferenceError> for PredictionError {
    fn from(e: InferenceError) -> Self {
        PredictionError::Model(e.to_string())
    }
}

// ============================================================================
// PREDICTOR TRAIT
// ============================================================================

pub trait Predictor: Send + Sync {
    fn backend(&self) -> Backend;

    /// Predicted yearly salary
    fn predict_amount(&self, profile: &ValidatedProfile) -> Result<f64, PredictionError>;

    /// Predicted salary level with confidence
    fn predict_level(&self, profile: &ValidatedProfile) -> Result<LevelPrediction, PredictionError>;
}

// ============================================================================
// REAL MODEL
// ============================================================================

/// Fitted encoders/scaler + ONNX regressor/classifier
pub struct RealModelPredictor {
    bundle: ModelBundle,
}

impl RealModelPredictor {
    pub fn new(bundle: ModelBundle) -> Self {
        Self { bundle }
    }
}

impl Predictor for RealModelPredictor {
    fn backend(&self) -> Backend {
        Backend::Onnx
    }

    fn predict_amount(&self, profile: &ValidatedProfile) -> Result<f64, PredictionError> {
        let features = self.bundle.encoder.encode(profile)?;
        log::debug!("Encoded features: {}", features.to_log_entry());

        let salary = self.bundle.regressor.predict(features.as_slice())?;
        if !salary.is_finite() {
            return Err(PredictionError::Model(format!("Regressor returned {}", salary)));
        }

        Ok(salary as f64)
    }

    fn predict_level(&self, profile: &ValidatedProfile) -> Result<LevelPrediction, PredictionError> {
        let features = self.bundle.encoder.encode(profile)?;
        log::debug!("Encoded features: {}", features.to_log_entry());

        let (class_index, proba) = self.bundle.classifier.predict_with_proba(features.as_slice())?;

        let confidence = proba
            .iter()
            .copied()
            .reduce(f32::max)
            .ok_or_else(|| PredictionError::Model("Classifier returned no probabilities".to_string()))?;

        let label = SalaryLevel::from_class_index(class_index);
        if label == SalaryLevel::Unknown {
            log::warn!("Classifier returned unmapped class index {}", class_index);
        }

        Ok(LevelPrediction { label, confidence })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_index_map() {
        assert_eq!(SalaryLevel::from_class_index(0), SalaryLevel::Low);
        assert_eq!(SalaryLevel::from_class_index(1), SalaryLevel::Medium);
        assert_eq!(SalaryLevel::from_class_index(2), SalaryLevel::High);
        assert_eq!(SalaryLevel::from_class_index(5), SalaryLevel::Unknown);
        assert_eq!(SalaryLevel::from_class_index(-1), SalaryLevel::Unknown);
        assert_eq!(SalaryLevel::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn test_prediction_error_messages() {
        let err: PredictionError = ValidationError::MissingField("Gender").into();
        assert!(err.to_string().starts_with("Please fill in all required fields!"));

        let err: PredictionError = InferenceError("shape mismatch".to_string()).into();
        assert_eq!(err.to_string(), "Prediction error: InferenceError: shape mismatch");
    }

    #[test]
    fn test_backend_serde() {
        assert_eq!(serde_json::to_string(&Backend::Onnx).unwrap(), "\"onnx\"");
        assert_eq!(Backend::Mock.as_str(), "mock");
    }
}
