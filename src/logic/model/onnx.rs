//! ONNX Model Artifacts - Regressor & Classifier
//!
//! Load and run the fitted models through ONNX Runtime.
//! The traits are the only contract the rest of the crate sees, so
//! tests (or another runtime) can stand in for the ONNX sessions.

use std::path::Path;
use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use crate::logic::features::FEATURE_COUNT;

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct InferenceError(pub String);

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "InferenceError: {}", self.0)
    }
}

impl std::error::Error for InferenceError {}

// ============================================================================
// MODEL TRAITS
// ============================================================================

/// Fitted regressor: one scaled row → predicted salary
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<f32, InferenceError>;
}

/// Fitted classifier: one scaled row → class index / class probabilities
pub trait Classifier: Send + Sync {
    fn predict(&self, features: &[f32]) -> Result<i64, InferenceError>;

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>, InferenceError>;

    /// Both outputs at once; override when the runtime yields them together
    fn predict_with_proba(&self, features: &[f32]) -> Result<(i64, Vec<f32>), InferenceError> {
        Ok((self.predict(features)?, self.predict_proba(features)?))
    }
}

// ============================================================================
// ONNX IMPLEMENTATION
// ============================================================================

fn load_session(model_path: &Path) -> Result<Session, InferenceError> {
    log::info!("Loading ONNX model from: {}", model_path.display());

    if !model_path.exists() {
        return Err(InferenceError(format!("Model not found: {}", model_path.display())));
    }

    let session = Session::builder()
        .map_err(|e| InferenceError(format!("Failed to create session builder: {}", e)))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| InferenceError(format!("Failed to set optimization: {}", e)))?
        .commit_from_file(model_path)
        .map_err(|e| InferenceError(format!("Failed to load model: {}", e)))?;

    Ok(session)
}

fn input_tensor(features: &[f32]) -> Result<Tensor<f32>, InferenceError> {
    if features.len() != FEATURE_COUNT {
        return Err(InferenceError(format!(
            "Expected {} features, got {}",
            FEATURE_COUNT,
            features.len()
        )));
    }

    let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
        .map_err(|e| InferenceError(format!("Failed to create array: {}", e)))?;

    Tensor::from_array(input_array)
        .map_err(|e| InferenceError(format!("Failed to create tensor: {}", e)))
}

/// Output names, fetched before `run` to avoid the borrow conflict
fn output_names(session: &Session, expected: usize) -> Result<Vec<String>, InferenceError> {
    let names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
    if names.len() < expected {
        return Err(InferenceError(format!(
            "Model defines {} outputs, expected {}",
            names.len(),
            expected
        )));
    }
    Ok(names)
}

/// ONNX regressor (sklearn-onnx export, output `variable` [1, 1])
pub struct OnnxRegressor {
    session: Mutex<Session>,
}

impl OnnxRegressor {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        Ok(Self { session: Mutex::new(load_session(model_path)?) })
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, features: &[f32]) -> Result<f32, InferenceError> {
        let input = input_tensor(features)?;

        let mut session = self.session.lock();
        let names = output_names(&session, 1)?;

        let outputs = session.run(ort::inputs![input])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&names[0])
            .ok_or_else(|| InferenceError("No output from regressor".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Failed to extract output: {}", e)))?;

        data.first()
            .copied()
            .ok_or_else(|| InferenceError("Regressor returned an empty tensor".to_string()))
    }
}

/// ONNX classifier (sklearn-onnx export with zipmap disabled):
/// output 0 = `label` int64 [1], output 1 = `probabilities` float [1, K]
pub struct OnnxClassifier {
    session: Mutex<Session>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        Ok(Self { session: Mutex::new(load_session(model_path)?) })
    }
}

impl Classifier for OnnxClassifier {
    fn predict(&self, features: &[f32]) -> Result<i64, InferenceError> {
        self.predict_with_proba(features).map(|(label, _)| label)
    }

    fn predict_proba(&self, features: &[f32]) -> Result<Vec<f32>, InferenceError> {
        self.predict_with_proba(features).map(|(_, proba)| proba)
    }

    fn predict_with_proba(&self, features: &[f32]) -> Result<(i64, Vec<f32>), InferenceError> {
        let input = input_tensor(features)?;

        let mut session = self.session.lock();
        let names = output_names(&session, 2)?;

        let outputs = session.run(ort::inputs![input])
            .map_err(|e| InferenceError(format!("Inference failed: {}", e)))?;

        let label_output = outputs.get(&names[0])
            .ok_or_else(|| InferenceError("No label output from classifier".to_string()))?;
        let (_, labels) = label_output.try_extract_tensor::<i64>()
            .map_err(|e| InferenceError(format!("Failed to extract label: {}", e)))?;
        let label = labels.first()
            .copied()
            .ok_or_else(|| InferenceError("Classifier returned no label".to_string()))?;

        let proba_output = outputs.get(&names[1])
            .ok_or_else(|| InferenceError("No probability output from classifier".to_string()))?;
        let (_, proba) = proba_output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError(format!("Failed to extract probabilities: {}", e)))?;

        Ok((label, proba.to_vec()))
    }
}
