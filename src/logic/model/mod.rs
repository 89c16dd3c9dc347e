//! Model Module - Inference Engine
//!
//! Artifact loading, the two prediction backends (ONNX / mock) and the
//! dispatcher that routes form requests to them.

pub mod artifacts;
pub mod onnx;
pub mod mock;
pub mod predictor;
pub mod dispatcher;

// Re-export common types
pub use dispatcher::{EngineStatus, PredictionDispatcher, PredictionMode, PredictionResult};
#[cfg(test)]
pub use mock::MockPredictor;
#[cfg(test)]
pub use predictor::SalaryLevel;
