//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Every value can be overridden through an environment variable.

use std::path::PathBuf;

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "AI Salary Predictor";

/// Directory name used under the platform data dir
pub const APP_DIR_NAME: &str = "salary-predictor";

// ============================================
// Artifact file names
// ============================================

pub const REGRESSOR_FILE: &str = "best_regressor.onnx";
pub const CLASSIFIER_FILE: &str = "best_classifier.onnx";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODERS_FILE: &str = "encoders.json";

/// Optional sha256 manifest next to the artifacts
pub const CHECKSUMS_FILE: &str = "checksums.json";

// ============================================
// Defaults
// ============================================

/// Relative model directory used when nothing else exists
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Simulated processing latency before each prediction (milliseconds)
pub const DEFAULT_SIMULATED_LATENCY_MS: u64 = 1500;

/// Initial slider positions
pub const DEFAULT_AGE: u8 = 30;
pub const DEFAULT_EXPERIENCE_YEARS: u8 = 5;

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get the model directory from environment, or the first existing default location
pub fn get_model_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SALARY_MODEL_DIR") {
        return PathBuf::from(dir);
    }

    let candidates = [
        dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("models")),
        Some(PathBuf::from(DEFAULT_MODEL_DIR)),
    ];

    candidates
        .into_iter()
        .flatten()
        .find(|p| p.is_dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_DIR))
}

/// Get simulated latency from environment or use default
pub fn get_simulated_latency_ms() -> u64 {
    std::env::var("SALARY_SIMULATED_LATENCY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SIMULATED_LATENCY_MS)
}

/// Get the mock RNG seed, if one is configured
pub fn get_mock_seed() -> Option<u64> {
    std::env::var("SALARY_MOCK_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
}

/// Check if a failing real model should fall back to the mock predictor
pub fn is_fallback_on_error_enabled() -> bool {
    std::env::var("SALARY_FALLBACK_ON_ERROR")
        .map(|s| s.to_lowercase() == "true" || s == "1")
        .unwrap_or(false)
}
