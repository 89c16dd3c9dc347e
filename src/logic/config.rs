//! Runtime Configuration
//!
//! Aggregates the defaults from `constants.rs` with env overrides.

use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::constants;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the four model artifacts
    pub model_dir: PathBuf,

    /// Fixed pause before each prediction
    pub simulated_latency_ms: u64,

    /// Seed for the mock predictor RNG (None = entropy)
    pub mock_seed: Option<u64>,

    /// Use the mock predictor when the real model fails (logged, never silent)
    pub fallback_on_error: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(constants::DEFAULT_MODEL_DIR),
            simulated_latency_ms: constants::DEFAULT_SIMULATED_LATENCY_MS,
            mock_seed: None,
            fallback_on_error: false,
        }
    }
}

impl AppConfig {
    /// Build config from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self {
            model_dir: constants::get_model_dir(),
            simulated_latency_ms: constants::get_simulated_latency_ms(),
            mock_seed: constants::get_mock_seed(),
            fallback_on_error: constants::is_fallback_on_error_enabled(),
        }
    }

    /// No artificial delay (tests, batch use)
    pub fn without_latency(mut self) -> Self {
        self.simulated_latency_ms = 0;
        self
    }

    pub fn simulated_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.simulated_latency_ms, 1500);
        assert_eq!(config.model_dir, PathBuf::from("models"));
        assert!(config.mock_seed.is_none());
        assert!(!config.fallback_on_error);
    }

    #[test]
    fn test_without_latency() {
        let config = AppConfig::default().without_latency();
        assert_eq!(config.simulated_latency(), Duration::ZERO);
    }
}
