//! Prediction Dispatcher - Single entry point for predictions
//!
//! Built once at startup and passed by reference to the command layer.
//! Validates the form, runs the backend chosen at construction and
//! normalizes its output into `PredictionResult`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::logic::config::AppConfig;
use crate::logic::profile::{EmployeeProfile, ValidatedProfile};
use super::artifacts::{self, ArtifactInfo, ArtifactLoadError, BundleInfo, ModelBundle};
use super::mock::MockPredictor;
use super::predictor::{Backend, PredictionError, Predictor, RealModelPredictor, SalaryLevel};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Output shape requested by the user; persists for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionMode {
    #[default]
    Amount,
    Level,
}

/// Normalized prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PredictionResult {
    Amount { value: f64 },
    Level { label: SalaryLevel, confidence_percent: f32 },
}

/// Engine Status for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub backend: Backend,
    pub model_loaded: bool,
    pub model_dir: Option<PathBuf>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub artifacts: Vec<ArtifactInfo>,
    pub load_warning: Option<String>,
    pub fallback_on_error: bool,
    /// Backend that produced the last successful prediction
    pub last_backend: Option<Backend>,
    pub prediction_count: u64,
    pub failure_count: u64,
    pub fallback_count: u64,
    pub avg_latency_ms: f32,
}

// ============================================================================
// DISPATCHER
// ============================================================================

pub struct PredictionDispatcher {
    predictor: Box<dyn Predictor>,
    /// Explicit, logged fallback for real-model failures (opt-in)
    fallback: Option<MockPredictor>,
    simulated_latency: Duration,
    bundle_info: Option<BundleInfo>,
    load_warning: Option<ArtifactLoadError>,
    last_backend: Mutex<Option<Backend>>,

    prediction_count: AtomicU64,
    failure_count: AtomicU64,
    fallback_count: AtomicU64,
    latency_sum_us: AtomicU64,
}

impl PredictionDispatcher {
    /// Load the artifacts once and pick the backend for the process lifetime
    pub fn start(config: &AppConfig) -> Self {
        match artifacts::load_bundle(&config.model_dir) {
            Ok(bundle) => {
                log::info!("Model bundle loaded - using ONNX predictions");
                Self::from_bundle(bundle, config)
            }
            Err(e) => {
                log::warn!("Model artifacts unavailable ({}). Using mock predictions for demo.", e);
                let mut dispatcher = Self::with_predictor(Box::new(MockPredictor::from_seed(config.mock_seed)), config);
                dispatcher.load_warning = Some(e);
                dispatcher
            }
        }
    }

    /// Real-model dispatcher over an already loaded bundle
    pub fn from_bundle(bundle: ModelBundle, config: &AppConfig) -> Self {
        let info = bundle.info.clone();
        let mut dispatcher = Self::with_predictor(Box::new(RealModelPredictor::new(bundle)), config);
        dispatcher.bundle_info = Some(info);
        if config.fallback_on_error {
            dispatcher.fallback = Some(MockPredictor::from_seed(config.mock_seed));
        }
        dispatcher
    }

    pub fn with_predictor(predictor: Box<dyn Predictor>, config: &AppConfig) -> Self {
        Self {
            predictor,
            fallback: None,
            simulated_latency: config.simulated_latency(),
            bundle_info: None,
            load_warning: None,
            last_backend: Mutex::new(None),
            prediction_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
            fallback_count: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
        }
    }

    pub fn backend(&self) -> Backend {
        self.predictor.backend()
    }

    /// Artifact failure to show the user once
    pub fn load_warning(&self) -> Option<&ArtifactLoadError> {
        self.load_warning.as_ref()
    }

    /// Validate → route → predict → normalize
    pub fn predict(
        &self,
        profile: &EmployeeProfile,
        mode: PredictionMode,
    ) -> Result<PredictionResult, PredictionError> {
        let validated = profile.validate()?;

        if !self.simulated_latency.is_zero() {
            std::thread::sleep(self.simulated_latency);
        }

        let start_time = Instant::now();
        let (outcome, answered_by) = match (run(self.predictor.as_ref(), &validated, mode), &self.fallback) {
            (Err(e), Some(mock)) => {
                log::warn!("Real model failed ({}), falling back to mock predictions", e);
                self.fallback_count.fetch_add(1, Ordering::Relaxed);
                (run(mock, &validated, mode), mock.backend())
            }
            (outcome, _) => (outcome, self.backend()),
        };
        let elapsed = start_time.elapsed().as_micros() as u64;

        match &outcome {
            Ok(result) => {
                self.prediction_count.fetch_add(1, Ordering::Relaxed);
                self.latency_sum_us.fetch_add(elapsed, Ordering::Relaxed);
                *self.last_backend.lock() = Some(answered_by);
                log::debug!("{:?} prediction via {} in {}us: {:?}", mode, answered_by.as_str(), elapsed, result);
            }
            Err(e) => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
                log::warn!("Prediction failed: {}", e);
            }
        }

        outcome
    }

    pub fn status(&self) -> EngineStatus {
        let count = self.prediction_count.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

        EngineStatus {
            backend: self.backend(),
            model_loaded: self.bundle_info.is_some(),
            model_dir: self.bundle_info.as_ref().map(|i| i.model_dir.clone()),
            loaded_at: self.bundle_info.as_ref().map(|i| i.loaded_at),
            artifacts: self.bundle_info.as_ref().map(|i| i.artifacts.clone()).unwrap_or_default(),
            load_warning: self.load_warning.as_ref().map(|e| e.to_string()),
            fallback_on_error: self.fallback.is_some(),
            last_backend: *self.last_backend.lock(),
            prediction_count: count,
            failure_count: self.failure_count.load(Ordering::Relaxed),
            fallback_count: self.fallback_count.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}

/// Mode-specific call on one backend
fn run(
    predictor: &dyn Predictor,
    profile: &ValidatedProfile,
    mode: PredictionMode,
) -> Result<PredictionResult, PredictionError> {
    match mode {
        PredictionMode::Amount => Ok(PredictionResult::Amount {
            value: predictor.predict_amount(profile)?,
        }),
        PredictionMode::Level => {
            let level = predictor.predict_level(profile)?;
            Ok(PredictionResult::Level {
                label: level.label,
                confidence_percent: level.confidence * 100.0,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::{Encoders, LabelEncoder, Scaler, FEATURE_COUNT};
    use crate::logic::model::onnx::{Classifier, InferenceError, Regressor};
    use crate::logic::profile::{Education, Gender, JobTitle, ValidationError};
    use crate::logic::features::EncodingError;

    struct FixedRegressor(f32);

    impl Regressor for FixedRegressor {
        fn predict(&self, features: &[f32]) -> Result<f32, InferenceError> {
            assert_eq!(features.len(), FEATURE_COUNT);
            Ok(self.0)
        }
    }

    struct FixedClassifier {
        class: i64,
        proba: Vec<f32>,
    }

    impl Classifier for FixedClassifier {
        fn predict(&self, _features: &[f32]) -> Result<i64, InferenceError> {
            Ok(self.class)
        }

        fn predict_proba(&self, _features: &[f32]) -> Result<Vec<f32>, InferenceError> {
            Ok(self.proba.clone())
        }
    }

    struct BrokenRegressor;

    impl Regressor for BrokenRegressor {
        fn predict(&self, _features: &[f32]) -> Result<f32, InferenceError> {
            Err(InferenceError("Got invalid dimensions for input".to_string()))
        }
    }

    fn encoders() -> Encoders {
        let mut encoders = Encoders::new();
        encoders.insert("Gender".to_string(), LabelEncoder::fit(["Male", "Female"]));
        encoders.insert(
            "Education Level".to_string(),
            LabelEncoder::fit(Education::ALL.iter().map(|e| e.label())),
        );
        encoders.insert(
            "Job Title".to_string(),
            LabelEncoder::fit(JobTitle::ALL.iter().map(|j| j.label())),
        );
        encoders
    }

    fn scaler() -> Scaler {
        Scaler::Standard {
            mean: vec![35.0, 0.5, 2.0, 2.5, 10.0],
            scale: vec![10.0, 0.5, 1.4, 1.7, 8.0],
            feature_names: None,
        }
    }

    fn bundle(regressor: Box<dyn Regressor>, class: i64, proba: Vec<f32>) -> ModelBundle {
        ModelBundle::new(regressor, Box::new(FixedClassifier { class, proba }), scaler(), encoders())
    }

    fn config() -> AppConfig {
        AppConfig { mock_seed: Some(11), ..AppConfig::default() }.without_latency()
    }

    fn profile() -> EmployeeProfile {
        EmployeeProfile {
            age: 30,
            gender: Some(Gender::Male),
            education: Some(Education::Bachelors),
            job_title: Some(JobTitle::SoftwareEngineer),
            experience_years: 5,
        }
    }

    #[test]
    fn test_default_mode_is_amount() {
        assert_eq!(PredictionMode::default(), PredictionMode::Amount);
    }

    #[test]
    fn test_missing_bundle_routes_to_mock() {
        let mut config = config();
        config.model_dir = PathBuf::from("/nonexistent/models");
        let dispatcher = PredictionDispatcher::start(&config);

        assert_eq!(dispatcher.backend(), Backend::Mock);
        assert_eq!(dispatcher.load_warning().map(|e| e.artifact.as_str()), Some("best_regressor.onnx"));

        match dispatcher.predict(&profile(), PredictionMode::Amount).unwrap() {
            PredictionResult::Amount { value } => assert!((108_399.0..=118_400.0).contains(&value)),
            other => panic!("unexpected {:?}", other),
        }
        match dispatcher.predict(&profile(), PredictionMode::Level).unwrap() {
            PredictionResult::Level { label, confidence_percent } => {
                assert_eq!(label, SalaryLevel::High);
                assert!((87.99..=98.01).contains(&confidence_percent));
            }
            other => panic!("unexpected {:?}", other),
        }

        let status = dispatcher.status();
        assert!(!status.model_loaded);
        assert_eq!(status.prediction_count, 2);
        assert!(status.load_warning.is_some());
    }

    #[test]
    fn test_validation_error_regardless_of_backend() {
        let mut incomplete = profile();
        incomplete.education = None;

        let mock = PredictionDispatcher::with_predictor(Box::new(MockPredictor::seeded(1)), &config());
        let real = PredictionDispatcher::from_bundle(bundle(Box::new(FixedRegressor(1.0)), 0, vec![1.0]), &config());

        for dispatcher in [&mock, &real] {
            for mode in [PredictionMode::Amount, PredictionMode::Level] {
                assert_eq!(
                    dispatcher.predict(&incomplete, mode),
                    Err(PredictionError::Validation(ValidationError::MissingField("Education Level")))
                );
            }
        }
    }

    #[test]
    fn test_real_path_amount() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(FixedRegressor(123_456.5)), 0, vec![1.0]),
            &config(),
        );
        assert_eq!(dispatcher.backend(), Backend::Onnx);

        let result = dispatcher.predict(&profile(), PredictionMode::Amount).unwrap();
        assert_eq!(result, PredictionResult::Amount { value: 123_456.5 });
        assert!(dispatcher.status().model_loaded);
    }

    #[test]
    fn test_real_path_level_confidence_is_max_probability() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(FixedRegressor(0.0)), 1, vec![0.2, 0.65, 0.15]),
            &config(),
        );

        match dispatcher.predict(&profile(), PredictionMode::Level).unwrap() {
            PredictionResult::Level { label, confidence_percent } => {
                assert_eq!(label, SalaryLevel::Medium);
                assert!((confidence_percent - 65.0).abs() < 1e-3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unmapped_class_index_is_unknown() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(FixedRegressor(0.0)), 5, vec![0.1, 0.1, 0.1, 0.1, 0.1, 0.5]),
            &config(),
        );

        match dispatcher.predict(&profile(), PredictionMode::Level).unwrap() {
            PredictionResult::Level { label, .. } => assert_eq!(label, SalaryLevel::Unknown),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unseen_category_is_non_fatal() {
        let mut encoders = encoders();
        encoders.insert("Job Title".to_string(), LabelEncoder::fit(["HR"]));
        let bundle = ModelBundle::new(
            Box::new(FixedRegressor(1.0)),
            Box::new(FixedClassifier { class: 0, proba: vec![1.0] }),
            scaler(),
            encoders,
        );
        let dispatcher = PredictionDispatcher::from_bundle(bundle, &config());

        let err = dispatcher.predict(&profile(), PredictionMode::Amount).unwrap_err();
        assert!(matches!(err, PredictionError::Encoding(EncodingError::UnknownCategory { .. })));
        assert_eq!(dispatcher.status().failure_count, 1);

        // the dispatcher stays usable after a failure
        let mut hr = profile();
        hr.job_title = Some(JobTitle::Hr);
        assert!(dispatcher.predict(&hr, PredictionMode::Amount).is_ok());
    }

    #[test]
    fn test_real_failure_does_not_silently_use_mock() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(BrokenRegressor), 0, vec![1.0]),
            &config(),
        );

        let err = dispatcher.predict(&profile(), PredictionMode::Amount).unwrap_err();
        assert!(matches!(err, PredictionError::Model(_)));
        assert!(err.to_string().contains("invalid dimensions"));
        assert_eq!(dispatcher.status().fallback_count, 0);
    }

    #[test]
    fn test_explicit_fallback_on_error() {
        let config = AppConfig { fallback_on_error: true, ..config() };
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(BrokenRegressor), 0, vec![1.0]),
            &config,
        );

        let result = dispatcher.predict(&profile(), PredictionMode::Amount).unwrap();
        assert!(matches!(result, PredictionResult::Amount { value } if value >= 30_000.0));

        let status = dispatcher.status();
        assert!(status.fallback_on_error);
        assert_eq!(status.fallback_count, 1);
        assert_eq!(status.failure_count, 0);
        assert_eq!(dispatcher.backend(), Backend::Onnx);
        assert_eq!(status.last_backend, Some(Backend::Mock));
    }

    #[test]
    fn test_last_backend_tracks_answering_predictor() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(FixedRegressor(50_000.0)), 0, vec![1.0]),
            &AppConfig { fallback_on_error: true, ..config() },
        );
        assert_eq!(dispatcher.status().last_backend, None);

        dispatcher.predict(&profile(), PredictionMode::Amount).unwrap();
        assert_eq!(dispatcher.status().last_backend, Some(Backend::Onnx));
    }

    #[test]
    fn test_empty_probabilities_is_an_error() {
        let dispatcher = PredictionDispatcher::from_bundle(
            bundle(Box::new(FixedRegressor(0.0)), 0, Vec::new()),
            &config(),
        );
        assert!(matches!(
            dispatcher.predict(&profile(), PredictionMode::Level),
            Err(PredictionError::Model(_))
        ));
    }

    #[test]
    fn test_result_serialization() {
        let json = serde_json::to_value(PredictionResult::Level {
            label: SalaryLevel::High,
            confidence_percent: 91.5,
        })
        .unwrap();
        assert_eq!(json["kind"], "level");
        assert_eq!(json["label"], "High");
    }
}
