//! Artifact Loader - Fitted model bundle
//!
//! Loads the four artifacts (regressor, classifier, scaler, encoders) from
//! one directory. All four load or none do: any failure yields an
//! `ArtifactLoadError` and the caller runs on the mock predictor instead.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::{CHECKSUMS_FILE, CLASSIFIER_FILE, ENCODERS_FILE, REGRESSOR_FILE, SCALER_FILE};
use crate::logic::features::layout::{self, matches_layout, validate_layout, LayoutMismatchError};
use crate::logic::features::{Encoders, FeatureEncoder, LayoutInfo, Scaler};
use super::onnx::{Classifier, OnnxClassifier, OnnxRegressor, Regressor};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One artifact file on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
}

/// Bundle metadata for status display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleInfo {
    pub model_dir: PathBuf,
    pub artifacts: Vec<ArtifactInfo>,
    pub layout: LayoutInfo,
    pub loaded_at: DateTime<Utc>,
}

impl BundleInfo {
    #[cfg(test)]
    fn in_memory() -> Self {
        Self {
            model_dir: PathBuf::from("<memory>"),
            artifacts: Vec::new(),
            layout: LayoutInfo::current(),
            loaded_at: Utc::now(),
        }
    }
}

/// Fully populated set of fitted artifacts, read-only after load
pub struct ModelBundle {
    pub regressor: Box<dyn Regressor>,
    pub classifier: Box<dyn Classifier>,
    pub encoder: FeatureEncoder,
    pub info: BundleInfo,
}

impl ModelBundle {
    /// Assemble a bundle from already-loaded parts
    #[cfg(test)]
    pub fn new(
        regressor: Box<dyn Regressor>,
        classifier: Box<dyn Classifier>,
        scaler: Scaler,
        encoders: Encoders,
    ) -> Self {
        Self {
            regressor,
            classifier,
            encoder: FeatureEncoder::new(encoders, scaler),
            info: BundleInfo::in_memory(),
        }
    }
}

/// Layout stamp the export script writes next to the scaler parameters
#[derive(Debug, Clone, Default, Deserialize)]
struct LayoutStamp {
    #[serde(default)]
    feature_version: Option<u8>,
    #[serde(default)]
    layout_hash: Option<u32>,
}

impl LayoutStamp {
    /// Unstamped scalers are accepted; a partial stamp is checked on what it has
    fn check(&self) -> Result<(), LayoutMismatchError> {
        if self.feature_version.is_none() && self.layout_hash.is_none() {
            return Ok(());
        }
        validate_layout(
            self.feature_version.unwrap_or(layout::FEATURE_VERSION),
            self.layout_hash.unwrap_or_else(layout::layout_hash),
        )
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactLoadError {
    /// File name of the artifact that failed
    pub artifact: String,
    pub reason: String,
}

impl ArtifactLoadError {
    fn new(artifact: &str, reason: impl Into<String>) -> Self {
        Self {
            artifact: artifact.to_string(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for ArtifactLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ArtifactLoadError: {}: {}", self.artifact, self.reason)
    }
}

impl std::error::Error for ArtifactLoadError {}

// ============================================================================
// LOADING
// ============================================================================

/// Read a file and compute its sha256
fn digest_file(model_dir: &Path, name: &str) -> Result<ArtifactInfo, ArtifactLoadError> {
    let path = model_dir.join(name);
    let bytes = std::fs::read(&path)
        .map_err(|e| ArtifactLoadError::new(name, format!("cannot read {}: {}", path.display(), e)))?;

    Ok(ArtifactInfo {
        name: name.to_string(),
        size_bytes: bytes.len() as u64,
        sha256: hex::encode(Sha256::digest(&bytes)),
        path,
    })
}

fn read_json<T: DeserializeOwned>(model_dir: &Path, name: &str) -> Result<T, ArtifactLoadError> {
    let path = model_dir.join(name);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ArtifactLoadError::new(name, format!("cannot read: {}", e)))?;

    serde_json::from_str(&content)
        .map_err(|e| ArtifactLoadError::new(name, format!("cannot parse: {}", e)))
}

/// Compare digests with `checksums.json` when it exists
fn verify_checksums(model_dir: &Path, artifacts: &[ArtifactInfo]) -> Result<(), ArtifactLoadError> {
    if !model_dir.join(CHECKSUMS_FILE).exists() {
        log::debug!("No {} in {}, skipping checksum verification", CHECKSUMS_FILE, model_dir.display());
        return Ok(());
    }

    let expected: BTreeMap<String, String> = read_json(model_dir, CHECKSUMS_FILE)?;

    for artifact in artifacts {
        if let Some(hash) = expected.get(&artifact.name) {
            if !hash.eq_ignore_ascii_case(&artifact.sha256) {
                return Err(ArtifactLoadError::new(
                    &artifact.name,
                    format!("checksum mismatch (expected {}, got {})", hash, artifact.sha256),
                ));
            }
        }
    }

    log::info!("Artifact checksums verified");
    Ok(())
}

/// Scaler and encoders must fit the feature layout
fn build_encoder(model_dir: &Path) -> Result<FeatureEncoder, ArtifactLoadError> {
    let scaler: Scaler = read_json(model_dir, SCALER_FILE)?;
    let stamp: LayoutStamp = read_json(model_dir, SCALER_FILE)?;
    stamp.check()
        .map_err(|e| ArtifactLoadError::new(SCALER_FILE, e.to_string()))?;
    scaler.check_shape()
        .map_err(|e| ArtifactLoadError::new(SCALER_FILE, e.to_string()))?;

    if let Some(names) = scaler.feature_names() {
        if !matches_layout(names) {
            return Err(ArtifactLoadError::new(
                SCALER_FILE,
                format!("fitted on columns {:?}, expected {:?}", names, LayoutInfo::current().feature_names),
            ));
        }
    }

    let encoders: Encoders = read_json(model_dir, ENCODERS_FILE)?;
    let encoder = FeatureEncoder::new(encoders, scaler);

    let missing = encoder.missing_encoders();
    if !missing.is_empty() {
        return Err(ArtifactLoadError::new(
            ENCODERS_FILE,
            format!("no encoder for {:?}", missing),
        ));
    }

    Ok(encoder)
}

/// Load all four artifacts from `model_dir`
pub fn load_bundle(model_dir: &Path) -> Result<ModelBundle, ArtifactLoadError> {
    log::info!("Loading model artifacts from: {}", model_dir.display());

    let artifacts = [REGRESSOR_FILE, CLASSIFIER_FILE, SCALER_FILE, ENCODERS_FILE]
        .iter()
        .map(|name| digest_file(model_dir, name))
        .collect::<Result<Vec<_>, _>>()?;

    verify_checksums(model_dir, &artifacts)?;

    let encoder = build_encoder(model_dir)?;

    let regressor = OnnxRegressor::load(&model_dir.join(REGRESSOR_FILE))
        .map_err(|e| ArtifactLoadError::new(REGRESSOR_FILE, e.to_string()))?;
    let classifier = OnnxClassifier::load(&model_dir.join(CLASSIFIER_FILE))
        .map_err(|e| ArtifactLoadError::new(CLASSIFIER_FILE, e.to_string()))?;

    for artifact in &artifacts {
        log::info!("  {} ({} bytes, sha256 {})", artifact.name, artifact.size_bytes, &artifact.sha256[..12]);
    }

    Ok(ModelBundle {
        regressor: Box::new(regressor),
        classifier: Box::new(classifier),
        encoder,
        info: BundleInfo {
            model_dir: model_dir.to_path_buf(),
            artifacts,
            layout: LayoutInfo::current(),
            loaded_at: Utc::now(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use crate::logic::config::AppConfig;
    use crate::logic::model::predictor::Backend;
    use crate::logic::model::PredictionDispatcher;

    const SCALER_JSON: &str = r#"{"kind":"standard","mean":[35,0.5,2,2.5,10],"scale":[10,0.5,1.4,1.7,8]}"#;
    const ENCODERS_JSON: &str = r#"{
        "Gender": {"classes": ["Female", "Male"]},
        "Education Level": {"classes": ["Associate's", "Bachelor's", "High School", "Master's", "PhD"]},
        "Job Title": {"classes": ["Data Analyst", "Data Scientist", "HR", "Manager", "Sales Executive", "Software Engineer"]}
    }"#;

    fn write_artifacts(dir: &Path) {
        fs::write(dir.join(REGRESSOR_FILE), b"regressor").unwrap();
        fs::write(dir.join(CLASSIFIER_FILE), b"classifier").unwrap();
        fs::write(dir.join(SCALER_FILE), SCALER_JSON).unwrap();
        fs::write(dir.join(ENCODERS_FILE), ENCODERS_JSON).unwrap();
    }

    #[test]
    fn test_missing_directory() {
        let err = load_bundle(Path::new("/nonexistent/models")).err().unwrap();
        assert_eq!(err.artifact, REGRESSOR_FILE);
    }

    #[test]
    fn test_single_missing_artifact_rejects_bundle() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::remove_file(dir.path().join(ENCODERS_FILE)).unwrap();

        let err = load_bundle(dir.path()).err().unwrap();
        assert_eq!(err.artifact, ENCODERS_FILE);
        assert!(err.to_string().starts_with("ArtifactLoadError"));
    }

    #[test]
    fn test_checksum_mismatch() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::write(
            dir.path().join(CHECKSUMS_FILE),
            format!(r#"{{"{}": "{}"}}"#, SCALER_FILE, "00".repeat(32)),
        )
        .unwrap();

        let err = load_bundle(dir.path()).err().unwrap();
        assert_eq!(err.artifact, SCALER_FILE);
        assert!(err.reason.contains("checksum mismatch"));
    }

    #[test]
    fn test_checksum_match() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        let info = digest_file(dir.path(), SCALER_FILE).unwrap();
        assert_eq!(info.sha256.len(), 64);

        fs::write(
            dir.path().join(CHECKSUMS_FILE),
            format!(r#"{{"{}": "{}"}}"#, SCALER_FILE, info.sha256.to_uppercase()),
        )
        .unwrap();

        assert!(verify_checksums(dir.path(), &[info]).is_ok());
    }

    #[test]
    fn test_build_encoder_from_json() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());

        let encoder = build_encoder(dir.path()).unwrap();
        assert_eq!(encoder.encoders().len(), 3);
        assert_eq!(encoder.scaler().dimension(), 5);
    }

    #[test]
    fn test_malformed_scaler() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(SCALER_FILE), "not json").unwrap();

        let err = load_bundle(dir.path()).err().unwrap();
        assert_eq!(err.artifact, SCALER_FILE);
        assert!(err.reason.contains("cannot parse"));
    }

    #[test]
    fn test_scaler_fitted_on_other_columns() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::write(
            dir.path().join(SCALER_FILE),
            r#"{"kind":"min_max","min_vals":[0,0,0,0,0],"max_vals":[1,1,1,1,1],
               "feature_names":["Years of Experience","Age","Gender","Education Level","Job Title"]}"#,
        )
        .unwrap();

        let err = build_encoder(dir.path()).err().unwrap();
        assert_eq!(err.artifact, SCALER_FILE);
    }

    #[test]
    fn test_scaler_layout_stamp() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());

        let stamped = format!(
            r#"{{"kind":"standard","mean":[35,0.5,2,2.5,10],"scale":[10,0.5,1.4,1.7,8],
                "feature_version":{},"layout_hash":{}}}"#,
            layout::FEATURE_VERSION,
            layout::layout_hash()
        );
        fs::write(dir.path().join(SCALER_FILE), &stamped).unwrap();
        assert!(build_encoder(dir.path()).is_ok());

        let stale = format!(
            r#"{{"kind":"standard","mean":[35,0.5,2,2.5,10],"scale":[10,0.5,1.4,1.7,8],
                "feature_version":{},"layout_hash":{}}}"#,
            layout::FEATURE_VERSION,
            layout::layout_hash().wrapping_add(1)
        );
        fs::write(dir.path().join(SCALER_FILE), &stale).unwrap();
        let err = build_encoder(dir.path()).err().unwrap();
        assert_eq!(err.artifact, SCALER_FILE);
        assert!(err.reason.contains("Feature layout mismatch"));

        fs::write(
            dir.path().join(SCALER_FILE),
            r#"{"kind":"min_max","min_vals":[0,0,0,0,0],"max_vals":[1,1,1,1,1],"feature_version":99}"#,
        )
        .unwrap();
        assert!(build_encoder(dir.path()).is_err());
    }

    #[test]
    fn test_corrupt_model_file_rejects_bundle() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());

        let err = load_bundle(dir.path()).err().unwrap();
        assert_eq!(err.artifact, REGRESSOR_FILE);
    }

    #[test]
    fn test_corrupt_model_file_starts_on_mock() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());

        let config = AppConfig {
            model_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        }
        .without_latency();
        let dispatcher = PredictionDispatcher::start(&config);

        assert_eq!(dispatcher.backend(), Backend::Mock);
        let warning = dispatcher.load_warning().unwrap();
        assert_eq!(warning.artifact, REGRESSOR_FILE);
        assert!(!dispatcher.status().model_loaded);
    }

    #[test]
    fn test_encoders_missing_column() {
        let dir = TempDir::new().unwrap();
        write_artifacts(dir.path());
        fs::write(dir.path().join(ENCODERS_FILE), r#"{"Gender": {"classes": ["Female", "Male"]}}"#).unwrap();

        let err = build_encoder(dir.path()).err().unwrap();
        assert_eq!(err.artifact, ENCODERS_FILE);
        assert!(err.reason.contains("Education Level"));
    }
}
