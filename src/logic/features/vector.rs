//! Feature Vector - Scaled model input
//!
//! Stamped with the layout version/hash it was built against, which the
//! debug log entry records next to the named values.

use serde::{Deserialize, Serialize};
use super::layout::{FEATURE_COUNT, FEATURE_VERSION, FEATURE_LAYOUT, layout_hash};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Feature layout version
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Values in FEATURE_LAYOUT order
    pub values: [f32; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; FEATURE_COUNT]) -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    #[cfg(test)]
    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        super::layout::feature_index(name).and_then(|i| self.values.get(i).copied())
    }

    /// JSON form for debug logging
    pub fn to_log_entry(&self) -> serde_json::Value {
        serde_json::json!({
            "feature_version": self.version,
            "layout_hash": self.layout_hash,
            "named_values": FEATURE_LAYOUT.iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.to_string(), *value))
                .collect::<std::collections::BTreeMap<_, _>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_stamps_current_layout() {
        let vector = FeatureVector::from_values([1.0, 0.0, 2.0, 3.0, 4.0]);
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert_eq!(vector.get_by_name("Job Title"), Some(3.0));
        assert_eq!(vector.get_by_name("Salary"), None);
    }

    #[test]
    fn test_to_log_entry() {
        let vector = FeatureVector::from_values([30.0, 1.0, 2.0, 5.0, 5.0]);
        let log = vector.to_log_entry();
        assert_eq!(log["feature_version"], FEATURE_VERSION);
        assert_eq!(log["named_values"]["Age"], 30.0);
    }
}
