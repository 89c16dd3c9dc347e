//! Features Module - Feature Encoding Engine
//!
//! Turns a validated employee profile into the numeric vector the
//! fitted scaler and models expect. Only used on the real-model path.

pub mod layout;
pub mod vector;
pub mod encoder;


// Re-export common types
pub use layout::{FEATURE_COUNT, LayoutInfo};
pub use encoder::{EncodingError, Encoders, FeatureEncoder, Scaler};
#[cfg(test)]
pub use encoder::LabelEncoder;
