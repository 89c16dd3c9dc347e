//! Logic Module - Business Logic & Engines
//!
//! - `profile` - Form input and validation
//! - `features/` - Feature encoding (label encoders, scaler, layout)
//! - `model/` - Artifacts, predictors, dispatcher
//! - `session` - Per-session form state and prediction mode

pub mod config;
pub mod profile;
pub mod session;

pub mod features;
pub mod model;
