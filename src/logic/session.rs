//! Session State - Form values and selected prediction mode
//!
//! One session per process. The mode persists across predictions until the
//! user switches it; the profile is rebuilt from these values per request.

use serde::{Deserialize, Serialize};

use super::model::{PredictionMode, PredictionResult};
use super::profile::{Education, EmployeeProfile, Gender, JobTitle};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub age: u8,
    pub gender: Option<Gender>,
    pub education: Option<Education>,
    pub job_title: Option<JobTitle>,
    pub experience_years: u8,
    pub mode: PredictionMode,
    /// Last successful result, kept when a later prediction fails
    pub last_result: Option<PredictionResult>,
}

impl Session {
    pub fn new() -> Self {
        let defaults = EmployeeProfile::default();
        Self {
            age: defaults.age,
            experience_years: defaults.experience_years,
            ..Default::default()
        }
    }

    /// Snapshot of the current form as a profile
    pub fn profile(&self) -> EmployeeProfile {
        EmployeeProfile {
            age: self.age,
            gender: self.gender,
            education: self.education,
            job_title: self.job_title,
            experience_years: self.experience_years,
        }
    }

    pub fn set_mode(&mut self, mode: PredictionMode) {
        if self.mode != mode {
            log::debug!("Prediction mode: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }
}
