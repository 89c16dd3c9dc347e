//! Mock Predictor - Heuristic salary model (no artifacts)
//!
//! Used when the model files are missing. Numbers come from the demo data
//! generator: base salary grows with age and experience, then education
//! and job multipliers apply, then ±5000 noise.
//!
//! NOTE: the 0.95 multiplier for `Female` reproduces a bias of the demo data
//! generator. It is a modelling artifact kept for behavioural parity, not a
//! property any real salary model should have.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::logic::profile::{Education, EmployeeProfile, Gender, JobTitle, ValidatedProfile};
use super::predictor::{Backend, LevelPrediction, PredictionError, Predictor, SalaryLevel};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const BASE_SALARY: f64 = 40_000.0;
pub const AGE_PIVOT: f64 = 25.0;
pub const PER_YEAR_OF_AGE: f64 = 800.0;
pub const PER_YEAR_OF_EXPERIENCE: f64 = 3_200.0;
pub const FEMALE_MULTIPLIER: f64 = 0.95;

/// Noise is uniform in [-NOISE_AMPLITUDE, +NOISE_AMPLITUDE]
pub const NOISE_AMPLITUDE: f64 = 5_000.0;

/// Floor of every mock salary
pub const MIN_SALARY: i64 = 30_000;

/// Level brackets: < LOW_CEILING → Low, >= HIGH_FLOOR → High
pub const LOW_CEILING: i64 = 60_000;
pub const HIGH_FLOOR: i64 = 100_000;

pub fn education_multiplier(education: Option<Education>) -> f64 {
    match education {
        Some(Education::HighSchool) => 1.0,
        Some(Education::Associates) => 1.15,
        Some(Education::Bachelors) => 1.35,
        Some(Education::Masters) => 1.65,
        Some(Education::Phd) => 2.0,
        None => 1.0,
    }
}

pub fn job_multiplier(job_title: Option<JobTitle>) -> f64 {
    match job_title {
        Some(JobTitle::SoftwareEngineer) => 1.4,
        Some(JobTitle::DataScientist) => 1.6,
        Some(JobTitle::DataAnalyst) => 1.2,
        Some(JobTitle::Hr) => 1.0,
        Some(JobTitle::Manager) => 1.3,
        Some(JobTitle::SalesExecutive) => 1.1,
        None => 1.0,
    }
}

// ============================================================================
// HEURISTICS
// ============================================================================

/// Salary before noise (base × multipliers × gender factor)
pub fn expected_salary(profile: &EmployeeProfile) -> f64 {
    let mut salary = BASE_SALARY
        + (profile.age as f64 - AGE_PIVOT) * PER_YEAR_OF_AGE
        + profile.experience_years as f64 * PER_YEAR_OF_EXPERIENCE;

    salary *= education_multiplier(profile.education) * job_multiplier(profile.job_title);

    if profile.gender == Some(Gender::Female) {
        salary *= FEMALE_MULTIPLIER;
    }

    salary
}

/// Salary with noise, truncated and floored at MIN_SALARY
pub fn mock_predict_salary<R: Rng + ?Sized>(rng: &mut R, profile: &EmployeeProfile) -> i64 {
    let noise = (rng.gen::<f64>() - 0.5) * 2.0 * NOISE_AMPLITUDE;
    let salary = (expected_salary(profile) + noise) as i64;

    salary.max(MIN_SALARY)
}

/// Level bracket + synthetic confidence (fraction, not a real posterior)
pub fn mock_predict_level<R: Rng + ?Sized>(rng: &mut R, salary: i64) -> (SalaryLevel, f32) {
    if salary < LOW_CEILING {
        (SalaryLevel::Low, rng.gen_range(0.85..=0.95))
    } else if salary < HIGH_FLOOR {
        (SalaryLevel::Medium, rng.gen_range(0.80..=0.95))
    } else {
        (SalaryLevel::High, rng.gen_range(0.88..=0.98))
    }
}

// ============================================================================
// PREDICTOR
// ============================================================================

/// Fallback backend; owns its RNG so sessions can be made reproducible
pub struct MockPredictor {
    rng: Mutex<StdRng>,
}

impl MockPredictor {
    pub fn new() -> Self {
        Self { rng: Mutex::new(StdRng::from_entropy()) }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: Mutex::new(StdRng::seed_from_u64(seed)) }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::new(),
        }
    }

    pub fn salary(&self, profile: &EmployeeProfile) -> i64 {
        mock_predict_salary(&mut *self.rng.lock(), profile)
    }

    pub fn level(&self, salary: i64) -> (SalaryLevel, f32) {
        mock_predict_level(&mut *self.rng.lock(), salary)
    }
}

impl Default for MockPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for MockPredictor {
    fn backend(&self) -> Backend {
        Backend::Mock
    }

    fn predict_amount(&self, profile: &ValidatedProfile) -> Result<f64, PredictionError> {
        Ok(self.salary(profile.profile()) as f64)
    }

    fn predict_level(&self, profile: &ValidatedProfile) -> Result<LevelPrediction, PredictionError> {
        let salary = self.salary(profile.profile());
        let (label, confidence) = self.level(salary);
        Ok(LevelPrediction { label, confidence })
    }
}
