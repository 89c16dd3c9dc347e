//! Employee Profile - Raw form input and validation
//!
//! The form keeps categorical fields as `Option`: `None` is the
//! "Select ..." sentinel shown before the user picks a value.

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_AGE, DEFAULT_EXPERIENCE_YEARS};

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 65;
pub const MIN_EXPERIENCE: u8 = 0;
pub const MAX_EXPERIENCE: u8 = 40;

/// Sentinel labels shown by the form for unselected fields
pub const GENDER_SENTINEL: &str = "Select gender";
pub const EDUCATION_SENTINEL: &str = "Select education level";
pub const JOB_TITLE_SENTINEL: &str = "Select job title";

// ============================================================================
// CATEGORICAL FIELDS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Education {
    #[serde(rename = "High School")]
    HighSchool,
    #[serde(rename = "Associate's")]
    Associates,
    #[serde(rename = "Bachelor's")]
    Bachelors,
    #[serde(rename = "Master's")]
    Masters,
    #[serde(rename = "PhD")]
    Phd,
}

impl Education {
    pub const ALL: [Education; 5] = [
        Education::HighSchool,
        Education::Associates,
        Education::Bachelors,
        Education::Masters,
        Education::Phd,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Education::HighSchool => "High School",
            Education::Associates => "Associate's",
            Education::Bachelors => "Bachelor's",
            Education::Masters => "Master's",
            Education::Phd => "PhD",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobTitle {
    #[serde(rename = "Software Engineer")]
    SoftwareEngineer,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Data Analyst")]
    DataAnalyst,
    #[serde(rename = "HR")]
    Hr,
    Manager,
    #[serde(rename = "Sales Executive")]
    SalesExecutive,
}

impl JobTitle {
    pub const ALL: [JobTitle; 6] = [
        JobTitle::SoftwareEngineer,
        JobTitle::DataScientist,
        JobTitle::DataAnalyst,
        JobTitle::Hr,
        JobTitle::Manager,
        JobTitle::SalesExecutive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            JobTitle::SoftwareEngineer => "Software Engineer",
            JobTitle::DataScientist => "Data Scientist",
            JobTitle::DataAnalyst => "Data Analyst",
            JobTitle::Hr => "HR",
            JobTitle::Manager => "Manager",
            JobTitle::SalesExecutive => "Sales Executive",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Education {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for JobTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse a form label, `None` for the sentinel. Unknown labels are an error.
fn parse_choice<T: Copy>(
    field: &'static str,
    value: &str,
    sentinel: &str,
    all: &[T],
    label: fn(&T) -> &'static str,
) -> Result<Option<T>, ValidationError> {
    let value = value.trim();
    if value.is_empty() || value == sentinel {
        return Ok(None);
    }
    all.iter()
        .find(|c| label(*c) == value)
        .copied()
        .map(Some)
        .ok_or_else(|| ValidationError::UnknownChoice {
            field,
            value: value.to_string(),
        })
}

impl Gender {
    /// Dropdown label, `None` for the sentinel
    pub fn from_form_label(s: &str) -> Result<Option<Self>, ValidationError> {
        parse_choice("Gender", s, GENDER_SENTINEL, &Gender::ALL, Gender::label)
    }
}

impl Education {
    pub fn from_form_label(s: &str) -> Result<Option<Self>, ValidationError> {
        parse_choice("Education Level", s, EDUCATION_SENTINEL, &Education::ALL, Education::label)
    }
}

impl JobTitle {
    pub fn from_form_label(s: &str) -> Result<Option<Self>, ValidationError> {
        parse_choice("Job Title", s, JOB_TITLE_SENTINEL, &JobTitle::ALL, JobTitle::label)
    }
}

impl FromStr for Gender {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::from_form_label(s)?.ok_or(ValidationError::MissingField("Gender"))
    }
}

impl FromStr for Education {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Education::from_form_label(s)?.ok_or(ValidationError::MissingField("Education Level"))
    }
}

impl FromStr for JobTitle {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobTitle::from_form_label(s)?.ok_or(ValidationError::MissingField("Job Title"))
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A required dropdown is still on its sentinel
    MissingField(&'static str),
    /// A slider value outside its range
    OutOfRange { field: &'static str, value: u8, min: u8, max: u8 },
    /// A label the form does not offer
    UnknownChoice { field: &'static str, value: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingField(field) => {
                write!(f, "Please fill in all required fields! ({} is not selected)", field)
            }
            ValidationError::OutOfRange { field, value, min, max } => {
                write!(f, "{} must be between {} and {} (got {})", field, min, max, value)
            }
            ValidationError::UnknownChoice { field, value } => {
                write!(f, "Unknown {}: {}", field, value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ============================================================================
// PROFILE
// ============================================================================

/// Current form state, rebuilt on every prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub age: u8,
    pub gender: Option<Gender>,
    pub education: Option<Education>,
    pub job_title: Option<JobTitle>,
    pub experience_years: u8,
}

impl Default for EmployeeProfile {
    fn default() -> Self {
        Self {
            age: DEFAULT_AGE,
            gender: None,
            education: None,
            job_title: None,
            experience_years: DEFAULT_EXPERIENCE_YEARS,
        }
    }
}

impl EmployeeProfile {
    /// Check required fields and ranges
    pub fn validate(&self) -> Result<ValidatedProfile, ValidationError> {
        let gender = self.gender.ok_or(ValidationError::MissingField("Gender"))?;
        let education = self.education.ok_or(ValidationError::MissingField("Education Level"))?;
        let job_title = self.job_title.ok_or(ValidationError::MissingField("Job Title"))?;

        if !(MIN_AGE..=MAX_AGE).contains(&self.age) {
            return Err(ValidationError::OutOfRange {
                field: "Age",
                value: self.age,
                min: MIN_AGE,
                max: MAX_AGE,
            });
        }
        if !(MIN_EXPERIENCE..=MAX_EXPERIENCE).contains(&self.experience_years) {
            return Err(ValidationError::OutOfRange {
                field: "Years of Experience",
                value: self.experience_years,
                min: MIN_EXPERIENCE,
                max: MAX_EXPERIENCE,
            });
        }

        Ok(ValidatedProfile {
            profile: self.clone(),
            gender,
            education,
            job_title,
        })
    }
}

/// A profile whose categorical fields are all selected
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedProfile {
    profile: EmployeeProfile,
    gender: Gender,
    education: Education,
    job_title: JobTitle,
}

impl ValidatedProfile {
    pub fn age(&self) -> u8 {
        self.profile.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn education(&self) -> Education {
        self.education
    }

    pub fn job_title(&self) -> JobTitle {
        self.job_title
    }

    pub fn experience_years(&self) -> u8 {
        self.profile.experience_years
    }

    pub fn profile(&self) -> &EmployeeProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> EmployeeProfile {
        EmployeeProfile {
            age: 30,
            gender: Some(Gender::Male),
            education: Some(Education::Bachelors),
            job_title: Some(JobTitle::SoftwareEngineer),
            experience_years: 5,
        }
    }

    #[test]
    fn test_default_profile_is_incomplete() {
        let profile = EmployeeProfile::default();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.experience_years, 5);
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_validate_complete_profile() {
        let validated = complete().validate().unwrap();
        assert_eq!(validated.gender(), Gender::Male);
        assert_eq!(validated.education(), Education::Bachelors);
        assert_eq!(validated.job_title(), JobTitle::SoftwareEngineer);
    }

    #[test]
    fn test_unselected_sentinel_always_fails() {
        for age in [18u8, 30, 65] {
            let profile = EmployeeProfile {
                age,
                gender: Gender::from_form_label(GENDER_SENTINEL).unwrap(),
                ..complete()
            };
            assert_eq!(
                profile.validate(),
                Err(ValidationError::MissingField("Gender"))
            );
        }

        let mut profile = complete();
        profile.job_title = None;
        assert_eq!(profile.validate(), Err(ValidationError::MissingField("Job Title")));
    }

    #[test]
    fn test_out_of_range_age() {
        let mut profile = complete();
        profile.age = 17;
        assert!(matches!(
            profile.validate(),
            Err(ValidationError::OutOfRange { field: "Age", .. })
        ));

        let mut profile = complete();
        profile.experience_years = 41;
        assert!(profile.validate().is_err());
    }

    #[test]
    fn test_form_labels() {
        assert_eq!(Gender::from_form_label("Female"), Ok(Some(Gender::Female)));
        assert_eq!(Education::from_form_label(" Master's "), Ok(Some(Education::Masters)));
        assert_eq!(JobTitle::from_form_label("Data Scientist"), Ok(Some(JobTitle::DataScientist)));
        assert_eq!(JobTitle::from_form_label(JOB_TITLE_SENTINEL), Ok(None));
        assert_eq!(Education::from_form_label(""), Ok(None));

        let err = Gender::from_form_label("Other").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownChoice { field: "Gender", .. }));
        assert_eq!("PhD".parse::<Education>(), Ok(Education::Phd));
        assert_eq!(GENDER_SENTINEL.parse::<Gender>(), Err(ValidationError::MissingField("Gender")));
    }

    #[test]
    fn test_from_str_labels() {
        assert_eq!("Associate's".parse::<Education>(), Ok(Education::Associates));
        assert_eq!("HR".parse::<JobTitle>(), Ok(JobTitle::Hr));
        assert!("Select gender".parse::<Gender>().is_err());
    }

    #[test]
    fn test_serde_uses_form_labels() {
        let json = serde_json::to_string(&Education::Bachelors).unwrap();
        assert_eq!(json, "\"Bachelor's\"");
        let job: JobTitle = serde_json::from_str("\"Sales Executive\"").unwrap();
        assert_eq!(job, JobTitle::SalesExecutive);
    }
}
