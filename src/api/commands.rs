//! Commands - API for the form front end
//!
//! Thin layer between the UI and the engines: every command returns
//! `Result<T, String>` so the UI only has to print the message.

use serde::{Deserialize, Serialize};

use crate::logic::model::{EngineStatus, PredictionDispatcher, PredictionMode, PredictionResult};
use crate::logic::profile::{
    Education, Gender, JobTitle, ValidationError, EDUCATION_SENTINEL, GENDER_SENTINEL,
    JOB_TITLE_SENTINEL, MAX_AGE, MAX_EXPERIENCE, MIN_AGE, MIN_EXPERIENCE,
};
use crate::logic::session::Session;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Rendered prediction for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionView {
    pub title: String,
    pub headline: String,
    pub detail: Option<String>,
    pub result: PredictionResult,
}

/// Dropdown choices, sentinel first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormOptions {
    pub genders: Vec<String>,
    pub education_levels: Vec<String>,
    pub job_titles: Vec<String>,
    pub age_range: (u8, u8),
    pub experience_range: (u8, u8),
}

/// Editable form fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormField {
    Age,
    Gender,
    Education,
    JobTitle,
    Experience,
}

// ============================================================================
// FORMATTING
// ============================================================================

/// `$` + thousands-separated whole amount
pub fn format_currency(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// One decimal place percentage
pub fn format_confidence(percent: f32) -> String {
    format!("{:.1}%", percent)
}

pub fn render_result(result: &PredictionResult) -> PredictionView {
    match result {
        PredictionResult::Amount { value } => PredictionView {
            title: "Predicted Annual Salary".to_string(),
            headline: format_currency(*value),
            detail: None,
            result: result.clone(),
        },
        PredictionResult::Level { label, confidence_percent } => PredictionView {
            title: "Predicted Salary Level".to_string(),
            headline: format!("{} Salary Level", label),
            detail: Some(format!("Confidence: {}", format_confidence(*confidence_percent))),
            result: result.clone(),
        },
    }
}

// ============================================================================
// FORM COMMANDS
// ============================================================================

fn with_sentinel(sentinel: &str, labels: impl Iterator<Item = &'static str>) -> Vec<String> {
    std::iter::once(sentinel.to_string())
        .chain(labels.map(str::to_string))
        .collect()
}

pub fn get_form_options() -> FormOptions {
    FormOptions {
        genders: with_sentinel(GENDER_SENTINEL, Gender::ALL.iter().map(|g| g.label())),
        education_levels: with_sentinel(EDUCATION_SENTINEL, Education::ALL.iter().map(|e| e.label())),
        job_titles: with_sentinel(JOB_TITLE_SENTINEL, JobTitle::ALL.iter().map(|j| j.label())),
        age_range: (MIN_AGE, MAX_AGE),
        experience_range: (MIN_EXPERIENCE, MAX_EXPERIENCE),
    }
}

fn parse_slider(raw: &str, min: u8, max: u8) -> Result<u8, String> {
    let value: u8 = raw
        .trim()
        .parse()
        .map_err(|_| format!("Enter a whole number between {} and {}", min, max))?;
    if !(min..=max).contains(&value) {
        return Err(format!("Value must be between {} and {}", min, max));
    }
    Ok(value)
}

/// Update one form field from its raw label/value
pub fn set_field(session: &mut Session, field: FormField, raw: &str) -> Result<(), String> {
    let label_error = |e: ValidationError| e.to_string();

    match field {
        FormField::Age => session.age = parse_slider(raw, MIN_AGE, MAX_AGE)?,
        FormField::Experience => {
            session.experience_years = parse_slider(raw, MIN_EXPERIENCE, MAX_EXPERIENCE)?
        }
        FormField::Gender => session.gender = Gender::from_form_label(raw).map_err(label_error)?,
        FormField::Education => session.education = Education::from_form_label(raw).map_err(label_error)?,
        FormField::JobTitle => session.job_title = JobTitle::from_form_label(raw).map_err(label_error)?,
    }

    Ok(())
}

pub fn set_prediction_mode(session: &mut Session, mode: PredictionMode) {
    session.set_mode(mode);
}

// ============================================================================
// PREDICTION COMMANDS
// ============================================================================

/// "Predict" button: runs the dispatcher on the current form.
/// On failure the session is left as it was.
pub fn run_prediction(
    dispatcher: &PredictionDispatcher,
    session: &mut Session,
) -> Result<PredictionView, String> {
    let result = dispatcher
        .predict(&session.profile(), session.mode)
        .map_err(|e| e.to_string())?;

    let view = render_result(&result);
    session.last_result = Some(result);
    Ok(view)
}

pub fn get_engine_status(dispatcher: &PredictionDispatcher) -> EngineStatus {
    dispatcher.status()
}

/// One-time warning when the artifacts could not be loaded
pub fn get_startup_warning(dispatcher: &PredictionDispatcher) -> Option<String> {
    dispatcher
        .load_warning()
        .map(|e| format!("⚠️ Model artifacts unavailable ({}). Using mock predictions for demo.", e))
}
