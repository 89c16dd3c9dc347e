//! Salary Form Screen - Employee details + prediction results
//!
//! Keys only change `FormState`; the dispatcher is reached through
//! `api::commands` from `tick` (predictions) and the status overlay.

use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::api::commands::{self, FormField, FormOptions, PredictionView};
use crate::constants::APP_NAME;
use crate::logic::model::{EngineStatus, PredictionDispatcher, PredictionMode};
use crate::logic::profile::{EDUCATION_SENTINEL, GENDER_SENTINEL, JOB_TITLE_SENTINEL};
use crate::logic::session::Session;
use crate::ui::theme::Theme;

pub enum Action {
    None,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Row {
    Age,
    Gender,
    Education,
    JobTitle,
    Experience,
    Mode,
    Predict,
}

const ROWS: [Row; 7] = [
    Row::Age,
    Row::Gender,
    Row::Education,
    Row::JobTitle,
    Row::Experience,
    Row::Mode,
    Row::Predict,
];

impl Row {
    fn label(self) -> &'static str {
        match self {
            Row::Age => "Age",
            Row::Gender => "Gender",
            Row::Education => "Education Level",
            Row::JobTitle => "Job Title",
            Row::Experience => "Years of Experience",
            Row::Mode => "Prediction Type",
            Row::Predict => "",
        }
    }

    fn field(self) -> Option<FormField> {
        match self {
            Row::Age => Some(FormField::Age),
            Row::Gender => Some(FormField::Gender),
            Row::Education => Some(FormField::Education),
            Row::JobTitle => Some(FormField::JobTitle),
            Row::Experience => Some(FormField::Experience),
            Row::Mode | Row::Predict => None,
        }
    }

    fn is_slider(self) -> bool {
        matches!(self, Row::Age | Row::Experience)
    }
}

pub struct FormState {
    session: Session,
    options: FormOptions,
    selected: usize,
    /// Digits typed on a slider row, committed with enter
    input: String,
    pending: bool,
    view: Option<PredictionView>,
    status: Option<EngineStatus>,
    /// Startup warning, cleared by the first key
    pub warning: Option<String>,
    pub error: Option<String>,
}

impl FormState {
    pub fn new(warning: Option<String>) -> Self {
        Self {
            session: Session::new(),
            options: commands::get_form_options(),
            selected: 0,
            input: String::new(),
            pending: false,
            view: None,
            status: None,
            warning,
            error: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    fn row(&self) -> Row {
        ROWS[self.selected]
    }
}

// ============================================================================
// KEY HANDLING
// ============================================================================

pub fn handle_key(state: &mut FormState, key: KeyCode, dispatcher: &PredictionDispatcher) -> Action {
    state.error = None;
    state.warning = None;

    // any key closes the status overlay
    if state.status.take().is_some() || state.pending {
        return Action::None;
    }

    match key {
        KeyCode::Char(c) if c.is_ascii_digit() && state.row().is_slider() => {
            if state.input.len() < 2 {
                state.input.push(c);
            }
        }
        KeyCode::Backspace => {
            state.input.pop();
        }
        KeyCode::Enter if !state.input.is_empty() => commit_input(state),
        KeyCode::Enter => match state.row() {
            Row::Predict => request_prediction(state),
            Row::Mode => toggle_mode(state),
            _ => move_selection(state, 1),
        },
        KeyCode::Up | KeyCode::BackTab | KeyCode::Char('k') => move_selection(state, -1),
        KeyCode::Down | KeyCode::Tab | KeyCode::Char('j') => move_selection(state, 1),
        KeyCode::Left | KeyCode::Char('h') => adjust(state, -1),
        KeyCode::Right | KeyCode::Char('l') => adjust(state, 1),
        KeyCode::Char('m') => toggle_mode(state),
        KeyCode::Char('p') => request_prediction(state),
        KeyCode::Char('s') => state.status = Some(commands::get_engine_status(dispatcher)),
        KeyCode::Esc if !state.input.is_empty() => state.input.clear(),
        KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
        _ => {}
    }

    Action::None
}

/// Runs a requested prediction; the caller draws the "analyzing" frame first
pub fn tick(state: &mut FormState, dispatcher: &PredictionDispatcher) {
    if !state.pending {
        return;
    }
    state.pending = false;

    match commands::run_prediction(dispatcher, &mut state.session) {
        Ok(view) => state.view = Some(view),
        Err(e) => state.error = Some(e),
    }
}

fn move_selection(state: &mut FormState, delta: isize) {
    state.input.clear();
    let last = ROWS.len() as isize - 1;
    state.selected = (state.selected as isize + delta).clamp(0, last) as usize;
}

fn request_prediction(state: &mut FormState) {
    state.input.clear();
    state.pending = true;
}

fn toggle_mode(state: &mut FormState) {
    let next = match state.session.mode {
        PredictionMode::Amount => PredictionMode::Level,
        PredictionMode::Level => PredictionMode::Amount,
    };
    commands::set_prediction_mode(&mut state.session, next);
}

fn commit_input(state: &mut FormState) {
    let input = std::mem::take(&mut state.input);
    if let Some(field) = state.row().field() {
        if let Err(e) = commands::set_field(&mut state.session, field, &input) {
            state.error = Some(e);
        }
    }
}

fn adjust(state: &mut FormState, delta: isize) {
    state.input.clear();

    let result = match state.row() {
        Row::Age => {
            let current = state.session.age;
            step_slider(&mut state.session, FormField::Age, current, state.options.age_range, delta)
        }
        Row::Experience => {
            let current = state.session.experience_years;
            step_slider(&mut state.session, FormField::Experience, current, state.options.experience_range, delta)
        }
        Row::Gender => cycle_choice(state, Row::Gender, FormField::Gender, delta),
        Row::Education => cycle_choice(state, Row::Education, FormField::Education, delta),
        Row::JobTitle => cycle_choice(state, Row::JobTitle, FormField::JobTitle, delta),
        Row::Mode => {
            toggle_mode(state);
            Ok(())
        }
        Row::Predict => Ok(()),
    };

    if let Err(e) = result {
        state.error = Some(e);
    }
}

/// Slider step, clamped to the field range
fn step_slider(
    session: &mut Session,
    field: FormField,
    current: u8,
    (min, max): (u8, u8),
    delta: isize,
) -> Result<(), String> {
    let next = (current as isize + delta).clamp(min as isize, max as isize);
    commands::set_field(session, field, &next.to_string())
}

/// Dropdown step; wraps around through the sentinel
fn cycle_choice(state: &mut FormState, row: Row, field: FormField, delta: isize) -> Result<(), String> {
    let choices: &[String] = match row {
        Row::Gender => &state.options.genders,
        Row::Education => &state.options.education_levels,
        Row::JobTitle => &state.options.job_titles,
        _ => return Ok(()),
    };
    if choices.is_empty() {
        return Ok(());
    }

    let current = current_label(&state.session, row);
    let position = choices.iter().position(|c| c == current).unwrap_or(0);
    let next = (position as isize + delta).rem_euclid(choices.len() as isize) as usize;

    commands::set_field(&mut state.session, field, &choices[next])
}

fn current_label(session: &Session, row: Row) -> &'static str {
    match row {
        Row::Gender => session.gender.map(|g| g.label()).unwrap_or(GENDER_SENTINEL),
        Row::Education => session.education.map(|e| e.label()).unwrap_or(EDUCATION_SENTINEL),
        Row::JobTitle => session.job_title.map(|j| j.label()).unwrap_or(JOB_TITLE_SENTINEL),
        _ => "",
    }
}

fn mode_label(mode: PredictionMode) -> &'static str {
    match mode {
        PredictionMode::Amount => "💲 Salary Amount",
        PredictionMode::Level => "🏷️ Salary Level",
    }
}

// ============================================================================
// DRAWING
// ============================================================================

pub fn draw(f: &mut Frame, state: &FormState) {
    let area = f.size();
    f.render_widget(Block::default().style(Theme::base()), area);

    let outer = centered_rect(70, 90, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                     // title
            Constraint::Length(1),                     // subtitle
            Constraint::Length(1),                     // startup warning
            Constraint::Length(ROWS.len() as u16 + 2), // form
            Constraint::Length(5),                     // result
            Constraint::Min(0),                        // spacer
            Constraint::Length(1),                     // hints
        ])
        .split(outer);

    f.render_widget(
        Paragraph::new(Span::styled(format!("💲 {}", APP_NAME), Theme::title()))
            .alignment(Alignment::Center),
        chunks[0],
    );
    f.render_widget(
        Paragraph::new(Span::styled(
            "Predict employee compensation with machine learning",
            Theme::dim(),
        ))
        .alignment(Alignment::Center),
        chunks[1],
    );

    if let Some(warning) = &state.warning {
        f.render_widget(
            Paragraph::new(Span::styled(warning.as_str(), Theme::warn())),
            chunks[2],
        );
    }

    draw_form(f, chunks[3], state);
    draw_result(f, chunks[4], state);
    draw_hints(f, chunks[6]);

    if let Some(err) = &state.error {
        draw_error_bar(f, area, err);
    }
    if let Some(status) = &state.status {
        draw_status(f, area, status);
    }
}

fn row_value(state: &FormState, row: Row, selected: bool) -> String {
    let typing = selected && !state.input.is_empty();
    match row {
        Row::Age if typing => format!("{}█", state.input),
        Row::Age => state.session.age.to_string(),
        Row::Experience if typing => format!("{}█ years", state.input),
        Row::Experience => format!("{} years", state.session.experience_years),
        Row::Gender | Row::Education | Row::JobTitle => format!("◀ {} ▶", current_label(&state.session, row)),
        Row::Mode => format!("◀ {} ▶", mode_label(state.session.mode)),
        Row::Predict => "[ 🤖 Predict Salary ]".to_string(),
    }
}

fn draw_form(f: &mut Frame, area: Rect, state: &FormState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(" 💼 Employee Details ")
        .title_style(Theme::title());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(ROWS.iter().map(|_| Constraint::Length(1)).collect::<Vec<_>>())
        .split(inner);

    for (i, (row, row_area)) in ROWS.iter().zip(rows.iter()).enumerate() {
        let selected = i == state.selected;
        let (prefix, style) = if selected {
            ("▶ ", Theme::highlight())
        } else {
            ("  ", Theme::text())
        };

        let line = Line::from(vec![
            Span::styled(prefix, style),
            Span::styled(format!("{:<22}", row.label()), style),
            Span::styled(row_value(state, *row, selected), style),
        ]);

        f.render_widget(Paragraph::new(line), *row_area);
    }
}

fn draw_result(f: &mut Frame, area: Rect, state: &FormState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Theme::border())
        .title(" 📊 Prediction Results ")
        .title_style(Theme::title());

    let lines = if state.pending {
        vec![Line::from(Span::styled("🤖 AI is analyzing the data...", Theme::warn()))]
    } else if let Some(view) = &state.view {
        let mut lines = vec![
            Line::from(Span::styled(view.title.as_str(), Theme::dim())),
            Line::from(Span::styled(view.headline.as_str(), Theme::ok())),
        ];
        if let Some(detail) = &view.detail {
            lines.push(Line::from(Span::styled(detail.as_str(), Theme::text())));
        }
        lines
    } else {
        vec![Line::from(Span::styled(
            "Fill in the employee details and press p to predict.",
            Theme::muted(),
        ))]
    };

    f.render_widget(
        Paragraph::new(lines)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_hints(f: &mut Frame, area: Rect) {
    let hints = [
        ("↑↓", "move"),
        ("←→", "change"),
        ("0-9", "type"),
        ("m", "mode"),
        ("p", "predict"),
        ("s", "status"),
        ("q", "quit"),
    ];

    let spans: Vec<Span> = hints
        .iter()
        .flat_map(|(key, action)| {
            [
                Span::styled(*key, Theme::dim()),
                Span::styled(format!(" {action}  "), Theme::muted()),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(spans)).alignment(Alignment::Center), area);
}

fn draw_error_bar(f: &mut Frame, area: Rect, msg: &str) {
    let bar = Rect {
        x: area.x + 1,
        y: area.y + area.height.saturating_sub(1),
        width: area.width.saturating_sub(2),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled(" ✖ ", Theme::error()),
            Span::styled(msg, Theme::error()),
        ])),
        bar,
    );
}

fn draw_status(f: &mut Frame, area: Rect, status: &EngineStatus) {
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let rows = [
        ("Backend", status.backend.as_str().to_string()),
        ("Model loaded", if status.model_loaded { "yes" } else { "no" }.to_string()),
        ("Model dir", or_dash(status.model_dir.as_ref().map(|p| p.display().to_string()))),
        ("Loaded at", or_dash(status.loaded_at.map(|t| t.to_rfc3339()))),
        ("Artifacts", status.artifacts.len().to_string()),
        ("Predictions", status.prediction_count.to_string()),
        ("Failures", status.failure_count.to_string()),
        ("Fallbacks", status.fallback_count.to_string()),
        ("Last answered by", or_dash(status.last_backend.map(|b| b.as_str().to_string()))),
        ("Avg latency", format!("{:.2} ms", status.avg_latency_ms)),
        ("Load warning", or_dash(status.load_warning.clone())),
    ];

    let mut lines: Vec<Line> = rows
        .into_iter()
        .map(|(key, value)| {
            Line::from(vec![
                Span::styled(format!("{key:<18}"), Theme::dim()),
                Span::styled(value, Theme::text()),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("any key: close", Theme::muted())));

    f.render_widget(
        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(" Engine Status ")
                    .title_style(Theme::title()),
            )
            .style(Theme::base())
            .wrap(Wrap { trim: true }),
        popup,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1])[1]
}
