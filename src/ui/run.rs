use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::api::commands;
use crate::logic::model::PredictionDispatcher;

use super::form::{self, Action, FormState};

/// Restores the terminal even when the loop exits early
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Runs the salary form until the user quits.
///
/// # Errors
/// Returns an error if terminal setup or rendering fails.
pub fn run(dispatcher: &PredictionDispatcher) -> io::Result<()> {
    let _guard = TerminalGuard::enter()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut state = FormState::new(commands::get_startup_warning(dispatcher));

    loop {
        terminal.draw(|f| form::draw(f, &state))?;

        // the "analyzing" frame is on screen; now do the blocking work
        if state.is_pending() {
            form::tick(&mut state, dispatcher);
            continue;
        }

        if event::poll(Duration::from_millis(120))? {
            if let Event::Key(k) = event::read()? {
                if k.kind != KeyEventKind::Press {
                    continue;
                }
                match form::handle_key(&mut state, k.code, dispatcher) {
                    Action::Quit => break,
                    Action::None => {}
                }
            }
        }
    }

    terminal.show_cursor()?;
    Ok(())
}
