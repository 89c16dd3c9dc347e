use ratatui::style::{Color, Modifier, Style};

/// Gold-on-navy payroll theme
pub struct Theme;

impl Theme {
    pub const BG: Color = Color::Rgb(10, 16, 32);
    pub const FG: Color = Color::Rgb(225, 230, 240);
    pub const FG_DIM: Color = Color::Rgb(150, 160, 180);
    pub const FG_MUTED: Color = Color::Rgb(90, 100, 120);

    pub const ACCENT_GOLD: Color = Color::Rgb(255, 200, 60);
    pub const ACCENT_GREEN: Color = Color::Rgb(80, 220, 120);
    pub const ACCENT_YELLOW: Color = Color::Rgb(255, 255, 0);
    pub const ACCENT_RED: Color = Color::Rgb(255, 70, 70);

    /// Default full-screen style.
    pub fn base() -> Style {
        Style::default().fg(Self::FG).bg(Self::BG)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::ACCENT_GOLD).bg(Self::BG)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::ACCENT_GOLD)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text() -> Style {
        Style::default().fg(Self::FG)
    }

    pub fn dim() -> Style {
        Style::default().fg(Self::FG_DIM)
    }

    pub fn muted() -> Style {
        Style::default().fg(Self::FG_MUTED)
    }

    /// Focused form row.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Self::ACCENT_GOLD)
            .bg(Color::Rgb(30, 40, 70))
            .add_modifier(Modifier::BOLD)
    }

    pub fn ok() -> Style {
        Style::default()
            .fg(Self::ACCENT_GREEN)
            .add_modifier(Modifier::BOLD)
    }

    pub fn warn() -> Style {
        Style::default()
            .fg(Self::ACCENT_YELLOW)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Self::ACCENT_RED)
            .add_modifier(Modifier::BOLD)
    }
}
