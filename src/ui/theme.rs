//! Theme and styling configuration.

use std::sync::OnceLock;

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the application.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Primary foreground color.
    pub fg: Color,
    /// Accent color for titles and focused elements.
    pub accent: Color,
    /// Border color.
    pub border: Color,
    /// Border color of the focused element.
    pub border_focused: Color,
    /// Foreground of selected rows.
    pub selection_fg: Color,
    /// Background of selected rows.
    pub selection_bg: Color,
    /// Dimmed text (hints, placeholders).
    pub dim: Color,
    /// Error text and borders.
    pub error: Color,
    /// Warning text.
    pub warning: Color,
    /// Success text.
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: Color::White,
            accent: Color::Cyan,
            border: Color::DarkGray,
            border_focused: Color::Yellow,
            selection_fg: Color::Black,
            selection_bg: Color::Cyan,
            dim: Color::DarkGray,
            error: Color::Red,
            warning: Color::Yellow,
            success: Color::Green,
        }
    }
}

impl Theme {
    /// Style for a block title.
    pub fn title_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.fg)
        }
    }

    /// Style for a block border.
    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }
}

static THEME: OnceLock<Theme> = OnceLock::new();

/// The active theme.
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::default)
}
