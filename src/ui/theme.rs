//! Color theme for the TUI

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the application
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,

    // Accent colors
    pub primary: Color,
    pub accent: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,

    // UI element colors
    pub border: Color,
    pub border_focused: Color,
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(22, 22, 30),
            foreground: Color::Rgb(230, 230, 240),
            muted: Color::Rgb(120, 120, 140),

            primary: Color::Rgb(130, 170, 255), // Soft blue
            accent: Color::Rgb(255, 180, 100),  // Orange

            success: Color::Rgb(130, 255, 170),
            warning: Color::Rgb(255, 220, 100),
            error: Color::Rgb(255, 130, 130),

            border: Color::Rgb(60, 60, 80),
            border_focused: Color::Rgb(130, 170, 255),
        }
    }

    // Style builders

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.background).fg(self.foreground)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.border_focused } else { self.border })
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.primary).add_modifier(Modifier::BOLD)
    }

    pub fn label_style(&self) -> Style {
        Style::default()
            .fg(self.foreground)
            .add_modifier(Modifier::BOLD)
    }

    pub fn shortcut_key_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Icon set for the UI
pub struct Icons;

impl Icons {
    pub const PENDING: &'static str = "○";
    pub const COMPLETED: &'static str = "✓";
    pub const ERROR: &'static str = "✗";
    pub const BULLET: &'static str = "•";
    pub const PROMPT: &'static str = "›";
}
