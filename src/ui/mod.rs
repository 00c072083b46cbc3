//! Presentation layer - ratatui TUI plus a plain line renderer

pub mod animations;
pub mod app;
pub mod format;
pub mod plain;
pub mod theme;
pub mod view;

pub use app::{App, TuiState};
pub use plain::PlainRenderer;
pub use theme::Theme;
pub use view::{render, ViewContext};
