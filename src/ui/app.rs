//! Interactive terminal client

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::analysis::{AnalysisClient, AnalysisController, StreamOpener};
use crate::{log_debug, log_info, log_warn};

use super::animations::Spinner;
use super::theme::Theme;
use super::view::{render, ViewContext};

/// Input line, scroll position and the controller; no terminal
pub struct TuiState<O: StreamOpener = AnalysisClient> {
    controller: AnalysisController<O>,
    input: String,
    cursor: usize,
    results_scroll: u16,
    user: Option<String>,
    should_quit: bool,
}

impl<O: StreamOpener> TuiState<O> {
    pub fn new(controller: AnalysisController<O>, user: Option<String>) -> Self {
        Self {
            controller,
            input: String::new(),
            cursor: 0,
            results_scroll: 0,
            user,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            // First Ctrl+C stops the stream, a second one quits
            if self.controller.is_streaming() {
                log_info!("Analysis cancelled by user");
                self.controller.cancel();
            } else {
                self.should_quit = true;
            }
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit(),
            KeyCode::Char(c) => {
                self.input.insert(self.byte_index(), c);
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let index = self.byte_index();
                self.input.remove(index);
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right if self.cursor < self.input.chars().count() => self.cursor += 1,
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.chars().count(),
            KeyCode::Up => self.results_scroll = self.results_scroll.saturating_sub(1),
            KeyCode::Down => self.results_scroll = self.results_scroll.saturating_add(1),
            KeyCode::PageUp => self.results_scroll = self.results_scroll.saturating_sub(10),
            KeyCode::PageDown => self.results_scroll = self.results_scroll.saturating_add(10),
            _ => {}
        }
    }

    /// Apply whatever the stream task has queued
    pub fn poll(&mut self) -> usize {
        let applied = self.controller.poll_updates();
        if applied > 0 {
            log_debug!("Applied {} stream updates", applied);
        }
        applied
    }

    pub fn controller(&self) -> &AnalysisController<O> {
        &self.controller
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn view<'a>(&'a self, theme: &'a Theme, spinner: &'a str) -> ViewContext<'a> {
        ViewContext {
            state: self.controller.state(),
            input: &self.input,
            spinner,
            theme,
            user: self.user.as_deref(),
            results_scroll: self.results_scroll,
        }
    }

    fn submit(&mut self) {
        if self.input.trim().is_empty() {
            return;
        }

        let query = std::mem::take(&mut self.input);
        self.cursor = 0;
        self.results_scroll = 0;

        match self.controller.submit(&query) {
            Ok(()) => {
                log_info!("Submitted query: {}", query.trim());
            }
            Err(e) => {
                log_warn!("Query rejected: {}", e);
            }
        }
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }
}

/// Owns the terminal for the lifetime of the session
pub struct App<O: StreamOpener = AnalysisClient> {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    state: TuiState<O>,
    theme: Theme,
    spinner: Spinner,
}

impl<O: StreamOpener> App<O> {
    pub fn new(controller: AnalysisController<O>, user: Option<String>) -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        Ok(Self {
            terminal,
            state: TuiState::new(controller, user),
            theme: Theme::dark(),
            spinner: Spinner::dots(),
        })
    }

    /// Submit `query` before the first frame
    pub fn with_initial_query(mut self, query: Option<String>) -> Self {
        if let Some(query) = query {
            self.state.input = query;
            self.state.submit();
        }
        self
    }

    pub async fn run(&mut self) -> io::Result<()> {
        let tick_rate = Duration::from_millis(80);
        let mut last_tick = Instant::now();

        loop {
            self.state.poll();
            self.draw()?;

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    self.state.handle_key(key);
                }
            }

            if last_tick.elapsed() >= tick_rate {
                if self.state.controller().state().is_loading() {
                    self.spinner.tick();
                } else {
                    self.spinner.reset();
                }
                last_tick = Instant::now();
            }

            if self.state.should_quit() {
                break;
            }
        }

        self.cleanup()
    }

    fn draw(&mut self) -> io::Result<()> {
        let view = self.state.view(&self.theme, self.spinner.frame());
        self.terminal.draw(|frame| render(frame, &view))?;
        Ok(())
    }

    fn cleanup(&mut self) -> io::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)?;
        Ok(())
    }
}

impl<O: StreamOpener> Drop for App<O> {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show);
    }
}
