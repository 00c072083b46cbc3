//! Loading spinner for the progress panel

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    current_frame: usize,
    last_update: Instant,
    interval: Duration,
}

impl Spinner {
    pub fn dots() -> Self {
        Self {
            frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            current_frame: 0,
            last_update: Instant::now(),
            interval: Duration::from_millis(80),
        }
    }

    pub fn tick(&mut self) {
        if self.last_update.elapsed() >= self.interval {
            self.advance();
            self.last_update = Instant::now();
        }
    }

    pub fn frame(&self) -> &'static str {
        self.frames[self.current_frame]
    }

    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.last_update = Instant::now();
    }

    fn advance(&mut self) {
        self.current_frame = (self.current_frame + 1) % self.frames.len();
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::dots()
    }
}
