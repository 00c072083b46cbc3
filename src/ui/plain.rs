//! Line-oriented output for pipes and scripts
//!
//! Progress steps are printed as they arrive, completed steps are reported
//! once, and every stage gets a one-line notice when it first produces data.
//! Full stage sections follow once the stream has closed.

use std::io::{self, Write};

use crate::analysis::{AnalysisController, AnalysisState, Stage, StreamOpener, VisibilityFlags};
use crate::i18n::{t, Text};

use super::format::{stage_entries, Entry};
use super::theme::Icons;

pub struct PlainRenderer<W: Write> {
    out: W,
    printed_steps: usize,
    completed: Vec<bool>,
    shown: VisibilityFlags,
    last_error: Option<String>,
}

impl<W: Write> PlainRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed_steps: 0,
            completed: Vec::new(),
            shown: VisibilityFlags::default(),
            last_error: None,
        }
    }

    /// Print whatever changed since the previous call
    pub fn update(&mut self, state: &AnalysisState) -> io::Result<()> {
        let steps = state.ledger().steps();

        for (index, step) in steps.iter().enumerate() {
            if index >= self.printed_steps {
                writeln!(self.out, "{} {}", Icons::PENDING, step.title)?;
                self.completed.push(false);
            }
            if step.is_completed() && !self.completed[index] {
                writeln!(self.out, "{} {}", Icons::COMPLETED, step.title)?;
                self.completed[index] = true;
            }
        }
        self.printed_steps = steps.len();

        for stage in state.visibility().visible_stages() {
            if !self.shown.is_visible(stage) {
                self.shown.mark(stage);
                writeln!(self.out, "{} {}", Icons::BULLET, stage.title())?;
            }
        }

        if state.error() != self.last_error.as_deref() {
            self.last_error = state.error().map(str::to_string);
            if let Some(error) = &self.last_error {
                writeln!(self.out, "{} {}", Icons::ERROR, error)?;
            }
        }

        self.out.flush()
    }

    /// Print the full sections of every visible stage
    pub fn finish(&mut self, state: &AnalysisState) -> io::Result<()> {
        self.update(state)?;

        for stage in state.visibility().visible_stages() {
            writeln!(self.out)?;
            self.write_stage(stage, state)?;
        }

        if state.is_terminal() {
            writeln!(self.out)?;
            writeln!(self.out, "{} {}", Icons::COMPLETED, t(Text::Completed))?;
        }

        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_stage(&mut self, stage: Stage, state: &AnalysisState) -> io::Result<()> {
        writeln!(self.out, "== {} ==", stage.title())?;
        for entry in stage_entries(stage, state.result()) {
            match entry {
                Entry::Field { label, value } => writeln!(self.out, "{}: {}", label, value)?,
                Entry::Heading(heading) => writeln!(self.out, "{}:", heading)?,
                Entry::Item(item) => writeln!(self.out, "  {} {}", Icons::BULLET, item)?,
            }
        }
        Ok(())
    }
}

/// Submit `query` and print the analysis until the stream closes
pub async fn run<O, W>(
    controller: &mut AnalysisController<O>,
    query: &str,
    out: W,
) -> anyhow::Result<W>
where
    O: StreamOpener,
    W: Write,
{
    let mut renderer = PlainRenderer::new(out);
    controller.submit(query)?;
    renderer.update(controller.state())?;

    while controller.next_update().await {
        renderer.update(controller.state())?;
    }

    renderer.finish(controller.state())?;
    Ok(renderer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::IntentResult;
    use crate::analysis::{AnalysisEvent, StreamUpdate};

    fn status(code: &str) -> StreamUpdate {
        StreamUpdate::Event(AnalysisEvent::Status {
            status: Some(code.to_string()),
            message: Some(code.to_string()),
        })
    }

    fn output(renderer: PlainRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    #[test]
    fn test_steps_printed_once() {
        let mut state = AnalysisState::new();
        state.begin("q");
        let mut renderer = PlainRenderer::new(Vec::new());

        state.apply(status("intent_analysis_started"));
        renderer.update(&state).unwrap();
        renderer.update(&state).unwrap();
        state.apply(status("intent_analysis_completed"));
        renderer.update(&state).unwrap();

        let text = output(renderer);
        assert_eq!(text.matches("intent_analysis_started").count(), 2);
        assert!(text.starts_with(Icons::PENDING));
    }

    #[test]
    fn test_stage_notice_and_final_section() {
        let mut state = AnalysisState::new();
        state.begin("q");
        let mut renderer = PlainRenderer::new(Vec::new());

        state.apply(StreamUpdate::Event(AnalysisEvent::IntentAnalysis {
            data: IntentResult {
                intent: "career_advice".to_string(),
                ..Default::default()
            },
        }));
        renderer.update(&state).unwrap();
        state.apply(status("completed"));
        renderer.finish(&state).unwrap();

        let text = output(renderer);
        assert!(text.contains(&format!("== {} ==", Stage::Intent.title())));
        assert!(text.contains("career_advice"));
        assert!(!text.contains(Stage::Courses.title()));
    }

    #[test]
    fn test_error_printed_when_it_changes() {
        let mut state = AnalysisState::new();
        state.begin("q");
        let mut renderer = PlainRenderer::new(Vec::new());

        state.apply(StreamUpdate::DecodeError("bad".to_string()));
        renderer.update(&state).unwrap();
        renderer.update(&state).unwrap();

        let text = output(renderer);
        assert_eq!(text.matches(t(Text::DecodeError)).count(), 1);
    }
}
