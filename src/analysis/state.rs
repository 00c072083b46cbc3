//! View state of one analysis query
//!
//! All mutation goes through [`AnalysisState::apply`], called by the single
//! consumer of the stream channel. A new submission resets everything in one
//! call through [`AnalysisState::begin`].

use super::client::{Closure, StreamUpdate};
use super::events::{AnalysisEvent, Stage};
use super::ledger::ProgressLedger;
use super::merger::AggregateResult;
use crate::i18n::{t, Text};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Which stages have produced anything yet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    pub intent: bool,
    pub question: bool,
    pub strategy: bool,
    pub ai_response: bool,
    pub courses: bool,
}

impl VisibilityFlags {
    /// Set the flag for `stage`. Flags never go back to false.
    pub fn mark(&mut self, stage: Stage) {
        *self.slot(stage) = true;
    }

    pub fn is_visible(&self, stage: Stage) -> bool {
        match stage {
            Stage::Intent => self.intent,
            Stage::Question => self.question,
            Stage::Strategy => self.strategy,
            Stage::AiResponse => self.ai_response,
            Stage::Courses => self.courses,
        }
    }

    pub fn any(&self) -> bool {
        Stage::ALL.iter().any(|s| self.is_visible(*s))
    }

    pub fn visible_stages(&self) -> Vec<Stage> {
        Stage::ALL.into_iter().filter(|s| self.is_visible(*s)).collect()
    }

    fn slot(&mut self, stage: Stage) -> &mut bool {
        match stage {
            Stage::Intent => &mut self.intent,
            Stage::Question => &mut self.question,
            Stage::Strategy => &mut self.strategy,
            Stage::AiResponse => &mut self.ai_response,
            Stage::Courses => &mut self.courses,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisState {
    query: String,
    result: AggregateResult,
    ledger: ProgressLedger,
    visibility: VisibilityFlags,
    loading: bool,
    error: Option<String>,
    /// `status: completed` was seen
    terminal: bool,
}

impl AnalysisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new query: every slot is cleared and loading is set
    pub fn begin(&mut self, query: impl Into<String>) {
        *self = Self {
            query: query.into(),
            loading: true,
            ..Self::default()
        };
    }

    /// Apply one update from the stream channel
    pub fn apply(&mut self, update: StreamUpdate) {
        match update {
            StreamUpdate::Event(event) => self.apply_event(&event),
            StreamUpdate::DecodeError(reason) => {
                if self.is_final() {
                    return;
                }
                warn!(%reason, "Dropping undecodable stream payload");
                self.error = Some(t(Text::DecodeError).to_string());
            }
            StreamUpdate::Closed(closure) => {
                self.finish(closure);
            }
        }
    }

    pub fn apply_event(&mut self, event: &AnalysisEvent) {
        if self.is_final() {
            debug!(kind = event.kind(), "Ignoring event after stream end");
            return;
        }

        match event {
            AnalysisEvent::Status { status, message } => {
                self.ledger.record_status(status.as_deref(), message.as_deref());
                if event.is_terminal() {
                    self.terminal = true;
                    self.loading = false;
                }
            }
            AnalysisEvent::Error { message } => {
                let message = message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| t(Text::StageErrorFallback));
                self.error = Some(message.to_string());
            }
            _ => {
                if let Some(stage) = event.stage() {
                    self.visibility.mark(stage);
                }
                self.result.apply(event);
            }
        }
    }

    /// Record the end of the stream. Returns true if this call cleared the
    /// loading flag; later calls are no-ops.
    pub fn finish(&mut self, closure: Closure) -> bool {
        if !self.loading {
            return false;
        }
        self.loading = false;

        match closure {
            Closure::Abnormal(reason) if !self.terminal => {
                warn!(%reason, "Analysis stream closed abnormally");
                // Keep a failure the server already reported
                let reported = self
                    .error
                    .as_deref()
                    .is_some_and(|e| e != t(Text::DecodeError));
                if !reported {
                    self.error = Some(t(Text::ConnectionError).to_string());
                }
            }
            _ => debug!("Analysis stream closed normally"),
        }
        true
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn result(&self) -> &AggregateResult {
        &self.result
    }

    pub fn ledger(&self) -> &ProgressLedger {
        &self.ledger
    }

    pub fn visibility(&self) -> &VisibilityFlags {
        &self.visibility
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn has_results(&self) -> bool {
        self.visibility.any()
    }

    /// Nothing more will be merged for the current query
    fn is_final(&self) -> bool {
        self.terminal || !self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::IntentProgress;

    fn status(code: Option<&str>, message: Option<&str>) -> StreamUpdate {
        StreamUpdate::Event(AnalysisEvent::Status {
            status: code.map(str::to_string),
            message: message.map(str::to_string),
        })
    }

    #[test]
    fn test_begin_resets_everything() {
        let mut state = AnalysisState::new();
        state.begin("first");
        state.apply(StreamUpdate::Event(AnalysisEvent::IntentAnalysisProgress {
            data: IntentProgress {
                partial_intent: Some("咨询建议".to_string()),
                ..Default::default()
            },
        }));
        state.apply(status(Some("started"), Some("开始")));
        state.apply(StreamUpdate::Event(AnalysisEvent::Error { message: None }));
        assert!(state.has_results());

        state.begin("second");
        assert_eq!(state.query(), "second");
        assert!(state.is_loading());
        assert!(!state.has_results());
        assert!(state.ledger().is_empty());
        assert!(state.error().is_none());
        assert_eq!(state.result(), &AggregateResult::default());
    }

    #[test]
    fn test_decode_error_keeps_stream_open() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(StreamUpdate::DecodeError("expected value".to_string()));
        assert_eq!(state.error(), Some(t(Text::DecodeError)));
        assert!(state.is_loading());
    }

    #[test]
    fn test_error_event_fallback_message() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(StreamUpdate::Event(AnalysisEvent::Error { message: None }));
        assert_eq!(state.error(), Some(t(Text::StageErrorFallback)));
        assert!(state.is_loading());

        state.apply(StreamUpdate::Event(AnalysisEvent::Error {
            message: Some("分析过程中出错: timeout".to_string()),
        }));
        assert_eq!(state.error(), Some("分析过程中出错: timeout"));
    }

    #[test]
    fn test_finish_clears_loading_once() {
        let mut state = AnalysisState::new();
        state.begin("q");
        assert!(state.finish(Closure::Normal));
        assert!(!state.finish(Closure::Abnormal("late".to_string())));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_abnormal_close_keeps_server_error() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(StreamUpdate::Event(AnalysisEvent::Error {
            message: Some("分析过程中出错: 意图分析失败".to_string()),
        }));
        state.apply(StreamUpdate::Closed(Closure::Abnormal("eof".to_string())));
        assert_eq!(state.error(), Some("分析过程中出错: 意图分析失败"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_abnormal_close_replaces_decode_error() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(StreamUpdate::DecodeError("expected value".to_string()));
        state.apply(StreamUpdate::Closed(Closure::Abnormal("eof".to_string())));
        assert_eq!(state.error(), Some(t(Text::ConnectionError)));
    }

    #[test]
    fn test_abnormal_after_terminal_is_silent() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(status(Some("completed"), None));
        assert!(!state.is_loading());
        state.apply(StreamUpdate::Closed(Closure::Abnormal("reset".to_string())));
        assert!(state.error().is_none());
    }

    #[test]
    fn test_events_after_terminal_are_ignored() {
        let mut state = AnalysisState::new();
        state.begin("q");
        state.apply(status(Some("completed"), None));
        state.apply(StreamUpdate::Event(AnalysisEvent::IntentAnalysisProgress {
            data: IntentProgress {
                partial_intent: Some("late".to_string()),
                ..Default::default()
            },
        }));
        assert!(!state.visibility().intent);
        assert_eq!(state.result().intent_analysis.intent, "");
    }

    #[test]
    fn test_visibility_flags() {
        let mut flags = VisibilityFlags::default();
        assert!(!flags.any());
        flags.mark(Stage::Strategy);
        flags.mark(Stage::Strategy);
        assert!(flags.is_visible(Stage::Strategy));
        assert_eq!(flags.visible_stages(), vec![Stage::Strategy]);
    }
}
