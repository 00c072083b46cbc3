//! Progress ledger - ordered, append-only list of human-readable steps

use super::events::{STAGE_COMPLETED_SUFFIX, STATUS_COMPLETED};
use crate::i18n::{t, Text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Pending,
    Completed,
}

/// One progress descriptor shown while a query is in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressStep {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
}

impl ProgressStep {
    pub fn pending(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            status: StepStatus::Pending,
            timestamp: Utc::now(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}

/// How to find the step a completion refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepMatcher {
    Id(String),
    Prefix(String),
}

impl StepMatcher {
    fn matches(&self, step: &ProgressStep) -> bool {
        match self {
            StepMatcher::Id(id) => step.id == *id,
            StepMatcher::Prefix(prefix) => step.id.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    steps: Vec<ProgressStep>,
    /// Counter for ids of message-only status steps
    anonymous: usize,
}

impl ProgressLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, step: ProgressStep) {
        self.steps.push(step);
    }

    /// Flip the most recent pending step matching `matcher`.
    /// Returns false when no pending step matched.
    pub fn mark_completed(&mut self, matcher: &StepMatcher) -> bool {
        match self
            .steps
            .iter_mut()
            .rev()
            .find(|s| s.status == StepStatus::Pending && matcher.matches(s))
        {
            Some(step) => {
                step.status = StepStatus::Completed;
                true
            }
            None => false,
        }
    }

    /// Flip every pending step; returns how many were flipped
    pub fn complete_all(&mut self) -> usize {
        let mut flipped = 0;
        for step in self.steps.iter_mut().filter(|s| s.status == StepStatus::Pending) {
            step.status = StepStatus::Completed;
            flipped += 1;
        }
        flipped
    }

    /// Map a `status` event onto the ledger.
    ///
    /// `completed` finishes everything, `<stage>_completed` closes the latest
    /// `<stage>_*` step, anything else is appended as a pending step.
    pub fn record_status(&mut self, status: Option<&str>, message: Option<&str>) {
        if status == Some(STATUS_COMPLETED) {
            self.complete_all();
            return;
        }

        if status.is_none() && message.is_none() {
            return;
        }

        let title = message.unwrap_or_else(|| t(Text::Processing)).to_string();
        let description = message
            .unwrap_or_else(|| t(Text::ProcessingDescription))
            .to_string();

        if let Some(code) = status {
            if let Some(stage) = code.strip_suffix(STAGE_COMPLETED_SUFFIX) {
                let matcher = StepMatcher::Prefix(format!("{}_", stage));
                if !self.mark_completed(&matcher) {
                    let mut step = ProgressStep::pending(code, title, description);
                    step.status = StepStatus::Completed;
                    self.append(step);
                }
                return;
            }
        }

        let id = match status {
            Some(code) => code.to_string(),
            None => {
                self.anonymous += 1;
                format!("message_{}", self.anonymous)
            }
        };
        self.append(ProgressStep::pending(id, title, description));
    }

    pub fn steps(&self) -> &[ProgressStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.is_completed()).count()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.anonymous = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_keeps_order() {
        let mut ledger = ProgressLedger::new();
        ledger.append(ProgressStep::pending("a", "A", "first"));
        ledger.append(ProgressStep::pending("b", "B", "second"));
        let ids: Vec<_> = ledger.steps().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_mark_completed_most_recent_match() {
        let mut ledger = ProgressLedger::new();
        ledger.append(ProgressStep::pending("step_1", "A", ""));
        ledger.append(ProgressStep::pending("step_1", "A", ""));

        assert!(ledger.mark_completed(&StepMatcher::Id("step_1".to_string())));
        assert_eq!(ledger.steps()[0].status, StepStatus::Pending);
        assert_eq!(ledger.steps()[1].status, StepStatus::Completed);

        // Next call picks the remaining pending one
        assert!(ledger.mark_completed(&StepMatcher::Id("step_1".to_string())));
        assert_eq!(ledger.pending_count(), 0);
        assert!(!ledger.mark_completed(&StepMatcher::Id("step_1".to_string())));
    }

    #[test]
    fn test_mark_completed_by_prefix() {
        let mut ledger = ProgressLedger::new();
        ledger.append(ProgressStep::pending("intent_analysis_started", "意图", ""));
        ledger.append(ProgressStep::pending("question_analysis_started", "问题", ""));

        assert!(ledger.mark_completed(&StepMatcher::Prefix("intent_analysis_".to_string())));
        assert!(ledger.steps()[0].is_completed());
        assert!(!ledger.steps()[1].is_completed());
    }

    #[test]
    fn test_record_status_stage_convention() {
        let mut ledger = ProgressLedger::new();
        ledger.record_status(Some("intent_analysis_started"), Some("正在进行意图分析..."));
        ledger.record_status(None, Some("=== 意图分析开始 ==="));
        ledger.record_status(Some("intent_analysis_completed"), Some("意图分析完成"));

        assert_eq!(ledger.len(), 2);
        assert!(ledger.steps()[0].is_completed());
        assert_eq!(ledger.steps()[1].id, "message_1");
        assert!(!ledger.steps()[1].is_completed());
    }

    #[test]
    fn test_record_status_unmatched_completion_is_appended() {
        let mut ledger = ProgressLedger::new();
        ledger.record_status(Some("chat_response_completed"), Some("标准回答生成完成"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.steps()[0].is_completed());
    }

    #[test]
    fn test_record_status_terminal_completes_all() {
        let mut ledger = ProgressLedger::new();
        ledger.record_status(Some("started"), Some("开始分析流程"));
        ledger.record_status(None, Some("正在处理"));
        ledger.record_status(Some("completed"), Some("分析流程完成"));

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.pending_count(), 0);
    }

    #[test]
    fn test_record_status_fallback_text() {
        let mut ledger = ProgressLedger::new();
        ledger.record_status(Some("started"), None);
        assert_eq!(ledger.steps()[0].title, t(Text::Processing));
        assert_eq!(ledger.steps()[0].description, t(Text::ProcessingDescription));
    }

    #[test]
    fn test_clear_resets_anonymous_ids() {
        let mut ledger = ProgressLedger::new();
        ledger.record_status(None, Some("x"));
        ledger.clear();
        ledger.record_status(None, Some("y"));
        assert_eq!(ledger.steps()[0].id, "message_1");
    }
}
