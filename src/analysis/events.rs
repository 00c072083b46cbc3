//! Typed events received from the analysis stream
//!
//! Each SSE `data` payload is one JSON object discriminated by its `type`
//! field. Decoding happens once, at the stream boundary; anything that does
//! not match a known variant fails closed as a [`DecodeError`].

use super::types::{
    AiResponse, CollectionStrategy, CourseRecommendations, IntentProgress, IntentResult,
    QuestionAnalysis, StrategyProgress,
};
use crate::i18n::{t, Text};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Status code the service sends once the whole analysis is finished
pub const STATUS_COMPLETED: &str = "completed";

/// Suffix of per-stage completion status codes (`intent_analysis_completed`)
pub const STAGE_COMPLETED_SUFFIX: &str = "_completed";

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid event payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// A named phase of server-side analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intent,
    Question,
    Strategy,
    AiResponse,
    Courses,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Intent,
        Stage::Question,
        Stage::Strategy,
        Stage::AiResponse,
        Stage::Courses,
    ];

    /// Stage name used by the service in status codes
    pub fn key(&self) -> &'static str {
        match self {
            Stage::Intent => "intent_analysis",
            Stage::Question => "question_analysis",
            Stage::Strategy => "collection_strategy",
            Stage::AiResponse => "ai_response",
            Stage::Courses => "course_recommendation",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Stage::Intent => t(Text::StageIntent),
            Stage::Question => t(Text::StageQuestion),
            Stage::Strategy => t(Text::StageStrategy),
            Stage::AiResponse => t(Text::StageAiResponse),
            Stage::Courses => t(Text::StageCourses),
        }
    }
}

/// One event of the analysis stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisEvent {
    Status {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        status: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    IntentAnalysis {
        data: IntentResult,
    },
    IntentAnalysisProgress {
        data: IntentProgress,
    },
    QuestionAnalysis {
        data: QuestionAnalysis,
    },
    CollectionStrategy {
        data: CollectionStrategy,
    },
    CollectionStrategyProgress {
        data: StrategyProgress,
    },
    /// Plain chat answer generated before the intent-driven one
    ChatResponse {
        data: AiResponse,
    },
    AiResponse {
        data: AiResponse,
    },
    CourseRecommendation {
        data: CourseRecommendations,
    },
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl AnalysisEvent {
    /// Decode one SSE data payload
    pub fn decode(payload: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Stage this event carries data for, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::IntentAnalysis { .. } | Self::IntentAnalysisProgress { .. } => Some(Stage::Intent),
            Self::QuestionAnalysis { .. } => Some(Stage::Question),
            Self::CollectionStrategy { .. } | Self::CollectionStrategyProgress { .. } => {
                Some(Stage::Strategy)
            }
            Self::ChatResponse { .. } | Self::AiResponse { .. } => Some(Stage::AiResponse),
            Self::CourseRecommendation { .. } => Some(Stage::Courses),
            Self::Status { .. } | Self::Error { .. } => None,
        }
    }

    /// Whether this is the `status: completed` end-of-stream marker
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Status { status: Some(s), .. } if s == STATUS_COMPLETED)
    }

    /// Short tag for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::IntentAnalysis { .. } => "intent_analysis",
            Self::IntentAnalysisProgress { .. } => "intent_analysis_progress",
            Self::QuestionAnalysis { .. } => "question_analysis",
            Self::CollectionStrategy { .. } => "collection_strategy",
            Self::CollectionStrategyProgress { .. } => "collection_strategy_progress",
            Self::ChatResponse { .. } => "chat_response",
            Self::AiResponse { .. } => "ai_response",
            Self::CourseRecommendation { .. } => "course_recommendation",
            Self::Error { .. } => "error",
        }
    }
}
