//! Incremental result merger
//!
//! Folds stream events into one [`AggregateResult`]. Progress events merge
//! only the fields they carry (a new non-empty value wins, anything else
//! keeps what was there); a stage's final event replaces the whole slot.
//! Stages are merged independently, so cross-stage ordering never matters.

use super::events::AnalysisEvent;
use super::types::{
    AiResponse, CollectionStrategy, CourseRecommendations, IntentProgress, IntentResult,
    QuestionAnalysis, StrategyProgress,
};
use serde::{Deserialize, Serialize};

/// Everything received so far for one query, one slot per stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub intent_analysis: IntentResult,
    pub question_analysis: QuestionAnalysis,
    pub collection_strategy: CollectionStrategy,
    pub ai_response: AiResponse,
    pub course_recommendations: CourseRecommendations,
}

impl AggregateResult {
    /// Apply one event in place. Events without stage data are ignored.
    pub fn apply(&mut self, event: &AnalysisEvent) {
        match event {
            AnalysisEvent::IntentAnalysisProgress { data } => self.intent_analysis.absorb(data),
            AnalysisEvent::IntentAnalysis { data } => self.intent_analysis = data.clone(),
            AnalysisEvent::QuestionAnalysis { data } => self.question_analysis = data.clone(),
            AnalysisEvent::CollectionStrategyProgress { data } => {
                self.collection_strategy.absorb(data)
            }
            AnalysisEvent::CollectionStrategy { data } => self.collection_strategy = data.clone(),
            AnalysisEvent::ChatResponse { data } | AnalysisEvent::AiResponse { data } => {
                self.ai_response = data.clone()
            }
            AnalysisEvent::CourseRecommendation { data } => {
                self.course_recommendations = data.clone()
            }
            AnalysisEvent::Status { .. } | AnalysisEvent::Error { .. } => {}
        }
    }
}

/// Pure reducer: `(previous, event) -> next`
pub fn merge(previous: &AggregateResult, event: &AnalysisEvent) -> AggregateResult {
    let mut next = previous.clone();
    next.apply(event);
    next
}

fn keep_or_replace(slot: &mut String, update: Option<&String>) {
    if let Some(value) = update.filter(|v| !v.is_empty()) {
        slot.clone_from(value);
    }
}

impl IntentResult {
    /// Merge a partial snapshot, keeping fields the snapshot leaves empty
    pub fn absorb(&mut self, partial: &IntentProgress) {
        keep_or_replace(&mut self.intent, partial.partial_intent.as_ref());

        if let Some(confidence) = partial.partial_confidence.filter(|c| *c != 0.0) {
            self.confidence = confidence;
        }

        if let Some(entities) = partial.partial_entities.as_ref().filter(|e| !e.is_empty()) {
            self.entities = entities.clone();
        }
    }
}

impl CollectionStrategy {
    /// Merge a partial snapshot, keeping fields the snapshot leaves empty
    pub fn absorb(&mut self, partial: &StrategyProgress) {
        keep_or_replace(&mut self.strategy, partial.partial_strategy.as_ref());
        keep_or_replace(&mut self.priority, partial.partial_priority.as_ref());
        keep_or_replace(&mut self.timeline, partial.partial_timeline.as_ref());
        keep_or_replace(&mut self.approach, partial.partial_approach.as_ref());
        keep_or_replace(&mut self.risk_level, partial.partial_risk_level.as_ref());
        keep_or_replace(&mut self.notes, partial.partial_notes.as_ref());
    }
}
