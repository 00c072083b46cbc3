//! Stage slots flattened into labelled rows, shared by both renderers

use crate::analysis::{AggregateResult, Stage};
use crate::i18n::{t, Text};
use serde_json::Value;

/// One row of a stage section
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Field { label: &'static str, value: String },
    Heading(String),
    Item(String),
}

impl Entry {
    fn field(label: Text, value: impl Into<String>) -> Self {
        Entry::Field {
            label: t(label),
            value: value.into(),
        }
    }
}

/// `0.856` -> `"85.6%"`
pub fn percent(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

/// Rows for one stage. Empty strings and lists are skipped so a slot that
/// is still filling in only shows what has arrived.
pub fn stage_entries(stage: Stage, result: &AggregateResult) -> Vec<Entry> {
    let mut entries = Vec::new();

    match stage {
        Stage::Intent => {
            let intent = &result.intent_analysis;
            push_text(&mut entries, Text::LabelIntent, &intent.intent);
            if intent.confidence > 0.0 {
                entries.push(Entry::field(Text::LabelConfidence, percent(intent.confidence)));
            }
            if !intent.entities.is_empty() {
                entries.push(Entry::Heading(t(Text::LabelEntities).to_string()));
                for (key, value) in &intent.entities {
                    entries.push(Entry::Item(format!("{}: {}", key, display_value(value))));
                }
            }
        }
        Stage::Question => {
            let question = &result.question_analysis;
            let scores = &question.question_analysis;
            for (label, score) in [
                (Text::LabelOverallScore, scores.overall_score),
                (Text::LabelClarity, scores.clarity),
                (Text::LabelSpecificity, scores.specificity),
                (Text::LabelContext, scores.context),
                (Text::LabelProfessionalism, scores.professionalism),
            ] {
                entries.push(Entry::field(label, format!("{:.2}", score)));
            }

            let suggestions = &question.improvement_suggestions;
            push_list(
                &mut entries,
                Text::LabelSuggestions,
                suggestions
                    .clarity_improvements
                    .iter()
                    .chain(&suggestions.specificity_improvements)
                    .chain(&suggestions.context_improvements)
                    .chain(&suggestions.professionalism_improvements),
            );
            push_list(&mut entries, Text::LabelFollowUp, &question.follow_up_questions);
        }
        Stage::Strategy => {
            let strategy = &result.collection_strategy;
            push_text(&mut entries, Text::LabelStrategy, &strategy.strategy);
            push_text(&mut entries, Text::LabelPriority, &strategy.priority);
            push_text(&mut entries, Text::LabelTimeline, &strategy.timeline);
            push_text(&mut entries, Text::LabelApproach, &strategy.approach);
            push_text(&mut entries, Text::LabelRiskLevel, &strategy.risk_level);
            push_text(&mut entries, Text::LabelNotes, &strategy.notes);
        }
        Stage::AiResponse => {
            let ai = &result.ai_response;
            push_text(&mut entries, Text::LabelAnswer, &ai.response.main_answer);
            push_list(&mut entries, Text::LabelKeyPoints, &ai.response.key_points);
            push_list(&mut entries, Text::LabelSteps, &ai.response.implementation_steps);
            push_text(&mut entries, Text::LabelComplexity, &ai.metadata.complexity);
            if ai.metadata.confidence > 0.0 {
                entries.push(Entry::field(
                    Text::LabelConfidence,
                    format!("{:.2}%", ai.metadata.confidence * 100.0),
                ));
            }
        }
        Stage::Courses => {
            let courses = &result.course_recommendations.recommendations;
            if courses.is_empty() {
                entries.push(Entry::Item(t(Text::NoRecommendations).to_string()));
            }
            for course in courses {
                entries.push(Entry::Heading(course.title.clone()));
                entries.push(Entry::field(Text::LabelRelevance, percent(course.relevance_score)));
                if !course.summary.is_empty() {
                    entries.push(Entry::Item(course.summary.clone()));
                }
                if !course.source.is_empty() {
                    entries.push(Entry::field(
                        Text::LabelSource,
                        format!("{} ({} {})", course.source, t(Text::LabelPage), course.page),
                    ));
                }
            }
        }
    }

    entries
}

fn push_text(entries: &mut Vec<Entry>, label: Text, value: &str) {
    if !value.is_empty() {
        entries.push(Entry::field(label, value));
    }
}

fn push_list<'a>(entries: &mut Vec<Entry>, label: Text, items: impl IntoIterator<Item = &'a String>) {
    let mut items = items.into_iter().peekable();
    if items.peek().is_none() {
        return;
    }
    entries.push(Entry::Heading(t(label).to_string()));
    entries.extend(items.map(|item| Entry::Item(item.clone())));
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(display_value).collect::<Vec<_>>().join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{CourseRecommendation, IntentResult};

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.856), "85.6%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn test_partial_intent_skips_empty_fields() {
        let mut result = AggregateResult::default();
        result.intent_analysis = IntentResult {
            intent: "咨询建议".to_string(),
            ..Default::default()
        };

        let entries = stage_entries(Stage::Intent, &result);
        assert_eq!(entries.len(), 1);
        assert!(matches!(&entries[0], Entry::Field { value, .. } if value == "咨询建议"));
    }

    #[test]
    fn test_entities_are_listed() {
        let mut result = AggregateResult::default();
        result
            .intent_analysis
            .entities
            .insert("topic".to_string(), serde_json::json!(["rust", "async"]));

        let entries = stage_entries(Stage::Intent, &result);
        assert!(entries.contains(&Entry::Item("topic: rust, async".to_string())));
    }

    #[test]
    fn test_empty_courses_placeholder() {
        let result = AggregateResult::default();
        let entries = stage_entries(Stage::Courses, &result);
        assert_eq!(entries, vec![Entry::Item(t(Text::NoRecommendations).to_string())]);
    }

    #[test]
    fn test_course_rows() {
        let mut result = AggregateResult::default();
        result.course_recommendations.recommendations.push(CourseRecommendation {
            title: "Python 入门".to_string(),
            relevance_score: 0.92,
            summary: String::new(),
            source: "python.pdf".to_string(),
            page: 3,
        });

        let entries = stage_entries(Stage::Courses, &result);
        assert_eq!(entries[0], Entry::Heading("Python 入门".to_string()));
        assert_eq!(entries.len(), 3);
    }
}
