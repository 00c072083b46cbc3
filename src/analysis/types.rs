//! Stage payload records
//!
//! Wire shapes of the per-stage results pushed by the analysis service.
//! Every field carries a serde default so a payload missing fields still
//! decodes into a well-defined zero value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Result of the intent analysis stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentResult {
    pub intent: String,
    pub confidence: f64,
    /// Entity values are strings or arrays of strings on the wire
    pub entities: Map<String, Value>,
}

/// Best-effort snapshot of the intent stage while it is still running
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_entities: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionScores {
    pub clarity: f64,
    pub specificity: f64,
    pub context: f64,
    pub professionalism: f64,
    pub overall_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImprovementSuggestions {
    pub clarity_improvements: Vec<String>,
    pub specificity_improvements: Vec<String>,
    pub context_improvements: Vec<String>,
    pub professionalism_improvements: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BestPractices {
    pub question_structure: String,
    pub key_elements: Vec<String>,
    pub examples: Vec<String>,
}

/// Scoring and advice on how the question was asked
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionAnalysis {
    pub question_analysis: QuestionScores,
    pub improvement_suggestions: ImprovementSuggestions,
    pub best_practices: BestPractices,
    pub follow_up_questions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionStrategy {
    pub strategy: String,
    pub priority: String,
    pub timeline: String,
    pub approach: String,
    pub risk_level: String,
    pub notes: String,
}

/// Best-effort snapshot of the collection strategy stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyProgress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_approach: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_risk_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseBody {
    pub main_answer: String,
    pub key_points: Vec<String>,
    pub practical_examples: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub common_pitfalls: Vec<String>,
    pub best_practices: Vec<String>,
    pub additional_resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMetadata {
    pub confidence: f64,
    pub complexity: String,
    /// Free text such as "10分钟"; numbers are kept as their decimal form
    #[serde(deserialize_with = "string_or_number")]
    pub estimated_time: String,
    pub target_audience: String,
    pub prerequisites: Vec<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(text)) => text,
        Some(Raw::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

/// Generated answer, shared by the `chat_response` and `ai_response` events
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiResponse {
    pub response: ResponseBody,
    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecommendation {
    pub title: String,
    pub relevance_score: f64,
    pub summary: String,
    pub source: String,
    pub page: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryContext {
    pub intent: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationMetadata {
    pub total_courses: u32,
    pub query_context: QueryContext,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecommendations {
    pub recommendations: Vec<CourseRecommendation>,
    pub metadata: RecommendationMetadata,
}
