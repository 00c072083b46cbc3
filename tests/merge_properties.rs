//! Properties of the merge reducer and the progress ledger

use aurora::analysis::types::{
    AiResponse, CollectionStrategy, IntentProgress, IntentResult, StrategyProgress,
};
use aurora::analysis::{
    merge, AggregateResult, AnalysisEvent, AnalysisState, ProgressLedger, ProgressStep, Stage,
    StepMatcher, StreamUpdate, VisibilityFlags,
};
use serde_json::{json, Map};

fn strategy_progress(strategy: Option<&str>, priority: Option<&str>) -> AnalysisEvent {
    AnalysisEvent::CollectionStrategyProgress {
        data: StrategyProgress {
            partial_strategy: strategy.map(str::to_string),
            partial_priority: priority.map(str::to_string),
            ..Default::default()
        },
    }
}

fn fold(events: &[AnalysisEvent]) -> AggregateResult {
    events
        .iter()
        .fold(AggregateResult::default(), |acc, event| merge(&acc, event))
}

#[test]
fn progress_never_erases_a_non_empty_field() {
    let result = fold(&[
        strategy_progress(Some("先调研"), None),
        strategy_progress(None, Some("高")),
        strategy_progress(Some(""), Some("")),
    ]);

    assert_eq!(result.collection_strategy.strategy, "先调研");
    assert_eq!(result.collection_strategy.priority, "高");
}

#[test]
fn progress_replaces_with_newer_non_empty_value() {
    let result = fold(&[
        strategy_progress(Some("先调研"), None),
        strategy_progress(Some("直接访谈"), None),
    ]);
    assert_eq!(result.collection_strategy.strategy, "直接访谈");
}

#[test]
fn final_overwrites_progress_verbatim() {
    let final_strategy = CollectionStrategy {
        strategy: "问卷".to_string(),
        priority: String::new(),
        timeline: "两周".to_string(),
        ..Default::default()
    };

    let result = fold(&[
        strategy_progress(Some("先调研"), Some("高")),
        AnalysisEvent::CollectionStrategy {
            data: final_strategy.clone(),
        },
    ]);

    // The final payload wins even where it is empty
    assert_eq!(result.collection_strategy, final_strategy);
}

#[test]
fn duplicate_finals_are_idempotent() {
    let final_intent = AnalysisEvent::IntentAnalysis {
        data: IntentResult {
            intent: "咨询建议".to_string(),
            confidence: 0.95,
            entities: Map::new(),
        },
    };

    let once = fold(&[final_intent.clone()]);
    let twice = fold(&[final_intent.clone(), final_intent]);
    assert_eq!(once, twice);
}

#[test]
fn merge_leaves_previous_untouched() {
    let previous = AggregateResult::default();
    let next = merge(
        &previous,
        &AnalysisEvent::IntentAnalysisProgress {
            data: IntentProgress {
                partial_intent: Some("咨询建议".to_string()),
                ..Default::default()
            },
        },
    );

    assert_eq!(previous, AggregateResult::default());
    assert_eq!(next.intent_analysis.intent, "咨询建议");
}

#[test]
fn stages_merge_independently_of_order() {
    let intent = AnalysisEvent::IntentAnalysis {
        data: IntentResult {
            intent: "学习规划".to_string(),
            confidence: 0.8,
            entities: Map::new(),
        },
    };
    let strategy = strategy_progress(Some("先调研"), None);
    let answer = AnalysisEvent::AiResponse {
        data: AiResponse::default(),
    };

    let forward = fold(&[intent.clone(), strategy.clone(), answer.clone()]);
    let backward = fold(&[answer, strategy, intent]);
    assert_eq!(forward, backward);
}

#[test]
fn entities_from_progress_and_final() {
    let mut entities = Map::new();
    entities.insert("topic".to_string(), json!(["efficiency", "habits"]));

    let result = fold(&[AnalysisEvent::IntentAnalysisProgress {
        data: IntentProgress {
            partial_entities: Some(entities.clone()),
            partial_confidence: Some(0.0),
            ..Default::default()
        },
    }]);

    assert_eq!(result.intent_analysis.entities, entities);
    assert_eq!(result.intent_analysis.confidence, 0.0);
}

#[test]
fn complete_all_finishes_every_pending_step() {
    let mut ledger = ProgressLedger::new();
    ledger.append(ProgressStep::pending("intent_analysis_started", "开始意图分析", "开始意图分析"));
    ledger.append(ProgressStep::pending("question_analysis_started", "开始问题分析", "开始问题分析"));
    ledger.append(ProgressStep::pending("message_1", "处理中", "正在处理..."));

    assert!(ledger.mark_completed(&StepMatcher::Id("question_analysis_started".to_string())));
    assert_eq!(ledger.complete_all(), 2);
    assert_eq!(ledger.pending_count(), 0);
    assert_eq!(ledger.complete_all(), 0);
}

#[test]
fn prefix_match_picks_most_recent_pending_step() {
    let mut ledger = ProgressLedger::new();
    ledger.append(ProgressStep::pending("intent_analysis_started", "a", "a"));
    ledger.append(ProgressStep::pending("intent_analysis_refining", "b", "b"));

    assert!(ledger.mark_completed(&StepMatcher::Prefix("intent_analysis_".to_string())));
    assert!(!ledger.steps()[0].is_completed());
    assert!(ledger.steps()[1].is_completed());

    assert!(ledger.mark_completed(&StepMatcher::Prefix("intent_analysis_".to_string())));
    assert!(!ledger.mark_completed(&StepMatcher::Prefix("intent_analysis_".to_string())));
}

#[test]
fn visibility_flags_only_grow() {
    let mut state = AnalysisState::new();
    state.begin("q");
    let mut seen = VisibilityFlags::default();

    let events = [
        strategy_progress(Some("先调研"), None),
        AnalysisEvent::Status {
            status: Some("question_analysis_started".to_string()),
            message: None,
        },
        AnalysisEvent::Error { message: None },
        AnalysisEvent::ChatResponse {
            data: AiResponse::default(),
        },
        strategy_progress(None, None),
    ];

    for event in events {
        state.apply(StreamUpdate::Event(event));
        let now = *state.visibility();
        for stage in Stage::ALL {
            assert!(!seen.is_visible(stage) || now.is_visible(stage));
        }
        seen = now;
    }

    assert_eq!(
        state.visibility().visible_stages(),
        vec![Stage::Strategy, Stage::AiResponse]
    );
}
