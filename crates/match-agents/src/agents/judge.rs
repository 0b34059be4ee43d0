//! Judge nodes: the arbiter. Reads the full argument history and leaves
//! an assessment on the state; the orchestrator decides whether that
//! assessment becomes the verdict or buys one more round.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use tribunal::{
    AgentNode, AgentRole, ArgumentAuthor, DebateState, EnrichmentContext, JudgeAssessment,
    MatchOutcome, NodeError, NodeResult,
};

use crate::backend::ReasoningBackend;
use crate::prompts;

/// Reasoning-backed arbiter.
pub struct LlmJudge {
    backend: Arc<dyn ReasoningBackend>,
}

impl LlmJudge {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentNode for LlmJudge {
    fn role(&self) -> AgentRole {
        AgentRole::Judge
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let request = prompts::judge_request(state);
        let value = match self.backend.invoke(&request).await {
            Ok(value) => value,
            Err(err) => return NodeResult::Fail(err.into()),
        };
        match parse_assessment(&value) {
            Ok(assessment) => {
                let mut next = state.clone();
                next.assessment = Some(assessment);
                NodeResult::Continue(next)
            }
            Err(err) => NodeResult::Fail(err),
        }
    }
}

/// Parse the judge response schema into an assessment.
///
/// Lenient where the original system was: a missing outcome falls back
/// to the score band, and a confidence given as a percentage is
/// normalized to [0, 1]. A payload with neither outcome nor score is a
/// parse failure.
fn parse_assessment(value: &Value) -> Result<JudgeAssessment, NodeError> {
    let score = value["final_score"].as_f64();
    let outcome = match value["outcome"].as_str() {
        Some(raw) => Some(parse_outcome(raw)?),
        None => None,
    };
    let (outcome, score) = match (outcome, score) {
        (Some(outcome), Some(score)) => (outcome, score),
        (Some(outcome), None) => (outcome, 50.0),
        (None, Some(score)) => (MatchOutcome::from_score(score), score),
        (None, None) => {
            return Err(NodeError::Invalid(
                "judge response missing outcome and final_score".into(),
            ))
        }
    };

    let mut confidence = value["confidence"].as_f64().unwrap_or(0.5);
    // Models sometimes answer 0-100 instead of 0-1.
    if confidence > 1.0 {
        confidence /= 100.0;
    }

    Ok(JudgeAssessment {
        outcome,
        rationale: value["rationale"].as_str().unwrap_or_default().to_string(),
        confidence,
        score,
        supporting: value["supporting_arguments"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_u64())
                    .map(|v| v as usize)
                    .collect()
            })
            .unwrap_or_default(),
        must_address: string_list(&value["must_address"]),
        nice_to_have: string_list(&value["nice_to_have"]),
    })
}

fn parse_outcome(raw: &str) -> Result<MatchOutcome, NodeError> {
    match raw.to_ascii_lowercase().as_str() {
        "match" => Ok(MatchOutcome::Match),
        "no_match" => Ok(MatchOutcome::NoMatch),
        "borderline" => Ok(MatchOutcome::Borderline),
        other => Err(NodeError::Invalid(format!("unknown outcome '{other}'"))),
    }
}

fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Deterministic arbiter used without a backend.
///
/// Scores each side from its argument strengths (concerns subtract from
/// a full score, strengths add to a neutral one), averages the two, and
/// lowers its confidence when a side went silent through failures, which
/// weighs against that side.
pub struct RuleBasedJudge;

#[async_trait]
impl AgentNode for RuleBasedJudge {
    fn role(&self) -> AgentRole {
        AgentRole::Judge
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let recruiter_penalty: f64 = state
            .arguments_by(ArgumentAuthor::Recruiter)
            .filter(|a| !a.is_failure())
            .map(|a| a.strength.weight())
            .sum();
        let coach_bonus: f64 = state
            .arguments_by(ArgumentAuthor::Coach)
            .filter(|a| !a.is_failure())
            .map(|a| a.strength.weight())
            .sum();

        let recruiter_score = (100.0 - recruiter_penalty).max(20.0);
        let coach_score = (50.0 + coach_bonus).min(95.0);
        let score = (recruiter_score + coach_score) / 2.0;
        let outcome = MatchOutcome::from_score(score);

        let had_failures = state.arguments.iter().any(|a| a.is_failure());
        let confidence = if had_failures { 0.45 } else { 0.6 };

        let supporting: Vec<usize> = state
            .arguments
            .iter()
            .enumerate()
            .filter(|(_, a)| !a.is_failure())
            .filter(|(_, a)| match outcome {
                MatchOutcome::Match => a.author == ArgumentAuthor::Coach,
                MatchOutcome::NoMatch => a.author == ArgumentAuthor::Recruiter,
                MatchOutcome::Borderline => true,
            })
            .map(|(i, _)| i)
            .collect();

        let must_address: Vec<String> = state
            .arguments_by(ArgumentAuthor::Recruiter)
            .filter(|a| !a.is_failure())
            .take(2)
            .map(|a| a.claim.clone())
            .collect();

        let mut next = state.clone();
        next.assessment = Some(JudgeAssessment {
            outcome,
            rationale: format!(
                "Recruiter score {recruiter_score:.0} against coach score {coach_score:.0} \
                 across {} completed round(s)",
                state.round
            ),
            confidence,
            score,
            supporting,
            must_address,
            nice_to_have: Vec::new(),
        });
        NodeResult::Continue(next)
    }
}
