//! Agent node implementations.
//!
//! Two interchangeable rosters drive the same orchestrator: reasoning-
//! backed nodes that call the shared backend, and the deterministic
//! rule-based roster selected when no backend endpoint is configured.
//! Both obey the node contract: evaluate against a borrowed state, hand
//! back an updated copy, never touch anything in place.

pub mod coach;
pub mod judge;
pub mod profile_parser;
pub mod recruiter;

use std::sync::Arc;

use serde_json::Value;

use tribunal::{
    AgentRoster, Argument, ArgumentAuthor, ArgumentStrength, DebateState, EvidenceRef, NodeError,
};

use crate::backend::ReasoningBackend;

pub use coach::{LlmCoach, RuleBasedCoach};
pub use judge::{LlmJudge, RuleBasedJudge};
pub use profile_parser::ProfileParserNode;
pub use recruiter::{LlmRecruiter, RuleBasedRecruiter};

/// Roster backed by the reasoning service.
pub fn llm_roster(backend: Arc<dyn ReasoningBackend>) -> AgentRoster {
    AgentRoster {
        parser: Arc::new(ProfileParserNode),
        recruiter: Arc::new(LlmRecruiter::new(backend.clone())),
        coach: Arc::new(LlmCoach::new(backend.clone())),
        judge: Arc::new(LlmJudge::new(backend)),
    }
}

/// Deterministic roster used when no backend endpoint is configured.
pub fn rule_based_roster() -> AgentRoster {
    AgentRoster {
        parser: Arc::new(ProfileParserNode),
        recruiter: Arc::new(RuleBasedRecruiter),
        coach: Arc::new(RuleBasedCoach),
        judge: Arc::new(RuleBasedJudge),
    }
}

/// Parse a debater response into an argument, or `None` for a decline.
///
/// Expected shape: `{"argument": {claim, cited_skills, cited_requirements,
/// strength} | null}`. Anything else is a parse failure the orchestrator
/// retries once.
pub(crate) fn parse_debater_payload(
    value: &Value,
    author: ArgumentAuthor,
    state: &DebateState,
) -> Result<Option<Argument>, NodeError> {
    let argument = &value["argument"];
    if argument.is_null() {
        return Ok(None);
    }
    let claim = argument["claim"]
        .as_str()
        .ok_or_else(|| NodeError::Invalid("argument missing claim".into()))?;
    if claim.trim().is_empty() {
        return Err(NodeError::Invalid("argument claim is empty".into()));
    }

    let mut cited = Vec::new();
    for skill in string_items(&argument["cited_skills"]) {
        cited.push(EvidenceRef::ProfileSkill(skill));
    }
    for requirement in string_items(&argument["cited_requirements"]) {
        if state.posting.preferred_skills.contains(&requirement)
            && !state.posting.required_skills.contains(&requirement)
        {
            cited.push(EvidenceRef::PreferredSkill(requirement));
        } else {
            cited.push(EvidenceRef::RequiredSkill(requirement));
        }
    }

    Ok(Some(Argument::new(
        author,
        state.round,
        claim,
        cited,
        parse_strength(argument["strength"].as_str()),
    )))
}

fn parse_strength(raw: Option<&str>) -> ArgumentStrength {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("strong") => ArgumentStrength::Strong,
        Some("weak") => ArgumentStrength::Weak,
        _ => ArgumentStrength::Medium,
    }
}

fn string_items(value: &Value) -> Vec<String> {
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
