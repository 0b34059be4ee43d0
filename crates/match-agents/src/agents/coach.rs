//! Coach nodes: the advocate side of the debate. Sees the Recruiter's
//! claims for the round before arguing.

use std::sync::Arc;

use async_trait::async_trait;

use tribunal::{
    AgentNode, AgentRole, Argument, ArgumentAuthor, ArgumentStrength, DebateState,
    EnrichmentContext, EvidenceRef, NodeResult,
};

use crate::agents::parse_debater_payload;
use crate::backend::ReasoningBackend;
use crate::prompts;

/// Reasoning-backed advocate.
pub struct LlmCoach {
    backend: Arc<dyn ReasoningBackend>,
}

impl LlmCoach {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentNode for LlmCoach {
    fn role(&self) -> AgentRole {
        AgentRole::Coach
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let request = prompts::coach_request(state);
        let value = match self.backend.invoke(&request).await {
            Ok(value) => value,
            Err(err) => return NodeResult::Fail(err.into()),
        };
        match parse_debater_payload(&value, ArgumentAuthor::Coach, state) {
            Ok(Some(argument)) => {
                let mut next = state.clone();
                next.record_argument(argument);
                NodeResult::Continue(next)
            }
            Ok(None) => NodeResult::Decline {
                reason: "no new strength".into(),
            },
            Err(err) => NodeResult::Fail(err),
        }
    }
}

/// Deterministic advocate used without a backend: one new strength per
/// round, then declines.
pub struct RuleBasedCoach;

#[async_trait]
impl AgentNode for RuleBasedCoach {
    fn role(&self) -> AgentRole {
        AgentRole::Coach
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let already_made: Vec<String> = state
            .arguments_by(ArgumentAuthor::Coach)
            .map(|a| a.claim.clone())
            .collect();

        match strength_candidates(state)
            .into_iter()
            .find(|c| !already_made.contains(&c.claim))
        {
            Some(argument) => {
                let mut next = state.clone();
                next.record_argument(argument);
                NodeResult::Continue(next)
            }
            None => NodeResult::Decline {
                reason: "no further strengths".into(),
            },
        }
    }
}

/// Ordered checklist of strengths for this matchup.
fn strength_candidates(state: &DebateState) -> Vec<Argument> {
    let mut candidates = Vec::new();
    let posting = &state.posting;
    let parsed = &state.parsed;

    let matching: Vec<String> = posting
        .all_skills()
        .into_iter()
        .filter(|s| parsed.skills.contains(s))
        .collect();

    if !matching.is_empty() {
        let shown: Vec<&str> = matching.iter().take(5).map(|s| s.as_str()).collect();
        let cited = shown
            .iter()
            .map(|s| EvidenceRef::ProfileSkill(s.to_string()))
            .collect();
        let strength = if matching.len() > 3 {
            ArgumentStrength::Strong
        } else {
            ArgumentStrength::Medium
        };
        candidates.push(Argument::new(
            ArgumentAuthor::Coach,
            state.round,
            format!(
                "Skill match on {} of the posting's skills: {}",
                matching.len(),
                shown.join(", ")
            ),
            cited,
            strength,
        ));
    }

    for strength in parsed.strengths.iter().take(3) {
        candidates.push(Argument::new(
            ArgumentAuthor::Coach,
            state.round,
            strength.clone(),
            vec![EvidenceRef::ResumeText],
            ArgumentStrength::Medium,
        ));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tribunal::{JobPosting, ParsedProfile, Profile};

    fn skills(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn state() -> DebateState {
        let profile = Arc::new(Profile {
            id: "cand-1".into(),
            name: "Ada".into(),
            skills: skills(&["Python", "SQL"]),
            experience: Vec::new(),
            raw_resume: String::new(),
            portfolio_handle: None,
        });
        let posting = Arc::new(JobPosting {
            id: "job-1".into(),
            title: "Backend Engineer".into(),
            org: "Globex".into(),
            required_skills: skills(&["Python", "SQL", "Go"]),
            preferred_skills: BTreeSet::new(),
            description: String::new(),
            min_experience_years: None,
        });
        let mut state = DebateState::open(profile.clone(), posting);
        state.parsed = ParsedProfile {
            skills: profile.skills.clone(),
            strengths: vec!["3 roles showing career progression".into()],
            ..ParsedProfile::default()
        };
        state
    }

    #[tokio::test]
    async fn test_raises_skill_match_first() {
        let state = state();
        let NodeResult::Continue(next) = RuleBasedCoach
            .evaluate(&state, &EnrichmentContext::empty())
            .await
        else {
            panic!("expected a strength");
        };
        let argument = next.arguments.last().unwrap();
        assert_eq!(argument.author, ArgumentAuthor::Coach);
        assert!(argument.claim.contains("Skill match on 2"));
        assert_eq!(argument.strength, ArgumentStrength::Medium);
        assert_eq!(argument.cited_evidence.len(), 2);
    }

    #[tokio::test]
    async fn test_walks_checklist_then_declines() {
        let mut state = state();
        for _ in 0..2 {
            let NodeResult::Continue(next) = RuleBasedCoach
                .evaluate(&state, &EnrichmentContext::empty())
                .await
            else {
                panic!("expected a strength");
            };
            state = next;
        }
        assert!(state.arguments[1].claim.contains("career progression"));

        let result = RuleBasedCoach
            .evaluate(&state, &EnrichmentContext::empty())
            .await;
        assert!(matches!(result, NodeResult::Decline { .. }));
    }

    #[tokio::test]
    async fn test_declines_with_nothing_in_common() {
        let mut state = state();
        state.parsed.skills = skills(&["Cobol"]);
        state.parsed.strengths.clear();
        let result = RuleBasedCoach
            .evaluate(&state, &EnrichmentContext::empty())
            .await;
        assert!(matches!(result, NodeResult::Decline { .. }));
    }
}
