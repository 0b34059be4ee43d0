//! Recruiter nodes: the critic side of the debate. Argues first each
//! round so the Coach can respond to concrete claims.

use std::sync::Arc;

use async_trait::async_trait;

use tribunal::{
    AgentNode, AgentRole, Argument, ArgumentAuthor, ArgumentStrength, DebateState,
    EnrichmentContext, EvidenceRef, NodeResult,
};

use crate::agents::parse_debater_payload;
use crate::backend::ReasoningBackend;
use crate::prompts;

/// Reasoning-backed critic.
pub struct LlmRecruiter {
    backend: Arc<dyn ReasoningBackend>,
}

impl LlmRecruiter {
    pub fn new(backend: Arc<dyn ReasoningBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl AgentNode for LlmRecruiter {
    fn role(&self) -> AgentRole {
        AgentRole::Recruiter
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let request = prompts::recruiter_request(state);
        let value = match self.backend.invoke(&request).await {
            Ok(value) => value,
            Err(err) => return NodeResult::Fail(err.into()),
        };
        match parse_debater_payload(&value, ArgumentAuthor::Recruiter, state) {
            Ok(Some(argument)) => {
                let mut next = state.clone();
                next.record_argument(argument);
                NodeResult::Continue(next)
            }
            Ok(None) => NodeResult::Decline {
                reason: "no new concern".into(),
            },
            Err(err) => NodeResult::Fail(err),
        }
    }
}

/// Deterministic critic used without a backend: raises one new concern
/// per round from an ordered checklist, then declines.
pub struct RuleBasedRecruiter;

#[async_trait]
impl AgentNode for RuleBasedRecruiter {
    fn role(&self) -> AgentRole {
        AgentRole::Recruiter
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let already_made: Vec<String> = state
            .arguments_by(ArgumentAuthor::Recruiter)
            .map(|a| a.claim.clone())
            .collect();

        match concern_candidates(state)
            .into_iter()
            .find(|c| !already_made.contains(&c.claim))
        {
            Some(argument) => {
                let mut next = state.clone();
                next.record_argument(argument);
                NodeResult::Continue(next)
            }
            None => NodeResult::Decline {
                reason: "no further concerns".into(),
            },
        }
    }
}

/// Ordered checklist of concerns for this matchup.
fn concern_candidates(state: &DebateState) -> Vec<Argument> {
    let mut candidates = Vec::new();
    let posting = &state.posting;
    let parsed = &state.parsed;

    let missing: Vec<String> = posting
        .all_skills()
        .into_iter()
        .filter(|s| !parsed.skills.contains(s))
        .collect();

    if !missing.is_empty() {
        let shown: Vec<&str> = missing.iter().take(5).map(|s| s.as_str()).collect();
        let cited = shown
            .iter()
            .map(|s| {
                if posting.required_skills.contains(*s) {
                    EvidenceRef::RequiredSkill(s.to_string())
                } else {
                    EvidenceRef::PreferredSkill(s.to_string())
                }
            })
            .collect();
        let strength = if missing.len() > 3 {
            ArgumentStrength::Strong
        } else {
            ArgumentStrength::Medium
        };
        let claim = if missing.len() == 1 {
            format!("Missing required skill: {}", shown[0])
        } else {
            format!("Missing {} skills: {}", missing.len(), shown.join(", "))
        };
        candidates.push(Argument::new(
            ArgumentAuthor::Recruiter,
            state.round,
            claim,
            cited,
            strength,
        ));
    }

    if let Some(min_years) = posting.min_experience_years {
        if parsed.total_years_experience < min_years {
            candidates.push(Argument::new(
                ArgumentAuthor::Recruiter,
                state.round,
                format!(
                    "Insufficient experience: has {:.1} years, posting asks for {:.1}",
                    parsed.total_years_experience, min_years
                ),
                vec![EvidenceRef::ResumeText],
                ArgumentStrength::Strong,
            ));
        }
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

    fn state(min_years: Option<f64>) -> DebateState {
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
            min_experience_years: min_years,
        });
        let mut state = DebateState::open(profile.clone(), posting);
        state.parsed = ParsedProfile {
            skills: profile.skills.clone(),
            total_years_experience: 2.0,
            ..ParsedProfile::default()
        };
        state
    }

    #[tokio::test]
    async fn test_raises_missing_skill_concern() {
        let state = state(None);
        let result = RuleBasedRecruiter
            .evaluate(&state, &EnrichmentContext::empty())
            .await;
        let NodeResult::Continue(next) = result else {
            panic!("expected a concern");
        };
        let argument = next.arguments.last().unwrap();
        assert_eq!(argument.author, ArgumentAuthor::Recruiter);
        assert_eq!(argument.claim, "Missing required skill: Go");
        assert_eq!(argument.strength, ArgumentStrength::Medium);
        assert_eq!(
            argument.cited_evidence,
            vec![EvidenceRef::RequiredSkill("Go".into())]
        );
    }

    #[tokio::test]
    async fn test_second_concern_then_decline() {
        let mut state = state(Some(5.0));

        // First turn: the missing skill.
        let NodeResult::Continue(next) = RuleBasedRecruiter
            .evaluate(&state, &EnrichmentContext::empty())
            .await
        else {
            panic!("expected first concern");
        };
        state = next;

        // Second turn: insufficient experience.
        let NodeResult::Continue(next) = RuleBasedRecruiter
            .evaluate(&state, &EnrichmentContext::empty())
            .await
        else {
            panic!("expected second concern");
        };
        state = next;
        assert!(state.arguments[1].claim.contains("Insufficient experience"));

        // Third turn: nothing left.
        let result = RuleBasedRecruiter
            .evaluate(&state, &EnrichmentContext::empty())
            .await;
        assert!(matches!(result, NodeResult::Decline { .. }));
    }

    #[tokio::test]
    async fn test_declines_when_profile_covers_posting() {
        let mut state = state(None);
        state.parsed.skills = skills(&["Python", "SQL", "Go"]);
        let result = RuleBasedRecruiter
            .evaluate(&state, &EnrichmentContext::empty())
            .await;
        assert!(matches!(result, NodeResult::Decline { .. }));
    }
}
