//! Profile Parser node: deterministic normalization of intake data plus
//! the best-effort portfolio enrichment merge.

use async_trait::async_trait;
use tracing::debug;

use tribunal::{
    AgentNode, AgentRole, DebateState, EnrichmentContext, NodeResult, ParsedProfile,
    PortfolioSummary, CODE_PORTFOLIO_SOURCE,
};

/// Normalizes skills and experience and merges the code-portfolio
/// record when the gateway produced one. Missing enrichment only sets
/// the staleness marker; it never fails the run.
pub struct ProfileParserNode;

#[async_trait]
impl AgentNode for ProfileParserNode {
    fn role(&self) -> AgentRole {
        AgentRole::ProfileParser
    }

    async fn evaluate(&self, state: &DebateState, ctx: &EnrichmentContext) -> NodeResult {
        let profile = &state.profile;
        let mut parsed = ParsedProfile::baseline(profile);
        parsed.portfolio_stale = false;

        match ctx.get(CODE_PORTFOLIO_SOURCE) {
            Some(record) => {
                let portfolio: PortfolioSummary =
                    serde_json::from_value(record.payload.clone()).unwrap_or_default();
                parsed.skills.extend(portfolio.languages.iter().cloned());
                parsed.portfolio_stale = record.stale;
                parsed.portfolio = Some(portfolio);
            }
            None => {
                parsed.portfolio_stale = profile.portfolio_handle.is_some();
            }
        }

        parsed.strengths = strengths(profile, &parsed);
        debug!(
            debate_id = %state.id,
            skills = parsed.skills.len(),
            strengths = parsed.strengths.len(),
            stale = parsed.portfolio_stale,
            "profile parsed"
        );

        let mut next = state.clone();
        next.parsed = parsed;
        NodeResult::Continue(next)
    }
}

/// Initial strengths surfaced for the Coach.
fn strengths(profile: &tribunal::Profile, parsed: &ParsedProfile) -> Vec<String> {
    let mut strengths = Vec::new();
    if profile.experience.len() >= 3 {
        strengths.push(format!(
            "{} roles showing career progression",
            profile.experience.len()
        ));
    }
    if parsed.skills.len() >= 10 {
        strengths.push(format!(
            "Diverse skill set with {} technologies",
            parsed.skills.len()
        ));
    }
    if let Some(portfolio) = &parsed.portfolio {
        if portfolio.activity_level == "High" {
            strengths.push("Active code-portfolio contributor".to_string());
        }
    }
    strengths
}
