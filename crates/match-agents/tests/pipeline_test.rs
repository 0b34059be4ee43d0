//! End-to-end pipeline tests over the shipped agent implementations.

use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use match_agents::agents::{self, ProfileParserNode, RuleBasedCoach, RuleBasedRecruiter};
use tribunal::derive::TemplateCoverWriter;
use tribunal::{
    derive_artifacts, AgentNode, AgentRole, AgentRoster, ArgumentAuthor, ContextGateway,
    DebateConfig, DebateState, EnrichmentContext, JobPosting, JudgeAssessment, MatchOutcome,
    NodeResult, Orchestrator, Profile,
};

fn skills(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn data_profile() -> Arc<Profile> {
    Arc::new(Profile {
        id: "cand-1".into(),
        name: "Ada".into(),
        skills: skills(&["Python", "SQL"]),
        experience: Vec::new(),
        raw_resume: "Ada, data engineer".into(),
        portfolio_handle: None,
    })
}

fn go_posting() -> Arc<JobPosting> {
    Arc::new(JobPosting {
        id: "job-1".into(),
        title: "Backend Engineer".into(),
        org: "Globex".into(),
        required_skills: skills(&["Python", "SQL", "Go"]),
        preferred_skills: BTreeSet::new(),
        description: "Backend services in Go and Python".into(),
        min_experience_years: None,
    })
}

/// Judge scripted per Judging pass; debaters stay the shipped rule-based
/// implementations.
struct ScriptedJudge {
    passes: Mutex<VecDeque<(f64, MatchOutcome)>>,
}

impl ScriptedJudge {
    fn new(passes: Vec<(f64, MatchOutcome)>) -> Arc<Self> {
        Arc::new(Self {
            passes: Mutex::new(passes.into()),
        })
    }
}

#[async_trait]
impl AgentNode for ScriptedJudge {
    fn role(&self) -> AgentRole {
        AgentRole::Judge
    }

    async fn evaluate(&self, state: &DebateState, _ctx: &EnrichmentContext) -> NodeResult {
        let (confidence, outcome) = self
            .passes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((0.5, MatchOutcome::Borderline));
        let mut next = state.clone();
        next.assessment = Some(JudgeAssessment {
            outcome,
            rationale: "scripted".into(),
            confidence,
            score: 55.0,
            supporting: (0..state.arguments.len()).collect(),
            must_address: Vec::new(),
            nice_to_have: Vec::new(),
        });
        NodeResult::Continue(next)
    }
}

fn fast_config() -> DebateConfig {
    DebateConfig {
        retry_backoff: Duration::from_millis(5),
        ..DebateConfig::default()
    }
}

/// The canonical borderline scenario: {Python, SQL} against
/// {Python, SQL, Go}. The judge is unsure after round one, buys the one
/// extra round, both debaters decline it, and the verdict lands
/// Borderline.
#[tokio::test]
async fn low_confidence_judge_buys_one_round_then_borderline() {
    let roster = AgentRoster {
        parser: Arc::new(ProfileParserNode),
        recruiter: Arc::new(RuleBasedRecruiter),
        coach: Arc::new(RuleBasedCoach),
        judge: ScriptedJudge::new(vec![
            (0.5, MatchOutcome::Borderline),
            (0.55, MatchOutcome::Borderline),
        ]),
    };
    let orchestrator = Orchestrator::new(
        roster,
        Arc::new(ContextGateway::new(Duration::from_secs(1))),
        fast_config(),
    );

    let record = orchestrator
        .run_debate_record(data_profile(), go_posting(), &CancellationToken::new())
        .await;

    assert!(record.is_complete());
    assert_eq!(record.round, 2);

    // Round one: recruiter cites the missing Go, coach cites the skill
    // overlap. Round two: both decline, so the log stays at two entries.
    assert_eq!(record.arguments.len(), 2);
    assert_eq!(record.arguments[0].author, ArgumentAuthor::Recruiter);
    assert!(record.arguments[0].claim.contains("Go"));
    assert_eq!(record.arguments[1].author, ArgumentAuthor::Coach);
    assert!(record.arguments[1].claim.contains("Skill match"));

    let verdict = record.verdict.unwrap();
    assert_eq!(verdict.outcome, MatchOutcome::Borderline);
    assert!(!verdict.degraded);
}

/// The fully rule-based roster is deterministic end to end.
#[tokio::test]
async fn rule_based_roster_scores_the_matchup() {
    let orchestrator = Orchestrator::new(
        agents::rule_based_roster(),
        Arc::new(ContextGateway::new(Duration::from_secs(1))),
        fast_config(),
    );

    let record = orchestrator
        .run_debate_record(data_profile(), go_posting(), &CancellationToken::new())
        .await;

    assert!(record.is_complete());
    // One medium concern (90) against one medium strength (60).
    let verdict = record.verdict.unwrap();
    assert_eq!(verdict.outcome, MatchOutcome::Match);
    assert!((verdict.score - 75.0).abs() < f64::EPSILON);
    assert_eq!(record.round, 1);
    assert_eq!(verdict.must_address.len(), 1);
    assert!(verdict.must_address[0].contains("Go"));
}

/// Terminal verdicts feed the derivers: the gap plan surfaces Go, and
/// the template writer produces a letter from the supporting arguments.
#[tokio::test]
async fn derivers_run_from_the_terminal_record() {
    let orchestrator = Orchestrator::new(
        agents::rule_based_roster(),
        Arc::new(ContextGateway::new(Duration::from_secs(1))),
        fast_config(),
    );

    let record = orchestrator
        .run_debate_record(data_profile(), go_posting(), &CancellationToken::new())
        .await;
    let artifacts = derive_artifacts(&record, &TemplateCoverWriter).await;

    assert_eq!(artifacts.skill_gaps.len(), 1);
    assert_eq!(artifacts.skill_gaps[0].skill, "Go");
    assert!(!artifacts.improvement_suggestions.is_empty());

    let letter = artifacts.cover_letter.unwrap();
    assert!(letter.contains("Globex"));
    assert!(letter.contains("Ada"));
}
