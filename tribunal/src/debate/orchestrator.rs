//! Debate orchestrator: owns the state machine, sequences the agent
//! nodes, enforces turn order and termination, and always hands back a
//! terminal verdict.
//!
//! # Pipeline
//!
//! ```text
//! Parsing ──▸ Debating ──▸ Judging ──▸ Terminal
//!               ▲  recruiter, coach │
//!               └────────────────────┘
//!             one extra round, at most once,
//!             when judge confidence < threshold
//! ```
//!
//! Node failures never escape: transient errors are retried with
//! backoff, exhausted debaters leave a failure-marker argument, and an
//! exhausted judge forces a Borderline verdict flagged as degraded.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::debate::state::{Argument, ArgumentAuthor, DebateState, DebateStatus};
use crate::debate::verdict::{JudgeAssessment, Verdict};
use crate::gateway::{
    ContextGateway, EnrichmentContext, EnrichmentQuery, CODE_PORTFOLIO_SOURCE, JOB_MARKET_SOURCE,
};
use crate::node::{AgentNode, NodeError, NodeResult, RetryCategory};
use crate::retriever::{merge_candidates, CandidateRetriever, RankedPosting, RetrieverError};
use crate::types::{JobPosting, ParsedProfile, Profile};

/// Configuration for the orchestrator.
#[derive(Debug, Clone)]
pub struct DebateConfig {
    /// Maximum debate rounds per run.
    pub max_rounds: u32,
    /// Judge confidence below this may buy one extra round.
    pub confidence_threshold: f64,
    /// Transient-error retries per node call.
    pub node_retries: u32,
    /// Wall-clock budget per node call.
    pub node_timeout: Duration,
    /// Base for exponential retry backoff.
    pub retry_backoff: Duration,
    /// Minimum similarity score for a posting to be debated.
    pub score_threshold: f64,
    /// Concurrent debates in a batch.
    pub max_concurrent: usize,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            max_rounds: 2,
            confidence_threshold: 0.6,
            node_retries: 2,
            node_timeout: Duration::from_secs(60),
            retry_backoff: Duration::from_millis(500),
            score_threshold: 0.7,
            max_concurrent: 8,
        }
    }
}

/// The agent roster driving one pipeline.
#[derive(Clone)]
pub struct AgentRoster {
    pub parser: Arc<dyn AgentNode>,
    pub recruiter: Arc<dyn AgentNode>,
    pub coach: Arc<dyn AgentNode>,
    pub judge: Arc<dyn AgentNode>,
}

/// Outcome of one node turn after the retry budget is spent.
enum TurnOutcome {
    Advanced(DebateState),
    Declined(String),
    Exhausted(NodeError),
}

/// Drives debates from Parsing to Terminal. Cheap to clone; clones share
/// the roster and the gateway cache.
#[derive(Clone)]
pub struct Orchestrator {
    roster: AgentRoster,
    gateway: Arc<ContextGateway>,
    config: DebateConfig,
}

impl Orchestrator {
    pub fn new(roster: AgentRoster, gateway: Arc<ContextGateway>, config: DebateConfig) -> Self {
        Self {
            roster,
            gateway,
            config,
        }
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    /// Run one debate to a terminal verdict.
    ///
    /// Never returns an error: node failures degrade per policy, and the
    /// worst case is a Borderline verdict flagged as degraded.
    pub async fn run_debate(&self, profile: Arc<Profile>, posting: Arc<JobPosting>) -> Verdict {
        let record = self
            .run_debate_record(profile, posting, &CancellationToken::new())
            .await;
        record
            .verdict
            .unwrap_or_else(|| Verdict::arbitration_failure("debate ended without a verdict"))
    }

    /// Like [`Orchestrator::run_debate`] but returns the full terminal
    /// state (argument history plus verdict) for durable storage and
    /// audit, and honors cooperative cancellation between rounds.
    pub async fn run_debate_record(
        &self,
        profile: Arc<Profile>,
        posting: Arc<JobPosting>,
        cancel: &CancellationToken,
    ) -> DebateState {
        let mut state = DebateState::open(profile.clone(), posting.clone());
        info!(debate_id = %state.id, posting = %posting.id, "debate opened");

        let ctx = self.gather_enrichment(&profile, &posting).await;
        for (source, reason) in ctx.unavailable_sources() {
            state.annotate(format!("enrichment stale: {source} ({reason})"));
        }

        self.run_parsing(&mut state, &ctx).await;
        self.advance(&mut state, DebateStatus::Debating, "profile parsed");

        let mut extra_round_used = false;
        let verdict = loop {
            // Cancellation is cooperative and only checked between
            // rounds; a round in flight completes or times out.
            if cancel.is_cancelled() {
                state.annotate("cancelled before round start");
                self.advance(&mut state, DebateStatus::Judging, "cancelled");
                break Verdict::cancelled();
            }

            let declined = self.run_round(&mut state, &ctx).await;
            state.round += 1;
            self.advance(&mut state, DebateStatus::Judging, "round complete");

            let assessment = match self.judge_pass(&state, &ctx).await {
                Ok(assessment) => assessment,
                Err(err) => {
                    warn!(debate_id = %state.id, error = %err, "judge exhausted retries");
                    state.annotate(format!("arbitration failure: {err}"));
                    break Verdict::arbitration_failure(&err.to_string());
                }
            };
            state.assessment = Some(assessment.clone());

            let wants_more = assessment.confidence < self.config.confidence_threshold;
            if wants_more && !extra_round_used && state.round < self.config.max_rounds && !declined
            {
                extra_round_used = true;
                info!(
                    debate_id = %state.id,
                    round = state.round,
                    confidence = assessment.confidence,
                    "judge requested an additional round"
                );
                self.advance(
                    &mut state,
                    DebateStatus::Debating,
                    "judge requested another round",
                );
                continue;
            }

            break Verdict::from_assessment(assessment, state.arguments.len());
        };

        let outcome = verdict.outcome;
        state.verdict = Some(verdict);
        self.advance(&mut state, DebateStatus::Terminal, "verdict recorded");
        info!(
            debate_id = %state.id,
            outcome = %outcome,
            rounds = state.round,
            arguments = state.arguments.len(),
            "debate terminal"
        );
        state
    }

    /// Debate every qualifying posting against one profile, fanning out
    /// over a bounded worker pool. Results come back in merge order.
    pub async fn run_debate_batch(
        &self,
        profile: Arc<Profile>,
        ranked: Vec<RankedPosting>,
        cancel: &CancellationToken,
    ) -> Vec<(Arc<JobPosting>, Verdict)> {
        let selected = merge_candidates(ranked, self.config.score_threshold);
        info!(
            profile = %profile.id,
            candidates = selected.len(),
            pool = self.config.max_concurrent,
            "debate batch starting"
        );

        let sem = Arc::new(Semaphore::new(self.config.max_concurrent));
        let mut join_set: JoinSet<(usize, Arc<JobPosting>, Verdict)> = JoinSet::new();

        for (idx, candidate) in selected.into_iter().enumerate() {
            let sem = sem.clone();
            let orchestrator = self.clone();
            let profile = profile.clone();
            let cancel = cancel.clone();
            join_set.spawn(async move {
                let _permit = sem.acquire().await.expect("semaphore closed");
                let record = orchestrator
                    .run_debate_record(profile, candidate.posting.clone(), &cancel)
                    .await;
                let verdict = record
                    .verdict
                    .unwrap_or_else(|| Verdict::arbitration_failure("missing verdict"));
                (idx, candidate.posting, verdict)
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(entry) => results.push(entry),
                Err(err) => warn!(error = %err, "debate worker panicked"),
            }
        }
        results.sort_by_key(|(idx, _, _)| *idx);
        results
            .into_iter()
            .map(|(_, posting, verdict)| (posting, verdict))
            .collect()
    }

    /// Rank postings for a profile against the similarity index, then
    /// debate every qualifying one. The scheduled headhunting sweep is
    /// just another caller of this entry point.
    pub async fn run_headhunt(
        &self,
        retriever: &dyn CandidateRetriever,
        profile: Arc<Profile>,
        k: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(Arc<JobPosting>, Verdict)>, RetrieverError> {
        let ranked = retriever.rank(&profile, k).await?;
        Ok(self.run_debate_batch(profile, ranked, cancel).await)
    }

    /// Build the enrichment snapshot for one (profile, posting) pair.
    /// Missing sources and missing handles simply yield a thinner context.
    async fn gather_enrichment(
        &self,
        profile: &Profile,
        posting: &JobPosting,
    ) -> EnrichmentContext {
        let mut queries = Vec::new();
        if let Some(handle) = &profile.portfolio_handle {
            if self.gateway.has_source(CODE_PORTFOLIO_SOURCE) {
                queries.push(EnrichmentQuery::new(CODE_PORTFOLIO_SOURCE, handle));
            }
        }
        if self.gateway.has_source(JOB_MARKET_SOURCE) {
            queries.push(EnrichmentQuery::new(JOB_MARKET_SOURCE, &posting.title));
        }
        self.gateway.snapshot(&queries).await
    }

    /// Parsing stage. A degraded parser falls back to the baseline
    /// normalization rather than failing the run.
    async fn run_parsing(&self, state: &mut DebateState, ctx: &EnrichmentContext) {
        match self
            .call_with_retry(self.roster.parser.as_ref(), state, ctx)
            .await
        {
            TurnOutcome::Advanced(next)
                if next.id == state.id
                    && next.status == DebateStatus::Parsing
                    && next.arguments.len() == state.arguments.len() =>
            {
                *state = next;
            }
            TurnOutcome::Advanced(_) => {
                warn!(debate_id = %state.id, "parser violated node contract; using baseline");
                state.annotate("profile parsing degraded: contract violation");
                state.parsed = ParsedProfile::baseline(&state.profile);
            }
            TurnOutcome::Declined(reason) | TurnOutcome::Exhausted(NodeError::Invalid(reason)) => {
                state.annotate(format!("profile parsing degraded: {reason}"));
                state.parsed = ParsedProfile::baseline(&state.profile);
            }
            TurnOutcome::Exhausted(err) => {
                state.annotate(format!("profile parsing degraded: {err}"));
                state.parsed = ParsedProfile::baseline(&state.profile);
            }
        }
    }

    /// One debate round: Recruiter argues first so the advocate can
    /// respond to concrete claims. Returns true when either side
    /// declined, which exhausts the debate.
    async fn run_round(&self, state: &mut DebateState, ctx: &EnrichmentContext) -> bool {
        let mut declined = false;
        let round = state.round;
        let turns = [
            (&self.roster.recruiter, ArgumentAuthor::Recruiter),
            (&self.roster.coach, ArgumentAuthor::Coach),
        ];

        for (node, author) in turns {
            match self.call_with_retry(node.as_ref(), state, ctx).await {
                TurnOutcome::Advanced(next) => match accept_turn(state, next, author, round) {
                    Ok(next) => *state = next,
                    Err(violation) => {
                        warn!(
                            debate_id = %state.id,
                            role = %node.role(),
                            violation,
                            "node contract violation; recording failure marker"
                        );
                        state.record_argument(Argument::failure_marker(author, round, &violation));
                        state.annotate(format!("{author} contract violation: {violation}"));
                    }
                },
                TurnOutcome::Declined(reason) => {
                    debug!(debate_id = %state.id, role = %node.role(), reason, "node declined");
                    declined = true;
                }
                TurnOutcome::Exhausted(err) => {
                    warn!(
                        debate_id = %state.id,
                        role = %node.role(),
                        error = %err,
                        "node exhausted retries; debate continues without it"
                    );
                    state.record_argument(Argument::failure_marker(author, round, &err.to_string()));
                    state.annotate(format!("{author} failed after retries: {err}"));
                }
            }
        }
        declined
    }

    /// One Judging pass. The judge reads the full history and must leave
    /// an assessment on the returned state.
    async fn judge_pass(
        &self,
        state: &DebateState,
        ctx: &EnrichmentContext,
    ) -> Result<JudgeAssessment, NodeError> {
        match self
            .call_with_retry(self.roster.judge.as_ref(), state, ctx)
            .await
        {
            TurnOutcome::Advanced(next) => {
                if next.id != state.id
                    || next.status != DebateStatus::Judging
                    || next.arguments.len() != state.arguments.len()
                {
                    return Err(NodeError::Invalid(
                        "judge violated node contract".to_string(),
                    ));
                }
                next.assessment
                    .ok_or_else(|| NodeError::Invalid("judge returned no assessment".to_string()))
            }
            TurnOutcome::Declined(reason) => {
                Err(NodeError::Invalid(format!("judge declined: {reason}")))
            }
            TurnOutcome::Exhausted(err) => Err(err),
        }
    }

    /// Invoke one node under the per-call timeout and retry policy.
    ///
    /// Each attempt re-evaluates from the same input state, so a retry
    /// can never double-append an argument; partial results from failed
    /// attempts are simply dropped.
    async fn call_with_retry(
        &self,
        node: &dyn AgentNode,
        state: &DebateState,
        ctx: &EnrichmentContext,
    ) -> TurnOutcome {
        let mut attempt: u32 = 0;
        loop {
            let result = match tokio::time::timeout(
                self.config.node_timeout,
                node.evaluate(state, ctx),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => NodeResult::Fail(NodeError::Timeout),
            };

            match result {
                NodeResult::Continue(next) => return TurnOutcome::Advanced(next),
                NodeResult::Decline { reason } => return TurnOutcome::Declined(reason),
                NodeResult::Fail(err) => {
                    let budget = match err.retry_category() {
                        RetryCategory::Transient => self.config.node_retries,
                        RetryCategory::ParseFailure => 1,
                    };
                    if attempt >= budget {
                        return TurnOutcome::Exhausted(err);
                    }
                    let backoff = self.config.retry_backoff * 2u32.saturating_pow(attempt);
                    warn!(
                        role = %node.role(),
                        attempt = attempt + 1,
                        budget,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "node attempt failed, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }

    /// Status transitions driven here follow the state machine by
    /// construction; a violation is a bug worth a loud log, not a panic.
    fn advance(&self, state: &mut DebateState, to: DebateStatus, reason: &str) {
        if let Err(err) = state.transition(to, reason) {
            warn!(debate_id = %state.id, error = %err, "unexpected transition rejection");
        }
    }
}

/// Validate a debater's returned state against the turn contract:
/// same debate, still Debating, exactly one new argument with the
/// expected author and round, verdict untouched.
fn accept_turn(
    current: &DebateState,
    next: DebateState,
    author: ArgumentAuthor,
    round: u32,
) -> Result<DebateState, String> {
    if next.id != current.id {
        return Err("state id changed".to_string());
    }
    if next.status != DebateStatus::Debating {
        return Err(format!("status changed to {}", next.status));
    }
    if next.verdict.is_some() {
        return Err("debater wrote a verdict".to_string());
    }
    if next.arguments.len() != current.arguments.len() + 1 {
        return Err(format!(
            "expected exactly one new argument, got {}",
            next.arguments.len() as i64 - current.arguments.len() as i64
        ));
    }
    if next.arguments[..current.arguments.len()] != current.arguments[..] {
        return Err("existing arguments were rewritten".to_string());
    }
    let added = &next.arguments[current.arguments.len()];
    if added.author != author {
        return Err(format!("argument authored by {}", added.author));
    }
    if added.round != round {
        return Err(format!("argument tagged round {}", added.round));
    }
    Ok(next)
}
