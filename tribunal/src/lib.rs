//! Tribunal: an agent-debate orchestration engine for candidate-job
//! matching.
//!
//! A candidate profile is matched against job postings through a
//! structured debate: a Recruiter argues the concerns, a Coach argues
//! the strengths, and a Judge weighs the accumulated arguments into a
//! terminal, auditable [`Verdict`]. The engine coordinates the
//! independently fallible reasoning calls behind each stage, threads one
//! exclusive [`DebateState`] per (profile, posting) pair, merges
//! best-effort context enrichment, and guarantees termination even when
//! any single stage keeps failing.
//!
//! The crate is transport-free. Reasoning backends, enrichment sources,
//! and the similarity index are trait objects supplied by the caller;
//! `match-agents` ships the production implementations.

pub mod debate;
pub mod derive;
pub mod gateway;
pub mod node;
pub mod retriever;
pub mod types;

pub use debate::orchestrator::{AgentRoster, DebateConfig, Orchestrator};
pub use debate::state::{
    Argument, ArgumentAuthor, ArgumentStrength, DebateState, DebateStatus, EvidenceRef,
};
pub use debate::verdict::{JudgeAssessment, MatchOutcome, Verdict};
pub use derive::{derive_artifacts, CoverWriter, DerivedArtifacts, GapImportance, SkillGap};
pub use gateway::{
    ContextGateway, ContextSource, Enrichment, EnrichmentContext, EnrichmentQuery,
    EnrichmentRecord, SourceError, CODE_PORTFOLIO_SOURCE, JOB_MARKET_SOURCE,
};
pub use node::{AgentNode, AgentRole, NodeError, NodeResult, RetryCategory};
pub use retriever::{merge_candidates, CandidateRetriever, RankedPosting, RetrieverError};
pub use types::{ExperienceEntry, JobPosting, ParsedProfile, PortfolioSummary, Profile};
