//! Debate orchestration: the recruiter-coach critique loop arbitrated by
//! a judge.
//!
//! # Pipeline
//!
//! ```text
//! Parsing → Debating → Judging → Terminal
//!    │         │ ▲        │
//!    │   recruiter │      ├─ verdict accepted → Terminal
//!    │   then coach│      └─ low confidence → one extra round
//!    │         ▼ │
//!    │        round += 1
//!    └─ enrichment is best-effort; staleness never blocks parsing
//! ```
//!
//! One debate evolves strictly sequentially; independent debates fan out
//! in parallel through [`orchestrator::Orchestrator::run_debate_batch`].

pub mod orchestrator;
pub mod state;
pub mod verdict;

pub use orchestrator::{AgentRoster, DebateConfig, Orchestrator};
pub use state::{
    Argument, ArgumentAuthor, ArgumentStrength, DebateState, DebateStatus, EvidenceRef,
    StatusTransition, TransitionError,
};
pub use verdict::{JudgeAssessment, MatchOutcome, Verdict};
