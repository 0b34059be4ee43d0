//! Debate state machine: statuses, transitions, and the per-debate record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::debate::verdict::{JudgeAssessment, Verdict};
use crate::types::{JobPosting, ParsedProfile, Profile};

/// Status of a debate over one (profile, posting) pair.
///
/// Moves only forward through Parsing, Debating, Judging, Terminal.
/// The single allowed step back, Judging to Debating, buys at most one
/// extra round and is policed by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    /// Profile Parser is normalizing inputs.
    Parsing,
    /// Recruiter and Coach are exchanging arguments.
    Debating,
    /// Judge is weighing the accumulated arguments.
    Judging,
    /// Verdict recorded; the state is immutable from here.
    Terminal,
}

impl DebateStatus {
    /// Whether this is the terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal)
    }

    /// Valid transitions from this status.
    pub fn valid_transitions(self) -> &'static [DebateStatus] {
        match self {
            Self::Parsing => &[Self::Debating],
            Self::Debating => &[Self::Judging],
            Self::Judging => &[Self::Debating, Self::Terminal],
            Self::Terminal => &[],
        }
    }
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parsing => write!(f, "parsing"),
            Self::Debating => write!(f, "debating"),
            Self::Judging => write!(f, "judging"),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

/// Author of a debate argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentAuthor {
    /// The critic: argues against the match.
    Recruiter,
    /// The advocate: argues for the candidate.
    Coach,
}

impl std::fmt::Display for ArgumentAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recruiter => write!(f, "recruiter"),
            Self::Coach => write!(f, "coach"),
        }
    }
}

/// How strongly an argument weighs for the side that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentStrength {
    Strong,
    Medium,
    Weak,
}

impl ArgumentStrength {
    /// Score weight on the 0-100 scale used at Judging.
    pub fn weight(self) -> f64 {
        match self {
            Self::Strong => 15.0,
            Self::Medium => 10.0,
            Self::Weak => 5.0,
        }
    }
}

impl std::fmt::Display for ArgumentStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strong => write!(f, "strong"),
            Self::Medium => write!(f, "medium"),
            Self::Weak => write!(f, "weak"),
        }
    }
}

/// A reference into profile or posting data cited as evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvidenceRef {
    /// A skill on the candidate profile.
    ProfileSkill(String),
    /// An experience entry, by index into the profile.
    ProfileExperience(usize),
    /// The raw resume text.
    ResumeText,
    /// The enriched code-portfolio summary.
    Portfolio,
    /// A required skill on the posting.
    RequiredSkill(String),
    /// A preferred skill on the posting.
    PreferredSkill(String),
    /// The posting description.
    PostingDescription,
}

/// One argument in the debate log. Append-only once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub author: ArgumentAuthor,
    /// Zero-indexed round the argument was made in.
    pub round: u32,
    pub claim: String,
    pub cited_evidence: Vec<EvidenceRef>,
    pub strength: ArgumentStrength,
    /// Set when this entry records an exhausted node rather than a claim.
    pub failure: Option<String>,
}

impl Argument {
    pub fn new(
        author: ArgumentAuthor,
        round: u32,
        claim: impl Into<String>,
        cited_evidence: Vec<EvidenceRef>,
        strength: ArgumentStrength,
    ) -> Self {
        Self {
            author,
            round,
            claim: claim.into(),
            cited_evidence,
            strength,
            failure: None,
        }
    }

    /// Placeholder recorded when a debater exhausted its retries. Carries no
    /// claim and weighs against the silent side at Judging.
    pub fn failure_marker(author: ArgumentAuthor, round: u32, reason: &str) -> Self {
        Self {
            author,
            round,
            claim: String::new(),
            cited_evidence: Vec::new(),
            strength: ArgumentStrength::Weak,
            failure: Some(reason.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// A status transition record for auditing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub from: DebateStatus,
    pub to: DebateStatus,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Error for invalid status transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebateStatus,
    pub to: DebateStatus,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} -> {} (allowed: {:?})",
            self.from,
            self.to,
            self.from.valid_transitions()
        )
    }
}

impl std::error::Error for TransitionError {}

/// The shared record threaded through one debate.
///
/// Exactly one exists per (profile, posting) evaluation, owned by the
/// worker driving it until Terminal. Agent nodes receive it by reference
/// and hand back an updated copy; they never mutate it in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateState {
    pub id: String,
    pub profile: Arc<Profile>,
    pub posting: Arc<JobPosting>,
    /// Normalized profile view filled in during Parsing.
    pub parsed: ParsedProfile,
    /// Append-only, chronological.
    pub arguments: Vec<Argument>,
    /// Completed rounds. Increments after the Coach's turn.
    pub round: u32,
    pub status: DebateStatus,
    /// The Judge's latest provisional assessment. Overwritten per Judging
    /// pass; only the accepted one becomes the verdict.
    pub assessment: Option<JudgeAssessment>,
    /// Written exactly once, at the Judging to Terminal transition.
    pub verdict: Option<Verdict>,
    /// Orchestration notes: degradations, failures, staleness.
    pub annotations: Vec<String>,
    pub transitions: Vec<StatusTransition>,
    pub opened_at: DateTime<Utc>,
}

impl DebateState {
    /// Open a fresh debate in Parsing.
    pub fn open(profile: Arc<Profile>, posting: Arc<JobPosting>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            profile,
            posting,
            parsed: ParsedProfile::default(),
            arguments: Vec::new(),
            round: 0,
            status: DebateStatus::Parsing,
            assessment: None,
            verdict: None,
            annotations: Vec::new(),
            transitions: Vec::new(),
            opened_at: Utc::now(),
        }
    }

    /// Move to a new status, recording the transition.
    pub fn transition(&mut self, to: DebateStatus, reason: &str) -> Result<(), TransitionError> {
        if !self.status.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.status,
                to,
            });
        }
        self.transitions.push(StatusTransition {
            from: self.status,
            to,
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
        self.status = to;
        Ok(())
    }

    /// Append an argument to the log.
    pub fn record_argument(&mut self, argument: Argument) {
        self.arguments.push(argument);
    }

    /// Attach an orchestration note.
    pub fn annotate(&mut self, note: impl Into<String>) {
        self.annotations.push(note.into());
    }

    /// Arguments raised by one side, in order.
    pub fn arguments_by(&self, author: ArgumentAuthor) -> impl Iterator<Item = &Argument> {
        self.arguments.iter().filter(move |a| a.author == author)
    }

    /// Whether the debate has reached Terminal.
    pub fn is_complete(&self) -> bool {
        self.status.is_terminal()
    }

    /// Compact status line for logs.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] round {} | {} arguments | posting={}",
            self.status,
            self.round,
            self.arguments.len(),
            self.posting.id
        )
    }
}
