//! Agent node contract: the uniform interface between the orchestrator
//! and each reasoning stage, plus the error taxonomy and retry classes.
//!
//! Every node is a function of (current state, enrichment context) to an
//! updated state copy. Nodes never mutate the state they are handed, so
//! the orchestrator can discard a partial result and retry an attempt
//! without ever double-appending arguments.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debate::state::DebateState;
use crate::gateway::EnrichmentContext;

/// Roles in the debate pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    ProfileParser,
    Recruiter,
    Coach,
    Judge,
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfileParser => write!(f, "profile_parser"),
            Self::Recruiter => write!(f, "recruiter"),
            Self::Coach => write!(f, "coach"),
            Self::Judge => write!(f, "judge"),
        }
    }
}

/// Error from a single agent-node attempt.
#[derive(Debug, Clone, Error)]
pub enum NodeError {
    #[error("node call timed out")]
    Timeout,
    #[error("reasoning backend rate limited")]
    RateLimited,
    #[error("malformed structured response: {0}")]
    Invalid(String),
    #[error("transport failure: {0}")]
    Transport(String),
}

/// Classification used by the orchestrator to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Timeout, rate limit, transport: retry with backoff up to the
    /// configured node limit.
    Transient,
    /// Malformed structured response: retry exactly once, then treat the
    /// node as failed.
    ParseFailure,
}

impl NodeError {
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::Timeout | Self::RateLimited | Self::Transport(_) => RetryCategory::Transient,
            Self::Invalid(_) => RetryCategory::ParseFailure,
        }
    }
}

/// Result of one agent-node evaluation.
#[derive(Debug, Clone)]
pub enum NodeResult {
    /// Updated copy of the debate state; the input state is untouched.
    Continue(DebateState),
    /// The node has nothing to add this turn. Idempotent.
    Decline { reason: String },
    /// The attempt failed; the orchestrator decides whether to retry.
    Fail(NodeError),
}

/// A reasoning stage in the debate pipeline.
///
/// Backed by an expensive, latency-variable external call in production;
/// tests script these directly.
#[async_trait]
pub trait AgentNode: Send + Sync {
    fn role(&self) -> AgentRole;

    /// Evaluate the current state and return the node's contribution.
    async fn evaluate(&self, state: &DebateState, ctx: &EnrichmentContext) -> NodeResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_categories() {
        assert_eq!(NodeError::Timeout.retry_category(), RetryCategory::Transient);
        assert_eq!(
            NodeError::RateLimited.retry_category(),
            RetryCategory::Transient
        );
        assert_eq!(
            NodeError::Transport("connection reset".into()).retry_category(),
            RetryCategory::Transient
        );
        assert_eq!(
            NodeError::Invalid("not json".into()).retry_category(),
            RetryCategory::ParseFailure
        );
    }

    #[test]
    fn test_role_display() {
        assert_eq!(AgentRole::ProfileParser.to_string(), "profile_parser");
        assert_eq!(AgentRole::Recruiter.to_string(), "recruiter");
        assert_eq!(AgentRole::Coach.to_string(), "coach");
        assert_eq!(AgentRole::Judge.to_string(), "judge");
    }

    #[test]
    fn test_error_display() {
        assert!(NodeError::Invalid("bad".into()).to_string().contains("bad"));
        assert!(NodeError::Timeout.to_string().contains("timed out"));
    }
}
