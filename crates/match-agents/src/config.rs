//! Environment-driven configuration for the matching pipeline.

use std::time::Duration;

use tribunal::DebateConfig;

/// Reasoning backend endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    /// Full URL of the chat-completions endpoint.
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
}

/// Top-level configuration, read from environment variables with
/// defaults that work offline (rule-based agents, no enrichment).
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Reasoning backend. None selects the rule-based agent roster.
    pub backend: Option<BackendEndpoint>,
    /// Base URL of the code-portfolio analysis service.
    pub portfolio_base_url: Option<String>,
    /// Base URL of the job-market data service.
    pub job_market_base_url: Option<String>,
    /// Per-source enrichment timeout.
    pub source_timeout: Duration,
    pub debate: DebateConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let mut debate = DebateConfig::default();
        debate.max_rounds = u32_from_env("MATCH_MAX_ROUNDS", debate.max_rounds);
        debate.confidence_threshold =
            f64_from_env("MATCH_CONFIDENCE_THRESHOLD", debate.confidence_threshold);
        debate.score_threshold = f64_from_env("MATCH_SCORE_THRESHOLD", debate.score_threshold);
        debate.max_concurrent =
            u32_from_env("MATCH_MAX_CONCURRENT", debate.max_concurrent as u32) as usize;
        debate.node_timeout = Duration::from_secs(u64_from_env(
            "MATCH_NODE_TIMEOUT_SECS",
            debate.node_timeout.as_secs(),
        ));

        Self {
            backend: Self::backend_from_env(),
            portfolio_base_url: std::env::var("MATCH_PORTFOLIO_CONTEXT_URL").ok(),
            job_market_base_url: std::env::var("MATCH_JOB_MARKET_URL").ok(),
            source_timeout: Duration::from_secs(u64_from_env("MATCH_SOURCE_TIMEOUT_SECS", 10)),
            debate,
        }
    }
}

impl MatchConfig {
    fn backend_from_env() -> Option<BackendEndpoint> {
        let url = std::env::var("MATCH_LLM_URL").ok()?;
        let model =
            std::env::var("MATCH_LLM_MODEL").unwrap_or_else(|_| "gpt-4-turbo-preview".into());
        let api_key = std::env::var("MATCH_LLM_API_KEY").ok();
        Some(BackendEndpoint {
            url,
            model,
            api_key,
        })
    }
}

fn u64_from_env(var: &str, default: u64) -> u64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn u32_from_env(var: &str, default: u32) -> u32 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn f64_from_env(var: &str, default: f64) -> f64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
