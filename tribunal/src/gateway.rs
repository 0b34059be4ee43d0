//! Context gateway: best-effort enrichment from external providers.
//!
//! Every source exposes the same contract and every failure degrades to
//! `Unavailable` rather than propagating; enrichment is never required
//! for correctness, only for quality. Results are cached by
//! (source, subject) for the lifetime of the gateway, which the
//! orchestrator scopes to one run or batch. The first successful fetch
//! wins a cache slot; concurrent duplicate fetches coalesce on the same
//! in-flight call instead of stacking up, and failures are not cached so
//! a later round may retry a source that was down.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

/// Source id for the code-portfolio analysis provider.
pub const CODE_PORTFOLIO_SOURCE: &str = "code_portfolio";
/// Source id for the job-market data provider.
pub const JOB_MARKET_SOURCE: &str = "job_market";

/// Query against one enrichment source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnrichmentQuery {
    pub source: String,
    pub subject: String,
}

impl EnrichmentQuery {
    pub fn new(source: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            subject: subject.into(),
        }
    }
}

/// A record fetched from an enrichment source. Read-only to agent nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentRecord {
    pub source: String,
    pub payload: serde_json::Value,
    pub fetched_at: DateTime<Utc>,
    pub stale: bool,
}

/// Error from a source implementation. Absorbed by the gateway.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("source timed out after {0:?}")]
    Timeout(Duration),
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a gateway fetch. Absence of data is a value, not an error.
#[derive(Debug, Clone)]
pub enum Enrichment {
    Available(EnrichmentRecord),
    Unavailable { source: String, reason: String },
}

impl Enrichment {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn record(&self) -> Option<&EnrichmentRecord> {
        match self {
            Self::Available(record) => Some(record),
            Self::Unavailable { .. } => None,
        }
    }
}

/// One external enrichment provider.
#[async_trait]
pub trait ContextSource: Send + Sync {
    fn id(&self) -> &str;

    /// Fetch the payload for one subject. Ordinary absence of data is an
    /// `Err(SourceError::Unavailable)`, never a panic.
    async fn fetch(&self, subject: &str) -> Result<serde_json::Value, SourceError>;
}

/// Merged enrichment snapshot passed to agent nodes. Read-only.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentContext {
    records: HashMap<String, EnrichmentRecord>,
    unavailable: HashMap<String, String>,
}

impl EnrichmentContext {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, enrichment: Enrichment) {
        match enrichment {
            Enrichment::Available(record) => {
                self.records.insert(record.source.clone(), record);
            }
            Enrichment::Unavailable { source, reason } => {
                self.unavailable.insert(source, reason);
            }
        }
    }

    pub fn get(&self, source: &str) -> Option<&EnrichmentRecord> {
        self.records.get(source)
    }

    /// True when a source produced no usable data, or marked what it
    /// returned as out of date.
    pub fn is_stale(&self, source: &str) -> bool {
        self.records.get(source).map(|r| r.stale).unwrap_or(true)
    }

    /// Sources that were queried but produced nothing, with reasons.
    pub fn unavailable_sources(&self) -> impl Iterator<Item = (&str, &str)> {
        self.unavailable
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Uniform client over all registered enrichment sources.
pub struct ContextGateway {
    sources: HashMap<String, Arc<dyn ContextSource>>,
    timeout: Duration,
    cache: Mutex<HashMap<EnrichmentQuery, Arc<OnceCell<EnrichmentRecord>>>>,
}

impl ContextGateway {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: HashMap::new(),
            timeout,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register a source under its own id.
    pub fn with_source(mut self, source: Arc<dyn ContextSource>) -> Self {
        self.sources.insert(source.id().to_string(), source);
        self
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Fetch one record, consulting the per-run cache first.
    pub async fn fetch(&self, query: &EnrichmentQuery) -> Enrichment {
        let Some(source) = self.sources.get(&query.source).cloned() else {
            return Enrichment::Unavailable {
                source: query.source.clone(),
                reason: "no such source registered".to_string(),
            };
        };

        let cell = {
            let mut cache = self.cache.lock().expect("gateway cache poisoned");
            cache
                .entry(query.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        let timeout = self.timeout;
        let result = cell
            .get_or_try_init(|| async {
                debug!(source = %query.source, subject = %query.subject, "fetching enrichment");
                match tokio::time::timeout(timeout, source.fetch(&query.subject)).await {
                    Ok(Ok(payload)) => Ok(EnrichmentRecord {
                        source: query.source.clone(),
                        payload,
                        fetched_at: Utc::now(),
                        stale: false,
                    }),
                    Ok(Err(err)) => Err(err),
                    Err(_) => Err(SourceError::Timeout(timeout)),
                }
            })
            .await;

        match result {
            Ok(record) => Enrichment::Available(record.clone()),
            Err(err) => {
                warn!(source = %query.source, error = %err, "enrichment source unavailable");
                Enrichment::Unavailable {
                    source: query.source.clone(),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Fetch a set of queries and merge the outcomes into one context.
    pub async fn snapshot(&self, queries: &[EnrichmentQuery]) -> EnrichmentContext {
        let mut ctx = EnrichmentContext::empty();
        for query in queries {
            ctx.insert(self.fetch(query).await);
        }
        ctx
    }
}
