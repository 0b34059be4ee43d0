//! Production wiring for the tribunal debate engine: the reasoning
//! backend client, LLM-backed and rule-based agent rosters, enrichment
//! source clients, and configuration.

pub mod agents;
pub mod backend;
pub mod config;
pub mod cover_writer;
pub mod prompts;
pub mod sources;
pub mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use tribunal::derive::{CoverWriter, TemplateCoverWriter};
use tribunal::{ContextGateway, Orchestrator};

use backend::{HttpBackend, ReasoningBackend};
use config::MatchConfig;
use cover_writer::LlmCoverWriter;
use sources::{JobMarketSource, PortfolioContextSource};

/// Assemble an orchestrator from configuration: enrichment sources when
/// their base URLs are set, the LLM roster when a backend endpoint is
/// configured, the rule-based roster otherwise.
pub fn build_orchestrator(config: &MatchConfig) -> anyhow::Result<Orchestrator> {
    let mut gateway = ContextGateway::new(config.source_timeout);
    if let Some(base) = &config.portfolio_base_url {
        gateway = gateway.with_source(Arc::new(
            PortfolioContextSource::new(base, config.source_timeout)
                .context("building portfolio source")?,
        ));
    }
    if let Some(base) = &config.job_market_base_url {
        gateway = gateway.with_source(Arc::new(
            JobMarketSource::new(base, config.source_timeout)
                .context("building job-market source")?,
        ));
    }

    let roster = match build_backend(config)? {
        Some(backend) => {
            info!("using reasoning-backed agent roster");
            agents::llm_roster(backend)
        }
        None => {
            info!("no reasoning backend configured; using rule-based roster");
            agents::rule_based_roster()
        }
    };

    Ok(Orchestrator::new(
        roster,
        Arc::new(gateway),
        config.debate.clone(),
    ))
}

/// The cover writer matching the configured roster.
pub fn build_cover_writer(config: &MatchConfig) -> anyhow::Result<Arc<dyn CoverWriter>> {
    Ok(match build_backend(config)? {
        Some(backend) => Arc::new(LlmCoverWriter::new(backend)),
        None => Arc::new(TemplateCoverWriter),
    })
}

fn build_backend(config: &MatchConfig) -> anyhow::Result<Option<Arc<dyn ReasoningBackend>>> {
    match &config.backend {
        Some(endpoint) => {
            let backend = HttpBackend::new(endpoint.clone(), config.debate.node_timeout)
                .context("building reasoning backend client")?;
            Ok(Some(Arc::new(backend)))
        }
        None => Ok(None),
    }
}
