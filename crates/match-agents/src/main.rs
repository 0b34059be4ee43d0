use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

use match_agents::config::MatchConfig;
use match_agents::{build_cover_writer, build_orchestrator, telemetry};
use tribunal::{derive_artifacts, JobPosting, Profile, RankedPosting};

#[derive(Parser)]
#[command(
    name = "match-agents",
    about = "Debate-adjudicated candidate-job matching"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Debate one posting against a profile and print the verdict.
    Debate {
        /// Path to the profile JSON file.
        #[arg(long)]
        profile: PathBuf,
        /// Path to the posting JSON file.
        #[arg(long)]
        posting: PathBuf,
        /// Also derive the cover letter and skill-gap plan.
        #[arg(long)]
        artifacts: bool,
    },
    /// Debate every qualifying posting in a ranked file, highest
    /// similarity first.
    Batch {
        /// Path to the profile JSON file.
        #[arg(long)]
        profile: PathBuf,
        /// Path to a JSON array of {posting, score} entries.
        #[arg(long)]
        postings: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let cli = Cli::parse();
    let config = MatchConfig::default();
    let orchestrator = build_orchestrator(&config)?;

    match cli.command {
        Command::Debate {
            profile,
            posting,
            artifacts,
        } => {
            let profile: Arc<Profile> = Arc::new(read_json(&profile)?);
            let posting: Arc<JobPosting> = Arc::new(read_json(&posting)?);
            info!(profile = %profile.id, posting = %posting.id, "running debate");

            let record = orchestrator
                .run_debate_record(profile, posting, &CancellationToken::new())
                .await;

            if artifacts {
                let writer = build_cover_writer(&config)?;
                let derived = derive_artifacts(&record, writer.as_ref()).await;
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "verdict": record.verdict,
                        "arguments": record.arguments,
                        "artifacts": derived,
                    }))?
                );
            } else {
                println!("{}", serde_json::to_string_pretty(&record.verdict)?);
            }
        }
        Command::Batch { profile, postings } => {
            let profile: Arc<Profile> = Arc::new(read_json(&profile)?);
            let ranked: Vec<RankedPosting> = read_json(&postings)?;
            info!(profile = %profile.id, candidates = ranked.len(), "running debate batch");

            let results = orchestrator
                .run_debate_batch(profile, ranked, &CancellationToken::new())
                .await;

            let report: Vec<_> = results
                .iter()
                .map(|(posting, verdict)| {
                    serde_json::json!({ "posting": posting.id, "verdict": verdict })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
