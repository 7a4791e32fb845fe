mod dispatch;
mod sources;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scout_core::{
    load_listings_jsonl, save_annotated_jsonl, DegradedProvider, EmbeddingProvider,
    LexicalEmbeddingProvider, Listing, MatchEngine, MatchError, MatchReport,
    MiniLmEmbeddingProvider, DEFAULT_THRESHOLD,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Profile used when neither the flag nor the environment supplies one.
const DEFAULT_PROFILE: &str = "I am a Computer Science junior with expertise in Python, \
    machine learning, and cloud infrastructure (AWS/GCP). I am interested in hackathons \
    focused on Generative AI and sustainability.";

#[derive(Debug, Parser)]
#[command(
    name = "scout",
    version,
    about = "Rank opportunity listings against a profile and plan the ones worth acting on"
)]
struct Cli {
    /// Path to all-MiniLM-L6-v2 weights (.safetensors). Without model
    /// files the deterministic lexical backend is used instead.
    #[arg(long, global = true)]
    model_path: Option<PathBuf>,

    /// Path to the matching tokenizer.json. Required with --model-path.
    #[arg(long, global = true)]
    tokenizer_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score and filter a listing pool, printing every verdict.
    Match {
        /// Listings JSONL; or use --sample for the built-in pool.
        #[arg(long, conflicts_with = "sample")]
        listings: Option<PathBuf>,

        #[arg(long)]
        sample: bool,

        #[arg(long, env = "SCOUT_PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,

        #[arg(long, env = "SCOUT_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Write accepted records here as JSONL.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Full pipeline: acquire listings, match, write the agenda.
    Run {
        /// Listings JSONL; or use --sample for the built-in pool.
        #[arg(long, conflicts_with = "sample")]
        listings: Option<PathBuf>,

        #[arg(long)]
        sample: bool,

        #[arg(long, env = "SCOUT_PROFILE", default_value = DEFAULT_PROFILE)]
        profile: String,

        #[arg(long, env = "SCOUT_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
        threshold: f32,

        /// Agenda JSONL destination.
        #[arg(long, default_value = "agenda.jsonl")]
        agenda: PathBuf,
    },
}

fn make_embedder(cli: &Cli) -> Result<Box<dyn EmbeddingProvider>> {
    match (&cli.model_path, &cli.tokenizer_path) {
        (Some(model), Some(tokenizer)) => {
            info!(model = %model.display(), "loading sentence encoder");
            match MiniLmEmbeddingProvider::load(model, tokenizer) {
                Ok(provider) => Ok(Box::new(provider)),
                Err(err) => {
                    // Keep the provider contract alive but refuse to score
                    // with it; the engine turns this into a hard failure.
                    error!(%err, "failed to load sentence encoder; embedder is degraded");
                    Ok(Box::new(DegradedProvider::default()))
                }
            }
        }
        (None, None) => Ok(Box::new(LexicalEmbeddingProvider::default())),
        _ => anyhow::bail!("--model-path and --tokenizer-path must both be provided"),
    }
}

fn load_pool(listings: &Option<PathBuf>, sample: bool) -> Result<Vec<Listing>> {
    match listings {
        Some(path) => load_listings_jsonl(path),
        None if sample => Ok(sources::sample_listings()),
        None => anyhow::bail!("either --listings or --sample is required"),
    }
}

fn evaluate_pool(
    engine: &MatchEngine<Box<dyn EmbeddingProvider>>,
    profile: &str,
    pool: &[Listing],
    threshold: f32,
) -> Result<MatchReport> {
    engine.evaluate(profile, pool, threshold).map_err(|err| match err {
        MatchError::ModelUnavailable => anyhow::anyhow!("matching aborted: {err}"),
        other => anyhow::anyhow!(other),
    })
}

fn print_verdicts(report: &MatchReport) {
    for record in &report.accepted {
        println!(
            "id={} score={:.4} eligible=true verdict=accepted title={:?}",
            record.listing.id, record.similarity_score, record.listing.title
        );
    }
    for record in &report.rejected {
        let eligible = match record.eligibility_ok {
            Some(true) => "true",
            Some(false) => "false",
            None => "null",
        };
        println!(
            "id={} score={:.4} eligible={} verdict=rejected title={:?}",
            record.listing.id, record.similarity_score, eligible, record.listing.title
        );
    }
}

fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Match {
            listings,
            sample,
            profile,
            threshold,
            output,
        } => {
            let pool = load_pool(listings, *sample)?;
            let engine = MatchEngine::new(make_embedder(&cli)?);
            let report = evaluate_pool(&engine, profile, &pool, *threshold)?;

            print_verdicts(&report);
            println!(
                "pool={} accepted={} rejected={} skipped={} threshold={}",
                pool.len(),
                report.accepted.len(),
                report.rejected.len(),
                report.skipped,
                threshold
            );

            if let Some(path) = output {
                save_annotated_jsonl(path, &report.accepted)?;
                info!(path = %path.display(), "accepted records written");
            }
        }
        Commands::Run {
            listings,
            sample,
            profile,
            threshold,
            agenda,
        } => {
            let pool = load_pool(listings, *sample)?;
            info!(pool = pool.len(), "matching listings against profile");

            let engine = MatchEngine::new(make_embedder(&cli)?);
            let report = evaluate_pool(&engine, profile, &pool, *threshold)?;

            let entries = dispatch::plan_agenda(&report.accepted);
            dispatch::write_agenda(agenda, &entries)?;

            println!("{}", "=".repeat(50));
            println!("               Scout Run Complete");
            println!("{}", "=".repeat(50));
            println!("Potential listings:     {}", pool.len());
            println!("Relevance threshold:    {threshold}");
            println!("Relevant and eligible:  {}", report.accepted.len());
            println!(
                "Agenda entries written: {} -> {}",
                entries.len(),
                agenda.display()
            );
            println!("{}", "=".repeat(50));
        }
    }

    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
