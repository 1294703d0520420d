mod config;
mod pipeline;

use crate::config::Config;
use crate::pipeline::Pipeline;
use anyhow::{bail, Context, Result};
use cagefeed_core::db::{EventFilter, FighterFilter, MemorySink, PersistenceSink, PgSink};
use cagefeed_core::ledger::LedgerStore;
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = Config::from_env();
    let mut command: Option<String> = None;

    let args: Vec<String> = env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "check" | "status" => command = Some(args[i].clone()),
            "--limit" => {
                i += 1;
                let value = args.get(i).context("--limit requires a value")?;
                config.fetch_limit = value
                    .parse()
                    .with_context(|| format!("invalid --limit value: {}", value))?;
            }
            other => bail!("unknown argument: {} (expected check|status [--limit N])", other),
        }
        i += 1;
    }

    let sink: Arc<dyn PersistenceSink> = match &config.database_url {
        Some(url) => Arc::new(PgSink::connect(url).await?),
        None => {
            warn!("DATABASE_URL not set, using in-memory sink; nothing will persist");
            Arc::new(MemorySink::new())
        }
    };

    match command.as_deref() {
        Some("status") => status(&config, sink).await,
        _ => check(config, sink).await,
    }
}

/// Run one scraping cycle and print its summary.
async fn check(config: Config, sink: Arc<dyn PersistenceSink>) -> Result<()> {
    info!(limit = config.fetch_limit, "starting scraping cycle");
    let mut pipeline = Pipeline::new(config, sink);
    let summary = pipeline.run_cycle().await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    if summary.events_processed == 0 && !summary.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Print the strike ledger and sink contents without fetching anything.
async fn status(config: &Config, sink: Arc<dyn PersistenceSink>) -> Result<()> {
    let ledger = LedgerStore::new(&config.ledger_path).load()?;
    let events = sink
        .find_events(&EventFilter { include_cancelled: true, after: None })
        .await?;
    let fighters = sink.find_fighters(&FighterFilter::default()).await?;

    println!("events: {}", events.len());
    println!(
        "  cancelled: {}",
        events.iter().filter(|e| e.cancelled).count()
    );
    println!("fighters: {}", fighters.len());
    println!(
        "  synthesized: {}",
        fighters
            .iter()
            .filter(|f| f.provenance == cagefeed_core::Provenance::Synthesized)
            .count()
    );
    println!("event strikes pending: {}", ledger.events.len());
    println!("fight strikes pending: {}", ledger.fights.len());
    Ok(())
}
