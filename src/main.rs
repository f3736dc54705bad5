//! season-escrow CLI
//!
//! Usage:
//!   season-escrow replay --script ops.json [--config escrow.toml] [--journal events.db]
//!   season-escrow events --journal events.db [--limit 100] [--emitter 0x..]
//!
//! `replay` runs a scripted session against a fresh registry and prints each
//! step outcome followed by the event journal, one JSON object per line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use season_escrow::{
    journal_db::JournalDb,
    script::{load_script, Replayer},
    AccountId, EscrowConfig, Registry,
};

#[derive(Parser, Debug)]
#[command(name = "season-escrow")]
#[command(about = "Season escrow ledger: replay scripted sessions and inspect journals")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, env = "ESCROW_CONFIG_PATH", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON script of operations against a fresh registry
    Replay {
        #[arg(short, long)]
        script: PathBuf,

        /// SQLite file to persist the resulting journal (overrides config)
        #[arg(short, long)]
        journal: Option<PathBuf>,
    },
    /// List events persisted in a journal database
    Events {
        #[arg(short, long)]
        journal: Option<PathBuf>,

        #[arg(short, long, default_value = "1000")]
        limit: usize,

        /// Only events emitted by this registry or ledger identity
        #[arg(long)]
        emitter: Option<AccountId>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = EscrowConfig::load(args.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Replay { script, journal } => {
            let steps = load_script(&script)?;
            let registry = Registry::from_config(&config);
            info!(
                registry = %registry.address(),
                steps = steps.len(),
                "replaying {}",
                script.display()
            );

            let mut replayer = Replayer::new(registry);
            let outcomes = replayer.run(&steps);
            for outcome in &outcomes {
                println!("{}", serde_json::to_string(outcome)?);
            }

            let records = replayer.registry().journal().records();
            for record in &records {
                println!("{}", serde_json::to_string(record)?);
            }

            let failed = outcomes.iter().filter(|o| !o.ok).count();
            info!(
                ok = outcomes.len() - failed,
                failed,
                events = records.len(),
                "replay finished"
            );

            let journal_path = journal.or_else(|| config.journal_path.as_ref().map(PathBuf::from));
            if let Some(path) = journal_path {
                let db = JournalDb::open(&path)?;
                let written = db.insert_records(&records)?;
                info!(written, "journal persisted to {}", path.display());
            }
        }
        Command::Events {
            journal,
            limit,
            emitter,
        } => {
            let path = journal
                .or_else(|| config.journal_path.as_ref().map(PathBuf::from))
                .context("no journal database given (--journal or ESCROW_JOURNAL_PATH)")?;
            let db = JournalDb::open(&path)?;
            for record in db.list_records(limit, emitter.as_ref())? {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
    }

    Ok(())
}
