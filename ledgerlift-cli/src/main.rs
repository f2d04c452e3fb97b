use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use ledgerlift_classify::{Classifier, GeminiOracle, OracleConfig};

mod config;
mod interact;

/// Statements larger than this are rejected before classification.
const MAX_STATEMENT_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Parser, Debug)]
#[command(name = "ledgerlift", version, about = "Classify bank statement text into a categorized spreadsheet")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default ~/.ledgerlift/config.toml
    InitConfig,

    /// Classify a statement text file and write the categorized report
    Classify {
        /// Path to the statement .txt file
        #[arg(long)]
        input: PathBuf,

        /// Where to write the xlsx report (default: Categorized_Statement.xlsx)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Command::InitConfig => {
            config::init_config()?;
        }
        Command::Classify { input, out } => {
            classify_statement(input, out)?;
        }
    }
    Ok(())
}

fn classify_statement(input: PathBuf, out: Option<PathBuf>) -> Result<()> {
    let meta = fs::metadata(&input).with_context(|| format!("stat {}", input.display()))?;
    if meta.len() > MAX_STATEMENT_BYTES {
        bail!("statement file is too large (max 5 MiB): {}", input.display());
    }

    let text = fs::read_to_string(&input).with_context(|| format!("read {}", input.display()))?;
    if text.trim().is_empty() {
        bail!("statement file is empty: {}", input.display());
    }

    let cfg = config::load_config()?;
    let api_key = config::resolve_api_key(&cfg)?;
    let oracle = GeminiOracle::new(OracleConfig {
        api_key,
        model: cfg.oracle.model.clone(),
        base_url: cfg.oracle.base_url.clone(),
    });

    info!("starting transaction classification");
    let classifier = Classifier::new(oracle);
    let (set, any_incomplete) = classifier.classify(&text)?;
    println!("Extracted {} transactions.", set.len());

    let set = if any_incomplete {
        println!("Some fields could not be determined and need your input.");
        interact::resolve_interactively(set)?
    } else {
        set
    };

    let bytes = ledgerlift_report::generate(&set)?;
    let out = out.unwrap_or_else(|| PathBuf::from("Categorized_Statement.xlsx"));
    fs::write(&out, bytes).with_context(|| format!("write {}", out.display()))?;
    println!("Wrote {}", out.display());
    Ok(())
}
