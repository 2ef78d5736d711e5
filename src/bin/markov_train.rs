//! `markov-train`: reads a newline-delimited, blank-line-separated corpus
//! from stdin and writes `stringdb`/`markovdb`/`startdb` to `--out-dir`.

use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use markov_chain::engine::Engine;
use markov_chain::shutdown;
use markov_chain::trainer;
use tracing::info;

#[derive(Parser)]
#[command(name = "markov-train")]
#[command(about = "Train an order-2 word-level Markov chain from stdin")]
struct Cli {
    /// Directory to write stringdb/markovdb/startdb into.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // SAFETY: called once, before stdin is read, from the only thread in
    // this process.
    unsafe {
        shutdown::install().context("failed to install SIGINT handler")?;
    }

    let mut engine = Engine::new();
    let stdin = io::stdin();
    let summary = trainer::run(&mut engine, BufReader::new(stdin.lock()), shutdown::flag())
        .context("failed reading training input")?;
    info!(
        lines_read = summary.lines_read,
        sentences_trained = summary.sentences_trained,
        "training complete"
    );

    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("failed to create output directory {}", cli.out_dir.display()))?;
    engine.export(&cli.out_dir).context("failed to export databases")?;

    engine.stats().log();

    Ok(())
}
