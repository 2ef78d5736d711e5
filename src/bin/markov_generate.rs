//! `markov-generate`: loads `stringdb`/`markovdb`/`startdb` from
//! `--db-dir` and prints one generated sentence per newline read from
//! stdin, forever.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use markov_chain::generator::Generator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

#[derive(Parser)]
#[command(name = "markov-generate")]
#[command(about = "Generate sentences from a trained Markov chain database")]
struct Cli {
    /// Directory containing stringdb/markovdb/startdb.
    #[arg(long, default_value = ".")]
    db_dir: PathBuf,
    /// Seed the RNG for reproducible output (testing/demo affordance; the
    /// unseeded path uses OS entropy, matching the reference `rand()`).
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let generator = Generator::open(&cli.db_dir)
        .with_context(|| format!("failed to open databases in {}", cli.db_dir.display()))?;
    debug!(db_dir = %cli.db_dir.display(), "generator ready");

    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            generate_forever(&generator, &mut rng, &mut stdin_lock, &mut out)
        }
        None => {
            let mut rng = rand::thread_rng();
            generate_forever(&generator, &mut rng, &mut stdin_lock, &mut out)
        }
    }
}

fn generate_forever<S, R, W>(
    generator: &Generator,
    rng: &mut S,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()>
where
    S: markov_chain::generator::SampleSource,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        let sentence = generator.generate_one(rng).context("failed to generate sentence")?;
        writeln!(output, "{sentence}\n")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
    }
    Ok(())
}
