use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use randart_core::{run, RandartSettings};

#[derive(Debug, Parser)]
#[command(name = "randart", version, about = "Random artifact generator")]
struct Args {
    /// Artifact catalogue, plain or gzip-compressed JSON.
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long)]
    seed: u64,

    /// Regenerate abilities and base items, not just names.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    full: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    randomize_names: bool,

    /// Optional JSON file overriding the generator's tuned constants.
    #[arg(long, value_name = "FILE")]
    tuning: Option<PathBuf>,

    /// Write randart_log.txt with scoring steps and warnings.
    #[arg(long, default_value_t = false)]
    debug: bool,
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = RandartSettings {
        seed: args.seed,
        full: args.full,
        randomize_names: args.randomize_names,
        debug: args.debug,
        input_path: args.input,
        output_path: args.output,
        tuning_path: args.tuning,
    };
    tracing::debug!(?settings, "starting");

    if let Err(err) = run(settings) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
