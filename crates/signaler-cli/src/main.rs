mod demo;
mod sizes;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "signaler-cli")]
#[command(about = "Exercise signaler-core functions and signals", long_about = None)]
#[command(version)]
struct Cli {
    /// Default log filter when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind functions, methods and closures, then wire signals together
    Demo,
    /// Print sizes and placements of wrappers and payloads
    Sizes {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(default_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    tracing::debug!(command = ?cli.command, "starting");

    match cli.command {
        Command::Demo => demo::run(),
        Command::Sizes { json } => sizes::run(json)?,
    }
    Ok(())
}
