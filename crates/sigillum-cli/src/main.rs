//! Sigillum CLI: check release policies before they gate a release.

mod commands;
mod discover;
mod validator;

use clap::Parser;
use color_eyre::eyre::Result;

/// Sigillum: supply-chain release policy tooling.
///
/// Validates organization and project release policies. Named for the seal
/// pressed into wax: once a release level is sealed, nothing changes it.
#[derive(Parser)]
#[command(name = "sigillum", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (repeat for more detail: -v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output logs as JSON (for machine consumption).
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Release policy commands.
    Release(commands::release::ReleaseArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Release(args) => commands::release::execute(args),
    }
}
