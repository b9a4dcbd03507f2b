use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxbrief::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxbrief::AppCommand {
    fn from(cmd: Commands) -> fxbrief::AppCommand {
        match cmd {
            Commands::Fetch => fxbrief::AppCommand::Fetch,
            Commands::Analyze => fxbrief::AppCommand::Analyze,
            Commands::Run => fxbrief::AppCommand::Run,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Fetch spot prices for the configured pairs
    Fetch,
    /// Compute change vs. previous close from the saved prices
    Analyze,
    /// Fetch, then analyze
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => fxbrief::cli::setup::setup(),
        Some(cmd) => fxbrief::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
