mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use waterway_cli::logging::{init_logging, LoggingConfig};
use waterway_cli::output::OutputFormat;
use waterway_lib::RouterConfig;

use commands::fetch::{handle_fetch_command, FetchCommandArgs};
use commands::route::{handle_route_command, RouteCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Navigable waterway routing utilities")]
struct Cli {
    /// Output format for route results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Only log warnings and errors.
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two coordinates.
    Route(RouteCommandArgs),
    /// Fetch corridor geometry and store it for offline routing.
    Fetch(FetchCommandArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LoggingConfig::from_env(cli.quiet));

    let config = RouterConfig::from_env();
    match &cli.command {
        Command::Route(args) => handle_route_command(args, config, cli.format).await,
        Command::Fetch(args) => handle_fetch_command(args, config).await,
    }
}
