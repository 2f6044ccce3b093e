//! Fetch command handler: download corridor geometry for offline routing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use waterway_lib::{fetch_corridor, Coordinate, OverpassClient, RouterConfig};

use super::parse_coordinate_arg;

/// Arguments for the fetch command.
#[derive(Debug, Clone, Args)]
pub struct FetchCommandArgs {
    /// Start coordinate as LAT,LON.
    #[arg(long = "from", value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    pub from: Coordinate,
    /// Destination coordinate as LAT,LON.
    #[arg(long = "to", value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    pub to: Coordinate,
    /// File to write the Overpass-style JSON geometry to.
    #[arg(long)]
    pub output: PathBuf,
    /// Corridor padding in degrees.
    #[arg(long)]
    pub padding: Option<f64>,
}

/// Handle the fetch subcommand.
pub async fn handle_fetch_command(args: &FetchCommandArgs, mut config: RouterConfig) -> Result<()> {
    if let Some(padding) = args.padding {
        config.corridor_padding_deg = padding;
    }

    let client = OverpassClient::new(&config)?;
    let collection = fetch_corridor(&client, args.from, args.to, &config)
        .await
        .context("failed to fetch corridor geometry")?;

    collection
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} features to {}",
        collection.len(),
        args.output.display()
    );
    Ok(())
}
