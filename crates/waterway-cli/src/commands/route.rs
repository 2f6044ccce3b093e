//! Route command handler for computing paths between two coordinates.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::Args;
use tracing::info;

use waterway_lib::{
    find_route, Coordinate, CorridorFetcher, OverpassClient, RouteRequest, RouterConfig,
};
use waterway_cli::output::{render, OutputFormat};
use waterway_cli::terminal::ColorPalette;

use super::{load_geometry, parse_coordinate_arg};

/// Arguments for the route command.
#[derive(Debug, Clone, Args)]
pub struct RouteCommandArgs {
    /// Start coordinate as LAT,LON.
    #[arg(long = "from", value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    pub from: Coordinate,
    /// Destination coordinate as LAT,LON.
    #[arg(long = "to", value_parser = parse_coordinate_arg, allow_hyphen_values = true)]
    pub to: Coordinate,
    /// Overpass-style JSON file with waterway geometry.
    #[arg(long)]
    pub geometry: Option<PathBuf>,
    /// Fetch corridor geometry from Overpass when no geometry is supplied.
    #[arg(long)]
    pub fetch: bool,
    /// Cruising speed in knots.
    #[arg(long, default_value_t = 6.0)]
    pub speed: f64,
    /// Reuse the nearest existing node instead of snapping onto a segment.
    #[arg(long)]
    pub no_snap: bool,
    /// Features processed between scheduler yields.
    #[arg(long)]
    pub batch_size: Option<usize>,
}

impl RouteCommandArgs {
    /// Convert CLI args to a library RouteRequest.
    pub fn to_request(&self) -> RouteRequest {
        RouteRequest {
            start: self.from,
            end: self.to,
            speed_knots: self.speed,
            snap_endpoints: !self.no_snap,
        }
    }
}

/// Handle the route subcommand.
pub async fn handle_route_command(
    args: &RouteCommandArgs,
    mut config: RouterConfig,
    format: OutputFormat,
) -> Result<()> {
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }

    let geometry = args.geometry.as_deref().map(load_geometry).transpose()?;
    if let Some(collection) = &geometry {
        info!(features = collection.len(), "loaded geometry file");
    }

    let client = if args.fetch {
        Some(OverpassClient::new(&config)?)
    } else {
        None
    };
    let fetcher = client.as_ref().map(|c| c as &dyn CorridorFetcher);

    let request = args.to_request();
    let route = match find_route(&request, geometry.as_ref(), fetcher, &config).await {
        Ok(route) => route,
        Err(err) if err.is_no_route() => return Err(anyhow!("No route found: {err}")),
        Err(err) => return Err(err.into()),
    };

    let palette = match format {
        OutputFormat::Text => ColorPalette::detect(),
        OutputFormat::Json => ColorPalette::plain(),
    };
    println!("{}", render(&route, format, palette)?);
    Ok(())
}
