// Module exports for CLI subcommands
//
// Each module handles one subcommand; main.rs only parses arguments and dispatches.

pub mod fetch;
pub mod route;

use std::path::Path;

use anyhow::{Context, Result};
use waterway_lib::{Coordinate, FeatureCollection};

/// clap value parser for `LAT,LON` arguments.
pub fn parse_coordinate_arg(value: &str) -> std::result::Result<Coordinate, String> {
    waterway_lib::parse_coordinate(value).map_err(|err| err.to_string())
}

/// Load an Overpass-style JSON geometry file.
pub fn load_geometry(path: &Path) -> Result<FeatureCollection> {
    FeatureCollection::load(path)
        .with_context(|| format!("failed to read geometry from {}", path.display()))
}
