//! Fetching waterway geometry around a start/end pair.
//!
//! A single request covers the padded bounding box first. When that fails
//! the box is split into a grid of tiles which are requested concurrently;
//! whatever tiles succeed are merged and failed tiles are only logged.

use std::fmt;

use futures::future::{join_all, BoxFuture};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::feature::FeatureCollection;
use crate::geo::Coordinate;

/// Upper bound on the number of tile requests a fallback may issue.
pub const MAX_TILES: usize = 256;

/// Slack applied before rounding a span up to whole tiles, so a quotient that
/// only exceeds an integer through float error does not add a sliver row.
const TILE_EPSILON: f64 = 1e-9;

/// Axis-aligned box in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingBox {
    /// Box spanning `a` and `b`, grown by `padding` degrees on every side
    /// and clamped to the valid coordinate range.
    pub fn around(a: Coordinate, b: Coordinate, padding: f64) -> Self {
        let padding = padding.max(0.0);
        Self {
            south: (a.lat.min(b.lat) - padding).max(-90.0),
            west: (a.lon.min(b.lon) - padding).max(-180.0),
            north: (a.lat.max(b.lat) + padding).min(90.0),
            east: (a.lon.max(b.lon) + padding).min(180.0),
        }
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Split into a row-major grid of tiles about `tile_size` degrees on a
    /// side. The last row and column end exactly on the box edge, absorbing
    /// any rounding remainder.
    ///
    /// A non-positive or non-finite `tile_size` yields the whole box. Fails
    /// with [`Error::TooManyTiles`] when the grid would exceed [`MAX_TILES`].
    pub fn tiles(&self, tile_size: f64) -> Result<Vec<BoundingBox>> {
        if !(tile_size.is_finite() && tile_size > 0.0) {
            return Ok(vec![*self]);
        }
        let rows = grid_steps(self.height(), tile_size);
        let cols = grid_steps(self.width(), tile_size);
        let count = rows.saturating_mul(cols);
        if count > MAX_TILES {
            return Err(Error::TooManyTiles {
                tiles: count,
                max: MAX_TILES,
            });
        }

        let mut tiles = Vec::with_capacity(count);
        for row in 0..rows {
            let south = self.south + row as f64 * tile_size;
            let north = if row + 1 == rows {
                self.north
            } else {
                south + tile_size
            };
            for col in 0..cols {
                let west = self.west + col as f64 * tile_size;
                let east = if col + 1 == cols {
                    self.east
                } else {
                    west + tile_size
                };
                tiles.push(BoundingBox {
                    south,
                    west,
                    north,
                    east,
                });
            }
        }
        Ok(tiles)
    }
}

fn grid_steps(span: f64, tile_size: f64) -> usize {
    // `as` saturates, so an absurd quotient still lands above MAX_TILES.
    ((span / tile_size - TILE_EPSILON).ceil() as usize).max(1)
}

impl fmt::Display for BoundingBox {
    /// Overpass order: south, west, north, east.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6},{:.6},{:.6},{:.6}",
            self.south, self.west, self.north, self.east
        )
    }
}

/// Source of geometry for a bounding box.
///
/// `label` identifies the request in logs. Implementations own query
/// construction, timeouts and any retry policy.
pub trait CorridorFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        bbox: BoundingBox,
        label: &'a str,
    ) -> BoxFuture<'a, Result<FeatureCollection>>;
}

/// Fetch geometry for the corridor between `start` and `end`.
pub async fn fetch_corridor(
    fetcher: &dyn CorridorFetcher,
    start: Coordinate,
    end: Coordinate,
    config: &RouterConfig,
) -> Result<FeatureCollection> {
    let bbox = BoundingBox::around(start, end, config.corridor_padding_deg);

    match fetcher.fetch(bbox, "corridor").await {
        Ok(collection) => {
            info!(%bbox, features = collection.len(), "fetched corridor geometry");
            return Ok(collection);
        }
        Err(err) => warn!(%bbox, error = %err, "corridor request failed, splitting into tiles"),
    }

    let tiles = bbox.tiles(config.tile_size_deg)?;
    let labels: Vec<String> = (0..tiles.len()).map(|i| format!("tile-{i}")).collect();
    let requests = tiles
        .iter()
        .zip(&labels)
        .map(|(tile, label)| fetcher.fetch(*tile, label));
    let results = join_all(requests).await;

    let attempted = results.len();
    let mut failed = 0usize;
    let mut merged = FeatureCollection::default();
    for ((tile, label), result) in tiles.iter().zip(&labels).zip(results) {
        match result {
            Ok(collection) => merged.merge(collection),
            Err(err) => {
                failed += 1;
                warn!(tile = %tile, label = label.as_str(), error = %err, "tile request failed");
            }
        }
    }

    if failed == attempted {
        return Err(Error::CorridorFetch { failed, attempted });
    }

    info!(
        tiles = attempted,
        failed,
        features = merged.len(),
        "merged tiled corridor geometry"
    );
    Ok(merged)
}
