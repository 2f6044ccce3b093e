//! Route assembly: geometry → graph → snapped endpoints → shortest path.
//!
//! [`find_route`] is the main entry point. It:
//! 1. Validates the request
//! 2. Fetches corridor geometry when none was supplied and a fetcher is available
//! 3. Builds the waterway graph
//! 4. Snaps start and end onto the graph
//! 5. Runs Dijkstra and maps the node path back to coordinates

use std::borrow::Cow;

use serde::Serialize;
use tracing::{debug, info};

use crate::builder::{BuildStats, GraphBuilder};
use crate::config::RouterConfig;
use crate::corridor::{fetch_corridor, CorridorFetcher};
use crate::error::{Error, Result};
use crate::feature::FeatureCollection;
use crate::geo::Coordinate;
use crate::path::find_route_dijkstra;
use crate::snap::{snap_endpoint, SnappedEndpoint};

/// Metres per second in one knot.
pub const KNOT_MS: f64 = 1852.0 / 3600.0;

/// High-level route request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: Coordinate,
    pub end: Coordinate,
    /// Cruising speed in knots.
    pub speed_knots: f64,
    /// Splice endpoints onto the nearest segment instead of reusing the
    /// nearest existing node.
    pub snap_endpoints: bool,
}

impl RouteRequest {
    pub fn new(start: Coordinate, end: Coordinate, speed_knots: f64) -> Self {
        Self {
            start,
            end,
            speed_knots,
            snap_endpoints: true,
        }
    }

    fn validate(&self) -> Result<()> {
        for coordinate in [self.start, self.end] {
            if !coordinate.is_valid() {
                return Err(Error::InvalidCoordinate {
                    lat: coordinate.lat,
                    lon: coordinate.lon,
                });
            }
        }
        if !(self.speed_knots.is_finite() && self.speed_knots > 0.0) {
            return Err(Error::InvalidSpeed {
                speed: self.speed_knots,
            });
        }
        Ok(())
    }
}

/// Aggregate leg of a route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// Computed route returned by the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub coordinates: Vec<Coordinate>,
    pub steps: Vec<RouteStep>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub start: SnappedEndpoint,
    pub end: SnappedEndpoint,
    pub stats: BuildStats,
}

impl Route {
    /// Number of legs between consecutive coordinates.
    pub fn leg_count(&self) -> usize {
        self.coordinates.len().saturating_sub(1)
    }
}

/// Seconds needed to cover `distance_m` at `speed_knots`.
pub fn travel_time_secs(distance_m: f64, speed_knots: f64) -> f64 {
    distance_m / (speed_knots * KNOT_MS)
}

/// Compute a route between the request endpoints.
///
/// `geometry` is used as-is when it holds at least one feature. Otherwise
/// the corridor is fetched through `fetcher`; without a fetcher the call
/// fails with [`Error::NoUsableGeometry`] and no request is made.
pub async fn find_route(
    request: &RouteRequest,
    geometry: Option<&FeatureCollection>,
    fetcher: Option<&dyn CorridorFetcher>,
    config: &RouterConfig,
) -> Result<Route> {
    request.validate()?;

    let geometry: Cow<'_, FeatureCollection> = match (geometry, fetcher) {
        (Some(supplied), _) if !supplied.is_empty() => Cow::Borrowed(supplied),
        (_, Some(fetcher)) => {
            Cow::Owned(fetch_corridor(fetcher, request.start, request.end, config).await?)
        }
        _ => return Err(Error::NoUsableGeometry),
    };

    let built = GraphBuilder::new(config.batch_size)
        .build(&geometry.features)
        .await;
    let stats = built.stats;
    let mut graph = built.graph;

    if graph.segment_count() == 0 {
        return Err(Error::NoUsableGeometry);
    }

    let start = snap_endpoint(&mut graph, request.start, request.snap_endpoints).ok_or(
        Error::SnapFailed {
            coordinate: request.start,
        },
    )?;
    let end = snap_endpoint(&mut graph, request.end, request.snap_endpoints).ok_or(
        Error::SnapFailed {
            coordinate: request.end,
        },
    )?;
    debug!(?start, ?end, "resolved route endpoints");

    let path = find_route_dijkstra(&graph, start.node, end.node).ok_or(Error::Unreachable {
        start: start.node,
        goal: end.node,
    })?;

    let coordinates = path
        .nodes
        .iter()
        .map(|&node| graph.coordinate(node))
        .collect::<Option<Vec<_>>>()
        .ok_or(Error::Unreachable {
            start: start.node,
            goal: end.node,
        })?;

    let distance_m = path.distance;
    let duration_s = travel_time_secs(distance_m, request.speed_knots);

    info!(
        nodes = path.nodes.len(),
        distance_m, duration_s, "route computed"
    );

    Ok(Route {
        coordinates,
        steps: vec![RouteStep {
            instruction: "Follow the waterway to the destination".to_string(),
            distance_m,
            duration_s,
        }],
        distance_m,
        duration_s,
        start,
        end,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_knot_covers_1852_metres_per_hour() {
        assert!((travel_time_secs(1852.0, 1.0) - 3600.0).abs() < 1e-9);
        assert!((travel_time_secs(1852.0, 6.0) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn validation_rejects_bad_speed_and_coordinates() {
        let ok = RouteRequest::new(Coordinate::new(0.0, 0.0), Coordinate::new(1.0, 1.0), 5.0);
        assert!(ok.validate().is_ok());

        let stopped = RouteRequest {
            speed_knots: 0.0,
            ..ok.clone()
        };
        assert!(matches!(
            stopped.validate(),
            Err(Error::InvalidSpeed { .. })
        ));

        let off_globe = RouteRequest {
            end: Coordinate::new(95.0, 0.0),
            ..ok
        };
        assert!(matches!(
            off_globe.validate(),
            Err(Error::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn leg_count_counts_segments() {
        let endpoint = SnappedEndpoint {
            node: 1,
            coordinate: Coordinate::new(0.0, 0.0),
            snapped: false,
        };
        let route = Route {
            coordinates: vec![Coordinate::new(0.0, 0.0); 3],
            steps: Vec::new(),
            distance_m: 0.0,
            duration_s: 0.0,
            start: endpoint,
            end: endpoint,
            stats: BuildStats::default(),
        };
        assert_eq!(route.leg_count(), 2);
    }
}
