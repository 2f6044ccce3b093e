//! Waterway routing library entry points.
//!
//! This crate turns tagged waterway line geometry into a routing graph,
//! snaps arbitrary coordinates onto it and computes shortest navigable
//! paths. Higher-level consumers (the CLI) should only depend on the
//! functions exported here instead of reimplementing behavior.
//!

pub mod builder;
pub mod config;
pub mod corridor;
pub mod error;
pub mod feature;
pub mod geo;
pub mod graph;
pub mod overpass;
pub mod path;
pub mod routing;
pub mod snap;

pub use builder::{BuildStats, BuiltGraph, GraphBuilder, DEFAULT_BATCH_SIZE};
pub use config::RouterConfig;
pub use corridor::{fetch_corridor, BoundingBox, CorridorFetcher};
pub use error::{Error, Result};
pub use feature::{Feature, FeatureCollection, FeatureKind, Rejection, WaterwayKind};
pub use geo::{distance, nearest_point_on_segment, Coordinate};
pub use graph::{Edge, Graph, NodeId, Segment};
pub use overpass::OverpassClient;
pub use path::{find_route_dijkstra, ShortestPath};
pub use routing::{find_route, travel_time_secs, Route, RouteRequest, RouteStep};
pub use snap::{nearest_node, snap_endpoint, SnappedEndpoint};

/// Parse a `LAT,LON` pair such as `52.37,4.89`.
pub fn parse_coordinate(value: &str) -> Result<Coordinate> {
    let invalid = || Error::InvalidCoordinateText {
        value: value.to_string(),
    };
    let (lat, lon) = value.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;
    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        return Err(Error::InvalidCoordinate { lat, lon });
    }
    Ok(coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_pairs() {
        let c = parse_coordinate(" 52.37, 4.89 ").expect("valid pair");
        assert_eq!(c, Coordinate::new(52.37, 4.89));
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(matches!(
            parse_coordinate("52.37"),
            Err(Error::InvalidCoordinateText { .. })
        ));
        assert!(matches!(
            parse_coordinate("north,east"),
            Err(Error::InvalidCoordinateText { .. })
        ));
        assert!(matches!(
            parse_coordinate("91,0"),
            Err(Error::InvalidCoordinate { .. })
        ));
    }
}
