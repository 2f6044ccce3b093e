use thiserror::Error;

use crate::geo::Coordinate;
use crate::graph::NodeId;

/// Convenient result alias for the waterway library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// The geometry set was empty, or nothing survived the navigability filter.
    #[error("no route: no navigable waterway geometry available")]
    NoUsableGeometry,

    /// A coordinate could not be matched to any node or segment.
    #[error("no route: could not snap {coordinate} onto the waterway graph")]
    SnapFailed { coordinate: Coordinate },

    /// Both endpoints snapped but no path connects them.
    #[error("no route: node {start} cannot reach node {goal}")]
    Unreachable { start: NodeId, goal: NodeId },

    /// Every corridor request failed.
    #[error("corridor fetch failed: {failed} of {attempted} request(s) failed")]
    CorridorFetch { failed: usize, attempted: usize },

    /// The corridor fallback grid would need more tile requests than allowed.
    #[error("corridor split needs {tiles} tiles, more than the limit of {max}; raise the tile size")]
    TooManyTiles { tiles: usize, max: usize },

    /// The geodata endpoint answered with a non-success status.
    #[error("geodata endpoint returned HTTP {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// Cruising speed must be a finite, positive number of knots.
    #[error("invalid cruising speed {speed} kn; expected a positive number")]
    InvalidSpeed { speed: f64 },

    /// Coordinate is outside the valid latitude/longitude range.
    #[error("invalid coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Raised when a `lat,lon` pair could not be parsed.
    #[error("could not parse coordinate '{value}'; expected LAT,LON")]
    InvalidCoordinateText { value: String },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// `true` for every outcome a caller should present as "no route".
    pub fn is_no_route(&self) -> bool {
        matches!(
            self,
            Error::NoUsableGeometry
                | Error::SnapFailed { .. }
                | Error::Unreachable { .. }
                | Error::CorridorFetch { .. }
        )
    }
}
