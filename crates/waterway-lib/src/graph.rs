use std::collections::HashMap;

use crate::geo::{distance, Coordinate};

/// 1-based node identifier, assigned in order of first encounter.
pub type NodeId = u32;

/// Decimal digits kept when deduplicating vertices into nodes.
pub const KEY_PRECISION: i32 = 6;

/// Quantised coordinate used to merge vertices that round to the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    lat: i64,
    lon: i64,
}

impl NodeKey {
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        let scale = 10f64.powi(KEY_PRECISION);
        Self {
            lat: (coordinate.lat * scale).round() as i64,
            lon: (coordinate.lon * scale).round() as i64,
        }
    }
}

/// Directed arc within the routing graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub distance: f64,
}

/// An undirected edge's endpoints, kept for nearest-segment search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: NodeId,
    pub b: NodeId,
    pub a_coord: Coordinate,
    pub b_coord: Coordinate,
}

/// Waterway graph built for a single route computation.
///
/// Nodes live in an arena indexed by `id - 1`. Every undirected edge is
/// stored as two arcs, one in each endpoint's adjacency list, and once in
/// the segment list.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    coordinates: Vec<Coordinate>,
    adjacency: Vec<Vec<Edge>>,
    index: HashMap<NodeKey, NodeId>,
    segments: Vec<Segment>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `coordinate`, creating it if no existing node
    /// shares its rounded key.
    pub fn add_node(&mut self, coordinate: Coordinate) -> NodeId {
        let key = NodeKey::from_coordinate(coordinate);
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.push_node(coordinate);
        self.index.insert(key, id);
        id
    }

    /// Allocate a node that is never merged with other vertices. Used for
    /// snapped endpoints.
    pub(crate) fn add_detached_node(&mut self, coordinate: Coordinate) -> NodeId {
        self.push_node(coordinate)
    }

    fn push_node(&mut self, coordinate: Coordinate) -> NodeId {
        self.coordinates.push(coordinate);
        self.adjacency.push(Vec::new());
        self.coordinates.len() as NodeId
    }

    /// Connect `a` and `b` with an undirected edge weighted by their
    /// great-circle distance and record it as a segment.
    ///
    /// Returns the edge weight, or `None` when either node is unknown.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<f64> {
        let a_coord = self.coordinate(a)?;
        let b_coord = self.coordinate(b)?;
        let weight = self.connect(a, b)?;
        self.segments.push(Segment {
            a,
            b,
            a_coord,
            b_coord,
        });
        Some(weight)
    }

    /// Add the two arcs between `a` and `b` without recording a segment.
    pub(crate) fn connect(&mut self, a: NodeId, b: NodeId) -> Option<f64> {
        let weight = distance(self.coordinate(a)?, self.coordinate(b)?);
        self.adjacency[slot(a)].push(Edge {
            target: b,
            distance: weight,
        });
        self.adjacency[slot(b)].push(Edge {
            target: a,
            distance: weight,
        });
        Some(weight)
    }

    pub fn coordinate(&self, id: NodeId) -> Option<Coordinate> {
        if id == 0 {
            return None;
        }
        self.coordinates.get(slot(id)).copied()
    }

    /// Arcs leaving `id`; empty for unknown ids.
    pub fn neighbours(&self, id: NodeId) -> &[Edge] {
        if id == 0 {
            return &[];
        }
        self.adjacency
            .get(slot(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id != 0 && slot(id) < self.coordinates.len()
    }

    /// All node ids in ascending order with their coordinates.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Coordinate)> + '_ {
        self.coordinates
            .iter()
            .enumerate()
            .map(|(i, coord)| ((i + 1) as NodeId, *coord))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn node_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}

#[inline]
fn slot(id: NodeId) -> usize {
    id as usize - 1
}
