//! Resolving arbitrary coordinates into graph nodes.
//!
//! With snapping enabled the query is projected onto the closest segment and
//! a new node is spliced in at the projected point, linked to both segment
//! endpoints. Every call adds a node, so each logical endpoint must be
//! snapped exactly once per graph.

use serde::Serialize;
use tracing::debug;

use crate::geo::{distance, nearest_point_on_segment, Coordinate};
use crate::graph::{Graph, NodeId};

/// Graph node chosen for a route endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SnappedEndpoint {
    pub node: NodeId,
    pub coordinate: Coordinate,
    /// `true` when a new node was spliced onto a segment, `false` when an
    /// existing node was reused.
    pub snapped: bool,
}

/// Resolve `query` to a node of `graph`.
///
/// Returns `None` only when the graph has no nodes at all.
pub fn snap_endpoint(graph: &mut Graph, query: Coordinate, snap: bool) -> Option<SnappedEndpoint> {
    if snap && graph.segment_count() > 0 {
        if let Some(endpoint) = snap_to_segment(graph, query) {
            return Some(endpoint);
        }
    }
    nearest_node(graph, query)
}

fn snap_to_segment(graph: &mut Graph, query: Coordinate) -> Option<SnappedEndpoint> {
    let mut best: Option<(usize, Coordinate, f64)> = None;
    for (index, segment) in graph.segments().iter().enumerate() {
        let (point, _) = nearest_point_on_segment(query, segment.a_coord, segment.b_coord);
        let d = distance(query, point);
        // Strict comparison keeps the first segment on ties.
        if best.map_or(true, |(_, _, best_d)| d < best_d) {
            best = Some((index, point, d));
        }
    }

    let (index, point, offset) = best?;
    let segment = graph.segments()[index];
    let node = graph.add_detached_node(point);
    graph.connect(node, segment.a)?;
    graph.connect(node, segment.b)?;

    debug!(
        node,
        segment = index,
        offset_m = offset,
        "snapped endpoint onto segment"
    );

    Some(SnappedEndpoint {
        node,
        coordinate: point,
        snapped: true,
    })
}

/// Nearest existing node to `query` by great-circle distance. Ties go to the
/// lowest id.
pub fn nearest_node(graph: &Graph, query: Coordinate) -> Option<SnappedEndpoint> {
    let mut best: Option<(NodeId, Coordinate, f64)> = None;
    for (id, coordinate) in graph.nodes() {
        let d = distance(query, coordinate);
        if best.map_or(true, |(_, _, best_d)| d < best_d) {
            best = Some((id, coordinate, d));
        }
    }
    best.map(|(node, coordinate, _)| SnappedEndpoint {
        node,
        coordinate,
        snapped: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_graph() -> Graph {
        let mut graph = Graph::new();
        let a = graph.add_node(Coordinate::new(0.0, 0.0));
        let b = graph.add_node(Coordinate::new(0.0, 0.01));
        let c = graph.add_node(Coordinate::new(0.01, 0.01));
        graph.add_edge(a, b);
        graph.add_edge(b, c);
        graph
    }

    #[test]
    fn snapping_splices_a_node_between_segment_endpoints() {
        let mut graph = straight_graph();
        let endpoint =
            snap_endpoint(&mut graph, Coordinate::new(0.001, 0.005), true).expect("snaps");

        assert!(endpoint.snapped);
        assert_eq!(endpoint.node, 4);
        assert!((endpoint.coordinate.lon - 0.005).abs() < 1e-12);
        assert_eq!(endpoint.coordinate.lat, 0.0);

        let targets: Vec<NodeId> = graph.neighbours(4).iter().map(|e| e.target).collect();
        assert_eq!(targets, vec![1, 2]);
        assert!(graph.neighbours(1).iter().any(|e| e.target == 4));
        assert!(graph.neighbours(2).iter().any(|e| e.target == 4));
        // Splice arcs are not searchable segments.
        assert_eq!(graph.segment_count(), 2);
    }

    #[test]
    fn splice_weights_sum_to_segment_length() {
        let mut graph = straight_graph();
        let segment_length = graph.neighbours(1)[0].distance;
        let endpoint =
            snap_endpoint(&mut graph, Coordinate::new(-0.002, 0.003), true).expect("snaps");
        let total: f64 = graph
            .neighbours(endpoint.node)
            .iter()
            .map(|e| e.distance)
            .sum();
        assert!((total - segment_length).abs() < 0.01);
    }

    #[test]
    fn ties_prefer_the_first_segment() {
        let mut graph = Graph::new();
        let a = graph.add_node(Coordinate::new(0.0, -0.05));
        let b = graph.add_node(Coordinate::new(0.0, 0.05));
        let c = graph.add_node(Coordinate::new(0.02, -0.05));
        let d = graph.add_node(Coordinate::new(0.02, 0.05));
        graph.add_edge(c, d);
        graph.add_edge(a, b);
        graph.add_edge(b, d);
        graph.add_edge(a, c);

        // Equidistant from the segments c-d and a-b.
        let endpoint = snap_endpoint(&mut graph, Coordinate::new(0.01, 0.0), true).expect("snaps");
        let targets: Vec<NodeId> = graph
            .neighbours(endpoint.node)
            .iter()
            .map(|e| e.target)
            .collect();
        assert_eq!(targets, vec![c, d]);
    }

    #[test]
    fn non_snapping_mode_reuses_nearest_node() {
        let mut graph = straight_graph();
        let endpoint =
            snap_endpoint(&mut graph, Coordinate::new(0.0, 0.0098), false).expect("resolves");
        assert!(!endpoint.snapped);
        assert_eq!(endpoint.node, 2);
        assert_eq!(graph.node_count(), 3);
    }

    #[test]
    fn graph_without_segments_falls_back_to_nodes() {
        let mut graph = Graph::new();
        graph.add_node(Coordinate::new(1.0, 1.0));
        let endpoint = snap_endpoint(&mut graph, Coordinate::new(0.0, 0.0), true).expect("resolves");
        assert_eq!(endpoint.node, 1);
        assert!(!endpoint.snapped);
    }

    #[test]
    fn empty_graph_cannot_be_snapped() {
        let mut graph = Graph::new();
        assert!(snap_endpoint(&mut graph, Coordinate::new(0.0, 0.0), true).is_none());
        assert!(snap_endpoint(&mut graph, Coordinate::new(0.0, 0.0), false).is_none());
    }
}
