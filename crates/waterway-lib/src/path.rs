use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;

use crate::graph::{Graph, NodeId};

/// Node sequence and accumulated length of a shortest path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortestPath {
    pub nodes: Vec<NodeId>,
    /// Total length in metres.
    pub distance: f64,
}

/// Run Dijkstra's algorithm from `start` to `goal`.
///
/// Nodes are settled in order of tentative distance, ties going to the lower
/// id, so identical graphs always produce identical paths. Returns `None`
/// when either id is unknown or `goal` is unreachable.
pub fn find_route_dijkstra(graph: &Graph, start: NodeId, goal: NodeId) -> Option<ShortestPath> {
    if !graph.contains(start) || !graph.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(ShortestPath {
            nodes: vec![start],
            distance: 0.0,
        });
    }

    let count = graph.node_count();
    let mut distances = vec![f64::INFINITY; count + 1];
    let mut parents: Vec<Option<NodeId>> = vec![None; count + 1];
    let mut visited = vec![false; count + 1];
    let mut queue = BinaryHeap::new();

    distances[start as usize] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current = entry.node as usize;
        if visited[current] {
            continue;
        }
        visited[current] = true;

        if entry.node == goal {
            break;
        }

        let current_distance = distances[current];
        for edge in graph.neighbours(entry.node) {
            let next = edge.target as usize;
            if visited[next] {
                continue;
            }
            let next_cost = current_distance + edge.distance;
            if next_cost < distances[next] {
                distances[next] = next_cost;
                parents[next] = Some(entry.node);
                queue.push(QueueEntry::new(edge.target, next_cost));
            }
        }
    }

    let total = distances[goal as usize];
    if !total.is_finite() {
        return None;
    }

    let nodes = reconstruct_path(&parents, start, goal)?;
    Some(ShortestPath {
        nodes,
        distance: total,
    })
}

fn reconstruct_path(parents: &[Option<NodeId>], start: NodeId, goal: NodeId) -> Option<Vec<NodeId>> {
    let mut path = vec![goal];
    let mut current = goal;
    // A path can never be longer than the node count.
    while current != start {
        current = parents[current as usize]?;
        path.push(current);
        if path.len() > parents.len() {
            return None;
        }
    }
    path.reverse();
    Some(path)
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost, then id.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
