//! Incremental graph construction from tagged line features.
//!
//! Features are processed in fixed-size batches and the builder yields to
//! the async scheduler between batches, so a large geometry set never holds
//! the executor for the whole build. Batch size only affects how often the
//! builder yields; node ids and edges are identical for any batch size.

use serde::Serialize;
use tracing::{debug, info};

use crate::feature::Feature;
use crate::graph::Graph;

/// Features handled between two yield points.
pub const DEFAULT_BATCH_SIZE: usize = 200;

/// Counters collected while building a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub accepted: usize,
    pub rejected: usize,
    pub nodes: usize,
    pub segments: usize,
}

/// Graph together with the statistics of the build that produced it.
#[derive(Debug, Clone, Default)]
pub struct BuiltGraph {
    pub graph: Graph,
    pub stats: BuildStats,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphBuilder {
    batch_size: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}

impl GraphBuilder {
    /// A batch size of zero is treated as one.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Build a graph from `features`, yielding after every batch.
    pub async fn build(&self, features: &[Feature]) -> BuiltGraph {
        let mut built = BuiltGraph::default();

        for (batch, chunk) in features.chunks(self.batch_size).enumerate() {
            for feature in chunk {
                insert_feature(&mut built, feature);
            }
            debug!(
                batch,
                features = chunk.len(),
                nodes = built.graph.node_count(),
                "processed feature batch"
            );
            tokio::task::yield_now().await;
        }

        built.stats.nodes = built.graph.node_count();
        built.stats.segments = built.graph.segment_count();
        info!(
            accepted = built.stats.accepted,
            rejected = built.stats.rejected,
            nodes = built.stats.nodes,
            segments = built.stats.segments,
            "waterway graph built"
        );
        built
    }
}

fn insert_feature(built: &mut BuiltGraph, feature: &Feature) {
    if let Err(reason) = feature.navigability() {
        debug!(id = ?feature.id, ?reason, "skipping feature");
        built.stats.rejected += 1;
        return;
    }
    built.stats.accepted += 1;

    let graph = &mut built.graph;
    let mut previous = None;
    for &vertex in &feature.coordinates {
        let node = graph.add_node(vertex);
        if let Some(prev) = previous {
            // Consecutive vertices that round to the same node add nothing.
            if prev != node {
                graph.add_edge(prev, node);
            }
        }
        previous = Some(node);
    }
}
