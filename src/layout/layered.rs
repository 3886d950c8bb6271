//! Rank assignment and centered placement for the layered layout.
//!
//! Edges point toward the root, so ranks grow source → target: leaves sit
//! on rank 0, the root on the highest rank. Within a rank, nodes keep
//! their emission order; every rank is centered on the cross axis against
//! the widest rank.

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::{LayoutDirection, NODE_HEIGHT, NODE_WIDTH};
use crate::graph::{GraphEdge, GraphNode};

/// Gap between neighbors in the same rank.
const NODE_SEP: f64 = 40.0;
/// Gap between consecutive ranks.
const RANK_SEP: f64 = 80.0;

/// Center coordinates for every node, or `None` when the edges contain a
/// cycle (no rank order exists).
pub(super) fn solve(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    direction: LayoutDirection,
) -> Option<HashMap<String, (f64, f64)>> {
    if nodes.is_empty() {
        return Some(HashMap::new());
    }

    // Graph-node weights index back into the `nodes` slice, so placement
    // can stay in emission order regardless of petgraph internals.
    let mut graph = DiGraph::<usize, ()>::new();
    let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
    for (position, node) in nodes.iter().enumerate() {
        let index = graph.add_node(position);
        index_of.entry(node.id.as_str()).or_insert(index);
    }
    for edge in edges {
        // Edges referencing unknown ids do not constrain the layout.
        if let (Some(&source), Some(&target)) = (
            index_of.get(edge.source.as_str()),
            index_of.get(edge.target.as_str()),
        ) {
            graph.add_edge(source, target, ());
        }
    }

    let order = toposort(&graph, None).ok()?;
    let mut rank = vec![0usize; nodes.len()];
    for index in order {
        let position = graph[index];
        for predecessor in graph.neighbors_directed(index, Direction::Incoming) {
            rank[position] = rank[position].max(rank[graph[predecessor]] + 1);
        }
    }

    let rank_count = rank.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); rank_count];
    for (position, node_rank) in rank.iter().enumerate() {
        layers[*node_rank].push(position);
    }

    let (main_size, cross_size) = match direction {
        LayoutDirection::LeftToRight => (NODE_WIDTH, NODE_HEIGHT),
        LayoutDirection::TopToBottom => (NODE_HEIGHT, NODE_WIDTH),
    };
    let extent =
        |count: usize| count as f64 * cross_size + count.saturating_sub(1) as f64 * NODE_SEP;
    let max_extent = layers
        .iter()
        .map(|layer| extent(layer.len()))
        .fold(0.0f64, f64::max);

    let mut centers = HashMap::new();
    for (level, layer) in layers.iter().enumerate() {
        let main_center = level as f64 * (main_size + RANK_SEP) + main_size / 2.0;
        let offset = (max_extent - extent(layer.len())) / 2.0;
        for (slot, position) in layer.iter().enumerate() {
            let cross_center = offset + slot as f64 * (cross_size + NODE_SEP) + cross_size / 2.0;
            let point = match direction {
                LayoutDirection::LeftToRight => (main_center, cross_center),
                LayoutDirection::TopToBottom => (cross_center, main_center),
            };
            centers.insert(nodes[*position].id.clone(), point);
        }
    }
    Some(centers)
}
