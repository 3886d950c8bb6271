//! 2-D placement for query graphs.
//!
//! Layered flow layout over the same node/edge records the backends emit:
//! ranks advance along the main axis (left to right, or top to bottom),
//! siblings are spaced along the cross axis, and every rank is centered.
//! Nodes have a fixed footprint; the returned positions are top-left
//! corners, ready for a renderer that draws boxes.

mod layered;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::graph::{GraphEdge, GraphNode};

/// Fixed node footprint the renderers draw with.
pub const NODE_WIDTH: f64 = 200.0;
pub const NODE_HEIGHT: f64 = 60.0;

/// Flow direction for ranks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutDirection {
    /// Ranks advance along x; the query root ends up rightmost.
    #[default]
    #[serde(rename = "LR")]
    LeftToRight,
    /// Ranks advance along y; the query root ends up at the bottom.
    #[serde(rename = "TB")]
    TopToBottom,
}

/// Options for [`compute_layout`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub direction: LayoutDirection,
}

/// Top-left corner of a node's footprint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Position every node reachable through a valid ranking.
///
/// Total over all inputs: a cyclic edge set has no ranking and yields an
/// empty map, edges with unknown endpoints are ignored, and nodes missing
/// from the result default to the origin on the consumer side.
pub fn compute_layout(
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    options: &LayoutOptions,
) -> HashMap<String, Point> {
    let centers = match layered::solve(nodes, edges, options.direction) {
        Some(centers) => centers,
        None => return HashMap::new(),
    };
    centers
        .into_iter()
        .map(|(id, (cx, cy))| {
            (
                id,
                Point {
                    x: cx - NODE_WIDTH / 2.0,
                    y: cy - NODE_HEIGHT / 2.0,
                },
            )
        })
        .collect()
}
