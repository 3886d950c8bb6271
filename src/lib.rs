//! # Queryscope
//!
//! Query text in, annotated structure graph out.
//!
//! ## Architecture
//!
//! Three extraction backends project onto one graph model:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │   Input text (SQL | ORM-JS chains | ORM-PY chains)       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [backend, selected by QueryMode]
//! ┌─────────────────────────────────────────────────────────┐
//! │        ParsedQuery (nodes + edges + cost tiers)          │
//! │        priced by the shared cost policy                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [layout]
//! ┌─────────────────────────────────────────────────────────┐
//! │     Node positions (layered, LR or TB flow)              │
//! │     + consumers: canvas, tree view, insights panel       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every backend is total: malformed input produces an error graph, never
//! a panic. Parsing is pure and synchronous; independent inputs can be
//! processed in parallel freely.

pub mod backend;
pub mod cost;
pub mod graph;
pub mod layout;

// Export the public surface at crate level
pub use backend::{parse_to_graph, ParseError, QueryMode, UnknownModeError};
pub use cost::{estimate, Complexity, CostProfile, Operation};
pub use graph::{GraphBuilder, GraphEdge, GraphNode, NodeKind, ParsedQuery, QueryAnalysis};
pub use layout::{compute_layout, LayoutDirection, LayoutOptions, Point};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::backend::{parse_to_graph, QueryMode};
    pub use crate::graph::{GraphEdge, GraphNode, NodeKind, ParsedQuery};
    pub use crate::layout::{compute_layout, LayoutDirection, LayoutOptions, Point};
}
