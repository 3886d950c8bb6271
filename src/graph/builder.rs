//! Incremental construction of a `ParsedQuery`.
//!
//! Ids are minted from a per-parse sequence counter: named nodes get
//! `kind:name` (suffixed with `:<seq>` on collision), unnamed nodes get
//! `kind:<seq>`, edges get `edge:<seq>`. Identical input therefore yields
//! identical ids, with no process-wide state.

use super::{GraphEdge, GraphNode, NodeKind, ParsedQuery, QueryAnalysis};
use crate::cost::CostProfile;

/// Root node id shared by every successful parse.
pub const ROOT_ID: &str = "root:query";

/// Accumulates the nodes, edges and advisories of one parse.
pub struct GraphBuilder {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    errors: Vec<String>,
    seq: u32,
}

impl GraphBuilder {
    /// Start a build with the standard root node already in place.
    pub fn new() -> Self {
        let root = GraphNode {
            id: ROOT_ID.to_string(),
            label: "Query".to_string(),
            kind: NodeKind::Select,
            detail: None,
            complexity: None,
            cost: None,
            warnings: Vec::new(),
        };
        GraphBuilder {
            nodes: vec![root],
            edges: Vec::new(),
            errors: Vec::new(),
            seq: 0,
        }
    }

    pub fn root_id(&self) -> &'static str {
        ROOT_ID
    }

    fn next_seq(&mut self) -> u32 {
        self.seq += 1;
        self.seq
    }

    fn mint_node_id(&mut self, kind: NodeKind, name: Option<&str>) -> String {
        let seq = self.next_seq();
        match name {
            Some(name) => {
                let id = format!("{}:{}", kind.as_str(), name);
                if self.nodes.iter().any(|n| n.id == id) {
                    format!("{}:{}", id, seq)
                } else {
                    id
                }
            }
            None => format!("{}:{}", kind.as_str(), seq),
        }
    }

    /// Add a node. `name` feeds the id; `label` is the display text.
    /// The profile's complexity, cost and warnings all land on the node.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        name: Option<&str>,
        label: impl Into<String>,
        profile: Option<&CostProfile>,
    ) -> String {
        let id = self.mint_node_id(kind, name);
        let mut node = GraphNode {
            id: id.clone(),
            label: label.into(),
            kind,
            detail: None,
            complexity: None,
            cost: None,
            warnings: Vec::new(),
        };
        if let Some(profile) = profile {
            node.complexity = Some(profile.complexity);
            node.cost = Some(profile.cost);
            node.warnings = profile.warnings.iter().map(|w| w.to_string()).collect();
        }
        self.nodes.push(node);
        id
    }

    /// Attach free-form detail text to an existing node.
    pub fn set_detail(&mut self, id: &str, detail: impl Into<String>) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.detail = Some(detail.into());
        }
    }

    /// Add an edge. Edges carry a profile's complexity and cost tier only;
    /// warnings stay on the node, so each advisory is listed once.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        label: impl Into<String>,
        profile: Option<&CostProfile>,
    ) {
        let seq = self.next_seq();
        let mut edge = GraphEdge {
            id: format!("edge:{}", seq),
            source: source.to_string(),
            target: target.to_string(),
            label: Some(label.into()),
            complexity: None,
            cost: None,
            warnings: Vec::new(),
        };
        if let Some(profile) = profile {
            edge.complexity = Some(profile.complexity);
            edge.cost = Some(profile.cost);
        }
        self.edges.push(edge);
    }

    /// Node plus its structural edge to `parent`, in one step.
    pub fn attach(
        &mut self,
        kind: NodeKind,
        name: Option<&str>,
        label: &str,
        parent: &str,
        edge_label: &str,
        profile: &CostProfile,
    ) -> String {
        let id = self.add_node(kind, name, label, Some(profile));
        self.add_edge(&id, parent, edge_label, Some(profile));
        id
    }

    /// Record a soft advisory (the graph is still returned).
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// True once any relation-class node exists. Drives the no-structure
    /// advisory each backend appends when a parse found nothing to graph.
    pub fn has_relations(&self) -> bool {
        self.nodes.iter().any(|n| {
            matches!(
                n.kind,
                NodeKind::Table
                    | NodeKind::View
                    | NodeKind::Join
                    | NodeKind::Cte
                    | NodeKind::Subquery
            )
        })
    }

    pub fn finish(self, analysis: Option<QueryAnalysis>) -> ParsedQuery {
        ParsedQuery {
            root_id: ROOT_ID.to_string(),
            nodes: self.nodes,
            edges: self.edges,
            errors: self.errors,
            analysis,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
