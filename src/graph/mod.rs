//! The normalized query graph every backend projects onto.
//!
//! All three extraction backends (SQL, ORM-JS, ORM-PY) emit the same node
//! and edge records, and every consumer (layout, tree view, insights panel)
//! reads them back. Nothing in this module is backend-specific, and nothing
//! here fails: a `ParsedQuery` is a plain value, replaced wholesale on the
//! next parse.

pub mod builder;

pub use builder::GraphBuilder;

use serde::{Deserialize, Serialize};

use crate::cost::Complexity;

// ============================================================================
// Node vocabulary
// ============================================================================

/// Kind of operation or relation a graph node represents.
///
/// Closed vocabulary shared by all backends, serialized kebab-case. The
/// kind string doubles as the id prefix (`table:users`, `where:7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// Physical table reference.
    Table,
    /// View reference.
    View,
    /// Common table expression defined in a WITH clause.
    Cte,
    /// Derived table (inline sub-select).
    Subquery,
    /// Query root; also the kind of the parse-error sentinel.
    Select,
    /// Joined relation.
    Join,
    /// Set operation between two result sets.
    Union,
    /// WHERE filter clause.
    Where,
    /// GROUP BY clause.
    GroupBy,
    /// ORDER BY clause.
    OrderBy,
    /// LIMIT clause.
    Limit,
    /// Window-function usage (text-level signal).
    Window,
    /// Aggregate-function usage (text-level signal).
    Aggregate,
}

impl NodeKind {
    /// Kebab-case name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Table => "table",
            NodeKind::View => "view",
            NodeKind::Cte => "cte",
            NodeKind::Subquery => "subquery",
            NodeKind::Select => "select",
            NodeKind::Join => "join",
            NodeKind::Union => "union",
            NodeKind::Where => "where",
            NodeKind::GroupBy => "group-by",
            NodeKind::OrderBy => "order-by",
            NodeKind::Limit => "limit",
            NodeKind::Window => "window",
            NodeKind::Aggregate => "aggregate",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Graph records
// ============================================================================

/// A single operation or relation in the query graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Unique within one `ParsedQuery`; edges reference it.
    pub id: String,
    /// Short display text (a relation name, or `"WHERE"`, `"GROUP BY"`, ...).
    pub label: String,
    pub kind: NodeKind,
    /// Free-form elaboration: join conditions, parse-error messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    /// Severity tier 0..=3 from the cost policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A directed edge: `source` feeds into `target`, pointing toward the query
/// root or the nearest enclosing structural node (a CTE, subquery, union or
/// derived-table join acts as local root for its own sub-tree).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Relationship text (`"FROM"`, `"INNER JOIN"`, `"Filter"`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Complexity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Query-level analysis produced by the SQL backend (the slot the insights
/// panel reads; per-operation advisories live on the nodes).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryAnalysis {
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// The complete result of one backend call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedQuery {
    /// Id of the query root (or of the parse-error sentinel).
    pub root_id: String,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Hard parse failures and soft advisories, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<QueryAnalysis>,
}

impl ParsedQuery {
    /// The single-sentinel graph for a hard parse failure: one `select`
    /// node carrying the message, `root_id` pointing at it, `errors`
    /// non-empty. The graph stays renderable; nothing is thrown away.
    pub fn parse_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        let sentinel = GraphNode {
            id: "root:error".to_string(),
            label: "Parse error".to_string(),
            kind: NodeKind::Select,
            detail: Some(message.clone()),
            complexity: None,
            cost: None,
            warnings: Vec::new(),
        };
        ParsedQuery {
            root_id: sentinel.id.clone(),
            nodes: vec![sentinel],
            edges: Vec::new(),
            errors: vec![message],
            analysis: None,
        }
    }

    /// The node `root_id` points at. Present for every backend result.
    pub fn root(&self) -> Option<&GraphNode> {
        self.node(&self.root_id)
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All nodes of one kind, in emission order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.kind == kind)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Every advisory in the result: analysis-level warnings first, then
    /// node and edge warnings in graph order. The insights panel renders
    /// exactly this list.
    pub fn all_warnings(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        if let Some(analysis) = &self.analysis {
            out.extend(analysis.warnings.iter().map(String::as_str));
        }
        for node in &self.nodes {
            out.extend(node.warnings.iter().map(String::as_str));
        }
        for edge in &self.edges {
            out.extend(edge.warnings.iter().map(String::as_str));
        }
        out
    }
}
