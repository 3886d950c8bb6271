//! Heuristic operation-cost policy.
//!
//! Every node and edge a backend emits is priced here: a coarse complexity
//! class, a severity tier from 0 (free) to 3 (expensive), and optional
//! advisory text. The tiers drive consumer styling and sorting; they are
//! deliberately not execution estimates, since no schema or statistics are
//! available.

use serde::{Deserialize, Serialize};

// ============================================================================
// Vocabulary
// ============================================================================

/// Coarse complexity class attached to nodes and edges.
///
/// Serialized as the exact display strings the renderers show
/// (`"O(N log N)"` etc.), so the wire shape stays a plain string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Complexity {
    /// Constant work regardless of input size (LIMIT).
    #[serde(rename = "O(1)")]
    Constant,
    /// One pass over a single relation.
    #[serde(rename = "O(N)")]
    Linear,
    /// Work proportional to both sides of a two-relation operation.
    #[serde(rename = "O(N+M)")]
    Bilinear,
    /// Sort-class work (grouping, ordering, window frames).
    #[serde(rename = "O(N log N)")]
    Linearithmic,
}

impl Complexity {
    /// The display string, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Constant => "O(1)",
            Complexity::Linear => "O(N)",
            Complexity::Bilinear => "O(N+M)",
            Complexity::Linearithmic => "O(N log N)",
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation vocabulary the estimator prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Plain FROM-clause table reference.
    TableScan,
    /// Join, carrying its type token (`"INNER"`, `"FULL OUTER"`,
    /// `"leftJoin"`, `"Product (outer)"`, ...). Classification is textual
    /// so all three backends can feed it whatever names their joins.
    Join(&'a str),
    /// WHERE-style row filter.
    Filter,
    /// GROUP BY clause.
    GroupBy,
    /// ORDER BY clause.
    OrderBy,
    /// LIMIT clause.
    Limit,
    /// Set operation between two result sets (UNION and friends).
    Union,
    /// Window-function usage detected in the text.
    Window,
    /// Plain aggregate-function usage detected in the text.
    Aggregate,
    /// CTE or derived-subquery wrapper.
    Nested,
}

/// What the estimator says about one operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostProfile {
    pub complexity: Complexity,
    /// Severity tier, 0 (free) to 3 (expensive).
    pub cost: u8,
    /// Advisory strings; the emitting backend attaches them to the node.
    pub warnings: Vec<&'static str>,
}

// ============================================================================
// Policy
// ============================================================================

/// Price one operation.
///
/// Join classification is a case-insensitive substring check on the type
/// token, tried in order: `outer`, then `left`/`right`, then plain. The
/// first match wins, so `FULL OUTER` and `LEFT OUTER` land on the outer
/// tier before the left/right tier is consulted.
pub fn estimate(op: Operation<'_>) -> CostProfile {
    match op {
        Operation::TableScan => profile(Complexity::Linear, 1, &[]),
        Operation::Join(join_type) => {
            let token = join_type.to_ascii_lowercase();
            if token.contains("outer") {
                profile(Complexity::Bilinear, 3, &["Outer join may be expensive"])
            } else if token.contains("left") || token.contains("right") {
                profile(Complexity::Bilinear, 2, &[])
            } else {
                profile(Complexity::Bilinear, 1, &[])
            }
        }
        Operation::Filter => profile(Complexity::Linear, 1, &[]),
        Operation::GroupBy => profile(
            Complexity::Linearithmic,
            2,
            &["Grouping can be costly without indexes"],
        ),
        Operation::OrderBy => profile(Complexity::Linearithmic, 2, &["Sorting can be expensive"]),
        Operation::Limit => profile(Complexity::Constant, 0, &[]),
        Operation::Union => profile(Complexity::Bilinear, 2, &["UNION ALL is cheaper than UNION"]),
        Operation::Window => profile(
            Complexity::Linearithmic,
            3,
            &["Window functions benefit from partition/order indexes"],
        ),
        Operation::Aggregate => profile(Complexity::Linear, 1, &[]),
        Operation::Nested => profile(Complexity::Linear, 1, &[]),
    }
}

fn profile(complexity: Complexity, cost: u8, warnings: &[&'static str]) -> CostProfile {
    CostProfile {
        complexity,
        cost,
        warnings: warnings.to_vec(),
    }
}
