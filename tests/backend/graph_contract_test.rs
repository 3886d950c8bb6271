//! Contract tests shared by all three backends.
//!
//! These tests verify the invariants every `ParsedQuery` must satisfy
//! regardless of input: totality, referential integrity, unique ids,
//! bounded cost tiers, tree shape for well-formed SQL, determinism, and
//! a stable serialized form.

use queryscope::{parse_to_graph, ParsedQuery, QueryMode};

const MODES: [QueryMode; 3] = [QueryMode::Sql, QueryMode::OrmJs, QueryMode::OrmPy];

/// Inputs that exercise the unhappy paths of each backend.
const HOSTILE_INPUTS: &[&str] = &[
    "",
    "   \t\n  ",
    "SELEKT * FROM",
    "SELECT * FROM WHERE AND",
    "((((((((((((((((",
    ")))))",
    "const = = nope(",
    "def )broken(:",
    "\u{0}\u{1}\u{2} binary \u{7f}",
    "🦀 garbage 🦀",
];

/// Well-formed inputs, one per mode.
fn well_formed(mode: QueryMode) -> &'static str {
    match mode {
        QueryMode::Sql => {
            "WITH sales_per_user AS \
             (SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id) \
             SELECT u.id FROM users u JOIN sales_per_user s ON s.user_id = u.id \
             WHERE s.total > 100 ORDER BY s.total DESC LIMIT 50"
        }
        QueryMode::OrmJs => "db('orders').leftJoin('users', 'orders.user_id', 'users.id');",
        QueryMode::OrmPy => "session.query(Order).join(User).outerjoin(Product)",
    }
}

fn assert_contract(query: &ParsedQuery, context: &str) {
    // The root id must name a node.
    assert!(
        query.root().is_some(),
        "rootId {} missing from nodes for {}",
        query.root_id,
        context
    );

    // Node ids are unique.
    for (position, node) in query.nodes.iter().enumerate() {
        assert!(
            query.nodes[position + 1..].iter().all(|n| n.id != node.id),
            "duplicate node id {} for {}",
            node.id,
            context
        );
    }

    // Every edge endpoint resolves to a node.
    for edge in &query.edges {
        assert!(
            query.node(&edge.source).is_some(),
            "dangling edge source {} for {}",
            edge.source,
            context
        );
        assert!(
            query.node(&edge.target).is_some(),
            "dangling edge target {} for {}",
            edge.target,
            context
        );
    }

    // Cost tiers stay in the 0..=3 policy range.
    for node in &query.nodes {
        if let Some(cost) = node.cost {
            assert!(cost <= 3, "node cost {} out of range for {}", cost, context);
        }
    }
    for edge in &query.edges {
        if let Some(cost) = edge.cost {
            assert!(cost <= 3, "edge cost {} out of range for {}", cost, context);
        }
    }
}

// ============================================================================
// Totality and integrity
// ============================================================================

#[test]
fn test_every_backend_is_total_over_hostile_input() {
    for mode in MODES {
        for input in HOSTILE_INPUTS {
            let query = parse_to_graph(mode, input);
            assert_contract(&query, &format!("{} on {:?}", mode, input));
        }
    }
}

#[test]
fn test_well_formed_input_satisfies_the_contract() {
    for mode in MODES {
        let query = parse_to_graph(mode, well_formed(mode));
        assert_contract(&query, &format!("{} well-formed", mode));
        assert!(!query.has_errors());
    }
}

#[test]
fn test_well_formed_sql_forms_a_tree() {
    let query = parse_to_graph(QueryMode::Sql, well_formed(QueryMode::Sql));
    for node in &query.nodes {
        let outgoing = query.edges.iter().filter(|e| e.source == node.id).count();
        if node.id == query.root_id {
            assert_eq!(outgoing, 0, "root must not point anywhere");
        } else {
            assert_eq!(outgoing, 1, "node {} must have exactly one parent", node.id);
        }
    }

    // Every node reaches the root by following its parent chain.
    for node in &query.nodes {
        let mut current = node.id.as_str();
        let mut hops = 0;
        while current != query.root_id {
            let edge = query
                .edges
                .iter()
                .find(|e| e.source == current)
                .unwrap_or_else(|| panic!("no path to root from {}", node.id));
            current = edge.target.as_str();
            hops += 1;
            assert!(hops <= query.nodes.len(), "cycle reached from {}", node.id);
        }
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_reparsing_identical_text_is_identical() {
    for mode in MODES {
        let first = parse_to_graph(mode, well_formed(mode));
        let second = parse_to_graph(mode, well_formed(mode));
        assert_eq!(first, second, "{} parse must be reproducible", mode);
    }
}

// ============================================================================
// Serialized form
// ============================================================================

#[test]
fn test_parsed_query_round_trips_through_json() {
    for mode in MODES {
        let query = parse_to_graph(mode, well_formed(mode));
        let value = serde_json::to_value(&query).unwrap();
        let back: ParsedQuery = serde_json::from_value(value).unwrap();
        assert_eq!(back, query, "{} round trip", mode);
    }
}

#[test]
fn test_error_graph_round_trips_through_json() {
    let query = parse_to_graph(QueryMode::Sql, "SELEKT * FROM");
    let value = serde_json::to_value(&query).unwrap();
    assert_eq!(value["rootId"], "root:error");
    assert!(value["errors"].is_array());
    let back: ParsedQuery = serde_json::from_value(value).unwrap();
    assert_eq!(back, query);
}
