//! Integration tests for the SQL backend.
//!
//! These tests verify statement-tree projection end to end: relation and
//! clause nodes, join classification, set operations, nested scopes, and
//! both failure paths (hard parse errors and structure-free statements).

use queryscope::{parse_to_graph, Complexity, GraphEdge, NodeKind, ParsedQuery, QueryMode};

fn parse(sql: &str) -> ParsedQuery {
    parse_to_graph(QueryMode::Sql, sql)
}

/// The structural edge leaving `source`.
fn edge_from<'a>(query: &'a ParsedQuery, source: &str) -> &'a GraphEdge {
    query
        .edges
        .iter()
        .find(|edge| edge.source == source)
        .unwrap_or_else(|| panic!("no edge from {}", source))
}

fn kind_count(query: &ParsedQuery, kind: NodeKind) -> usize {
    query.nodes_of_kind(kind).count()
}

// ============================================================================
// CTE report (the representative analytical query)
// ============================================================================

const SALES_REPORT: &str = "WITH sales_per_user AS \
    (SELECT user_id, SUM(amount) AS total FROM orders GROUP BY user_id) \
    SELECT u.id, u.name, s.total FROM users u \
    JOIN sales_per_user s ON s.user_id = u.id \
    WHERE s.total > 100 ORDER BY s.total DESC LIMIT 50;";

#[test]
fn test_cte_report_produces_the_full_node_set() {
    let query = parse(SALES_REPORT);
    assert!(!query.has_errors(), "unexpected errors: {:?}", query.errors);
    assert_eq!(query.nodes.len(), 11);
    assert_eq!(query.edges.len(), 10);

    let cte = query.node("cte:sales_per_user").unwrap();
    assert_eq!(cte.kind, NodeKind::Cte);
    assert_eq!(
        edge_from(&query, &cte.id).label.as_deref(),
        Some("WITH")
    );

    // The CTE body hangs off the CTE node, not the outer root.
    assert_eq!(
        edge_from(&query, "table:orders").target,
        "cte:sales_per_user"
    );
    let group_by = query.nodes_of_kind(NodeKind::GroupBy).next().unwrap();
    assert_eq!(edge_from(&query, &group_by.id).target, "cte:sales_per_user");

    // Outer level: table scan, join against the CTE by name, clause chain.
    assert_eq!(edge_from(&query, "table:users").target, "root:query");
    let join = query.node("join:sales_per_user").unwrap();
    assert_eq!(join.kind, NodeKind::Join);
    assert_eq!(join.cost, Some(1));
    assert_eq!(join.detail.as_deref(), Some("ON s.user_id = u.id"));
    assert_eq!(
        edge_from(&query, &join.id).label.as_deref(),
        Some("INNER JOIN")
    );
    assert_eq!(kind_count(&query, NodeKind::Where), 1);
    assert_eq!(kind_count(&query, NodeKind::OrderBy), 1);
    assert_eq!(kind_count(&query, NodeKind::Limit), 1);
}

#[test]
fn test_aggregate_signal_fires_per_scope_and_over_the_whole_text() {
    // SUM appears once in the source but inside a CTE, so the scoped pass
    // and the whole-text pass each emit a node. Both are kept.
    let query = parse(SALES_REPORT);
    let aggregates: Vec<_> = query.nodes_of_kind(NodeKind::Aggregate).collect();
    assert_eq!(aggregates.len(), 2);
    assert_eq!(
        edge_from(&query, &aggregates[0].id).target,
        "cte:sales_per_user"
    );
    assert_eq!(edge_from(&query, &aggregates[1].id).target, "root:query");
}

#[test]
fn test_clause_nodes_carry_their_policy_costs() {
    let query = parse(SALES_REPORT);

    let where_node = query.nodes_of_kind(NodeKind::Where).next().unwrap();
    assert_eq!(where_node.cost, Some(1));
    assert_eq!(where_node.complexity, Some(Complexity::Linear));
    assert_eq!(edge_from(&query, &where_node.id).label.as_deref(), Some("Filter"));

    let group_by = query.nodes_of_kind(NodeKind::GroupBy).next().unwrap();
    assert_eq!(group_by.cost, Some(2));
    assert_eq!(group_by.complexity, Some(Complexity::Linearithmic));
    assert_eq!(
        group_by.warnings,
        vec!["Grouping can be costly without indexes"]
    );

    let order_by = query.nodes_of_kind(NodeKind::OrderBy).next().unwrap();
    assert_eq!(order_by.cost, Some(2));
    assert_eq!(order_by.warnings, vec!["Sorting can be expensive"]);
    assert_eq!(edge_from(&query, &order_by.id).label.as_deref(), Some("Sort"));

    let limit = query.nodes_of_kind(NodeKind::Limit).next().unwrap();
    assert_eq!(limit.cost, Some(0));
    assert_eq!(limit.complexity, Some(Complexity::Constant));
}

#[test]
fn test_warnings_stay_on_nodes_not_on_edges() {
    let query = parse(SALES_REPORT);
    let order_by = query.nodes_of_kind(NodeKind::OrderBy).next().unwrap();
    let edge = edge_from(&query, &order_by.id);
    assert_eq!(edge.cost, Some(2));
    assert_eq!(edge.complexity, Some(Complexity::Linearithmic));
    assert!(edge.warnings.is_empty());
}

// ============================================================================
// Join classification
// ============================================================================

#[test]
fn test_left_join_and_left_outer_join_classify_identically() {
    // The parser canonicalizes both spellings to the same operator.
    for sql in [
        "SELECT * FROM a LEFT JOIN b ON a.id = b.a_id",
        "SELECT * FROM a LEFT OUTER JOIN b ON a.id = b.a_id",
    ] {
        let query = parse(sql);
        let join = query.node("join:b").unwrap();
        assert_eq!(join.cost, Some(2), "for {}", sql);
        assert_eq!(join.complexity, Some(Complexity::Bilinear));
        assert!(join.warnings.is_empty());
        assert_eq!(
            edge_from(&query, "join:b").label.as_deref(),
            Some("LEFT JOIN")
        );
    }
}

#[test]
fn test_full_outer_join_is_the_expensive_tier() {
    let query = parse("SELECT * FROM a FULL OUTER JOIN b ON a.id = b.a_id");
    let join = query.node("join:b").unwrap();
    assert_eq!(join.cost, Some(3));
    assert_eq!(join.warnings, vec!["Outer join may be expensive"]);
    assert_eq!(
        edge_from(&query, "join:b").label.as_deref(),
        Some("FULL OUTER JOIN")
    );
}

#[test]
fn test_cross_join_is_plain_tier_with_no_condition_detail() {
    let query = parse("SELECT * FROM a CROSS JOIN b");
    let join = query.node("join:b").unwrap();
    assert_eq!(join.cost, Some(1));
    assert_eq!(join.detail, None);
    assert_eq!(
        edge_from(&query, "join:b").label.as_deref(),
        Some("CROSS JOIN")
    );
}

// ============================================================================
// Set operations
// ============================================================================

#[test]
fn test_union_branches_hang_off_the_union_node() {
    let query = parse("SELECT id FROM a UNION SELECT id FROM b");
    assert_eq!(query.nodes.len(), 4);
    assert_eq!(query.edges.len(), 3);

    let union = query.nodes_of_kind(NodeKind::Union).next().unwrap();
    assert_eq!(union.label, "UNION");
    assert_eq!(union.cost, Some(2));
    assert_eq!(union.warnings, vec!["UNION ALL is cheaper than UNION"]);

    // Left branch keeps the original parent; the right branch nests.
    assert_eq!(edge_from(&query, "table:a").target, "root:query");
    assert_eq!(edge_from(&query, &union.id).target, "root:query");
    assert_eq!(edge_from(&query, "table:b").target, union.id);
}

#[test]
fn test_union_all_label_carries_the_quantifier() {
    let query = parse("SELECT id FROM a UNION ALL SELECT id FROM b");
    let union = query.nodes_of_kind(NodeKind::Union).next().unwrap();
    assert_eq!(union.label, "UNION ALL");
    assert_eq!(edge_from(&query, &union.id).label.as_deref(), Some("UNION ALL"));
}

#[test]
fn test_chained_unions_each_attach_to_the_root() {
    let query = parse("SELECT id FROM a UNION SELECT id FROM b UNION SELECT id FROM c");
    let unions: Vec<_> = query.nodes_of_kind(NodeKind::Union).collect();
    assert_eq!(unions.len(), 2);
    for union in unions {
        assert_eq!(edge_from(&query, &union.id).target, "root:query");
    }
}

// ============================================================================
// Nested scopes
// ============================================================================

#[test]
fn test_derived_table_forms_a_nested_scope() {
    let query = parse("SELECT * FROM (SELECT id FROM raw_events) AS e");
    let sub = query.node("subquery:e").unwrap();
    assert_eq!(sub.kind, NodeKind::Subquery);
    assert_eq!(edge_from(&query, &sub.id).label.as_deref(), Some("FROM (sub)"));
    assert_eq!(edge_from(&query, "table:raw_events").target, "subquery:e");
}

#[test]
fn test_unaliased_derived_table_gets_the_generic_label() {
    let query = parse("SELECT * FROM (SELECT id FROM raw_events)");
    let sub = query.nodes_of_kind(NodeKind::Subquery).next().unwrap();
    assert_eq!(sub.label, "subquery");
}

#[test]
fn test_join_against_derived_table_nests_under_the_join_node() {
    let query =
        parse("SELECT * FROM a JOIN (SELECT id FROM b WHERE ok) AS recent ON recent.id = a.id");
    let join = query.node("join:recent").unwrap();
    assert_eq!(join.kind, NodeKind::Join);
    assert_eq!(join.detail.as_deref(), Some("ON recent.id = a.id"));
    assert_eq!(edge_from(&query, "table:b").target, "join:recent");
    let where_node = query.nodes_of_kind(NodeKind::Where).next().unwrap();
    assert_eq!(edge_from(&query, &where_node.id).target, "join:recent");
}

// ============================================================================
// Text-level signals
// ============================================================================

#[test]
fn test_window_function_signal() {
    let query = parse("SELECT id, ROW_NUMBER() OVER (ORDER BY ts) AS rn FROM events");
    let window = query.nodes_of_kind(NodeKind::Window).next().unwrap();
    assert_eq!(window.label, "WINDOW");
    assert_eq!(window.cost, Some(3));
    assert_eq!(
        window.warnings,
        vec!["Window functions benefit from partition/order indexes"]
    );
    assert_eq!(edge_from(&query, &window.id).label.as_deref(), Some("OVER(...)"));
    // The OVER clause's ORDER BY is not a top-level sort.
    assert_eq!(kind_count(&query, NodeKind::OrderBy), 0);
}

// ============================================================================
// Multiple statements and failure paths
// ============================================================================

#[test]
fn test_multiple_statements_share_the_root() {
    let query = parse("SELECT id FROM a; SELECT name FROM b");
    assert_eq!(edge_from(&query, "table:a").target, "root:query");
    assert_eq!(edge_from(&query, "table:b").target, "root:query");
    assert!(!query.has_errors());
}

#[test]
fn test_malformed_sql_collapses_to_the_sentinel() {
    let query = parse("SELEKT * FROM");
    assert_eq!(query.root_id, "root:error");
    assert_eq!(query.nodes.len(), 1);
    assert!(query.edges.is_empty());
    assert_eq!(query.nodes[0].kind, NodeKind::Select);
    assert_eq!(query.nodes[0].label, "Parse error");
    assert!(query.has_errors());
    assert!(query.errors[0].starts_with("SQL parse error:"));
    // The sentinel carries the message as detail for the renderer.
    assert_eq!(query.nodes[0].detail.as_deref(), Some(query.errors[0].as_str()));
}

#[test]
fn test_non_query_statement_reports_no_structure() {
    let query = parse("INSERT INTO t (id) VALUES (1)");
    assert_eq!(query.nodes.len(), 1);
    assert_eq!(query.root_id, "root:query");
    assert_eq!(
        query.errors,
        vec!["No tables, views, or CTEs detected in statement.".to_string()]
    );
}
