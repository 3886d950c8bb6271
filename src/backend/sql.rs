//! SQL backend: statement trees from `sqlparser` projected onto the graph.
//!
//! One statement list in, one graph out. Structural recursion follows the
//! AST (CTEs, FROM factors, joins, set operations); the scope of every
//! recursive step is the node that introduced it, so a CTE's tables and
//! clauses hang off the CTE node, a subquery's off the subquery node. The
//! text-level window/aggregate signals run once over the whole input and
//! once per nested scope, on the parser's rendering of that scope.

use sqlparser::ast::{
    Cte, GroupByExpr, Join, JoinConstraint, JoinOperator, ObjectName, Query, Select, SetExpr,
    SetQuantifier, Statement, TableFactor, TableWithJoins,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use super::signals::{self, SignalDialect};
use super::ParseError;
use crate::cost::{estimate, Operation};
use crate::graph::{GraphBuilder, NodeKind, ParsedQuery, QueryAnalysis};

/// Parse SQL text (possibly multi-statement) into a query graph.
///
/// Never fails: parser errors collapse to the sentinel graph, statements
/// with nothing to graph produce the root plus an advisory.
pub fn parse(sql: &str) -> ParsedQuery {
    let mut builder = GraphBuilder::new();
    match collect_statements(sql, &mut builder) {
        Ok(()) => {
            let root = builder.root_id();
            signals::scan_window(&mut builder, sql, root, SignalDialect::Sql);
            signals::scan_aggregate(&mut builder, sql, root, SignalDialect::Sql);
            if !builder.has_relations() {
                builder.push_error("No tables, views, or CTEs detected in statement.");
            }
            builder.finish(Some(QueryAnalysis::default()))
        }
        Err(err) => ParsedQuery::parse_failure(err.to_string()),
    }
}

fn collect_statements(sql: &str, builder: &mut GraphBuilder) -> Result<(), ParseError> {
    let statements = Parser::parse_sql(&GenericDialect {}, sql)?;
    let root = builder.root_id();
    for statement in &statements {
        // DDL/DML contribute no structure; they fall through to the
        // no-relations advisory.
        if let Statement::Query(query) = statement {
            collect_query(query, root, builder);
        }
    }
    Ok(())
}

/// Project one query (top-level statement, CTE body, subquery, or set
/// operation branch) onto the graph under `parent`.
fn collect_query(query: &Query, parent: &str, builder: &mut GraphBuilder) {
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            collect_cte(cte, parent, builder);
        }
    }
    collect_body(&query.body, parent, builder);
    if query.order_by.is_some() {
        let profile = estimate(Operation::OrderBy);
        builder.attach(NodeKind::OrderBy, None, "ORDER BY", parent, "Sort", &profile);
    }
    if query.limit.is_some() {
        let profile = estimate(Operation::Limit);
        builder.attach(NodeKind::Limit, None, "LIMIT", parent, "Limit", &profile);
    }
}

fn collect_cte(cte: &Cte, parent: &str, builder: &mut GraphBuilder) {
    let name = cte.alias.name.value.clone();
    let profile = estimate(Operation::Nested);
    let cte_id = builder.attach(NodeKind::Cte, Some(&name), &name, parent, "WITH", &profile);
    collect_query(&cte.query, &cte_id, builder);
    scan_scope(&cte.query.to_string(), &cte_id, builder);
}

/// Scoped signal pass over the parser's rendering of a sub-statement, so a
/// window/aggregate inside a CTE or subquery is attributed to that scope.
/// The whole-input pass still runs afterwards; the double count is the
/// intended "used anywhere" sentinel.
fn scan_scope(rendered: &str, scope: &str, builder: &mut GraphBuilder) {
    signals::scan_window(builder, rendered, scope, SignalDialect::Sql);
    signals::scan_aggregate(builder, rendered, scope, SignalDialect::Sql);
}

fn collect_body(body: &SetExpr, parent: &str, builder: &mut GraphBuilder) {
    match body {
        SetExpr::Select(select) => collect_select(select, parent, builder),
        SetExpr::Query(query) => collect_query(query, parent, builder),
        SetExpr::SetOperation {
            op,
            set_quantifier,
            left,
            right,
            ..
        } => {
            // Chains are left-associative: the left side keeps the current
            // parent, each chained branch gets its own union node.
            collect_body(left, parent, builder);
            let label = match set_quantifier {
                SetQuantifier::All => format!("{} ALL", op),
                _ => op.to_string(),
            };
            let profile = estimate(Operation::Union);
            let union_id =
                builder.attach(NodeKind::Union, None, &label, parent, &label, &profile);
            collect_body(right, &union_id, builder);
        }
        _ => {}
    }
}

fn collect_select(select: &Select, parent: &str, builder: &mut GraphBuilder) {
    for table_with_joins in &select.from {
        collect_table_with_joins(table_with_joins, parent, builder);
    }
    if select.selection.is_some() {
        let profile = estimate(Operation::Filter);
        builder.attach(NodeKind::Where, None, "WHERE", parent, "Filter", &profile);
    }
    if has_group_by(&select.group_by) {
        let profile = estimate(Operation::GroupBy);
        builder.attach(
            NodeKind::GroupBy,
            None,
            "GROUP BY",
            parent,
            "Aggregate",
            &profile,
        );
    }
}

fn has_group_by(group_by: &GroupByExpr) -> bool {
    match group_by {
        GroupByExpr::All(_) => true,
        GroupByExpr::Expressions(exprs, modifiers) => !exprs.is_empty() || !modifiers.is_empty(),
    }
}

fn collect_table_with_joins(twj: &TableWithJoins, parent: &str, builder: &mut GraphBuilder) {
    collect_relation(&twj.relation, parent, builder);
    for join in &twj.joins {
        collect_join(join, parent, builder);
    }
}

/// A FROM factor outside a join: plain table, derived table, or a
/// parenthesized join group (walked through transparently).
fn collect_relation(relation: &TableFactor, parent: &str, builder: &mut GraphBuilder) {
    match relation {
        TableFactor::Table { name, .. } => {
            let label = table_label(name);
            let profile = estimate(Operation::TableScan);
            builder.attach(NodeKind::Table, Some(&label), &label, parent, "FROM", &profile);
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            let label = alias
                .as_ref()
                .map(|a| a.name.value.clone())
                .unwrap_or_else(|| "subquery".to_string());
            let profile = estimate(Operation::Nested);
            let sub_id = builder.attach(
                NodeKind::Subquery,
                Some(&label),
                &label,
                parent,
                "FROM (sub)",
                &profile,
            );
            collect_query(subquery, &sub_id, builder);
            scan_scope(&subquery.to_string(), &sub_id, builder);
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            collect_table_with_joins(table_with_joins, parent, builder);
        }
        _ => {}
    }
}

fn collect_join(join: &Join, parent: &str, builder: &mut GraphBuilder) {
    let (token, constraint) = join_operator_parts(&join.join_operator);
    match &join.relation {
        TableFactor::Table { name, .. } => {
            let label = table_label(name);
            let profile = estimate(Operation::Join(token));
            let join_id = builder.attach(
                NodeKind::Join,
                Some(&label),
                &label,
                parent,
                &join_edge_label(token),
                &profile,
            );
            if let Some(on) = constraint_detail(constraint) {
                builder.set_detail(&join_id, on);
            }
        }
        TableFactor::Derived {
            subquery, alias, ..
        } => {
            // JOIN (SELECT ...) alias: the join node is the local root for
            // the derived statement's own structure.
            let label = alias
                .as_ref()
                .map(|a| a.name.value.clone())
                .unwrap_or_else(|| "subquery".to_string());
            let profile = estimate(Operation::Join(token));
            let join_id = builder.attach(
                NodeKind::Join,
                Some(&label),
                &label,
                parent,
                &join_edge_label(token),
                &profile,
            );
            if let Some(on) = constraint_detail(constraint) {
                builder.set_detail(&join_id, on);
            }
            collect_query(subquery, &join_id, builder);
            scan_scope(&subquery.to_string(), &join_id, builder);
        }
        TableFactor::NestedJoin {
            table_with_joins, ..
        } => {
            collect_table_with_joins(table_with_joins, parent, builder);
        }
        _ => {}
    }
}

/// `"INNER"` → `"INNER JOIN"`; an empty token is a plain `"JOIN"`.
fn join_edge_label(token: &str) -> String {
    if token.is_empty() {
        "JOIN".to_string()
    } else {
        format!("{} JOIN", token)
    }
}

fn constraint_detail(constraint: Option<&JoinConstraint>) -> Option<String> {
    match constraint {
        Some(JoinConstraint::On(expr)) => Some(format!("ON {}", expr)),
        _ => None,
    }
}

/// Canonical join-type token plus the constraint, from the AST operator.
/// The parser collapses `LEFT JOIN` and `LEFT OUTER JOIN` into one
/// operator, so classification keys on the canonical token.
fn join_operator_parts(operator: &JoinOperator) -> (&'static str, Option<&JoinConstraint>) {
    match operator {
        JoinOperator::Inner(c) => ("INNER", Some(c)),
        JoinOperator::LeftOuter(c) => ("LEFT", Some(c)),
        JoinOperator::RightOuter(c) => ("RIGHT", Some(c)),
        JoinOperator::FullOuter(c) => ("FULL OUTER", Some(c)),
        JoinOperator::CrossJoin => ("CROSS", None),
        JoinOperator::LeftSemi(c) => ("LEFT SEMI", Some(c)),
        JoinOperator::RightSemi(c) => ("RIGHT SEMI", Some(c)),
        JoinOperator::LeftAnti(c) => ("LEFT ANTI", Some(c)),
        JoinOperator::RightAnti(c) => ("RIGHT ANTI", Some(c)),
        JoinOperator::CrossApply => ("CROSS APPLY", None),
        JoinOperator::OuterApply => ("OUTER APPLY", None),
        // Anything else (ASOF, dialect-specific operators) classifies as a
        // plain join with no extractable condition.
        _ => ("", None),
    }
}

/// Display name for a (possibly schema-qualified) object reference: the
/// last path segment.
fn table_label(name: &ObjectName) -> String {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .unwrap_or_else(|| name.to_string())
}
