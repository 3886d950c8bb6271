//! ORM-JS backend: call-chain extraction over a tree-sitter syntax tree.
//!
//! Walks every call expression in the source (TSX grammar, so TypeScript
//! and JSX extensions parse too) and pattern-matches the small set of
//! query-builder shapes onto the graph model:
//!
//! - `db('orders')` — bare factory call with a string table name
//! - `.from('t')` / `.table('t')` / `.selectFrom('t')` — table methods
//! - `.join('t', ...)` and friends — join methods, the method name drives
//!   cost classification
//! - `.with('name', ...)` / `.withRecursive('name', ...)` — CTEs
//! - `prisma.<model>.<method>(...)` — model-as-table namespace heuristic
//!
//! Extraction is lexical about everything else: variables, subchains and
//! computed names are ignored rather than resolved.

use std::collections::HashMap;

use tree_sitter::{Node, Parser, Point};

use super::signals::{self, SignalDialect};
use super::ParseError;
use crate::cost::{estimate, Operation};
use crate::graph::{GraphBuilder, NodeKind, ParsedQuery};

/// Chain methods that introduce a joined table.
const JOIN_METHODS: [&str; 7] = [
    "join",
    "leftJoin",
    "rightJoin",
    "innerJoin",
    "leftOuterJoin",
    "rightOuterJoin",
    "fullOuterJoin",
];

/// Chain methods that introduce a FROM-style table reference.
const TABLE_METHODS: [&str; 3] = ["from", "table", "selectFrom"];

/// Chain methods that introduce a CTE.
const CTE_METHODS: [&str; 2] = ["with", "withRecursive"];

/// The model namespace recognized for `<namespace>.<model>.<method>()`.
const MODEL_NAMESPACE: &str = "prisma";

/// Call-chain discoveries, in walk order (outermost call first).
#[derive(Debug, Default)]
struct Extraction {
    tables: Vec<String>,
    join_methods: HashMap<String, String>,
    ctes: Vec<String>,
}

/// Parse ORM-JS source into a query graph.
///
/// A source the grammar cannot parse cleanly is a hard failure and returns
/// the sentinel graph; everything else returns whatever chains were found.
pub fn parse(source: &str) -> ParsedQuery {
    match extract(source) {
        Ok(extraction) => build_graph(source, &extraction),
        Err(err) => ParsedQuery::parse_failure(err.to_string()),
    }
}

fn extract(source: &str) -> Result<Extraction, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TSX.into())
        .expect("Error loading TSX grammar");

    let tree = parser.parse(source, None).ok_or(ParseError::Unparsable)?;
    let root = tree.root_node();
    if root.has_error() {
        let point = first_error_point(root).unwrap_or_else(|| root.start_position());
        return Err(ParseError::Syntax {
            line: point.row + 1,
            column: point.column + 1,
        });
    }

    let mut extraction = Extraction::default();
    collect_calls(root, source, &mut extraction);
    Ok(extraction)
}

/// Position of the first ERROR or missing node under `node`.
fn first_error_point(node: Node) -> Option<Point> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position());
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() {
            if let Some(point) = first_error_point(child) {
                return Some(point);
            }
        }
    }
    None
}

/// Pre-order walk over every node, visiting call expressions.
fn collect_calls(node: Node, source: &str, out: &mut Extraction) {
    if node.kind() == "call_expression" {
        collect_call(node, source, out);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, out);
    }
}

fn collect_call(call: Node, source: &str, out: &mut Extraction) {
    let Some(callee) = call.child_by_field_name("function") else {
        return;
    };
    match callee.kind() {
        // db('orders') — a bare factory taking the table name.
        "identifier" => {
            if let Some(table) = first_string_argument(call, source) {
                record_table(out, table);
            }
        }
        "member_expression" => {
            let Some(property) = callee.child_by_field_name("property") else {
                return;
            };
            let method = node_text(property, source);
            if TABLE_METHODS.contains(&method) {
                if let Some(table) = first_string_argument(call, source) {
                    record_table(out, table);
                }
            } else if JOIN_METHODS.contains(&method) {
                if let Some(table) = first_string_argument(call, source) {
                    out.join_methods.insert(table.clone(), method.to_string());
                    record_table(out, table);
                }
            } else if CTE_METHODS.contains(&method) {
                if let Some(name) = first_string_argument(call, source) {
                    if !out.ctes.contains(&name) {
                        out.ctes.push(name);
                    }
                }
            } else if let Some(model) = model_namespace_table(callee, source) {
                record_table(out, model.to_string());
            }
        }
        _ => {}
    }
}

fn record_table(out: &mut Extraction, table: String) {
    if !out.tables.contains(&table) {
        out.tables.push(table);
    }
}

/// `prisma.<model>.<method>(...)`: the middle segment names a table.
fn model_namespace_table<'a>(callee: Node, source: &'a str) -> Option<&'a str> {
    let object = callee.child_by_field_name("object")?;
    if object.kind() != "member_expression" {
        return None;
    }
    let namespace = object.child_by_field_name("object")?;
    if namespace.kind() != "identifier" || node_text(namespace, source) != MODEL_NAMESPACE {
        return None;
    }
    let model = object.child_by_field_name("property")?;
    Some(node_text(model, source))
}

/// The call's first argument, if it is a plain string literal. Template
/// strings and non-literal expressions do not count.
fn first_string_argument(call: Node, source: &str) -> Option<String> {
    let args = call.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")?;
    if first.kind() != "string" {
        return None;
    }
    Some(string_content(first, source))
}

/// Literal content of a string node, quotes stripped.
fn string_content(node: Node, source: &str) -> String {
    node_text(node, source)
        .trim_matches('"')
        .trim_matches('\'')
        .to_string()
}

fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

fn build_graph(source: &str, extraction: &Extraction) -> ParsedQuery {
    let mut builder = GraphBuilder::new();
    let root = builder.root_id();
    for table in &extraction.tables {
        match extraction.join_methods.get(table) {
            Some(method) => {
                let profile = estimate(Operation::Join(method));
                builder.attach(
                    NodeKind::Join,
                    Some(table),
                    table,
                    root,
                    &method.to_uppercase(),
                    &profile,
                );
            }
            None => {
                let profile = estimate(Operation::TableScan);
                builder.attach(NodeKind::Table, Some(table), table, root, "FROM", &profile);
            }
        }
    }
    for cte in &extraction.ctes {
        let profile = estimate(Operation::Nested);
        builder.attach(NodeKind::Cte, Some(cte), cte, root, "WITH", &profile);
    }
    signals::scan_aggregate(&mut builder, source, root, SignalDialect::Sql);
    signals::scan_window(&mut builder, source, root, SignalDialect::Sql);
    if !builder.has_relations() {
        builder.push_error("No tables/models/CTEs detected. This is a minimal heuristic parser.");
    }
    builder.finish(None)
}
