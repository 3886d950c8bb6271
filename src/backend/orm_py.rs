//! ORM-PY backend: lexical extraction from Python ORM call chains.
//!
//! No syntax tree here. The chain shapes (`session.query(X)`, `.join(Y)`,
//! `select(Z)`, `.cte("name")`) are regular enough that regex capture plus
//! a bracket- and quote-aware argument splitter recovers the relation
//! names. Anything else in the source is ignored; there is no recall
//! guarantee and no failure mode — this backend is total by construction.

use std::sync::LazyLock;

use regex::Regex;

use super::signals::{self, SignalDialect};
use crate::cost::{estimate, Operation};
use crate::graph::{GraphBuilder, NodeKind, ParsedQuery};

// Argument captures accept one level of balanced parens, so wrapped names
// like `aliased(User)` survive intact for the normalizer.
static QUERY_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bquery\s*\(((?:[^()]|\([^()]*\))*)\)").unwrap());
static SELECT_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bselect\s*\(((?:[^()]|\([^()]*\))*)\)").unwrap());
static FROM_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bfrom_\s*\(((?:[^()]|\([^()]*\))*)\)").unwrap());

// Joins keep only their first argument (the relation); the rest of the
// call is the join condition.
static JOIN_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bjoin\s*\(\s*((?:[^,()]|\([^()]*\))+)[^)]*\)").unwrap());
static OUTERJOIN_ARGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bouterjoin\s*\(\s*((?:[^,()]|\([^()]*\))+)[^)]*\)").unwrap());

// Two alternation branches instead of a quote backreference.
static CTE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\.cte\s*\(\s*(?:"\s*([^'")]+?)\s*"|'\s*([^'")]+?)\s*')\s*\)"#).unwrap()
});

/// Lexical discoveries, in scan order.
#[derive(Debug, Default)]
struct Extraction {
    tables: Vec<String>,
    /// Join entries as recorded: the relation name, with ` (outer)`
    /// appended for outer joins so classification sees the marker.
    joins: Vec<String>,
    ctes: Vec<String>,
}

/// Parse Python ORM source into a query graph. Never fails.
pub fn parse(source: &str) -> ParsedQuery {
    let extraction = extract(source);
    build_graph(source, &extraction)
}

fn extract(source: &str) -> Extraction {
    let mut extraction = Extraction::default();
    for pattern in [&QUERY_ARGS, &SELECT_ARGS] {
        for caps in pattern.captures_iter(source) {
            if let Some(args) = caps.get(1) {
                for arg in split_args(args.as_str()) {
                    if let Some(name) = normalize_name(&arg) {
                        record(&mut extraction.tables, name);
                    }
                }
            }
        }
    }
    // from_ takes a single relation; the capture is one name, not a list.
    for caps in FROM_ARGS.captures_iter(source) {
        if let Some(arg) = caps.get(1) {
            if let Some(name) = normalize_name(arg.as_str()) {
                record(&mut extraction.tables, name);
            }
        }
    }
    for caps in JOIN_ARGS.captures_iter(source) {
        if let Some(arg) = caps.get(1) {
            if let Some(name) = normalize_name(arg.as_str()) {
                record(&mut extraction.joins, name.clone());
                record(&mut extraction.tables, name);
            }
        }
    }
    for caps in OUTERJOIN_ARGS.captures_iter(source) {
        if let Some(arg) = caps.get(1) {
            if let Some(name) = normalize_name(arg.as_str()) {
                record(&mut extraction.joins, format!("{} (outer)", name));
                record(&mut extraction.tables, name);
            }
        }
    }
    for caps in CTE_NAME.captures_iter(source) {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim());
        if let Some(name) = name {
            if !name.is_empty() {
                record(&mut extraction.ctes, name.to_string());
            }
        }
    }
    extraction
}

fn record(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Split a call's argument text on top-level commas. Commas inside nested
/// brackets or string literals do not split; a backslash-escaped quote
/// does not close its string.
fn split_args(arg_list: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_string: Option<char> = None;
    let mut previous: Option<char> = None;
    for ch in arg_list.chars() {
        match in_string {
            Some(quote) => {
                current.push(ch);
                if ch == quote && previous != Some('\\') {
                    in_string = None;
                }
            }
            None => match ch {
                '\'' | '"' => {
                    in_string = Some(ch);
                    current.push(ch);
                }
                '(' | '[' | '{' => {
                    depth += 1;
                    current.push(ch);
                }
                ')' | ']' | '}' => {
                    depth -= 1;
                    current.push(ch);
                }
                ',' if depth == 0 => {
                    let piece = current.trim();
                    if !piece.is_empty() {
                        out.push(piece.to_string());
                    }
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
        previous = Some(ch);
    }
    let piece = current.trim();
    if !piece.is_empty() {
        out.push(piece.to_string());
    }
    out
}

/// Reduce a raw argument to a bare relation name: strip surrounding
/// matching quotes, unwrap `aliased(X)`, drop a trailing `.__table__`,
/// then keep the last dotted segment.
fn normalize_name(raw: &str) -> Option<String> {
    let mut name = raw.trim().to_string();
    if name.len() >= 2 {
        let first = name.chars().next()?;
        let last = name.chars().last()?;
        if (first == '"' || first == '\'') && first == last {
            name = name[1..name.len() - 1].trim().to_string();
        }
    }
    if let Some(inner) = name
        .strip_prefix("aliased(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        name = inner.trim().to_string();
    }
    if let Some(stripped) = name.strip_suffix(".__table__") {
        name = stripped.to_string();
    }
    if let Some(segment) = name.rsplit('.').next() {
        name = segment.to_string();
    }
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn build_graph(source: &str, extraction: &Extraction) -> ParsedQuery {
    let mut builder = GraphBuilder::new();
    let root = builder.root_id();
    for table in &extraction.tables {
        let join_entry = extraction
            .joins
            .iter()
            .find(|entry| entry.starts_with(table.as_str()));
        match join_entry {
            Some(entry) => {
                let profile = estimate(Operation::Join(entry));
                builder.attach(NodeKind::Join, Some(table), table, root, "JOIN", &profile);
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
    signals::scan_aggregate(&mut builder, source, root, SignalDialect::Python);
    signals::scan_window(&mut builder, source, root, SignalDialect::Python);
    if !builder.has_relations() {
        builder.push_error("No models/tables/CTEs detected from SQLAlchemy code.");
    }
    builder.finish(None)
}
