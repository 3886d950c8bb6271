//! Whole-text detection of window and aggregate usage.
//!
//! These scans deliberately ignore syntax: they answer "does this text use
//! a window/aggregate function anywhere" and emit at most one node per
//! scope, regardless of how many occurrences or how deeply nested. The SQL
//! backend runs them once over the raw input and once per CTE/subquery
//! scope; the ORM backends run them once over the raw source.

use std::sync::LazyLock;

use regex::Regex;

use crate::cost::{estimate, Operation};
use crate::graph::{GraphBuilder, NodeKind};

/// Window-function names recognized in any dialect.
static WINDOW_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(row_number|rank|dense_rank|ntile|lag|lead)\b").unwrap());

/// `OVER (` in SQL-shaped text.
static SQL_OVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bover\s*\(").unwrap());

/// `.over(` attribute calls in Python-shaped text.
static PY_OVER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.over\s*\(").unwrap());

/// COUNT/SUM/AVG/MIN/MAX call in SQL-shaped text.
static SQL_AGGREGATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(count|sum|avg|min|max)\s*\(").unwrap());

/// Same aggregate set, with the ORM's optional `func.` prefix accepted.
static PY_AGGREGATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:func\.)?(count|sum|avg|min|max)\s*\(").unwrap());

/// Which pattern family to scan with. ORM-JS text uses the SQL family: its
/// query builders spell aggregates and OVER the SQL way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalDialect {
    Sql,
    Python,
}

pub(crate) fn has_window(text: &str, dialect: SignalDialect) -> bool {
    let over = match dialect {
        SignalDialect::Sql => &SQL_OVER,
        SignalDialect::Python => &PY_OVER,
    };
    over.is_match(text) || WINDOW_FUNCTION.is_match(text)
}

pub(crate) fn has_aggregate(text: &str, dialect: SignalDialect) -> bool {
    let pattern = match dialect {
        SignalDialect::Sql => &SQL_AGGREGATE,
        SignalDialect::Python => &PY_AGGREGATE,
    };
    pattern.is_match(text)
}

/// Emit one `window` node under `parent` if the text shows window usage.
pub(crate) fn scan_window(
    builder: &mut GraphBuilder,
    text: &str,
    parent: &str,
    dialect: SignalDialect,
) {
    if has_window(text, dialect) {
        let profile = estimate(Operation::Window);
        builder.attach(NodeKind::Window, None, "WINDOW", parent, "OVER(...)", &profile);
    }
}

/// Emit one `aggregate` node under `parent` if the text shows an aggregate
/// function call.
pub(crate) fn scan_aggregate(
    builder: &mut GraphBuilder,
    text: &str,
    parent: &str,
    dialect: SignalDialect,
) {
    if has_aggregate(text, dialect) {
        let profile = estimate(Operation::Aggregate);
        builder.attach(NodeKind::Aggregate, None, "AGGREGATE", parent, "Agg", &profile);
    }
}
