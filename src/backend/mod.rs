//! Backend selection and the parse boundary.
//!
//! One capability, three implementations: `parse(text) -> ParsedQuery`,
//! selected by [`QueryMode`]. Every backend is total; hard failures are
//! converted to the single-sentinel error graph right here at the
//! boundary, so callers never see a panic or a `Result`.

pub mod orm_js;
pub mod orm_py;
mod signals;
pub mod sql;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::ParsedQuery;

/// Which surface syntax the input text is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    /// Raw SQL text.
    Sql,
    /// JavaScript/TypeScript ORM call chains.
    OrmJs,
    /// Python ORM call chains.
    OrmPy,
}

impl QueryMode {
    /// The mode tag, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Sql => "sql",
            QueryMode::OrmJs => "orm-js",
            QueryMode::OrmPy => "orm-py",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error for a mode tag outside `sql` / `orm-js` / `orm-py`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown query mode '{0}'")]
pub struct UnknownModeError(pub String);

impl FromStr for QueryMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sql" => Ok(QueryMode::Sql),
            "orm-js" => Ok(QueryMode::OrmJs),
            "orm-py" => Ok(QueryMode::OrmPy),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// Why a backend could not build a structural graph.
///
/// Internal to the boundary: `parse_to_graph` renders it into the sentinel
/// graph via [`ParsedQuery::parse_failure`], it never crosses the public
/// surface as an `Err`.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("SQL parse error: {0}")]
    Sql(#[from] sqlparser::parser::ParserError),

    /// The syntax tree contains an ERROR node at this position.
    #[error("syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    /// The syntax-tree parser produced no tree at all.
    #[error("source could not be parsed")]
    Unparsable,
}

/// Parse `text` according to `mode`.
///
/// Total over all inputs: malformed text comes back as a graph whose only
/// node is the parse-error sentinel, with `errors` populated.
pub fn parse_to_graph(mode: QueryMode, text: &str) -> ParsedQuery {
    match mode {
        QueryMode::Sql => sql::parse(text),
        QueryMode::OrmJs => orm_js::parse(text),
        QueryMode::OrmPy => orm_py::parse(text),
    }
}
