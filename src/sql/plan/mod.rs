mod optimizer;
mod planner;

pub use planner::Planner;

use super::ast::Statement;
use super::engine::Engine;
use super::execution::{self, ResultSet};
use super::predicate::Predicate;
use super::schema::{format_ident, Catalog};
use super::types::Value;
use crate::error::Result;

use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A plan node
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Filter {
        source: Box<Node>,
        /// Combined with AND; empty passes every row.
        predicates: Vec<Predicate>,
    },
    IndexLookup {
        table: String,
        index: String,
        column: String,
        key: Value,
    },
    Insert {
        table: String,
        values: Vec<Value>,
    },
    NestedLoopJoin {
        outer: Box<Node>,
        inner: Box<Node>,
    },
    Projection {
        source: Box<Node>,
        fields: Vec<usize>,
    },
    Scan {
        table: String,
    },
}

impl Node {
    fn format(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        match self {
            Self::Filter { source, predicates } => {
                if predicates.is_empty() {
                    writeln!(f, "Filter: true")?;
                } else {
                    writeln!(
                        f,
                        "Filter: {}",
                        predicates.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" AND ")
                    )?;
                }
                source.format(f, depth + 1)
            }
            Self::IndexLookup { table, index, column, key } => writeln!(
                f,
                "IndexLookup: {}.{} = {} ({})",
                format_ident(table),
                format_ident(column),
                key,
                format_ident(index)
            ),
            Self::Insert { table, values } => writeln!(
                f,
                "Insert: {} ({})",
                format_ident(table),
                values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
            ),
            Self::NestedLoopJoin { outer, inner } => {
                writeln!(f, "NestedLoopJoin")?;
                outer.format(f, depth + 1)?;
                inner.format(f, depth + 1)
            }
            Self::Projection { source, fields } => {
                writeln!(
                    f,
                    "Projection: {}",
                    fields.iter().map(|i| format!("#{}", i)).collect::<Vec<_>>().join(", ")
                )?;
                source.format(f, depth + 1)
            }
            Self::Scan { table } => writeln!(f, "Scan: {}", format_ident(table)),
        }
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.format(f, 0)
    }
}

/// A query plan
#[derive(Clone, Debug, PartialEq)]
pub struct Plan(pub Node);

impl Plan {
    /// Compiles a statement into a plan. Fails without side effects if the
    /// statement does not resolve against the catalog.
    pub fn build<C: Catalog + ?Sized>(statement: Statement, catalog: &C) -> Result<Self> {
        Planner::new(catalog).build(statement)
    }

    /// Executes the plan. Queries are driven to exhaustion and closed.
    pub fn execute<E: Engine + ?Sized>(self, engine: &mut E) -> Result<ResultSet> {
        match self.0 {
            Node::Insert { table, values } => execution::Insert::new(table, values).execute(engine),
            node => {
                let mut root = execution::build(node, &*engine)?;
                let result = ResultSet::drain(root.as_mut());
                root.close();
                result
            }
        }
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
