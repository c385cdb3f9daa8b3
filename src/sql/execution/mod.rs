mod join;
mod mutation;
mod query;
mod source;

pub use join::NestedLoopJoin;
pub use mutation::Insert;
pub use query::{Filter, Projection};
pub use source::{IndexLookup, TableScan};

use super::engine::Engine;
use super::plan::Node;
use super::schema::Schema;
use super::tuple::Tuple;
use super::types::Value;
use crate::error::{Error, Result};

use std::fmt::{self, Display};
use std::sync::Arc;

/// A pull-based relational iterator. Executors are open once constructed,
/// own their children exclusively, and close them when closed themselves.
///
/// Callers must only call `next` after `has_next` returned true; doing
/// otherwise yields an internal error.
pub trait Executor {
    /// The schema of the produced tuples.
    fn schema(&self) -> &Arc<Schema>;

    /// Returns true if another tuple is available. Repeated calls without an
    /// intervening `next` return the same answer.
    fn has_next(&mut self) -> Result<bool>;

    /// Returns the next tuple.
    fn next(&mut self) -> Result<Tuple>;

    /// Restarts the iteration as if freshly constructed, reopening any
    /// underlying cursors.
    fn restart(&mut self) -> Result<()>;

    /// Releases all held cursors, including those of children. Idempotent.
    fn close(&mut self);

    /// Returns true until closed.
    fn is_open(&self) -> bool;
}

/// Builds an executor tree for a query plan node.
pub fn build<'a, E: Engine + ?Sized>(node: Node, engine: &'a E) -> Result<Box<dyn Executor + 'a>> {
    Ok(match node {
        Node::Filter { source, predicates } => {
            Box::new(Filter::new(build(*source, engine)?, predicates))
        }
        Node::IndexLookup { table, index, column: _, key } => {
            let schema = Arc::new(engine.must_read_table(&table)?.schema);
            Box::new(IndexLookup::new(engine.heap(&table)?, engine.index(&index)?, &key, schema)?)
        }
        Node::NestedLoopJoin { outer, inner } => {
            Box::new(NestedLoopJoin::new(build(*outer, engine)?, build(*inner, engine)?))
        }
        Node::Projection { source, fields } => {
            Box::new(Projection::new(build(*source, engine)?, fields)?)
        }
        Node::Scan { table } => {
            let schema = Arc::new(engine.must_read_table(&table)?.schema);
            Box::new(TableScan::new(engine.heap(&table)?, schema))
        }
        Node::Insert { table, .. } => {
            return Err(Error::Internal(format!("Insert into {} is not a query", table)))
        }
    })
}

/// Error for a `next` call with nothing left to return.
fn exhausted() -> Error {
    Error::Internal("No more tuples".into())
}

/// Error for using an executor after it was closed.
fn closed() -> Error {
    Error::Internal("Executor is closed".into())
}

/// An executor result set
#[derive(Clone, Debug, PartialEq)]
pub enum ResultSet {
    Query { columns: Vec<String>, rows: Vec<Vec<Value>> },
    Insert { count: u64 },
}

impl ResultSet {
    /// Pulls every remaining tuple out of an executor.
    pub fn drain(executor: &mut dyn Executor) -> Result<Self> {
        let columns = executor.schema().names();
        let mut rows = Vec::new();
        while executor.has_next()? {
            rows.push(executor.next()?.into_values());
        }
        Ok(ResultSet::Query { columns, rows })
    }
}

impl Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query { columns, rows } => {
                writeln!(f, "{}", columns.join(" | "))?;
                for row in rows {
                    writeln!(
                        f,
                        "{}",
                        row.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(" | ")
                    )?;
                }
                write!(f, "{} rows selected.", rows.len())
            }
            Self::Insert { count } => write!(f, "{} rows inserted.", count),
        }
    }
}
