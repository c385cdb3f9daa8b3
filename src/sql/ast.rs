use super::predicate::Predicate;
use super::types::Value;

/// A parsed statement, with names already resolved to tables and columns.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select {
        /// Source tables, in statement order.
        tables: Vec<String>,
        /// Output columns; empty means all columns.
        columns: Vec<String>,
        /// Predicates grouped by table slot. Predicates comparing columns of
        /// two tables may sit in either slot.
        predicates: Vec<Vec<Predicate>>,
    },
    Insert {
        table: String,
        /// One literal per column, in schema order.
        values: Vec<Value>,
    },
}
