use super::ResultSet;
use crate::error::Result;
use crate::sql::engine::Engine;
use crate::sql::tuple::Tuple;
use crate::sql::types::Value;

use log::{debug, error};
use std::sync::Arc;

/// An INSERT executor for a single row.
///
/// The heap insert, each index insert and the row count update are separate
/// steps with no rollback: if a later step fails, earlier ones stay applied.
pub struct Insert {
    table: String,
    values: Vec<Value>,
}

impl Insert {
    pub fn new(table: String, values: Vec<Value>) -> Self {
        Self { table, values }
    }

    pub fn execute<E: Engine + ?Sized>(self, engine: &mut E) -> Result<ResultSet> {
        let table = engine.must_read_table(&self.table)?;
        let indexes = engine.indexes(&table.name)?;
        let tuple = Tuple::new(Arc::new(table.schema), self.values)?;

        let rid = engine.heap_mut(&table.name)?.insert(tuple.encode()?)?;
        for index in indexes {
            let key = tuple.get_by_name(&index.column)?.search_key()?;
            if let Err(err) = engine.index_mut(&index.name)?.insert(&key, rid) {
                error!(
                    "Index {} is missing record {} of table {}: {}",
                    index.name, rid, table.name, err
                );
                return Err(err);
            }
        }
        engine.increment_row_count(&table.name)?;

        debug!("Inserted record {} into {}", rid, table.name);
        Ok(ResultSet::Insert { count: 1 })
    }
}
