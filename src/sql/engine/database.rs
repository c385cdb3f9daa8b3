use super::Engine;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::sql::ast::Statement;
use crate::sql::execution::{self, Executor, Filter, ResultSet, TableScan};
use crate::sql::plan::{Plan, Planner};
use crate::sql::predicate::{Operator, Predicate};
use crate::sql::schema::{Catalog, Field, IndexDesc, Schema, Table};
use crate::sql::tuple::Tuple;
use crate::sql::types::{DataType, Value};
use crate::storage::heap::{self, Heap};
use crate::storage::index::{self, Index};
use crate::storage::Rid;

use lazy_static::lazy_static;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// The reserved catalog relation holding one row count per table.
const RELATIONS: &str = "relations";
const REL_NAME: &str = "relName";
const REC_COUNT: &str = "recCount";

lazy_static! {
    static ref RELATIONS_SCHEMA: Arc<Schema> = Arc::new(Schema::new(vec![
        Field::string(REL_NAME, 64),
        Field::new(REC_COUNT, DataType::Integer),
    ]));
}

/// An in-process database, owning every table's heap, every hash index, the
/// table and index descriptors, and the catalog relation of row counts.
pub struct Database {
    config: Config,
    tables: BTreeMap<String, Table>,
    heaps: HashMap<String, Box<dyn Heap>>,
    index_descs: Vec<IndexDesc>,
    indexes: HashMap<String, Box<dyn Index>>,
    relations: Box<dyn Heap>,
}

impl Database {
    /// Creates a new, empty database, applying the configured log level.
    pub fn new(config: Config) -> Result<Self> {
        log::set_max_level(config.log_filter()?);
        Ok(Self {
            config,
            tables: BTreeMap::new(),
            heaps: HashMap::new(),
            index_descs: Vec::new(),
            indexes: HashMap::new(),
            relations: Box::new(heap::Memory::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Creates a table, with a zero row count in the catalog relation.
    pub fn create_table(&mut self, table: Table) -> Result<()> {
        table.validate()?;
        if table.name == RELATIONS || self.tables.contains_key(&table.name) {
            return Err(Error::Value(format!("Table {} already exists", table.name)));
        }
        let row = Tuple::new(RELATIONS_SCHEMA.clone(), vec![table.name.as_str().into(), 0.into()])?;
        self.relations.insert(row.encode()?)?;
        self.heaps.insert(table.name.clone(), Box::new(heap::Memory::new()));
        debug!("Created table {}", table.name);
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Creates a hash index on a table column, indexing any existing rows.
    pub fn create_index(&mut self, name: &str, table: &str, column: &str) -> Result<()> {
        if self.indexes.contains_key(name) {
            return Err(Error::Value(format!("Index {} already exists", name)));
        }
        let schema = Arc::new(self.must_read_table(table)?.schema);
        let field = schema.field_number(column)?;

        let mut index = index::Memory::new();
        {
            let mut scan = TableScan::new(self.heap(table)?, schema);
            while scan.has_next()? {
                let tuple = scan.next()?;
                let rid =
                    scan.last_rid().ok_or_else(|| Error::Internal("Scan lost its RID".into()))?;
                index.insert(&tuple.get(field)?.search_key()?, rid)?;
            }
            scan.close();
        }

        self.index_descs.push(IndexDesc {
            name: name.to_owned(),
            table: table.to_owned(),
            column: column.to_owned(),
        });
        self.indexes.insert(name.to_owned(), Box::new(index));
        debug!("Created index {} on {}.{}", name, table, column);
        Ok(())
    }

    /// Compiles a statement against the catalog.
    pub fn plan(&self, statement: Statement) -> Result<Plan> {
        Planner::new(self).with_index_lookups(self.config.index_lookups).build(statement)
    }

    /// Compiles and executes a statement.
    pub fn execute(&mut self, statement: Statement) -> Result<ResultSet> {
        self.plan(statement)?.execute(self)
    }

    /// Builds the executor tree of a query plan, for the caller to drive.
    pub fn query(&self, plan: Plan) -> Result<Box<dyn Executor + '_>> {
        execution::build(plan.0, self)
    }

    /// Finds a table's row in the catalog relation.
    fn find_relation(&self, table: &str) -> Result<(Rid, Tuple)> {
        let predicate = Predicate::column(REL_NAME, Operator::Equal, table);
        let mut scan = TableScan::new(self.relations.as_ref(), RELATIONS_SCHEMA.clone());
        let mut found = None;
        while scan.has_next()? {
            let tuple = scan.next()?;
            if predicate.evaluate(&tuple)? {
                found = scan.last_rid().map(|rid| (rid, tuple));
                break;
            }
        }
        scan.close();
        found.ok_or_else(|| Error::Value(format!("Table {} does not exist", table)))
    }
}

/// Reads the row count column of a catalog relation row.
fn record_count(tuple: &Tuple) -> Result<i32> {
    match tuple.get_by_name(REC_COUNT)? {
        Value::Integer(count) => Ok(*count),
        v => Err(Error::Internal(format!("Invalid row count {}", v))),
    }
}

impl Catalog for Database {
    fn read_table(&self, table: &str) -> Result<Option<Table>> {
        Ok(self.tables.get(table).cloned())
    }

    fn indexes(&self, table: &str) -> Result<Vec<IndexDesc>> {
        Ok(self.index_descs.iter().filter(|i| i.table == table).cloned().collect())
    }

    fn row_count(&self, table: &str) -> Result<u64> {
        let scan = TableScan::new(self.relations.as_ref(), RELATIONS_SCHEMA.clone());
        let mut filter = Filter::new(
            Box::new(scan),
            vec![Predicate::column(REL_NAME, Operator::Equal, table)],
        );
        let found = if filter.has_next()? { Some(filter.next()?) } else { None };
        filter.close();
        let tuple = found.ok_or_else(|| Error::Value(format!("Table {} does not exist", table)))?;
        u64::try_from(record_count(&tuple)?)
            .map_err(|_| Error::Internal(format!("Negative row count for table {}", table)))
    }

    fn increment_row_count(&mut self, table: &str) -> Result<()> {
        let (rid, mut tuple) = self.find_relation(table)?;
        let count = record_count(&tuple)?
            .checked_add(1)
            .ok_or_else(|| Error::Internal(format!("Row count overflow for table {}", table)))?;
        tuple.set_by_name(REC_COUNT, count.into())?;
        self.relations.update(rid, tuple.encode()?)
    }
}

impl Engine for Database {
    fn heap(&self, table: &str) -> Result<&dyn Heap> {
        let heap = self
            .heaps
            .get(table)
            .ok_or_else(|| Error::Value(format!("Table {} does not exist", table)))?;
        Ok(heap.as_ref())
    }

    fn heap_mut(&mut self, table: &str) -> Result<&mut dyn Heap> {
        let heap = self
            .heaps
            .get_mut(table)
            .ok_or_else(|| Error::Value(format!("Table {} does not exist", table)))?;
        Ok(heap.as_mut())
    }

    fn index(&self, name: &str) -> Result<&dyn Index> {
        let index = self
            .indexes
            .get(name)
            .ok_or_else(|| Error::Value(format!("Index {} does not exist", name)))?;
        Ok(index.as_ref())
    }

    fn index_mut(&mut self, name: &str) -> Result<&mut dyn Index> {
        let index = self
            .indexes
            .get_mut(name)
            .ok_or_else(|| Error::Value(format!("Index {} does not exist", name)))?;
        Ok(index.as_mut())
    }
}
