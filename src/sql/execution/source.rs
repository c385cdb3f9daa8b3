use super::{closed, exhausted, Executor};
use crate::error::{Error, Result};
use crate::sql::schema::Schema;
use crate::sql::tuple::Tuple;
use crate::sql::types::Value;
use crate::storage::heap::{Heap, Scan};
use crate::storage::index::{Index, Lookup};
use crate::storage::Rid;

use std::iter::Peekable;
use std::sync::Arc;

/// A full forward scan over a table's heap, decoding each record against the
/// table schema.
pub struct TableScan<'a> {
    heap: &'a dyn Heap,
    schema: Arc<Schema>,
    scan: Option<Peekable<Scan<'a>>>,
    last_rid: Option<Rid>,
}

impl<'a> TableScan<'a> {
    pub fn new(heap: &'a dyn Heap, schema: Arc<Schema>) -> Self {
        Self { heap, schema, scan: Some(heap.scan().peekable()), last_rid: None }
    }

    /// The RID of the last tuple returned, if any.
    pub fn last_rid(&self) -> Option<Rid> {
        self.last_rid
    }
}

impl<'a> Executor for TableScan<'a> {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(match &mut self.scan {
            Some(scan) => scan.peek().is_some(),
            None => false,
        })
    }

    fn next(&mut self) -> Result<Tuple> {
        let scan = self.scan.as_mut().ok_or_else(closed)?;
        let (rid, record) = scan.next().ok_or_else(exhausted)??;
        self.last_rid = Some(rid);
        Tuple::decode(self.schema.clone(), &record)
    }

    fn restart(&mut self) -> Result<()> {
        self.scan = Some(self.heap.scan().peekable());
        self.last_rid = None;
        Ok(())
    }

    fn close(&mut self) {
        self.scan = None;
    }

    fn is_open(&self) -> bool {
        self.scan.is_some()
    }
}

/// An equality lookup through a hash index, fetching each matching record
/// from the indexed table's heap.
pub struct IndexLookup<'a> {
    heap: &'a dyn Heap,
    index: &'a dyn Index,
    key: Vec<u8>,
    schema: Arc<Schema>,
    lookup: Option<Peekable<Lookup<'a>>>,
}

impl<'a> IndexLookup<'a> {
    pub fn new(
        heap: &'a dyn Heap,
        index: &'a dyn Index,
        key: &Value,
        schema: Arc<Schema>,
    ) -> Result<Self> {
        let key = key.search_key()?;
        let lookup = Some(index.lookup(&key)?.peekable());
        Ok(Self { heap, index, key, schema, lookup })
    }
}

impl<'a> Executor for IndexLookup<'a> {
    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn has_next(&mut self) -> Result<bool> {
        Ok(match &mut self.lookup {
            Some(lookup) => lookup.peek().is_some(),
            None => false,
        })
    }

    fn next(&mut self) -> Result<Tuple> {
        let lookup = self.lookup.as_mut().ok_or_else(closed)?;
        let rid = lookup.next().ok_or_else(exhausted)?;
        let record = self
            .heap
            .get(rid)?
            .ok_or_else(|| Error::Internal(format!("Indexed record {} does not exist", rid)))?;
        Tuple::decode(self.schema.clone(), &record)
    }

    fn restart(&mut self) -> Result<()> {
        self.lookup = Some(self.index.lookup(&self.key)?.peekable());
        Ok(())
    }

    fn close(&mut self) {
        self.lookup = None;
    }

    fn is_open(&self) -> bool {
        self.lookup.is_some()
    }
}
