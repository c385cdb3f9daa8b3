mod database;

pub use database::Database;

use super::schema::Catalog;
use crate::error::Result;
use crate::storage::heap::Heap;
use crate::storage::index::Index;

/// A storage engine: the catalog plus access to each table's heap and each
/// named index. Executors borrow heaps and indexes for the lifetime of a query.
pub trait Engine: Catalog {
    /// Fetches a table's heap
    fn heap(&self, table: &str) -> Result<&dyn Heap>;
    /// Fetches a table's heap for writing
    fn heap_mut(&mut self, table: &str) -> Result<&mut dyn Heap>;
    /// Fetches an index by name
    fn index(&self, name: &str) -> Result<&dyn Index>;
    /// Fetches an index by name for writing
    fn index_mut(&mut self, name: &str) -> Result<&mut dyn Index>;
}
