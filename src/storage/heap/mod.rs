mod memory;
#[cfg(test)]
mod test;

pub use memory::Memory;
#[cfg(test)]
use test::TestSuite;

use super::Rid;
use crate::error::Result;

use std::fmt::Display;

/// A forward scan over a heap, yielding each live record with its RID.
pub type Scan<'a> = Box<dyn Iterator<Item = Result<(Rid, Vec<u8>)>> + 'a>;

/// A heap file: unordered record storage addressed by RIDs. Records are
/// opaque bytes; decoding them is up to the caller.
pub trait Heap: Display + Send + Sync {
    /// Appends a record, returning its RID.
    fn insert(&mut self, record: Vec<u8>) -> Result<Rid>;

    /// Fetches a record, if it exists.
    fn get(&self, rid: Rid) -> Result<Option<Vec<u8>>>;

    /// Replaces an existing record. Errors if the RID is not live.
    fn update(&mut self, rid: Rid, record: Vec<u8>) -> Result<()>;

    /// Removes a record. Errors if the RID is not live.
    fn delete(&mut self, rid: Rid) -> Result<()>;

    /// Scans all live records in RID order.
    fn scan(&self) -> Scan;

    /// Returns the number of live records.
    fn len(&self) -> u64;

    /// Returns true if the heap holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
