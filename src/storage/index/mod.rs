mod memory;

pub use memory::Memory;

use super::Rid;
use crate::error::Result;

use std::fmt::Display;

/// An equality lookup cursor over the RIDs stored under one search key.
pub type Lookup<'a> = Box<dyn Iterator<Item = Rid> + 'a>;

/// A hash index, mapping an encoded search key to zero or more RIDs. Keys are
/// opaque bytes, and only equality lookups are supported.
pub trait Index: Display + Send + Sync {
    /// Adds a key to RID entry. Duplicate keys are allowed.
    fn insert(&mut self, key: &[u8], rid: Rid) -> Result<()>;

    /// Opens a cursor over all RIDs stored under the key.
    fn lookup(&self, key: &[u8]) -> Result<Lookup>;

    /// Returns the number of entries in the index.
    fn len(&self) -> u64;

    /// Returns true if the index has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
