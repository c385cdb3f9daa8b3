use super::{Index, Lookup};
use crate::error::Result;
use crate::storage::Rid;

use std::collections::HashMap;
use std::fmt::Display;

/// An in-memory hash index. RIDs under a key are kept in insertion order.
pub struct Memory {
    buckets: HashMap<Vec<u8>, Vec<Rid>>,
    entries: u64,
}

impl Memory {
    /// Creates a new, empty in-memory hash index.
    pub fn new() -> Self {
        Self { buckets: HashMap::new(), entries: 0 }
    }
}

impl Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "memory")
    }
}

impl Index for Memory {
    fn insert(&mut self, key: &[u8], rid: Rid) -> Result<()> {
        self.buckets.entry(key.to_vec()).or_default().push(rid);
        self.entries += 1;
        Ok(())
    }

    fn lookup(&self, key: &[u8]) -> Result<Lookup> {
        Ok(match self.buckets.get(key) {
            Some(rids) => Box::new(rids.iter().copied()),
            None => Box::new(std::iter::empty()),
        })
    }

    fn len(&self) -> u64 {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_lookup() -> Result<()> {
        let mut index = Memory::new();
        assert!(index.is_empty());
        assert_eq!(0, index.lookup(b"a")?.count());

        index.insert(b"a", Rid(1))?;
        index.insert(b"b", Rid(2))?;
        index.insert(b"a", Rid(3))?;
        assert_eq!(3, index.len());

        assert_eq!(vec![Rid(1), Rid(3)], index.lookup(b"a")?.collect::<Vec<_>>());
        assert_eq!(vec![Rid(2)], index.lookup(b"b")?.collect::<Vec<_>>());
        assert_eq!(0, index.lookup(b"c")?.count());
        Ok(())
    }

    #[test]
    fn lookup_is_repeatable() -> Result<()> {
        let mut index = Memory::new();
        index.insert(b"k", Rid(7))?;
        let first = index.lookup(b"k")?.collect::<Vec<_>>();
        let second = index.lookup(b"k")?.collect::<Vec<_>>();
        assert_eq!(first, second);
        Ok(())
    }
}
