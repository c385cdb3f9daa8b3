use super::{Heap, Scan};
use crate::error::{Error, Result};
use crate::storage::Rid;

use std::fmt::Display;

/// An in-memory heap. RIDs are slot numbers; deleted slots are never reused.
pub struct Memory {
    slots: Vec<Option<Vec<u8>>>,
    live: u64,
}

impl Memory {
    /// Creates a new, empty in-memory heap.
    pub fn new() -> Self {
        Self { slots: Vec::new(), live: 0 }
    }

    fn slot_mut(&mut self, rid: Rid) -> Result<&mut Option<Vec<u8>>> {
        match self.slots.get_mut(rid.0 as usize) {
            Some(slot) if slot.is_some() => Ok(slot),
            _ => Err(Error::Internal(format!("Record {} does not exist", rid))),
        }
    }
}

impl Display for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "memory")
    }
}

impl Heap for Memory {
    fn insert(&mut self, record: Vec<u8>) -> Result<Rid> {
        self.slots.push(Some(record));
        self.live += 1;
        Ok(Rid(self.slots.len() as u64 - 1))
    }

    fn get(&self, rid: Rid) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(rid.0 as usize).cloned().flatten())
    }

    fn update(&mut self, rid: Rid, record: Vec<u8>) -> Result<()> {
        *self.slot_mut(rid)? = Some(record);
        Ok(())
    }

    fn delete(&mut self, rid: Rid) -> Result<()> {
        *self.slot_mut(rid)? = None;
        self.live -= 1;
        Ok(())
    }

    fn scan(&self) -> Scan {
        Box::new(
            self.slots
                .iter()
                .enumerate()
                .filter_map(|(i, slot)| slot.as_ref().map(|r| Ok((Rid(i as u64), r.clone())))),
        )
    }

    fn len(&self) -> u64 {
        self.live
    }
}

#[cfg(test)]
impl super::TestSuite<Memory> for Memory {
    fn setup() -> Result<Self> {
        Ok(Memory::new())
    }
}

#[test]
fn tests() -> Result<()> {
    use super::TestSuite;
    Memory::test()
}
