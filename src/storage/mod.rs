pub mod heap;
pub mod index;

use serde_derive::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A record identifier, locating one stored record within a heap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rid(pub u64);

impl Display for Rid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
