use std::fmt;

/// Block identifier - a handle to a block registered with a `BufferManager`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.0)
    }
}

/// Lifecycle state of a block as tracked by its gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockState {
    /// Newly allocated, never pinned, nothing to load
    Fresh,
    /// Resident and unchanged since it was pinned
    Loaded,
    /// Not resident; pinning a disk block reloads it
    Unloaded,
    /// Resident with pending writes
    Dirty,
}

impl BlockState {
    /// Returns true if tuple contents may be read or written in this state.
    pub fn is_accessible(&self) -> bool {
        matches!(self, BlockState::Loaded | BlockState::Dirty)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockState::Fresh => "fresh",
            BlockState::Loaded => "loaded",
            BlockState::Unloaded => "unloaded",
            BlockState::Dirty => "dirty",
        };
        f.write_str(name)
    }
}
