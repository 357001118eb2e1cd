use crate::buffer::BufferManager;
use crate::common::BlockId;

/// A relation: an ordered, append-only list of block handles.
///
/// In-memory relations allocate fresh blocks that are discarded after their
/// first pin cycle; disk relations allocate unloaded blocks that are loaded
/// and written back through the buffer manager.
#[derive(Debug, Default)]
pub struct Relation {
    blocks: Vec<BlockId>,
    in_memory: bool,
}

impl Relation {
    /// Creates an empty relation.
    pub fn new(in_memory: bool) -> Self {
        Self {
            blocks: Vec::new(),
            in_memory,
        }
    }

    /// Creates an empty disk-resident relation.
    pub fn on_disk() -> Self {
        Self::new(false)
    }

    /// Creates an empty in-memory relation.
    pub fn in_memory() -> Self {
        Self::new(true)
    }

    /// Allocates a new block for this relation and returns its handle.
    /// The block is not pinned.
    pub fn append_block(&mut self, manager: &mut BufferManager) -> BlockId {
        let block_id = manager.allocate_block(self.in_memory);
        self.blocks.push(block_id);
        block_id
    }

    /// Returns the block handles in allocation order.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if the relation has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns true if the relation is in-memory.
    pub fn is_in_memory(&self) -> bool {
        self.in_memory
    }
}
