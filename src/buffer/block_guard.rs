use std::ops::Deref;

use crate::common::BlockId;
use crate::storage::Block;
use crate::tuple::Tuple;

use super::BlockGate;

/// Read access to a pinned block.
///
/// The guard borrows the `BufferManager`, so the block cannot be unpinned
/// while any guard for it is alive.
pub struct BlockReadGuard<'a> {
    block_id: BlockId,
    block: &'a Block,
}

impl<'a> BlockReadGuard<'a> {
    pub(crate) fn new(block_id: BlockId, block: &'a Block) -> Self {
        Self { block_id, block }
    }

    /// Returns the block ID.
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Returns the stored tuples in insertion order.
    pub fn tuples(&self) -> &'a [Tuple] {
        self.block.tuples()
    }

    /// Iterates the stored tuples in insertion order.
    pub fn scan(&self) -> std::slice::Iter<'a, Tuple> {
        self.block.tuples().iter()
    }
}

impl Deref for BlockReadGuard<'_> {
    type Target = Block;

    fn deref(&self) -> &Self::Target {
        self.block
    }
}

/// Read-write access to a pinned block.
/// Appending a tuple marks the block dirty.
pub struct BlockWriteGuard<'a> {
    block_id: BlockId,
    block: &'a mut Block,
    gate: &'a mut BlockGate,
}

impl<'a> BlockWriteGuard<'a> {
    pub(crate) fn new(block_id: BlockId, block: &'a mut Block, gate: &'a mut BlockGate) -> Self {
        Self {
            block_id,
            block,
            gate,
        }
    }

    /// Returns the block ID.
    pub fn block_id(&self) -> BlockId {
        self.block_id
    }

    /// Stores `tuple` if it fits into the remaining capacity.
    /// Returns false and leaves the block untouched otherwise.
    pub fn append(&mut self, tuple: &Tuple) -> bool {
        if !self.block.fits(tuple) {
            return false;
        }
        self.gate.mark_dirty();
        self.block.push(tuple.clone());
        true
    }

    /// Returns the stored tuples in insertion order.
    pub fn tuples(&self) -> &[Tuple] {
        self.block.tuples()
    }
}

impl Deref for BlockWriteGuard<'_> {
    type Target = Block;

    fn deref(&self) -> &Self::Target {
        &*self.block
    }
}
