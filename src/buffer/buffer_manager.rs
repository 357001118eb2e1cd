use std::collections::HashMap;

use log::{debug, warn};

use crate::common::{BlockId, BlockState, JoinError, Result};
use crate::storage::Block;

use super::{BlockGate, BlockReadGuard, BlockWriteGuard};

/// A registered block together with its lifecycle gate
struct Frame {
    block: Block,
    gate: BlockGate,
}

/// Snapshot of the buffer manager's counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferStats {
    /// Total charged I/O operations (loads + writes)
    pub io_count: u64,
    /// Charged page loads
    pub loads: u64,
    /// Charged page writes
    pub writes: u64,
    /// Distinct blocks currently pinned
    pub pinned_blocks: usize,
    /// Blocks allocated since construction
    pub allocated_blocks: usize,
}

/// BufferManager is the sole authority over block lifecycle.
///
/// It allocates blocks, keeps a reference-counted table of pinned blocks,
/// bounds the number of distinct pinned blocks, and charges one simulated
/// I/O operation for every page load and every page write.
///
/// Block contents are reachable only through [`BufferManager::read`] and
/// [`BufferManager::write`], which fail unless the block is resident.
pub struct BufferManager {
    /// Maximum number of distinct pinned blocks
    max_pinned_blocks: usize,
    /// Maximum size of a block in bytes
    max_block_size: usize,
    /// Block table, indexed by block ID
    frames: Vec<Frame>,
    /// Pin table: pin reference count per pinned block
    pins: HashMap<BlockId, u32>,
    loads: u64,
    writes: u64,
}

impl BufferManager {
    /// Creates a new BufferManager that keeps at most `max_pinned_blocks`
    /// blocks pinned, each holding at most `max_block_size` bytes of tuples.
    pub fn new(max_pinned_blocks: usize, max_block_size: usize) -> Self {
        Self {
            max_pinned_blocks,
            max_block_size,
            frames: Vec::new(),
            pins: HashMap::new(),
            loads: 0,
            writes: 0,
        }
    }

    /// Allocates a new block. In-memory blocks start fresh, disk blocks start
    /// unloaded. Allocation is never bounded by the pin capacity.
    pub fn allocate_block(&mut self, in_memory: bool) -> BlockId {
        let block_id = BlockId::new(self.frames.len() as u32);
        self.frames.push(Frame {
            block: Block::new(self.max_block_size),
            gate: BlockGate::new(in_memory),
        });
        debug!("allocated {} (in_memory={})", block_id, in_memory);
        block_id
    }

    /// Pins a block, loading it if necessary.
    ///
    /// The first pin of a block checks that the block may be pinned again and
    /// that a pin slot is free before anything changes, so a failed pin
    /// leaves the manager exactly as it was.
    pub fn pin(&mut self, block_id: BlockId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(block_id.as_usize())
            .ok_or(JoinError::UnknownBlock(block_id))?;

        if let Some(count) = self.pins.get_mut(&block_id) {
            *count += 1;
            return Ok(());
        }

        frame.gate.check_pinnable()?;
        if self.pins.len() >= self.max_pinned_blocks {
            warn!(
                "rejected pin of {}: {} of {} slots in use",
                block_id,
                self.pins.len(),
                self.max_pinned_blocks
            );
            return Err(JoinError::CapacityExceeded {
                capacity: self.max_pinned_blocks,
            });
        }

        if frame.gate.pin()? {
            self.loads += 1;
            debug!("loaded {}", block_id);
        }
        self.pins.insert(block_id, 1);
        Ok(())
    }

    /// Unpins a block, writing it back if it is dirty and this was the last pin.
    pub fn unpin(&mut self, block_id: BlockId) -> Result<()> {
        let frame = self
            .frames
            .get_mut(block_id.as_usize())
            .ok_or(JoinError::UnknownBlock(block_id))?;

        let count = self.pins.get_mut(&block_id).ok_or_else(|| {
            JoinError::protocol(format!("cannot unpin {} that is not pinned", block_id))
        })?;
        *count -= 1;
        if *count > 0 {
            return Ok(());
        }

        self.pins.remove(&block_id);
        if frame.gate.unpin() {
            self.writes += 1;
            debug!("wrote {}", block_id);
        }
        Ok(())
    }

    /// Returns read access to a resident block.
    pub fn read(&self, block_id: BlockId) -> Result<BlockReadGuard<'_>> {
        let frame = self
            .frames
            .get(block_id.as_usize())
            .ok_or(JoinError::UnknownBlock(block_id))?;
        if !frame.gate.can_access() {
            return Err(JoinError::protocol(format!(
                "cannot read from unpinned {}",
                block_id
            )));
        }
        Ok(BlockReadGuard::new(block_id, &frame.block))
    }

    /// Returns write access to a resident block.
    pub fn write(&mut self, block_id: BlockId) -> Result<BlockWriteGuard<'_>> {
        let frame = self
            .frames
            .get_mut(block_id.as_usize())
            .ok_or(JoinError::UnknownBlock(block_id))?;
        if !frame.gate.can_access() {
            return Err(JoinError::protocol(format!(
                "cannot write to unpinned {}",
                block_id
            )));
        }
        let Frame { block, gate } = frame;
        Ok(BlockWriteGuard::new(block_id, block, gate))
    }

    /// Returns the number of blocks that can still be pinned.
    pub fn free_pin_slots(&self) -> usize {
        self.max_pinned_blocks.saturating_sub(self.pins.len())
    }

    /// Returns the number of I/O operations since construction.
    pub fn io_count(&self) -> u64 {
        self.loads + self.writes
    }

    /// Returns the pin count of a block, or None for an unknown block.
    pub fn pin_count(&self, block_id: BlockId) -> Option<u32> {
        if block_id.as_usize() >= self.frames.len() {
            return None;
        }
        Some(self.pins.get(&block_id).copied().unwrap_or(0))
    }

    /// Returns true if the block is currently pinned.
    pub fn is_pinned(&self, block_id: BlockId) -> bool {
        self.pins.contains_key(&block_id)
    }

    /// Returns the distinct pinned blocks in ascending order.
    pub fn pinned_blocks(&self) -> Vec<BlockId> {
        let mut pinned: Vec<_> = self.pins.keys().copied().collect();
        pinned.sort();
        pinned
    }

    /// Returns the lifecycle state of a block.
    pub fn block_state(&self, block_id: BlockId) -> Option<BlockState> {
        self.frames
            .get(block_id.as_usize())
            .map(|frame| frame.gate.state())
    }

    /// Returns whether a block was allocated as in-memory.
    pub fn is_in_memory(&self, block_id: BlockId) -> Option<bool> {
        self.frames
            .get(block_id.as_usize())
            .map(|frame| frame.gate.is_in_memory())
    }

    /// Returns the pin capacity.
    pub fn max_pinned_blocks(&self) -> usize {
        self.max_pinned_blocks
    }

    /// Returns the block capacity in bytes.
    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Returns the number of blocks allocated so far.
    pub fn allocated_blocks(&self) -> usize {
        self.frames.len()
    }

    /// Returns a snapshot of all counters.
    pub fn stats(&self) -> BufferStats {
        BufferStats {
            io_count: self.io_count(),
            loads: self.loads,
            writes: self.writes,
            pinned_blocks: self.pins.len(),
            allocated_blocks: self.frames.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple::Tuple;

    fn tuple(value: &str) -> Tuple {
        Tuple::from(&[value][..])
    }

    #[test]
    fn test_buffer_manager_new() {
        let bm = BufferManager::new(4, 128);
        assert_eq!(bm.max_pinned_blocks(), 4);
        assert_eq!(bm.max_block_size(), 128);
        assert_eq!(bm.free_pin_slots(), 4);
        assert_eq!(bm.io_count(), 0);
        assert_eq!(bm.stats(), BufferStats::default());
    }

    #[test]
    fn test_buffer_manager_allocate_block() {
        let mut bm = BufferManager::new(1, 128);
        let disk = bm.allocate_block(false);
        let mem = bm.allocate_block(true);

        assert_eq!(disk, BlockId::new(0));
        assert_eq!(mem, BlockId::new(1));
        assert_eq!(bm.block_state(disk), Some(BlockState::Unloaded));
        assert_eq!(bm.block_state(mem), Some(BlockState::Fresh));
        assert_eq!(bm.is_in_memory(mem), Some(true));
        assert_eq!(bm.pin_count(disk), Some(0));
        assert_eq!(bm.pin_count(BlockId::new(7)), None);
        // allocation is not bounded by pin capacity
        assert_eq!(bm.free_pin_slots(), 1);
    }

    #[test]
    fn test_buffer_manager_disk_block_io() {
        let mut bm = BufferManager::new(2, 128);
        let block = bm.allocate_block(false);

        bm.pin(block).unwrap();
        assert_eq!(bm.io_count(), 1);
        assert!(bm.write(block).unwrap().append(&tuple("a")));
        bm.unpin(block).unwrap();
        assert_eq!(bm.io_count(), 2);
        assert_eq!(bm.block_state(block), Some(BlockState::Unloaded));

        // clean reread costs one load and a free release
        bm.pin(block).unwrap();
        assert_eq!(bm.read(block).unwrap().len(), 1);
        bm.unpin(block).unwrap();

        let stats = bm.stats();
        assert_eq!(stats.loads, 2);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.io_count, 3);
    }

    #[test]
    fn test_buffer_manager_in_memory_block() {
        let mut bm = BufferManager::new(2, 128);
        let block = bm.allocate_block(true);

        bm.pin(block).unwrap();
        bm.write(block).unwrap().append(&tuple("a"));
        bm.unpin(block).unwrap();
        assert_eq!(bm.io_count(), 0);

        assert!(matches!(
            bm.pin(block),
            Err(JoinError::ProtocolViolation(_))
        ));
        assert!(!bm.is_pinned(block));
        assert_eq!(bm.free_pin_slots(), 2);
    }

    #[test]
    fn test_buffer_manager_discarded_block_with_full_pin_table() {
        let mut bm = BufferManager::new(1, 128);
        let discarded = bm.allocate_block(true);
        let other = bm.allocate_block(false);

        bm.pin(discarded).unwrap();
        bm.unpin(discarded).unwrap();
        bm.pin(other).unwrap();
        assert_eq!(bm.free_pin_slots(), 0);

        assert!(matches!(
            bm.pin(discarded),
            Err(JoinError::ProtocolViolation(_))
        ));
        assert_eq!(bm.pinned_blocks(), vec![other]);
    }

    #[test]
    fn test_buffer_manager_nested_pins() {
        let mut bm = BufferManager::new(1, 128);
        let block = bm.allocate_block(false);

        bm.pin(block).unwrap();
        bm.pin(block).unwrap();
        assert_eq!(bm.pin_count(block), Some(2));
        assert_eq!(bm.io_count(), 1);
        assert_eq!(bm.free_pin_slots(), 0);

        bm.unpin(block).unwrap();
        assert!(bm.read(block).is_ok());
        bm.unpin(block).unwrap();
        assert!(bm.read(block).is_err());
    }

    #[test]
    fn test_buffer_manager_capacity() {
        let mut bm = BufferManager::new(2, 128);
        let blocks: Vec<_> = (0..3).map(|_| bm.allocate_block(false)).collect();

        bm.pin(blocks[0]).unwrap();
        bm.pin(blocks[1]).unwrap();
        let before = bm.stats();

        assert!(matches!(
            bm.pin(blocks[2]),
            Err(JoinError::CapacityExceeded { capacity: 2 })
        ));
        assert_eq!(bm.stats(), before);
        assert_eq!(bm.pinned_blocks(), vec![blocks[0], blocks[1]]);
        assert_eq!(bm.block_state(blocks[2]), Some(BlockState::Unloaded));

        // re-pinning an already pinned block needs no slot
        bm.pin(blocks[1]).unwrap();
        assert_eq!(bm.pin_count(blocks[1]), Some(2));
    }

    #[test]
    fn test_buffer_manager_unpin_unpinned() {
        let mut bm = BufferManager::new(2, 128);
        let block = bm.allocate_block(false);

        assert!(matches!(
            bm.unpin(block),
            Err(JoinError::ProtocolViolation(_))
        ));
        assert!(matches!(
            bm.unpin(BlockId::new(9)),
            Err(JoinError::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_buffer_manager_access_requires_pin() {
        let mut bm = BufferManager::new(2, 128);
        let block = bm.allocate_block(true);

        assert!(matches!(
            bm.read(block),
            Err(JoinError::ProtocolViolation(_))
        ));
        assert!(matches!(
            bm.write(block),
            Err(JoinError::ProtocolViolation(_))
        ));
    }
}
