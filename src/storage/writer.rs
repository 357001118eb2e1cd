use log::debug;

use crate::buffer::BufferManager;
use crate::common::{BlockId, JoinError, Result};
use crate::tuple::Tuple;

use super::Relation;

/// Appends a stream of tuples to a relation, taking care of block allocation
/// and pinning.
///
/// The writer keeps exactly one block of the relation pinned: the block that
/// is currently being filled. When that block rejects a tuple it is unpinned
/// and a fresh block is allocated and pinned. The first block is allocated on
/// the first append, so a writer that never receives a tuple leaves the
/// relation unchanged.
///
/// ```rust
/// use blockjoin::buffer::BufferManager;
/// use blockjoin::storage::{Relation, RelationWriter};
/// use blockjoin::tuple::Tuple;
///
/// let mut bm = BufferManager::new(4, 64);
/// let mut writer = RelationWriter::open(Relation::on_disk());
/// for key in ["1", "2", "3"] {
///     writer.append(&mut bm, Tuple::from(&[key, "payload"][..])).unwrap();
/// }
/// let relation = writer.close(&mut bm).unwrap();
/// assert!(relation.block_count() >= 1);
/// assert!(bm.pinned_blocks().is_empty());
/// ```
#[derive(Debug)]
pub struct RelationWriter {
    relation: Relation,
    current: Option<BlockId>,
}

impl RelationWriter {
    /// Opens a writer that appends to `relation`.
    pub fn open(relation: Relation) -> Self {
        Self {
            relation,
            current: None,
        }
    }

    /// Appends a tuple, moving on to a new block when the current one is full.
    ///
    /// Fails with `BlockTooSmall` if the tuple does not even fit into an
    /// empty block.
    pub fn append(&mut self, manager: &mut BufferManager, tuple: Tuple) -> Result<()> {
        let tuple_size = tuple.size_in_bytes();
        if tuple_size > manager.max_block_size() {
            return Err(JoinError::BlockTooSmall {
                tuple_size,
                block_size: manager.max_block_size(),
            });
        }

        if let Some(block_id) = self.current {
            if manager.write(block_id)?.append(&tuple) {
                return Ok(());
            }
            self.current = None;
            manager.unpin(block_id)?;
        }

        let block_id = self.relation.append_block(manager);
        manager.pin(block_id)?;
        self.current = Some(block_id);
        debug!("writer moved to {}", block_id);

        if manager.write(block_id)?.append(&tuple) {
            Ok(())
        } else {
            Err(JoinError::BlockTooSmall {
                tuple_size,
                block_size: manager.max_block_size(),
            })
        }
    }

    /// Returns the block currently being filled, if any.
    pub fn current_block(&self) -> Option<BlockId> {
        self.current
    }

    /// Returns the relation written so far.
    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    /// Releases the pin on the last block and returns the relation.
    pub fn close(self, manager: &mut BufferManager) -> Result<Relation> {
        if let Some(block_id) = self.current {
            manager.unpin(block_id)?;
        }
        Ok(self.relation)
    }

    /// Returns the relation without releasing the last block.
    ///
    /// The returned block (if any) is still pinned once and the caller is
    /// responsible for unpinning it.
    pub fn finish_retained(self) -> (Relation, Option<BlockId>) {
        (self.relation, self.current)
    }
}
