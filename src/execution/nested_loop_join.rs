use log::info;

use crate::buffer::BufferManager;
use crate::common::{BlockId, Result};
use crate::storage::Relation;
use crate::tuple::Tuple;

use super::{cross_product, Join};

/// Block-nested-loop equi-join.
///
/// The relation with fewer blocks drives the outer loop (ties go to the first
/// argument). Each outer block is read once and the whole inner relation is
/// read once per outer block, with exactly one outer and one inner block
/// pinned at a time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NestedLoopEquiJoin;

impl NestedLoopEquiJoin {
    pub fn new() -> Self {
        Self
    }

    /// Returns true if `relation_b` is used as the outer relation.
    fn swapped(relation_a: &Relation, relation_b: &Relation) -> bool {
        relation_b.block_count() < relation_a.block_count()
    }

    fn join_blocks(
        manager: &BufferManager,
        block_a: BlockId,
        attribute_a: usize,
        block_b: BlockId,
        attribute_b: usize,
        sink: &mut dyn FnMut(Tuple),
    ) -> Result<()> {
        let left = manager.read(block_a)?;
        let right = manager.read(block_b)?;
        cross_product(left.tuples(), attribute_a, right.tuples(), attribute_b, sink)
    }
}

impl Join for NestedLoopEquiJoin {
    fn name(&self) -> &'static str {
        "NestedLoopEquiJoin"
    }

    fn join(
        &self,
        manager: &mut BufferManager,
        relation_a: &Relation,
        attribute_a: usize,
        relation_b: &Relation,
        attribute_b: usize,
        sink: &mut dyn FnMut(Tuple),
    ) -> Result<()> {
        let swapped = Self::swapped(relation_a, relation_b);
        let (outer, inner) = if swapped {
            (relation_b, relation_a)
        } else {
            (relation_a, relation_b)
        };
        let io_before = manager.io_count();

        for &outer_block in outer.blocks() {
            manager.pin(outer_block)?;
            for &inner_block in inner.blocks() {
                manager.pin(inner_block)?;
                // results are always shaped [a..., b...]
                let (block_a, block_b) = if swapped {
                    (inner_block, outer_block)
                } else {
                    (outer_block, inner_block)
                };
                Self::join_blocks(manager, block_a, attribute_a, block_b, attribute_b, sink)?;
                manager.unpin(inner_block)?;
            }
            manager.unpin(outer_block)?;
        }

        info!(
            "nested loop join of {}x{} blocks finished with {} I/O",
            outer.block_count(),
            inner.block_count(),
            manager.io_count() - io_before
        );
        Ok(())
    }

    fn estimate_io(&self, relation_a: &Relation, relation_b: &Relation) -> u64 {
        let (outer, inner) = if Self::swapped(relation_a, relation_b) {
            (relation_b, relation_a)
        } else {
            (relation_a, relation_b)
        };
        outer.block_count() as u64 * (1 + inner.block_count() as u64)
    }
}
