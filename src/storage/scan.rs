use crate::buffer::BufferManager;
use crate::common::{BlockId, Result};
use crate::tuple::Tuple;

use super::Relation;

/// Reads a relation tuple by tuple, pinning one block at a time.
///
/// The block holding the next tuple stays pinned between calls to `next_tuple`;
/// it is released when the scan moves past it, reaches the end, or is closed.
#[derive(Debug)]
pub struct RelationScan<'r> {
    blocks: std::slice::Iter<'r, BlockId>,
    current: Option<BlockId>,
    position: usize,
}

impl<'r> RelationScan<'r> {
    /// Creates a scan positioned before the first tuple of `relation`.
    pub fn new(relation: &'r Relation) -> Self {
        Self {
            blocks: relation.blocks().iter(),
            current: None,
            position: 0,
        }
    }

    /// Returns the next tuple, or None once the relation is exhausted.
    pub fn next_tuple(&mut self, manager: &mut BufferManager) -> Result<Option<Tuple>> {
        loop {
            if let Some(block_id) = self.current {
                if let Some(tuple) = manager.read(block_id)?.tuples().get(self.position) {
                    self.position += 1;
                    return Ok(Some(tuple.clone()));
                }
                self.current = None;
                manager.unpin(block_id)?;
            }

            match self.blocks.next() {
                Some(&block_id) => {
                    manager.pin(block_id)?;
                    self.current = Some(block_id);
                    self.position = 0;
                }
                None => return Ok(None),
            }
        }
    }

    /// Releases the block the scan is positioned on.
    pub fn close(mut self, manager: &mut BufferManager) -> Result<()> {
        if let Some(block_id) = self.current.take() {
            manager.unpin(block_id)?;
        }
        Ok(())
    }
}

/// Reads every tuple of a relation in block order.
pub fn collect_relation(manager: &mut BufferManager, relation: &Relation) -> Result<Vec<Tuple>> {
    let mut scan = RelationScan::new(relation);
    let mut tuples = Vec::new();
    while let Some(tuple) = scan.next_tuple(manager)? {
        tuples.push(tuple);
    }
    scan.close(manager)?;
    Ok(tuples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::JoinError;
    use crate::storage::RelationWriter;

    fn build(bm: &mut BufferManager, relation: Relation, keys: &[&str]) -> Relation {
        let mut writer = RelationWriter::open(relation);
        for key in keys {
            writer.append(bm, Tuple::from(&[*key][..])).unwrap();
        }
        writer.close(bm).unwrap()
    }

    #[test]
    fn test_scan_yields_tuples_in_order() {
        let mut bm = BufferManager::new(2, 20); // two 9-byte tuples per block
        let keys = ["1", "2", "3", "4", "5"];
        let relation = build(&mut bm, Relation::on_disk(), &keys);
        assert_eq!(relation.block_count(), 3);

        let tuples = collect_relation(&mut bm, &relation).unwrap();
        let values: Vec<_> = tuples.iter().map(|t| t.value(0).unwrap()).collect();
        assert_eq!(values, keys);
        assert!(bm.pinned_blocks().is_empty());
    }

    #[test]
    fn test_scan_keeps_one_block_pinned() {
        let mut bm = BufferManager::new(2, 20);
        let relation = build(&mut bm, Relation::on_disk(), &["1", "2", "3"]);

        let mut scan = RelationScan::new(&relation);
        scan.next_tuple(&mut bm).unwrap();
        assert_eq!(bm.pinned_blocks(), vec![relation.blocks()[0]]);
        scan.next_tuple(&mut bm).unwrap();
        scan.next_tuple(&mut bm).unwrap();
        assert_eq!(bm.pinned_blocks(), vec![relation.blocks()[1]]);
        scan.close(&mut bm).unwrap();
        assert!(bm.pinned_blocks().is_empty());
    }

    #[test]
    fn test_scan_in_memory_relation_twice_fails() {
        let mut bm = BufferManager::new(2, 20);
        let relation = build(&mut bm, Relation::in_memory(), &["1"]);
        assert!(matches!(
            collect_relation(&mut bm, &relation),
            Err(JoinError::ProtocolViolation(_))
        ));
    }
}
