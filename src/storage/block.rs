use crate::common::Result;
use crate::tuple::Tuple;

/// A bounded buffer of tuples standing in for one page of a relation.
///
/// A block owns no lifecycle state. It lives inside the `BufferManager` and
/// is only reachable through the manager's read and write guards, which check
/// that the block is pinned.
#[derive(Debug, Clone)]
pub struct Block {
    tuples: Vec<Tuple>,
    capacity: usize,
    used: usize,
}

impl Block {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            tuples: Vec::new(),
            capacity,
            used: 0,
        }
    }

    /// Returns the number of stored tuples.
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Returns true if the block holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Returns the maximum size of the block in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of bytes taken by the stored tuples.
    pub fn used_bytes(&self) -> usize {
        self.used
    }

    /// Returns the number of bytes still available.
    pub fn remaining(&self) -> usize {
        self.capacity - self.used
    }

    /// Returns true if `tuple` fits into the remaining capacity.
    pub fn fits(&self, tuple: &Tuple) -> bool {
        tuple.size_in_bytes() <= self.remaining()
    }

    /// Returns a copy of the stored tuples in ascending order of the given
    /// attribute. Tuples with equal attribute values keep insertion order.
    pub fn scan_sorted_by(&self, attribute: usize) -> Result<Vec<Tuple>> {
        for tuple in &self.tuples {
            tuple.attribute(attribute)?;
        }
        let mut sorted = self.tuples.clone();
        sorted.sort_by(|a, b| a.value(attribute).cmp(&b.value(attribute)));
        Ok(sorted)
    }

    pub(crate) fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Stores a tuple. The caller has checked `fits`.
    pub(crate) fn push(&mut self, tuple: Tuple) {
        debug_assert!(self.fits(&tuple));
        self.used += tuple.size_in_bytes();
        self.tuples.push(tuple);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::JoinError;

    fn row(values: &[&str]) -> Tuple {
        Tuple::from(values)
    }

    #[test]
    fn test_block_capacity_accounting() {
        let mut block = Block::new(30);
        let tuple = row(&["abcd"]); // 12 bytes

        assert!(block.fits(&tuple));
        block.push(tuple.clone());
        block.push(tuple.clone());
        assert_eq!(block.used_bytes(), 24);
        assert_eq!(block.remaining(), 6);
        assert!(!block.fits(&tuple));
        assert_eq!(block.len(), 2);
    }

    #[test]
    fn test_block_exact_fit() {
        let mut block = Block::new(12);
        let tuple = row(&["abcd"]);
        assert!(block.fits(&tuple));
        block.push(tuple);
        assert_eq!(block.remaining(), 0);
    }

    #[test]
    fn test_block_scan_sorted_by() {
        let mut block = Block::new(1024);
        block.push(row(&["b", "1"]));
        block.push(row(&["a", "2"]));
        block.push(row(&["b", "0"]));
        block.push(row(&["10", "3"]));

        let sorted = block.scan_sorted_by(0).unwrap();
        let keys: Vec<_> = sorted.iter().map(|t| t.values().to_vec()).collect();
        assert_eq!(
            keys,
            vec![
                vec!["10", "3"],
                vec!["a", "2"],
                vec!["b", "1"],
                vec!["b", "0"],
            ]
        );
        // the block itself keeps insertion order
        assert_eq!(block.tuples()[0], row(&["b", "1"]));
    }

    #[test]
    fn test_block_scan_sorted_by_out_of_range() {
        let mut block = Block::new(1024);
        block.push(row(&["x"]));
        assert!(matches!(
            block.scan_sorted_by(1),
            Err(JoinError::AttributeOutOfRange { .. })
        ));
    }
}
