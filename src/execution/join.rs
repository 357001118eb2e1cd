use crate::buffer::BufferManager;
use crate::common::Result;
use crate::storage::Relation;
use crate::tuple::Tuple;

/// An equi-join strategy operating on relations through a `BufferManager`.
///
/// For every pair `(a, b)` with `a[attribute_a] == b[attribute_b]` a join
/// emits exactly one tuple `[a..., b...]` to `sink`. The order of emitted
/// tuples is strategy-specific but deterministic for fixed inputs; the
/// multiset of results is the same for every correct strategy.
pub trait Join {
    /// Returns a short, human readable name of the strategy.
    fn name(&self) -> &'static str;

    /// Joins `relation_a` and `relation_b` on the given attributes.
    ///
    /// Every block pinned during the call is unpinned again before it returns
    /// successfully. On error the call aborts immediately.
    fn join(
        &self,
        manager: &mut BufferManager,
        relation_a: &Relation,
        attribute_a: usize,
        relation_b: &Relation,
        attribute_b: usize,
        sink: &mut dyn FnMut(Tuple),
    ) -> Result<()>;

    /// Predicts the number of I/O operations from the block counts alone.
    fn estimate_io(&self, relation_a: &Relation, relation_b: &Relation) -> u64;
}

/// Emits `[a..., b...]` for every matching pair of `left` and `right` tuples.
///
/// This is the only place where the join predicate and the shape of a joined
/// tuple are defined; every strategy goes through it.
pub fn cross_product(
    left: &[Tuple],
    attribute_a: usize,
    right: &[Tuple],
    attribute_b: usize,
    sink: &mut dyn FnMut(Tuple),
) -> Result<()> {
    for a in left {
        let key = a.attribute(attribute_a)?;
        for b in right {
            if key == b.attribute(attribute_b)? {
                sink(a.concat(b));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::JoinError;

    fn rows(keys: &[&str]) -> Vec<Tuple> {
        keys.iter().map(|k| Tuple::from(&[*k, "v"][..])).collect()
    }

    #[test]
    fn test_cross_product_matches() {
        let left = rows(&["1", "2", "1"]);
        let right: Vec<Tuple> = vec![
            Tuple::from(&["x", "1"][..]),
            Tuple::from(&["y", "3"][..]),
        ];

        let mut out = Vec::new();
        cross_product(&left, 0, &right, 1, &mut |t| out.push(t)).unwrap();

        assert_eq!(out.len(), 2);
        for t in &out {
            assert_eq!(t.values(), &["1", "v", "x", "1"]);
        }
    }

    #[test]
    fn test_cross_product_empty_side() {
        let mut out = Vec::new();
        cross_product(&[], 0, &rows(&["1"]), 0, &mut |t| out.push(t)).unwrap();
        cross_product(&rows(&["1"]), 0, &[], 0, &mut |t| out.push(t)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_cross_product_attribute_out_of_range() {
        let result = cross_product(&rows(&["1"]), 2, &rows(&["1"]), 0, &mut |_| {});
        assert!(matches!(
            result,
            Err(JoinError::AttributeOutOfRange { index: 2, arity: 2 })
        ));
    }
}
