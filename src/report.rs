//! Result comparison and I/O reporting across join strategies.

use std::collections::HashMap;
use std::fmt;

use crate::buffer::BufferManager;
use crate::common::Result;
use crate::execution::Join;
use crate::storage::Relation;
use crate::tuple::Tuple;

/// A multiset of joined tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMultiset {
    counts: HashMap<Tuple, usize>,
    len: usize,
}

impl ResultMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `tuple`.
    pub fn insert(&mut self, tuple: Tuple) {
        *self.counts.entry(tuple).or_insert(0) += 1;
        self.len += 1;
    }

    /// Returns the number of occurrences of `tuple`.
    pub fn count(&self, tuple: &Tuple) -> usize {
        self.counts.get(tuple).copied().unwrap_or(0)
    }

    /// Returns the total number of tuples, counting duplicates.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of distinct tuples.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Iterates distinct tuples with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&Tuple, usize)> {
        self.counts.iter().map(|(t, &c)| (t, c))
    }
}

impl FromIterator<Tuple> for ResultMultiset {
    fn from_iter<I: IntoIterator<Item = Tuple>>(iter: I) -> Self {
        let mut set = ResultMultiset::new();
        for tuple in iter {
            set.insert(tuple);
        }
        set
    }
}

/// Runs `join` and collects its output into a multiset.
pub fn collect_join(
    join: &dyn Join,
    manager: &mut BufferManager,
    relation_a: &Relation,
    attribute_a: usize,
    relation_b: &Relation,
    attribute_b: usize,
) -> Result<ResultMultiset> {
    let mut results = ResultMultiset::new();
    join.join(
        manager,
        relation_a,
        attribute_a,
        relation_b,
        attribute_b,
        &mut |tuple| results.insert(tuple),
    )?;
    Ok(results)
}

/// Figures of one evaluated join strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinReport {
    pub algorithm: &'static str,
    pub estimated_io: u64,
    pub actual_io: u64,
    pub result_size: usize,
    pub matches_reference: bool,
}

impl JoinReport {
    /// Runs `join`, measures its I/O and compares its result with `reference`.
    pub fn evaluate(
        join: &dyn Join,
        manager: &mut BufferManager,
        relation_a: &Relation,
        attribute_a: usize,
        relation_b: &Relation,
        attribute_b: usize,
        reference: &ResultMultiset,
    ) -> Result<Self> {
        let estimated_io = join.estimate_io(relation_a, relation_b);
        let io_before = manager.io_count();
        let results = collect_join(
            join,
            manager,
            relation_a,
            attribute_a,
            relation_b,
            attribute_b,
        )?;
        Ok(Self {
            algorithm: join.name(),
            estimated_io,
            actual_io: manager.io_count() - io_before,
            result_size: results.len(),
            matches_reference: &results == reference,
        })
    }
}

impl fmt::Display for JoinReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.algorithm)?;
        writeln!(f, "IO cost estimate: {}", self.estimated_io)?;
        writeln!(f, "Result size: {}", self.result_size)?;
        writeln!(f, "Result equals NLJ: {}", self.matches_reference)?;
        write!(f, "Real IO cost: {}", self.actual_io)
    }
}
