use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::{debug, info};

use crate::buffer::BufferManager;
use crate::common::{BlockId, JoinError, Result};
use crate::storage::{Relation, RelationWriter};
use crate::tuple::Tuple;

use super::{Join, NestedLoopEquiJoin};

/// Output of partitioning one relation
struct Partitions {
    /// One disk-resident relation per bucket
    buckets: Vec<Relation>,
    /// Buffered output blocks that are still pinned
    retained: Vec<BlockId>,
}

/// Grace-style hash equi-join with a single partitioning level.
///
/// Both relations are split into `bucket_count` partitions by a hash of the
/// join attribute, then each pair of non-empty partitions is joined with a
/// [`NestedLoopEquiJoin`].
///
/// ## Pin usage
///
/// Partitioning keeps one input block plus one buffered output block per
/// non-empty bucket pinned. The build side (`relation_a`) releases its output
/// buffers when partitioning ends. With probe retention enabled (the
/// default), the probe side (`relation_b`) keeps its last output block per
/// bucket pinned through the join phase, so those blocks are not reloaded,
/// and releases them after the last bucket is joined. This needs up to
/// `bucket_count + 2` pin slots during the join phase instead of 2; callers
/// that cannot afford it can disable retention. A bucket count that is too
/// large for the pin capacity fails with `CapacityExceeded`.
#[derive(Debug, Clone)]
pub struct HashEquiJoin {
    bucket_count: usize,
    retain_probe_buffers: bool,
}

impl HashEquiJoin {
    /// Creates a hash join with `bucket_count` buckets and probe retention enabled.
    pub fn new(bucket_count: usize) -> Result<Self> {
        if bucket_count == 0 {
            return Err(JoinError::InvalidConfig(
                "bucket count must be at least 1".into(),
            ));
        }
        Ok(Self {
            bucket_count,
            retain_probe_buffers: true,
        })
    }

    /// Enables or disables keeping the probe side's output buffers pinned
    /// between partitioning and joining.
    pub fn with_probe_retention(mut self, retain: bool) -> Self {
        self.retain_probe_buffers = retain;
        self
    }

    /// Returns the number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Returns whether probe-side output buffers stay pinned across phases.
    pub fn retains_probe_buffers(&self) -> bool {
        self.retain_probe_buffers
    }

    /// Returns the bucket a join attribute value is routed to.
    pub fn bucket_for(&self, value: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        (hasher.finish() % self.bucket_count as u64) as usize
    }

    fn partition(
        &self,
        manager: &mut BufferManager,
        relation: &Relation,
        attribute: usize,
        retain: bool,
    ) -> Result<Partitions> {
        let mut writers: Vec<RelationWriter> = (0..self.bucket_count)
            .map(|_| RelationWriter::open(Relation::on_disk()))
            .collect();

        for &block_id in relation.blocks() {
            manager.pin(block_id)?;
            let tuples = manager.read(block_id)?.tuples().to_vec();
            for tuple in tuples {
                let bucket = self.bucket_for(tuple.attribute(attribute)?);
                writers[bucket].append(manager, tuple)?;
            }
            manager.unpin(block_id)?;
        }

        let mut buckets = Vec::with_capacity(self.bucket_count);
        let mut retained = Vec::new();
        for writer in writers {
            if retain {
                let (bucket, block_id) = writer.finish_retained();
                retained.extend(block_id);
                buckets.push(bucket);
            } else {
                buckets.push(writer.close(manager)?);
            }
        }

        debug!(
            "partitioned {} blocks into {} buckets ({} buffers retained)",
            relation.block_count(),
            buckets.iter().filter(|b| !b.is_empty()).count(),
            retained.len()
        );
        Ok(Partitions { buckets, retained })
    }
}

impl Join for HashEquiJoin {
    fn name(&self) -> &'static str {
        "HashEquiJoin"
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
        let io_before = manager.io_count();

        let build = self.partition(manager, relation_a, attribute_a, false)?;
        let probe = self.partition(manager, relation_b, attribute_b, self.retain_probe_buffers)?;

        let nested_loop = NestedLoopEquiJoin::new();
        for (bucket_a, bucket_b) in build.buckets.iter().zip(&probe.buckets) {
            if bucket_a.is_empty() || bucket_b.is_empty() {
                continue;
            }
            nested_loop.join(manager, bucket_a, attribute_a, bucket_b, attribute_b, sink)?;
        }

        for block_id in probe.retained {
            manager.unpin(block_id)?;
        }

        info!(
            "hash join with {} buckets finished with {} I/O",
            self.bucket_count,
            manager.io_count() - io_before
        );
        Ok(())
    }

    fn estimate_io(&self, relation_a: &Relation, relation_b: &Relation) -> u64 {
        3 * (relation_a.block_count() + relation_b.block_count()) as u64
    }
}
