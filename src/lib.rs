//! Blockjoin - buffer-managed equi-joins with simulated I/O accounting
//!
//! This crate models relational join processing over disk-resident data
//! under a fixed memory budget. Every block access goes through a buffer
//! manager that bounds the number of pinned blocks and charges one simulated
//! I/O operation per page load and page write, so join strategies can be
//! compared by their real I/O cost.
//!
//! # Architecture
//!
//! - **Tuple** (`tuple`): immutable string rows with a byte-size metric
//!
//! - **Buffer** (`buffer`): block lifecycle management
//!   - `BufferManager`: pin/unpin protocol, pin capacity, I/O ledger
//!   - `BlockReadGuard`/`BlockWriteGuard`: checked access to pinned blocks
//!
//! - **Storage** (`storage`): blocks and relations
//!   - `Block`: bounded tuple buffer
//!   - `Relation`: append-only list of blocks
//!   - `RelationWriter`/`RelationScan`: sequential write and read helpers
//!
//! - **Execution** (`execution`): join strategies
//!   - `NestedLoopEquiJoin`: block-nested-loop join
//!   - `HashEquiJoin`: partitioning hash join
//!
//! - **Loader** (`loader`) and **Report** (`report`): tab-separated input and
//!   result comparison used by the command-line driver
//!
//! # Example
//!
//! ```rust
//! use blockjoin::buffer::BufferManager;
//! use blockjoin::execution::{HashEquiJoin, Join, NestedLoopEquiJoin};
//! use blockjoin::storage::{Relation, RelationWriter};
//! use blockjoin::tuple::Tuple;
//!
//! // At most 10 pinned blocks of 64 bytes each
//! let mut bm = BufferManager::new(10, 64);
//!
//! let mut writer = RelationWriter::open(Relation::on_disk());
//! for key in ["1", "2", "1"] {
//!     writer.append(&mut bm, Tuple::from(&[key][..])).unwrap();
//! }
//! let left = writer.close(&mut bm).unwrap();
//!
//! let mut writer = RelationWriter::open(Relation::on_disk());
//! for key in ["1", "3"] {
//!     writer.append(&mut bm, Tuple::from(&[key][..])).unwrap();
//! }
//! let right = writer.close(&mut bm).unwrap();
//!
//! let mut results = Vec::new();
//! NestedLoopEquiJoin::new()
//!     .join(&mut bm, &left, 0, &right, 0, &mut |t| results.push(t))
//!     .unwrap();
//! assert_eq!(results.len(), 2);
//!
//! let hash = HashEquiJoin::new(4).unwrap();
//! let mut hashed = Vec::new();
//! hash.join(&mut bm, &left, 0, &right, 0, &mut |t| hashed.push(t))
//!     .unwrap();
//! assert_eq!(hashed.len(), 2);
//! ```

pub mod buffer;
pub mod common;
pub mod execution;
pub mod loader;
pub mod report;
pub mod storage;
pub mod tuple;

// Re-export commonly used types at the crate root
pub use common::{BlockId, BlockState, JoinError, Result};
