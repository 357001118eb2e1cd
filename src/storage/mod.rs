mod block;
mod relation;
mod scan;
mod writer;

pub use block::Block;
pub use relation::Relation;
pub use scan::{collect_relation, RelationScan};
pub use writer::RelationWriter;
