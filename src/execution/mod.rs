mod hash_join;
mod join;
mod nested_loop_join;

pub use hash_join::HashEquiJoin;
pub use join::{cross_product, Join};
pub use nested_loop_join::NestedLoopEquiJoin;
