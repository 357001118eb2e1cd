mod block_guard;
mod buffer_manager;
mod gate;

pub use block_guard::*;
pub use buffer_manager::*;
pub(crate) use gate::BlockGate;
