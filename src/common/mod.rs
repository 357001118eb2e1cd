pub mod config;
mod error;
mod types;

pub use config::*;
pub use error::{JoinError, Result};
pub use types::{BlockId, BlockState};
