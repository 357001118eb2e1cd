use thiserror::Error;

use super::types::BlockId;

/// Join engine error types
#[derive(Error, Debug)]
pub enum JoinError {
    #[error("cannot pin block: all {capacity} pin slots are in use")]
    CapacityExceeded { capacity: usize },

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("block size too small: tuple of {tuple_size} bytes exceeds block size {block_size}")]
    BlockTooSmall { tuple_size: usize, block_size: usize },

    #[error("{0} is not managed by this buffer manager")]
    UnknownBlock(BlockId),

    #[error("attribute index {index} out of range for tuple of arity {arity}")]
    AttributeOutOfRange { index: usize, arity: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
}

impl JoinError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        JoinError::ProtocolViolation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, JoinError>;
