use super::error::{JoinError, Result};

/// Default maximum number of distinct blocks that may be pinned at once
pub const DEFAULT_MAX_PINNED_BLOCKS: usize = 50;

/// Default maximum size of a block in bytes
pub const DEFAULT_MAX_BLOCK_SIZE: usize = 100_000;

/// Default number of buckets for the hash join
pub const DEFAULT_BUCKET_COUNT: usize = 5;

/// Fixed per-tuple cost used by the size metric
pub const TUPLE_OVERHEAD: usize = 4;

/// Fixed per-attribute cost used by the size metric
pub const ATTRIBUTE_OVERHEAD: usize = 4;

/// Parameters of one join run.
///
/// The core only consumes these values as constructor and call arguments;
/// this struct exists so the driver and tests have one place to validate them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinConfig {
    /// Maximum number of distinct pinned blocks
    pub max_pinned_blocks: usize,
    /// Maximum block size in bytes
    pub max_block_size: usize,
    /// Bucket count for the hash join
    pub bucket_count: usize,
    /// Join attribute of the first relation
    pub join_attribute_a: usize,
    /// Join attribute of the second relation
    pub join_attribute_b: usize,
    /// Repetition factor applied while ingesting the first relation
    pub scale_a: usize,
    /// Repetition factor applied while ingesting the second relation
    pub scale_b: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            max_pinned_blocks: DEFAULT_MAX_PINNED_BLOCKS,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            bucket_count: DEFAULT_BUCKET_COUNT,
            join_attribute_a: 0,
            join_attribute_b: 0,
            scale_a: 1,
            scale_b: 1,
        }
    }
}

impl JoinConfig {
    /// Checks that every capacity and factor is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_pinned_blocks == 0 {
            return Err(JoinError::InvalidConfig(
                "pin capacity must be at least 1".into(),
            ));
        }
        if self.max_block_size <= TUPLE_OVERHEAD {
            return Err(JoinError::InvalidConfig(format!(
                "block size {} cannot hold any tuple",
                self.max_block_size
            )));
        }
        if self.bucket_count == 0 {
            return Err(JoinError::InvalidConfig(
                "bucket count must be at least 1".into(),
            ));
        }
        if self.scale_a == 0 || self.scale_b == 0 {
            return Err(JoinError::InvalidConfig(
                "scale factors must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(JoinConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_values() {
        let config = JoinConfig {
            bucket_count: 0,
            ..JoinConfig::default()
        };
        assert!(matches!(config.validate(), Err(JoinError::InvalidConfig(_))));

        let config = JoinConfig {
            max_pinned_blocks: 0,
            ..JoinConfig::default()
        };
        assert!(matches!(config.validate(), Err(JoinError::InvalidConfig(_))));

        let config = JoinConfig {
            scale_b: 0,
            ..JoinConfig::default()
        };
        assert!(matches!(config.validate(), Err(JoinError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_rejects_tiny_blocks() {
        let config = JoinConfig {
            max_block_size: TUPLE_OVERHEAD,
            ..JoinConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
