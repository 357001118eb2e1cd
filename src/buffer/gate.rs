use crate::common::{BlockState, JoinError, Result};

/// BlockGate tracks the lifecycle of a single block.
///
/// Gates are created and owned exclusively by the `BufferManager`; blocks and
/// relations never see them. The boolean results of `pin` and `unpin` tell
/// the manager whether the transition has to be charged as one I/O operation.
#[derive(Debug, Clone)]
pub(crate) struct BlockGate {
    state: BlockState,
    in_memory: bool,
}

impl BlockGate {
    /// Creates a gate for a newly allocated block. In-memory blocks start
    /// fresh, disk blocks start unloaded.
    pub(crate) fn new(in_memory: bool) -> Self {
        let state = if in_memory {
            BlockState::Fresh
        } else {
            BlockState::Unloaded
        };
        Self { state, in_memory }
    }

    pub(crate) fn state(&self) -> BlockState {
        self.state
    }

    pub(crate) fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Fails without changing state if the block may not be pinned again.
    pub(crate) fn check_pinnable(&self) -> Result<()> {
        if self.in_memory && self.state != BlockState::Fresh {
            return Err(JoinError::protocol(
                "cannot pin in-memory block again after it was released",
            ));
        }
        Ok(())
    }

    /// Makes the block resident. Returns true if this required a page load.
    pub(crate) fn pin(&mut self) -> Result<bool> {
        self.check_pinnable()?;
        let load = self.state == BlockState::Unloaded;
        self.state = BlockState::Loaded;
        Ok(load)
    }

    /// Releases the block. Returns true if this required a page write.
    pub(crate) fn unpin(&mut self) -> bool {
        let write = self.state == BlockState::Dirty;
        self.state = BlockState::Unloaded;
        write && !self.in_memory
    }

    pub(crate) fn can_access(&self) -> bool {
        self.state.is_accessible()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.state = BlockState::Dirty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_initial_state() {
        assert_eq!(BlockGate::new(true).state(), BlockState::Fresh);
        assert_eq!(BlockGate::new(false).state(), BlockState::Unloaded);
        assert!(!BlockGate::new(true).can_access());
    }

    #[test]
    fn test_gate_disk_block_cycle() {
        let mut gate = BlockGate::new(false);

        assert!(gate.pin().unwrap()); // load
        assert!(gate.can_access());
        assert!(!gate.unpin()); // clean, free

        assert!(gate.pin().unwrap());
        gate.mark_dirty();
        assert_eq!(gate.state(), BlockState::Dirty);
        assert!(gate.unpin()); // write
        assert_eq!(gate.state(), BlockState::Unloaded);
    }

    #[test]
    fn test_gate_in_memory_block_is_single_use() {
        let mut gate = BlockGate::new(true);

        assert!(!gate.pin().unwrap());
        gate.mark_dirty();
        assert!(!gate.unpin());
        assert_eq!(gate.state(), BlockState::Unloaded);

        assert!(matches!(gate.pin(), Err(JoinError::ProtocolViolation(_))));
        assert_eq!(gate.state(), BlockState::Unloaded);
    }
}
