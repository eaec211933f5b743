use std::sync::{Arc, Mutex};

use pbft_rs::chain::{Chain, FinalizeError};

use super::block::TestBlock;

/// An in-memory chain that records the blocks finalized on it, in order.
#[derive(Clone, Default)]
pub(crate) struct MemChain {
    blocks: Arc<Mutex<Vec<TestBlock>>>,
    fail: bool,
}

impl MemChain {
    pub(crate) fn new() -> MemChain {
        MemChain::default()
    }

    /// A chain whose storage rejects every block.
    pub(crate) fn failing() -> MemChain {
        MemChain {
            fail: true,
            ..MemChain::default()
        }
    }

    pub(crate) fn blocks(&self) -> Vec<TestBlock> {
        self.blocks.lock().unwrap().clone()
    }
}

impl Chain<TestBlock> for MemChain {
    fn finalize_block(&mut self, block: TestBlock) -> Result<(), FinalizeError> {
        if self.fail {
            return Err(FinalizeError::new("storage is read-only"));
        }
        self.blocks.lock().unwrap().push(block);
        Ok(())
    }
}
