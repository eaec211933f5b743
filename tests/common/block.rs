use pbft_rs::types::{
    block::Block,
    data_types::{BlockHash, BlockHeight},
};
use sha2::{Digest, Sha256};

/// A block whose hash is the hex-encoded SHA-256 digest of its height and payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TestBlock {
    height: BlockHeight,
    hash: BlockHash,
}

impl TestBlock {
    pub(crate) fn new(height: u64, payload: &[u8]) -> TestBlock {
        let mut hasher = Sha256::new();
        hasher.update(height.to_le_bytes());
        hasher.update(payload);
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect();

        TestBlock {
            height: BlockHeight::new(height),
            hash: BlockHash::new(hash),
        }
    }
}

impl Block for TestBlock {
    fn height(&self) -> BlockHeight {
        self.height
    }

    fn hash(&self) -> BlockHash {
        self.hash.clone()
    }
}
