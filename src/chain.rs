/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The pluggable blockchain storage that finalized blocks are handed to.

use thiserror::Error;

use crate::types::block::Block;

/// Methods that a type needs to implement to receive the blocks finalized by the voting protocol.
///
/// pbft-rs calls [`finalize_block`](Chain::finalize_block) at most once per successfully committed
/// round, from the algorithm thread.
pub trait Chain<B: Block>: Send + 'static {
    /// Durably append `block` to the blockchain.
    ///
    /// # Errors
    ///
    /// An error is fatal: the replica stops processing messages and every later call on the
    /// [`Replica`](crate::replica::Replica) returns [`ReplicaError::Halted`](crate::replica::ReplicaError::Halted).
    fn finalize_block(&mut self, block: B) -> Result<(), FinalizeError>;
}

/// Failure reported by a [`Chain`] implementation.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct FinalizeError {
    reason: String,
}

impl FinalizeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
