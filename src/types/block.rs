/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The pluggable block type.
//!
//! Block production and block storage live outside of pbft-rs, so the voting protocol treats a block
//! as an opaque body that it only needs to identify: by its [height](Block::height) and its
//! [hash](Block::hash). The pair of the two is a "candidate" in the voting protocol.

use super::data_types::{BlockHash, BlockHeight};

/// Read-only view of a block body that the library user's block producer hands to the
/// [`Replica`](crate::replica::Replica).
///
/// Block bodies are moved between threads and held in memory until their round ends, hence the
/// `Clone + Send + 'static` bound.
pub trait Block: Clone + Send + 'static {
    /// Height of the block in the blockchain.
    fn height(&self) -> BlockHeight;

    /// Hash that uniquely identifies the block.
    fn hash(&self) -> BlockHash;
}
