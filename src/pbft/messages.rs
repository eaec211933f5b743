/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions for structured messages that are sent between replicas as part of the
//! [PBFT][crate::pbft::implementation::Pbft] voting protocol.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::types::data_types::{BlockHash, BlockHeight, SignerId};

/// Every message of the voting protocol. Messages are decoded into this type once, when they are
/// received from the [`Network`](crate::networking::network::Network).
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum PbftMessage {
    Prepare(StageVote),
    Commit(StageVote),
}

impl PbftMessage {
    pub fn prepare(height: BlockHeight, hash: BlockHash, signer: SignerId) -> PbftMessage {
        PbftMessage::Prepare(StageVote::new(height, hash, signer))
    }

    pub fn commit(height: BlockHeight, hash: BlockHash, signer: SignerId) -> PbftMessage {
        PbftMessage::Commit(StageVote::new(height, hash, signer))
    }

    /// Returns the vote carried by a given [PbftMessage].
    pub fn vote(&self) -> &StageVote {
        match self {
            PbftMessage::Prepare(vote) => vote,
            PbftMessage::Commit(vote) => vote,
        }
    }
}

/// A vote by `signer` for the candidate `(height, hash)`. Whether it is a Prepare or a Commit vote is
/// decided by the [PbftMessage] variant that carries it.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct StageVote {
    pub height: BlockHeight,
    pub hash: BlockHash,
    pub signer: SignerId,
}

impl StageVote {
    pub fn new(height: BlockHeight, hash: BlockHash, signer: SignerId) -> Self {
        Self {
            height,
            hash,
            signer,
        }
    }
}
