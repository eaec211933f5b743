/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Subprotocol for finalizing `Block`s through two rounds of voting.
//!
//! ## Rounds
//!
//! Consensus proceeds in slots. In each slot, the block producer hands every replica one or more
//! blocks, and the replicas try to agree on one of them:
//! 1. "Prepare" phase: the first block a replica observes in a slot becomes its candidate. The replica
//!    votes [`Prepare`](messages::PbftMessage::Prepare) for it and collects its peers' Prepare votes.
//! 2. "Commit" phase: once more than `f` replicas voted Prepare for the candidate, the replica votes
//!    [`Commit`](messages::PbftMessage::Commit) for it. Once more than `2f` replicas voted Commit for a
//!    block, the block is finalized and the round is reset.
//!
//! `f` is the [fault bound](types::FaultBound), `floor((N - 1) / 3)` for a network of `N` replicas.
//!
//! A round is also reset, without finalizing anything, when a block for a later slot is observed.
//!
//! ## Gossip
//!
//! Votes are spread by flooding: every replica relays every vote it has not seen before in the current
//! round, whether or not it counts the vote. A per-phase [dedup cache](types::DedupCache) stops a vote
//! from being relayed more than once.

pub mod implementation;

pub mod messages;

pub(crate) mod state;

pub mod types;
