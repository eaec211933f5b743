/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The in-memory state of a single round of voting.
//!
//! None of this state is persisted: losing it on restart means the replica rejoins consensus at the
//! next slot.

use std::collections::HashMap;

use crate::types::{
    block::Block,
    data_types::{BlockHash, SlotNumber},
};

use super::types::{DedupCache, Phase, VoteSet};

/// Everything a replica knows about the round for [`current_slot`](Self::current_slot).
///
/// `RoundState` is owned by exactly one [`Pbft`](super::implementation::Pbft), which in turn is owned by
/// the algorithm thread, so every read-check-write sequence on it is atomic.
pub(crate) struct RoundState<B: Block> {
    pub(crate) phase: Phase,
    pub(crate) current_slot: SlotNumber,

    /// The first block adopted in the current slot. `None` while `phase` is `Idle`.
    pub(crate) prepare_tally: Option<VoteSet>,

    /// Several candidates may reach the commit phase (through different replicas' Prepare quorums)
    /// before one of them is finalized.
    pub(crate) commit_tallies: HashMap<BlockHash, VoteSet>,

    /// Every block body seen in this round, adopted or not.
    pub(crate) pending_blocks: HashMap<BlockHash, B>,

    pub(crate) prepare_cache: DedupCache,
    pub(crate) commit_cache: DedupCache,
}

impl<B: Block> RoundState<B> {
    pub(crate) fn new() -> Self {
        Self {
            phase: Phase::Idle,
            current_slot: SlotNumber::default(),
            prepare_tally: None,
            commit_tallies: HashMap::new(),
            pending_blocks: HashMap::new(),
            prepare_cache: DedupCache::new(),
            commit_cache: DedupCache::new(),
        }
    }

    /// Discard every tally, pending block, and dedup cache entry, and return to `Idle`. The current
    /// slot is kept.
    pub(crate) fn reset(&mut self) {
        let current_slot = self.current_slot;
        *self = Self::new();
        self.current_slot = current_slot;
    }
}
