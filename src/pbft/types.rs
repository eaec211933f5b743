/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of types specific to the [PBFT][crate::pbft::implementation::Pbft] voting protocol.

use std::collections::HashSet;

use crate::types::data_types::{BlockHash, BlockHeight, ParticipantCount, SignerId};

use super::messages::StageVote;

/// The phase of the current round of voting.
///
/// Within a slot the phase only ever moves forward: `Idle` → `Preparing` → `Committing`. It returns to
/// `Idle` when the round is reset, either because a block was finalized or because a later slot
/// started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No candidate has been adopted for the current slot yet.
    Idle,

    /// A candidate has been adopted and the replica is collecting Prepare votes for it.
    Preparing,

    /// The candidate reached a Prepare quorum and the replica has sent its Commit vote.
    Committing,
}

impl Phase {
    pub fn is_idle(self) -> bool {
        self == Phase::Idle
    }

    pub fn is_preparing(self) -> bool {
        self == Phase::Preparing
    }
}

/// The maximum number of faulty participants tolerated, `f = floor((N - 1) / 3)`.
///
/// The two quorum thresholds derived from `f` are asymmetric: a Prepare quorum is `f + 1` votes and a
/// Commit quorum is `2f + 1` votes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaultBound(u64);

impl FaultBound {
    /// Compute the fault bound for a network of `participants` replicas. An empty network tolerates
    /// no faults.
    pub const fn from_participants(participants: ParticipantCount) -> Self {
        Self(participants.int().saturating_sub(1) / 3)
    }

    pub const fn int(&self) -> u64 {
        self.0
    }

    /// Whether `count` Prepare votes form a quorum, i.e., `count > f`.
    pub const fn prepare_quorum_reached(&self, count: u64) -> bool {
        count > self.0
    }

    /// Whether `count` Commit votes form a quorum, i.e., `count > 2f`.
    pub const fn commit_quorum_reached(&self, count: u64) -> bool {
        count > 2 * self.0
    }
}

/// Tally of the unique signers that voted for a single candidate `(height, hash)` in a single phase.
///
/// ## Invariant
///
/// `size()` always equals the number of distinct signers recorded. A signer voting twice does not
/// inflate the count.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteSet {
    height: BlockHeight,
    hash: BlockHash,
    voters: HashSet<SignerId>,
    count: u64,
}

impl VoteSet {
    /// Create a vote set for the given candidate that already contains the vote of `first_signer`.
    pub fn new(height: BlockHeight, hash: BlockHash, first_signer: SignerId) -> Self {
        let mut vote_set = Self {
            height,
            hash,
            voters: HashSet::new(),
            count: 0,
        };
        vote_set.record_vote(first_signer);
        vote_set
    }

    /// Add `signer` to the set of voters. Returns whether this call changed the set, i.e., `false` if
    /// `signer` had already voted.
    pub fn record_vote(&mut self, signer: SignerId) -> bool {
        let inserted = self.voters.insert(signer);
        if inserted {
            self.count += 1;
        }
        debug_assert_eq!(self.count, self.voters.len() as u64);
        inserted
    }

    pub fn has_voted(&self, signer: &SignerId) -> bool {
        self.voters.contains(signer)
    }

    /// Number of distinct signers that voted.
    pub fn size(&self) -> u64 {
        self.count
    }

    pub fn height(&self) -> BlockHeight {
        self.height
    }

    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }

    /// Whether `vote` is a vote for the candidate this set tallies.
    pub fn is_for(&self, vote: &StageVote) -> bool {
        self.height == vote.height && self.hash == vote.hash
    }
}

/// Identity of a vote message for deduplication: the `(hash, height, signer)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VoteKey {
    pub hash: BlockHash,
    pub height: BlockHeight,
    pub signer: SignerId,
}

impl From<&StageVote> for VoteKey {
    fn from(vote: &StageVote) -> Self {
        VoteKey {
            hash: vote.hash.clone(),
            height: vote.height,
            signer: vote.signer,
        }
    }
}

/// Append-only set of the vote messages that have already been seen in the current round.
///
/// Each unique vote is relayed to peers at most once per round, no matter how many times it is
/// received. The cache is emptied only when the whole round state is reset.
#[derive(Clone, Debug, Default)]
pub struct DedupCache {
    seen: HashSet<VoteKey>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the key of `vote` into the cache. Returns `true` if the vote had not been seen before.
    pub fn insert(&mut self, vote: &StageVote) -> bool {
        self.seen.insert(VoteKey::from(vote))
    }

    pub fn contains(&self, vote: &StageVote) -> bool {
        self.seen.contains(&VoteKey::from(vote))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
