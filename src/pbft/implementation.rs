/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Event-driven implementation of the PBFT voting protocol.
//!
//! Main type: [`Pbft`].

use std::{sync::mpsc::Sender, time::SystemTime};

use thiserror::Error;

use crate::{
    chain::{Chain, FinalizeError},
    events::{
        CollectPrepareQuorumEvent, CommitEvent, Event, FinalizeBlockEvent, ObserveBlockEvent,
        PrepareEvent, ReceiveCommitEvent, ReceivePrepareEvent, ResetCause, ResetRoundEvent,
        StartRoundEvent,
    },
    networking::{network::Network, sending::SenderHandle},
    types::{
        block::Block,
        data_types::{BlockHash, BlockHeight, SignerId, SlotNumber},
    },
};

use super::{
    messages::{PbftMessage, StageVote},
    state::RoundState,
    types::{FaultBound, Phase, VoteSet},
};

/// A single participant in the PBFT voting protocol.
///
/// # Usage
///
/// `Pbft` is driven by two event handlers, which are to be called when specific things happen to the
/// replica:
/// 1. [`observe_block`](Self::observe_block): called when the block producer hands the replica a block
///    for a slot.
/// 2. [`on_receive_msg`](Self::on_receive_msg): called when a new [`PbftMessage`] is received.
///
/// Both take `&mut self`: the round state is owned by a single `Pbft`, and the `Pbft` by a single
/// thread, so that recording a vote and checking whether it completes a quorum can never interleave
/// with another handler.
pub(crate) struct Pbft<B: Block, N: Network, C: Chain<B>> {
    config: PbftConfiguration,
    round: RoundState<B>,
    sender_handle: SenderHandle<N>,
    chain: C,
    event_publisher: Option<Sender<Event>>,
}

impl<B: Block, N: Network, C: Chain<B>> Pbft<B, N, C> {
    /// Create a new PBFT participant in the `Idle` phase.
    pub(crate) fn new(
        config: PbftConfiguration,
        sender_handle: SenderHandle<N>,
        chain: C,
        event_publisher: Option<Sender<Event>>,
    ) -> Self {
        Self {
            config,
            round: RoundState::new(),
            sender_handle,
            chain,
            event_publisher,
        }
    }

    /// Process a block observed for `slot`.
    ///
    /// ## Internal procedure
    ///
    /// 1. If `slot` is later than the current slot, abandon the current round and move to `slot`.
    /// 2. Store the block body, whether or not it becomes the candidate.
    /// 3. If the replica is `Idle`, adopt the block as the round's only Prepare candidate, vote for it,
    ///    and broadcast the vote. Blocks observed after the first one in a round never replace the
    ///    candidate. A block for an earlier slot is adopted too, but leaves the current slot unchanged.
    pub(crate) fn observe_block(&mut self, block: B, slot: SlotNumber) {
        let height = block.height();
        let hash = block.hash();

        Event::ObserveBlock(ObserveBlockEvent {
            timestamp: SystemTime::now(),
            slot,
            height,
            hash: hash.clone(),
        })
        .publish(&self.event_publisher);

        // 1. Roll over to the new slot.
        if slot > self.round.current_slot {
            self.round.reset();
            self.round.current_slot = slot;

            Event::ResetRound(ResetRoundEvent {
                timestamp: SystemTime::now(),
                slot,
                cause: ResetCause::SlotRollover,
            })
            .publish(&self.event_publisher);
        }

        // 2. Keep the body so it can be finalized if its hash collects a Commit quorum.
        self.round.pending_blocks.insert(hash.clone(), block);

        if !self.round.phase.is_idle() {
            return;
        }

        // 3. Adopt the block as the candidate and vote for it.
        let me = self.config.me;
        self.round.prepare_tally = Some(VoteSet::new(height, hash.clone(), me));
        self.round.phase = Phase::Preparing;

        Event::StartRound(StartRoundEvent {
            timestamp: SystemTime::now(),
            slot,
            height,
            hash: hash.clone(),
        })
        .publish(&self.event_publisher);

        let prepare = PbftMessage::prepare(height, hash, me);
        self.sender_handle.broadcast(&prepare);

        Event::Prepare(PrepareEvent {
            timestamp: SystemTime::now(),
            vote: prepare.vote().clone(),
        })
        .publish(&self.event_publisher);
    }

    /// Process a newly received message.
    ///
    /// Votes that are duplicated, stale, or for a candidate other than the replica's are dropped
    /// without being reported: under gossip they are the normal case.
    pub(crate) fn on_receive_msg(&mut self, msg: PbftMessage) -> Result<(), PbftError> {
        match msg {
            PbftMessage::Prepare(vote) => {
                self.on_receive_prepare(vote);
                Ok(())
            }
            PbftMessage::Commit(vote) => self.on_receive_commit(vote),
        }
    }

    /// Process a received Prepare `vote`.
    ///
    /// ## Internal procedure
    ///
    /// 1. If the vote was already seen this round, return. Otherwise remember it and relay it to peers.
    ///    Every vote not seen before is relayed, including those that are not tallied in step 2.
    /// 2. Tally the vote if the replica is `Preparing`, the vote is for the round's candidate, and the
    ///    signer has not voted yet.
    /// 3. If the tally now forms a Prepare quorum, move to `Committing` and broadcast a Commit vote for
    ///    the candidate.
    fn on_receive_prepare(&mut self, vote: StageVote) {
        // 1. Deduplicate and relay.
        if !self.round.prepare_cache.insert(&vote) {
            return;
        }
        self.sender_handle.broadcast(&PbftMessage::Prepare(vote.clone()));

        Event::ReceivePrepare(ReceivePrepareEvent {
            timestamp: SystemTime::now(),
            vote: vote.clone(),
        })
        .publish(&self.event_publisher);

        // 2. Tally.
        if !self.round.phase.is_preparing() {
            return;
        }
        let prepare_tally = match self.round.prepare_tally.as_mut() {
            Some(prepare_tally) if prepare_tally.is_for(&vote) => prepare_tally,
            _ => return,
        };
        if !prepare_tally.record_vote(vote.signer) {
            return;
        }

        // 3. Check for a Prepare quorum.
        let votes = prepare_tally.size();
        if !self.config.fault_bound.prepare_quorum_reached(votes) {
            return;
        }
        let (height, hash) = (prepare_tally.height(), prepare_tally.hash().clone());
        self.round.phase = Phase::Committing;

        Event::CollectPrepareQuorum(CollectPrepareQuorumEvent {
            timestamp: SystemTime::now(),
            height,
            hash: hash.clone(),
            votes,
        })
        .publish(&self.event_publisher);

        self.commit(height, hash);
    }

    /// Record and broadcast the replica's own Commit vote for the candidate `(height, hash)`.
    ///
    /// The vote starts a fresh Commit tally for `hash`, replacing any tally bootstrapped from peers'
    /// Commit votes. Commit quorums are only checked when a Commit vote is received.
    fn commit(&mut self, height: BlockHeight, hash: BlockHash) {
        let me = self.config.me;
        self.round
            .commit_tallies
            .insert(hash.clone(), VoteSet::new(height, hash.clone(), me));

        let commit = PbftMessage::commit(height, hash, me);
        self.sender_handle.broadcast(&commit);

        Event::Commit(CommitEvent {
            timestamp: SystemTime::now(),
            vote: commit.vote().clone(),
        })
        .publish(&self.event_publisher);
    }

    /// Process a received Commit `vote`.
    ///
    /// ## Internal procedure
    ///
    /// 1. Deduplicate and relay, exactly as for Prepare votes but with the Commit dedup cache.
    /// 2. If a Commit tally exists for the vote's hash, tally the vote. If the tally now forms a Commit
    ///    quorum, finalize the block and reset the round.
    /// 3. Otherwise start a Commit tally for the hash containing only the vote's signer. This lets a
    ///    replica that missed its own Prepare quorum still finalize on its peers' Commit votes.
    fn on_receive_commit(&mut self, vote: StageVote) -> Result<(), PbftError> {
        // 1. Deduplicate and relay.
        if !self.round.commit_cache.insert(&vote) {
            return Ok(());
        }
        self.sender_handle.broadcast(&PbftMessage::Commit(vote.clone()));

        Event::ReceiveCommit(ReceiveCommitEvent {
            timestamp: SystemTime::now(),
            vote: vote.clone(),
        })
        .publish(&self.event_publisher);

        match self.round.commit_tallies.get_mut(&vote.hash) {
            // 2. Tally, and check for a Commit quorum.
            Some(commit_tally) => {
                if commit_tally.record_vote(vote.signer)
                    && self.config.fault_bound.commit_quorum_reached(commit_tally.size())
                {
                    return self.finalize(vote.hash);
                }
            }
            // 3. Bootstrap a tally from a peer's vote.
            None => {
                let commit_tally = VoteSet::new(vote.height, vote.hash.clone(), vote.signer);
                self.round.commit_tallies.insert(vote.hash, commit_tally);
            }
        }

        Ok(())
    }

    /// Hand the block with `hash` to the chain, then reset the round.
    ///
    /// If the body of the block is not known, which happens when stale votes rebuild a quorum after the
    /// round it belonged to was already reset, only the tally is discarded.
    fn finalize(&mut self, hash: BlockHash) -> Result<(), PbftError> {
        let slot = self.round.current_slot;
        let block = match self.round.pending_blocks.remove(&hash) {
            Some(block) => block,
            None => {
                log::warn!(
                    "Commit quorum for block {} with no known body in slot {}, discarding its tally",
                    hash.short(),
                    slot
                );
                self.round.commit_tallies.remove(&hash);
                return Ok(());
            }
        };
        let height = block.height();

        self.chain
            .finalize_block(block)
            .map_err(|source| PbftError::Finalize {
                height,
                hash: hash.clone(),
                source,
            })?;

        Event::FinalizeBlock(FinalizeBlockEvent {
            timestamp: SystemTime::now(),
            slot,
            height,
            hash,
        })
        .publish(&self.event_publisher);

        self.round.reset();

        Event::ResetRound(ResetRoundEvent {
            timestamp: SystemTime::now(),
            slot,
            cause: ResetCause::Finalized,
        })
        .publish(&self.event_publisher);

        Ok(())
    }
}

#[cfg(test)]
impl<B: Block, N: Network, C: Chain<B>> Pbft<B, N, C> {
    pub(crate) fn phase(&self) -> Phase {
        self.round.phase
    }

    pub(crate) fn current_slot(&self) -> SlotNumber {
        self.round.current_slot
    }

    pub(crate) fn prepare_tally(&self) -> Option<&VoteSet> {
        self.round.prepare_tally.as_ref()
    }

    pub(crate) fn commit_tally(&self, hash: &BlockHash) -> Option<&VoteSet> {
        self.round.commit_tallies.get(hash)
    }

    pub(crate) fn pending_block(&self, hash: &BlockHash) -> Option<&B> {
        self.round.pending_blocks.get(hash)
    }

    pub(crate) fn has_seen_prepare(&self, vote: &StageVote) -> bool {
        self.round.prepare_cache.contains(vote)
    }

    pub(crate) fn has_seen_commit(&self, vote: &StageVote) -> bool {
        self.round.commit_cache.contains(vote)
    }
}

/// Configuration parameters for the [`Pbft`] struct.
#[derive(Clone, Copy)]
pub(crate) struct PbftConfiguration {
    /// The id this replica signs its votes with.
    pub(crate) me: SignerId,

    /// Computed once from the number of participants.
    pub(crate) fault_bound: FaultBound,
}

/// The different ways a call to a method of the `Pbft` struct can fail.
///
/// Only collaborators can fail: the voting logic itself is total over its inputs.
#[derive(Debug, Error)]
pub enum PbftError {
    #[error("chain failed to finalize block {hash} at height {height}: {source}")]
    Finalize {
        height: BlockHeight,
        hash: BlockHash,
        #[source]
        source: FinalizeError,
    },
}
