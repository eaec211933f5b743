/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Definitions of pbft-rs events for event handling and logging.
//!
//! An event for a given action indicates that the action has been completed. Events are published by
//! the algorithm thread and handled on the [event bus](crate::event_bus) thread, so slow handlers never
//! delay voting.

use std::{sync::mpsc::Sender, time::SystemTime};

use crate::{
    pbft::messages::StageVote,
    types::data_types::{BlockHash, BlockHeight, SlotNumber},
};

pub enum Event {
    // Events that involve a block handed to the replica by the block producer.
    ObserveBlock(ObserveBlockEvent),
    StartRound(StartRoundEvent),
    // Events that involve broadcasting the replica's own vote.
    Prepare(PrepareEvent),
    Commit(CommitEvent),
    // Events that involve receiving a vote that has not been seen before in this round.
    ReceivePrepare(ReceivePrepareEvent),
    ReceiveCommit(ReceiveCommitEvent),
    // Events that change the outcome of the round.
    CollectPrepareQuorum(CollectPrepareQuorumEvent),
    FinalizeBlock(FinalizeBlockEvent),
    ResetRound(ResetRoundEvent),
}

impl Event {
    /// Send the event to the event bus, if one is running.
    pub(crate) fn publish(self, event_publisher: &Option<Sender<Event>>) {
        if let Some(event_publisher) = event_publisher {
            // The event bus is shut down before the algorithm thread.
            let _ = event_publisher.send(self);
        }
    }
}

/// A block was handed to the replica for a given slot. Emitted whether or not the block became the
/// round's candidate.
pub struct ObserveBlockEvent {
    pub timestamp: SystemTime,
    pub slot: SlotNumber,
    pub height: BlockHeight,
    pub hash: BlockHash,
}

/// A block was adopted as the Prepare candidate of a slot.
pub struct StartRoundEvent {
    pub timestamp: SystemTime,
    pub slot: SlotNumber,
    pub height: BlockHeight,
    pub hash: BlockHash,
}

/// The replica broadcasted its own Prepare vote.
pub struct PrepareEvent {
    pub timestamp: SystemTime,
    pub vote: StageVote,
}

/// The replica broadcasted its own Commit vote.
pub struct CommitEvent {
    pub timestamp: SystemTime,
    pub vote: StageVote,
}

pub struct ReceivePrepareEvent {
    pub timestamp: SystemTime,
    pub vote: StageVote,
}

pub struct ReceiveCommitEvent {
    pub timestamp: SystemTime,
    pub vote: StageVote,
}

/// The round's candidate collected a Prepare quorum, moving the replica into the commit phase.
pub struct CollectPrepareQuorumEvent {
    pub timestamp: SystemTime,
    pub height: BlockHeight,
    pub hash: BlockHash,
    pub votes: u64,
}

/// A block collected a Commit quorum and was handed to the [`Chain`](crate::chain::Chain).
pub struct FinalizeBlockEvent {
    pub timestamp: SystemTime,
    pub slot: SlotNumber,
    pub height: BlockHeight,
    pub hash: BlockHash,
}

/// All round state was discarded.
pub struct ResetRoundEvent {
    pub timestamp: SystemTime,
    pub slot: SlotNumber,
    pub cause: ResetCause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetCause {
    /// A block was observed for a slot later than the one being voted on.
    SlotRollover,

    /// The round ended with a finalized block.
    Finalized,
}
