/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions that log out events.
//!
//! The logs defined in this module are printed if the user enabled them via the replica's
//! [config](crate::replica::Configuration).
//!
//! pbft-rs logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
//! printed onto a terminal or to a file, set up a
//! [logging implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
//!
//! ## Log message format
//!
//! Log messages are CSVs (Comma Separated Values) with at least two values. The first two values are
//! always:
//! 1. The name of the [event](crate::events) in PascalCase (defined in this module as constants).
//! 2. The time the event was emitted (as number of seconds since the Unix Epoch).
//!
//! The rest of the values differ depending on the kind of event. For example, the following snippet
//! is how a [ReceivePrepare](crate::events::ReceivePrepareEvent) is printed:
//!
//! ```text
//! ReceivePrepare, 1701329264, 3f9a1c2, 5, 2
//! ```
//!
//! In the snippet:
//! - The third value is the first seven characters of the hash of the block voted for.
//! - The fourth value is the height of the block voted for.
//! - The fifth value is the signer of the vote.

use std::time::SystemTime;

use crate::events::*;

// Names of each event in PascalCase for printing:
pub const OBSERVE_BLOCK: &str = "ObserveBlock";
pub const START_ROUND: &str = "StartRound";
pub const PREPARE: &str = "Prepare";
pub const COMMIT: &str = "Commit";
pub const RECEIVE_PREPARE: &str = "ReceivePrepare";
pub const RECEIVE_COMMIT: &str = "ReceiveCommit";
pub const COLLECT_PREPARE_QUORUM: &str = "CollectPrepareQuorum";
pub const FINALIZE_BLOCK: &str = "FinalizeBlock";
pub const RESET_ROUND: &str = "ResetRound";

/// Implemented by event types. Used to get a closure that logs the event.
pub(crate) trait Logger {
    /// Returns a pointer to the default logging handler for a given event type.
    fn get_logger() -> Box<dyn Fn(&Self) + Send>;
}

impl Logger for ObserveBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |observe_block_event: &ObserveBlockEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                OBSERVE_BLOCK,
                secs_since_unix_epoch(observe_block_event.timestamp),
                observe_block_event.hash.short(),
                observe_block_event.height,
                observe_block_event.slot
            )
        };
        Box::new(logger)
    }
}

impl Logger for StartRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |start_round_event: &StartRoundEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                START_ROUND,
                secs_since_unix_epoch(start_round_event.timestamp),
                start_round_event.hash.short(),
                start_round_event.height,
                start_round_event.slot
            )
        };
        Box::new(logger)
    }
}

impl Logger for PrepareEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |prepare_event: &PrepareEvent| {
            log::info!(
                "{}, {}, {}, {}",
                PREPARE,
                secs_since_unix_epoch(prepare_event.timestamp),
                prepare_event.vote.hash.short(),
                prepare_event.vote.height
            )
        };
        Box::new(logger)
    }
}

impl Logger for CommitEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |commit_event: &CommitEvent| {
            log::info!(
                "{}, {}, {}, {}",
                COMMIT,
                secs_since_unix_epoch(commit_event.timestamp),
                commit_event.vote.hash.short(),
                commit_event.vote.height
            )
        };
        Box::new(logger)
    }
}

impl Logger for ReceivePrepareEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |receive_prepare_event: &ReceivePrepareEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                RECEIVE_PREPARE,
                secs_since_unix_epoch(receive_prepare_event.timestamp),
                receive_prepare_event.vote.hash.short(),
                receive_prepare_event.vote.height,
                receive_prepare_event.vote.signer
            )
        };
        Box::new(logger)
    }
}

impl Logger for ReceiveCommitEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |receive_commit_event: &ReceiveCommitEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                RECEIVE_COMMIT,
                secs_since_unix_epoch(receive_commit_event.timestamp),
                receive_commit_event.vote.hash.short(),
                receive_commit_event.vote.height,
                receive_commit_event.vote.signer
            )
        };
        Box::new(logger)
    }
}

impl Logger for CollectPrepareQuorumEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |collect_prepare_quorum_event: &CollectPrepareQuorumEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                COLLECT_PREPARE_QUORUM,
                secs_since_unix_epoch(collect_prepare_quorum_event.timestamp),
                collect_prepare_quorum_event.hash.short(),
                collect_prepare_quorum_event.height,
                collect_prepare_quorum_event.votes
            )
        };
        Box::new(logger)
    }
}

impl Logger for FinalizeBlockEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |finalize_block_event: &FinalizeBlockEvent| {
            log::info!(
                "{}, {}, {}, {}, {}",
                FINALIZE_BLOCK,
                secs_since_unix_epoch(finalize_block_event.timestamp),
                finalize_block_event.hash.short(),
                finalize_block_event.height,
                finalize_block_event.slot
            )
        };
        Box::new(logger)
    }
}

impl Logger for ResetRoundEvent {
    fn get_logger() -> Box<dyn Fn(&Self) + Send> {
        let logger = |reset_round_event: &ResetRoundEvent| {
            log::info!(
                "{}, {}, {}, {:?}",
                RESET_ROUND,
                secs_since_unix_epoch(reset_round_event.timestamp),
                reset_round_event.slot,
                reset_round_event.cause
            )
        };
        Box::new(logger)
    }
}

fn secs_since_unix_epoch(timestamp: SystemTime) -> u64 {
    timestamp
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
