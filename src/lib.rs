/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! A Rust implementation of a PBFT-style voting protocol that decides, for every block-production slot,
//! which single block becomes final.
//!
//! pbft-rs is the agreement core of a blockchain node. Block production, block storage, and peer-to-peer
//! networking are left to the library user, who plugs them in through the [`Block`](types::block::Block),
//! [`Chain`](chain::Chain), and [`Network`](networking::network::Network) traits. Replicas exchange two
//! kinds of votes, Prepare and Commit, and a block is finalized once it collects a quorum of each.
//!
//! ## Getting started
//!
//! A replica is built and started through [`ReplicaSpec`](replica::ReplicaSpec). See the
//! [replica] module for an example.
//!
//! ## Threads
//!
//! A running replica consists of up to three threads:
//! 1. The algorithm thread, which exclusively owns the voting state.
//! 2. The poller thread, which receives and decodes messages from the network.
//! 3. The event bus thread, which runs the event handlers registered by the user, if any.

pub(crate) mod algorithm;

pub mod chain;

pub(crate) mod event_bus;

pub mod events;

pub mod logging;

pub mod networking;

pub mod pbft;

pub mod replica;

pub mod types;
