/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Pluggable peer-to-peer (P2P) networking.
//!
//! pbft-rs does not implement peer discovery or message delivery itself. Library users supply an
//! implementation of the [`Network`](network::Network) trait, and pbft-rs takes care of encoding
//! outbound messages and decoding inbound ones into [`PbftMessage`](crate::pbft::messages::PbftMessage)s.

pub mod network;

pub mod messages;

pub(crate) mod receiving;

pub(crate) mod sending;
