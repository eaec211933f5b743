/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions and types for sending messages to the P2P network.

use crate::pbft::messages::PbftMessage;

use super::{messages::encode_message, network::Network};

/// Handle for broadcasting [`PbftMessage`]s to the [`Network`].
#[derive(Clone)]
pub(crate) struct SenderHandle<N: Network> {
    network: N,
}

impl<N: Network> SenderHandle<N> {
    pub(crate) fn new(network: N) -> Self {
        Self { network }
    }

    pub(crate) fn broadcast(&mut self, msg: &PbftMessage) {
        self.network.broadcast(encode_message(msg))
    }
}
