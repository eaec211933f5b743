/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Functions for receiving messages from the P2P network.

use std::{
    sync::mpsc::{Receiver, Sender, TryRecvError},
    thread::{self, JoinHandle},
};

use crate::{algorithm::Command, types::block::Block};

use super::{messages::decode_message, network::Network};

/// Spawn the poller thread, which polls the [`Network`] for messages, decodes them, and forwards them
/// to the [`Algorithm`][crate::algorithm::Algorithm] thread through `commands`.
///
/// Messages that cannot be decoded are logged and dropped here, so the algorithm thread only ever sees
/// well-typed [`PbftMessage`](crate::pbft::messages::PbftMessage)s.
pub(crate) fn start_polling<B: Block, N: Network + 'static>(
    mut network: N,
    commands: Sender<Command<B>>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("Poller thread disconnected from main thread")
            }
        }

        if let Some(bytes) = network.recv() {
            match decode_message(&bytes) {
                Ok(msg) => {
                    // The algorithm thread may already have halted. Its error is reported through the
                    // replica handle, not here.
                    let _ = commands.send(Command::ConsensusMessage(msg));
                }
                Err(err) => log::warn!("Dropping message from the network: {}", err),
            }
        } else {
            thread::yield_now()
        }
    })
}
