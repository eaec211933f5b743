/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The thread that owns the voting state and runs every protocol handler.
//!
//! The algorithm thread is the driving force of a pbft-rs replica. It is the only thread that ever
//! touches the [`Pbft`] state machine: blocks from the block producer and messages from the poller
//! reach it as [`Command`]s over a single channel, and are processed one at a time in arrival order.

use std::{
    sync::mpsc::{Receiver, RecvTimeoutError, Sender, TryRecvError},
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::{
    chain::Chain,
    events::Event,
    networking::{network::Network, sending::SenderHandle},
    pbft::{
        implementation::{Pbft, PbftConfiguration, PbftError},
        messages::PbftMessage,
    },
    types::{block::Block, data_types::SlotNumber},
};

/// How long the algorithm thread blocks waiting for a command before checking for shutdown.
const COMMAND_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A request to the algorithm thread.
pub(crate) enum Command<B: Block> {
    /// The block producer handed the replica `block` for `slot`.
    ObserveBlock { block: B, slot: SlotNumber },

    /// A peer's vote arrived.
    ConsensusMessage(PbftMessage),
}

pub(crate) struct Algorithm<B: Block, N: Network + 'static, C: Chain<B>> {
    pbft: Pbft<B, N, C>,
    commands: Receiver<Command<B>>,
    shutdown_signal: Receiver<()>,
}

impl<B: Block, N: Network + 'static, C: Chain<B>> Algorithm<B, N, C> {
    pub(crate) fn new(
        pbft_config: PbftConfiguration,
        network: N,
        chain: C,
        commands: Receiver<Command<B>>,
        shutdown_signal: Receiver<()>,
        event_publisher: Option<Sender<Event>>,
    ) -> Self {
        let pbft = Pbft::new(pbft_config, SenderHandle::new(network), chain, event_publisher);

        Self {
            pbft,
            commands,
            shutdown_signal,
        }
    }

    /// Spawn the algorithm thread.
    ///
    /// The thread runs until it receives the shutdown signal, or until a handler fails. In the latter
    /// case the thread returns the error, dropping its command receiver, so that every later command
    /// sent to it fails to send.
    pub(crate) fn start(self) -> JoinHandle<Result<(), PbftError>> {
        thread::spawn(move || self.execute())
    }

    fn execute(mut self) -> Result<(), PbftError> {
        loop {
            match self.shutdown_signal.try_recv() {
                Ok(()) => return Ok(()),
                Err(TryRecvError::Empty) => (),
                Err(TryRecvError::Disconnected) => {
                    panic!("Algorithm thread disconnected from main thread")
                }
            }

            match self.commands.recv_timeout(COMMAND_POLL_INTERVAL) {
                Ok(command) => {
                    if let Err(err) = self.handle(command) {
                        log::error!("Algorithm thread halted: {}", err);
                        return Err(err);
                    }
                }
                Err(RecvTimeoutError::Timeout) => (),
                Err(RecvTimeoutError::Disconnected) => thread::sleep(COMMAND_POLL_INTERVAL),
            }
        }
    }

    fn handle(&mut self, command: Command<B>) -> Result<(), PbftError> {
        match command {
            Command::ObserveBlock { block, slot } => {
                self.pbft.observe_block(block, slot);
                Ok(())
            }
            Command::ConsensusMessage(msg) => self.pbft.on_receive_msg(msg),
        }
    }
}
