/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Methods to build and run a replica.
//!
//! pbft-rs works to make multiple processes agree on one block per round of voting. In our terminology,
//! these processes are called 'replicas'. Each replica is identified by a [`SignerId`], and the total
//! number of replicas, `N`, is fixed when the replica is started.
//!
//! The key components of this module are:
//! - The builder-pattern interface to construct a [specification of the replica](ReplicaSpec) with:
//!   1. `ReplicaSpec::builder` to construct a `ReplicaSpecBuilder`,
//!   2. The setters of the `ReplicaSpecBuilder`, and
//!   3. The `ReplicaSpecBuilder::build` method to construct a [ReplicaSpec],
//! - The function to [start](ReplicaSpec::start) a [Replica] given its specification,
//! - [The type](Replica) which keeps the replica alive, and through which blocks and consensus messages
//!   are fed to it.
//!
//! ## Starting a replica
//!
//! Here is an example that demonstrates how to build and start running a replica using the builder
//! pattern:
//!
//! ```ignore
//! let replica =
//!     ReplicaSpec::builder()
//!     .chain(chain)
//!     .network(network)
//!     .configuration(configuration)
//!     .on_finalize_block(finalize_block_handler)
//!     .build()
//!     .start();
//!
//! replica.observe_block(block, SlotNumber::new(10))?;
//! ```
//!
//! ### Required setters
//!
//! The required setters are for providing the trait implementations required to run a replica:
//! - `.chain(...)`
//! - `.network(...)`
//! - `.configuration(...)`
//!
//! ### Optional setters
//!
//! The optional setters are for registering user-defined event handlers for events from
//! [crate::events]:
//! - `.on_observe_block(...)`
//! - `.on_start_round(...)`
//! - `.on_prepare(...)`
//! - `.on_commit(...)`
//! - `.on_receive_prepare(...)`
//! - `.on_receive_commit(...)`
//! - `.on_collect_prepare_quorum(...)`
//! - `.on_finalize_block(...)`
//! - `.on_reset_round(...)`
//!
//! The replica's [configuration](Configuration) can also be defined using the builder pattern, for
//! example:
//!
//! ```ignore
//! let configuration =
//!     Configuration::builder()
//!     .me(SignerId::new(0))
//!     .participants(ParticipantCount::new(4))
//!     .log_events(true)
//!     .build();
//! ```

use std::{
    marker::PhantomData,
    sync::mpsc::{self, Sender},
    thread::JoinHandle,
};

use thiserror::Error;
use typed_builder::TypedBuilder;

use crate::{
    algorithm::{Algorithm, Command},
    chain::Chain,
    event_bus::*,
    events::*,
    networking::{network::Network, receiving::start_polling},
    pbft::{
        implementation::{PbftConfiguration, PbftError},
        messages::PbftMessage,
        types::FaultBound,
    },
    types::{
        block::Block,
        data_types::{ParticipantCount, SignerId, SlotNumber},
    },
};

/// Stores the user-defined parameters required to start the replica, that is:
/// 1. The [id](SignerId) the replica signs its votes with.
/// 2. The total number of participants in consensus, including this replica.
/// 3. The "Log Events" flag, if set to "true" then logs should be printed.
///
/// ## Log Events
///
/// pbft-rs logs using the [log](https://docs.rs/log/latest/log/) crate. To get these messages
/// printed onto a terminal or to a file, set up a [logging
/// implementation](https://docs.rs/log/latest/log/#available-logging-implementations).
#[derive(Clone, TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [Configuration]. On the builder call the following methods to construct a valid [Configuration].

    Required:
    - `.me(...)`
    - `.participants(...)`
    - `.log_events(...)`
"))]
pub struct Configuration {
    #[builder(setter(doc = "Set the id this replica signs its votes with. Required."))]
    pub me: SignerId,
    #[builder(setter(doc = "Set the total number of participants in consensus, `N`. Required."))]
    pub participants: ParticipantCount,
    #[builder(setter(doc = "Enable logging? Required."))]
    pub log_events: bool,
}

impl From<&Configuration> for PbftConfiguration {
    fn from(configuration: &Configuration) -> Self {
        PbftConfiguration {
            me: configuration.me,
            fault_bound: FaultBound::from_participants(configuration.participants),
        }
    }
}

/// Stores all necessary parameters and trait implementations required to run the [Replica].
#[derive(TypedBuilder)]
#[builder(builder_method(doc = "
    Create a builder for building a [ReplicaSpec]. On the builder call the following methods to construct a valid [ReplicaSpec].

    Required:
    - `.chain(...)`
    - `.network(...)`
    - `.configuration(...)`

    Optional:
    - `.on_observe_block(...)`
    - `.on_start_round(...)`
    - `.on_prepare(...)`
    - `.on_commit(...)`
    - `.on_receive_prepare(...)`
    - `.on_receive_commit(...)`
    - `.on_collect_prepare_quorum(...)`
    - `.on_finalize_block(...)`
    - `.on_reset_round(...)`
"))]
pub struct ReplicaSpec<B: Block, N: Network + 'static, C: Chain<B>> {
    // Required parameters
    #[builder(setter(doc = "Set the blockchain that finalized blocks are appended to. The argument must implement the [Chain](crate::chain::Chain) trait. Required."))]
    chain: C,
    #[builder(setter(doc = "Set the implementation of peer-to-peer networking. The argument must implement the [Network](crate::networking::network::Network) trait. Required."))]
    network: N,
    #[builder(setter(doc = "Set the [configuration](Configuration), which contains the necessary parameters to run a replica. Required."))]
    configuration: Configuration,
    // Optional parameters
    #[builder(default, setter(transform = |handler: impl Fn(&ObserveBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ObserveBlockEvent>),
    doc = "Register a handler closure to be invoked after the replica is handed a block. Optional."))]
    on_observe_block: Option<HandlerPtr<ObserveBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&StartRoundEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<StartRoundEvent>),
    doc = "Register a handler closure to be invoked after the replica adopts a block as the candidate of a round. Optional."))]
    on_start_round: Option<HandlerPtr<StartRoundEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&PrepareEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<PrepareEvent>),
    doc = "Register a handler closure to be invoked after the replica broadcasts its Prepare vote. Optional."))]
    on_prepare: Option<HandlerPtr<PrepareEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CommitEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CommitEvent>),
    doc = "Register a handler closure to be invoked after the replica broadcasts its Commit vote. Optional."))]
    on_commit: Option<HandlerPtr<CommitEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ReceivePrepareEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ReceivePrepareEvent>),
    doc = "Register a handler closure to be invoked after the replica receives a Prepare vote it had not seen in the current round. Optional."))]
    on_receive_prepare: Option<HandlerPtr<ReceivePrepareEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ReceiveCommitEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ReceiveCommitEvent>),
    doc = "Register a handler closure to be invoked after the replica receives a Commit vote it had not seen in the current round. Optional."))]
    on_receive_commit: Option<HandlerPtr<ReceiveCommitEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&CollectPrepareQuorumEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<CollectPrepareQuorumEvent>),
    doc = "Register a handler closure to be invoked after the replica's candidate collects a Prepare quorum. Optional."))]
    on_collect_prepare_quorum: Option<HandlerPtr<CollectPrepareQuorumEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&FinalizeBlockEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<FinalizeBlockEvent>),
    doc = "Register a handler closure to be invoked after a block is finalized. Optional."))]
    on_finalize_block: Option<HandlerPtr<FinalizeBlockEvent>>,
    #[builder(default, setter(transform = |handler: impl Fn(&ResetRoundEvent) + Send + 'static| Some(Box::new(handler) as HandlerPtr<ResetRoundEvent>),
    doc = "Register a handler closure to be invoked after the replica discards the state of a round. Optional."))]
    on_reset_round: Option<HandlerPtr<ResetRoundEvent>>,
    #[builder(default, setter(skip))]
    _block: PhantomData<B>,
}

impl<B: Block, N: Network + 'static, C: Chain<B>> ReplicaSpec<B, N, C> {
    /// Starts all threads and channels associated with running a replica, and returns the handles to
    /// them in a [Replica] struct.
    pub fn start(self) -> Replica<B> {
        let pbft_config = PbftConfiguration::from(&self.configuration);

        let event_handlers = EventHandlers::new(
            self.configuration.log_events,
            self.on_observe_block,
            self.on_start_round,
            self.on_prepare,
            self.on_commit,
            self.on_receive_prepare,
            self.on_receive_commit,
            self.on_collect_prepare_quorum,
            self.on_finalize_block,
            self.on_reset_round,
        );

        let (event_publisher, event_subscriber) = if !event_handlers.is_empty() {
            Some(mpsc::channel()).unzip()
        } else {
            (None, None)
        };

        let (commands, commands_receiver) = mpsc::channel();

        let (poller_shutdown, poller_shutdown_receiver) = mpsc::channel();
        let poller = start_polling(self.network.clone(), commands.clone(), poller_shutdown_receiver);

        let (algorithm_shutdown, algorithm_shutdown_receiver) = mpsc::channel();
        let algorithm = Algorithm::new(
            pbft_config,
            self.network,
            self.chain,
            commands_receiver,
            algorithm_shutdown_receiver,
            event_publisher,
        )
        .start();

        let (event_bus, event_bus_shutdown) = match event_subscriber {
            Some(event_subscriber) => {
                let (event_bus_shutdown, event_bus_shutdown_receiver) = mpsc::channel();
                let event_bus =
                    start_event_bus(event_handlers, event_subscriber, event_bus_shutdown_receiver);
                (Some(event_bus), Some(event_bus_shutdown))
            }
            None => (None, None),
        };

        Replica {
            input: ReplicaInput { commands },
            poller: Some(poller),
            poller_shutdown,
            algorithm: Some(algorithm),
            algorithm_shutdown,
            event_bus,
            event_bus_shutdown,
        }
    }
}

/// A handle to the background threads of a pbft-rs replica. When this value is dropped, all background
/// threads are gracefully shut down.
pub struct Replica<B: Block> {
    input: ReplicaInput<B>,
    poller: Option<JoinHandle<()>>,
    poller_shutdown: Sender<()>,
    algorithm: Option<JoinHandle<Result<(), PbftError>>>,
    algorithm_shutdown: Sender<()>,
    event_bus: Option<JoinHandle<()>>,
    event_bus_shutdown: Option<Sender<()>>,
}

impl<B: Block> Replica<B> {
    /// Hand the replica a block produced for `slot`.
    ///
    /// The first block handed over in a slot becomes the replica's candidate. Blocks for later slots
    /// abandon the current round.
    pub fn observe_block(&self, block: B, slot: SlotNumber) -> Result<(), ReplicaError> {
        self.input.observe_block(block, slot)
    }

    /// Feed the replica a consensus message that reached it outside of its
    /// [`Network`](crate::networking::network::Network).
    pub fn handle_consensus_message(&self, msg: PbftMessage) -> Result<(), ReplicaError> {
        self.input.handle_consensus_message(msg)
    }

    /// Get a clonable handle for feeding the replica from other threads.
    pub fn input(&self) -> ReplicaInput<B> {
        self.input.clone()
    }
}

impl<B: Block> Drop for Replica<B> {
    fn drop(&mut self) {
        // The order of thread shutdown in this function is important. The algorithm thread publishes to
        // the event bus, and receives commands from the poller.

        if let Some(event_bus_shutdown) = &self.event_bus_shutdown {
            let _ = event_bus_shutdown.send(());
        }
        if let Some(event_bus) = self.event_bus.take() {
            let _ = event_bus.join();
        }

        // The algorithm thread is already gone if it halted.
        let _ = self.algorithm_shutdown.send(());
        if let Some(algorithm) = self.algorithm.take() {
            let _ = algorithm.join();
        }

        let _ = self.poller_shutdown.send(());
        if let Some(poller) = self.poller.take() {
            let _ = poller.join();
        }
    }
}

/// A clonable handle through which blocks and consensus messages are fed to a running [Replica].
///
/// Every method fails with [`ReplicaError::Halted`] once the replica's algorithm thread has stopped.
pub struct ReplicaInput<B: Block> {
    commands: Sender<Command<B>>,
}

impl<B: Block> Clone for ReplicaInput<B> {
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
        }
    }
}

impl<B: Block> ReplicaInput<B> {
    /// See [`Replica::observe_block`].
    pub fn observe_block(&self, block: B, slot: SlotNumber) -> Result<(), ReplicaError> {
        self.commands
            .send(Command::ObserveBlock { block, slot })
            .map_err(|_| ReplicaError::Halted)
    }

    /// See [`Replica::handle_consensus_message`].
    pub fn handle_consensus_message(&self, msg: PbftMessage) -> Result<(), ReplicaError> {
        self.commands
            .send(Command::ConsensusMessage(msg))
            .map_err(|_| ReplicaError::Halted)
    }
}

/// The ways in which feeding a [Replica] can fail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplicaError {
    /// The algorithm thread stopped after a fatal error, which it logged.
    #[error("replica halted after a fatal error")]
    Halted,
}
