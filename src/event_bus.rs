/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The thread that receives [events](crate::events) from the algorithm thread and fires the handlers
//! registered for them.

use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::events::*;
use crate::logging::Logger;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

/// How long the event bus blocks waiting for an event before checking for shutdown.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// The user-defined handlers, plus the default loggers if logging was enabled, for every kind of event.
pub(crate) struct EventHandlers {
    pub(crate) observe_block_handlers: Vec<HandlerPtr<ObserveBlockEvent>>,
    pub(crate) start_round_handlers: Vec<HandlerPtr<StartRoundEvent>>,
    pub(crate) prepare_handlers: Vec<HandlerPtr<PrepareEvent>>,
    pub(crate) commit_handlers: Vec<HandlerPtr<CommitEvent>>,
    pub(crate) receive_prepare_handlers: Vec<HandlerPtr<ReceivePrepareEvent>>,
    pub(crate) receive_commit_handlers: Vec<HandlerPtr<ReceiveCommitEvent>>,
    pub(crate) collect_prepare_quorum_handlers: Vec<HandlerPtr<CollectPrepareQuorumEvent>>,
    pub(crate) finalize_block_handlers: Vec<HandlerPtr<FinalizeBlockEvent>>,
    pub(crate) reset_round_handlers: Vec<HandlerPtr<ResetRoundEvent>>,
}

impl EventHandlers {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        log_events: bool,
        observe_block_handler: Option<HandlerPtr<ObserveBlockEvent>>,
        start_round_handler: Option<HandlerPtr<StartRoundEvent>>,
        prepare_handler: Option<HandlerPtr<PrepareEvent>>,
        commit_handler: Option<HandlerPtr<CommitEvent>>,
        receive_prepare_handler: Option<HandlerPtr<ReceivePrepareEvent>>,
        receive_commit_handler: Option<HandlerPtr<ReceiveCommitEvent>>,
        collect_prepare_quorum_handler: Option<HandlerPtr<CollectPrepareQuorumEvent>>,
        finalize_block_handler: Option<HandlerPtr<FinalizeBlockEvent>>,
        reset_round_handler: Option<HandlerPtr<ResetRoundEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            observe_block_handlers: handlers(log_events, observe_block_handler),
            start_round_handlers: handlers(log_events, start_round_handler),
            prepare_handlers: handlers(log_events, prepare_handler),
            commit_handlers: handlers(log_events, commit_handler),
            receive_prepare_handlers: handlers(log_events, receive_prepare_handler),
            receive_commit_handlers: handlers(log_events, receive_commit_handler),
            collect_prepare_quorum_handlers: handlers(log_events, collect_prepare_quorum_handler),
            finalize_block_handlers: handlers(log_events, finalize_block_handler),
            reset_round_handlers: handlers(log_events, reset_round_handler),
        }
    }

    /// Returns whether no handler at all is registered, in which case the event bus need not run.
    pub(crate) fn is_empty(&self) -> bool {
        self.observe_block_handlers.is_empty()
            && self.start_round_handlers.is_empty()
            && self.prepare_handlers.is_empty()
            && self.commit_handlers.is_empty()
            && self.receive_prepare_handlers.is_empty()
            && self.receive_commit_handlers.is_empty()
            && self.collect_prepare_quorum_handlers.is_empty()
            && self.finalize_block_handlers.is_empty()
            && self.reset_round_handlers.is_empty()
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::ObserveBlock(observe_block_event) =>
                self.observe_block_handlers.iter().for_each(|handler| handler(&observe_block_event)),

            Event::StartRound(start_round_event) =>
                self.start_round_handlers.iter().for_each(|handler| handler(&start_round_event)),

            Event::Prepare(prepare_event) =>
                self.prepare_handlers.iter().for_each(|handler| handler(&prepare_event)),

            Event::Commit(commit_event) =>
                self.commit_handlers.iter().for_each(|handler| handler(&commit_event)),

            Event::ReceivePrepare(receive_prepare_event) =>
                self.receive_prepare_handlers.iter().for_each(|handler| handler(&receive_prepare_event)),

            Event::ReceiveCommit(receive_commit_event) =>
                self.receive_commit_handlers.iter().for_each(|handler| handler(&receive_commit_event)),

            Event::CollectPrepareQuorum(collect_prepare_quorum_event) =>
                self.collect_prepare_quorum_handlers.iter().for_each(|handler| handler(&collect_prepare_quorum_event)),

            Event::FinalizeBlock(finalize_block_event) =>
                self.finalize_block_handlers.iter().for_each(|handler| handler(&finalize_block_event)),

            Event::ResetRound(reset_round_event) =>
                self.reset_round_handlers.iter().for_each(|handler| handler(&reset_round_event)),
        }
    }
}

// Default logger first, then the user's handler.
fn handlers<T: Logger>(log_events: bool, user_handler: Option<HandlerPtr<T>>) -> Vec<HandlerPtr<T>> {
    let mut handlers = Vec::new();
    if log_events {
        handlers.push(T::get_logger());
    }
    handlers.extend(user_handler);
    handlers
}

pub(crate) fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
    shutdown_signal: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("event_bus thread disconnected from main thread")
            }
        }

        match event_subscriber.recv_timeout(EVENT_POLL_INTERVAL) {
            Ok(event) => event_handlers.fire_handlers(event),
            Err(RecvTimeoutError::Timeout) => (),
            // The algorithm thread (event publisher) halted. Keep waiting for the shutdown signal.
            Err(RecvTimeoutError::Disconnected) => thread::sleep(EVENT_POLL_INTERVAL),
        }
    })
}
