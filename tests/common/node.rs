use std::sync::{Arc, Mutex};

use pbft_rs::{
    events::{CollectPrepareQuorumEvent, FinalizeBlockEvent, ResetRoundEvent},
    pbft::messages::PbftMessage,
    replica::{Configuration, Replica, ReplicaError, ReplicaSpec},
    types::data_types::{BlockHash, ParticipantCount, SignerId, SlotNumber},
};

use super::{
    block::TestBlock, chain::MemChain, logging::log_with_context, network::NetworkStub,
};

/// Things the Nodes will have in common:
/// - Participant count.
///
/// Things that they will differ in:
/// - Signer id.
/// - Network instance.
/// - Chain.
pub(crate) struct Node {
    me: SignerId,
    chain: MemChain,
    finalize_events: Arc<Mutex<Vec<BlockHash>>>,
    replica: Replica<TestBlock>,
}

impl Node {
    pub(crate) fn new(me: u64, participants: u64, network: NetworkStub, chain: MemChain) -> Node {
        let me = SignerId::new(me);
        let finalize_events = Arc::new(Mutex::new(Vec::new()));

        let configuration = Configuration::builder()
            .me(me)
            .participants(ParticipantCount::new(participants))
            .log_events(false)
            .build();

        let replica = ReplicaSpec::builder()
            .chain(chain.clone())
            .network(network)
            .configuration(configuration)
            .on_collect_prepare_quorum(collect_prepare_quorum_handler(me))
            .on_finalize_block(finalize_block_handler(me, finalize_events.clone()))
            .on_reset_round(reset_round_handler(me))
            .build()
            .start();

        Node {
            me,
            chain,
            finalize_events,
            replica,
        }
    }

    pub(crate) fn observe_block(&self, block: TestBlock, slot: u64) -> Result<(), ReplicaError> {
        self.replica.observe_block(block, SlotNumber::new(slot))
    }

    pub(crate) fn handle_consensus_message(&self, msg: PbftMessage) -> Result<(), ReplicaError> {
        self.replica.handle_consensus_message(msg)
    }

    pub(crate) fn finalized_blocks(&self) -> Vec<TestBlock> {
        self.chain.blocks()
    }

    /// Hashes reported by `FinalizeBlock` events, in the order the event bus handled them.
    pub(crate) fn finalize_events(&self) -> Vec<BlockHash> {
        self.finalize_events.lock().unwrap().clone()
    }

    pub(crate) fn me(&self) -> SignerId {
        self.me
    }
}

fn collect_prepare_quorum_handler(
    me: SignerId,
) -> impl Fn(&CollectPrepareQuorumEvent) + Send + 'static {
    move |collect_prepare_quorum_event| {
        log_with_context(
            Some(me),
            &format!(
                "Collected Prepare quorum, block hash: {}, height: {}, votes: {}",
                collect_prepare_quorum_event.hash.short(),
                collect_prepare_quorum_event.height,
                collect_prepare_quorum_event.votes
            ),
        );
    }
}

fn finalize_block_handler(
    me: SignerId,
    finalize_events: Arc<Mutex<Vec<BlockHash>>>,
) -> impl Fn(&FinalizeBlockEvent) + Send + 'static {
    move |finalize_block_event: &FinalizeBlockEvent| {
        log_with_context(
            Some(me),
            &format!(
                "Finalized Block, block hash: {}, height: {}, slot: {}",
                finalize_block_event.hash.short(),
                finalize_block_event.height,
                finalize_block_event.slot
            ),
        );
        finalize_events
            .lock()
            .unwrap()
            .push(finalize_block_event.hash.clone());
    }
}

fn reset_round_handler(me: SignerId) -> impl Fn(&ResetRoundEvent) + Send + 'static {
    move |reset_round_event: &ResetRoundEvent| {
        log_with_context(
            Some(me),
            &format!(
                "Reset round, slot: {}, cause: {:?}",
                reset_round_event.slot, reset_round_event.cause
            ),
        );
    }
}
