use std::{
    thread,
    time::{Duration, Instant},
};

use log::LevelFilter;
use pbft_rs::types::block::Block;

mod common;

use crate::common::{
    block::TestBlock,
    chain::MemChain,
    logging::setup_logger,
    network::{mock_network, DeliveryGate},
    node::Node,
};

const TIMEOUT: Duration = Duration::from_secs(30);

// Poll `condition` until it holds, or panic after `TIMEOUT`.
fn wait_until(description: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + TIMEOUT;
    while !condition() {
        if Instant::now() > deadline {
            panic!("timed out waiting until {}", description);
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn start_nodes(live: usize, participants: u64, gate: &DeliveryGate) -> Vec<Node> {
    mock_network(participants as usize, gate)
        .into_iter()
        .take(live)
        .enumerate()
        .map(|(me, network)| Node::new(me as u64, participants, network, MemChain::new()))
        .collect()
}

#[test]
fn four_replicas_finalize_the_same_block_test() {
    setup_logger(LevelFilter::Info);

    // 1. Start 4 replicas on a network that holds back every message.
    let gate = DeliveryGate::default();
    let nodes = start_nodes(4, 4, &gate);

    // 2. Hand every replica the same block for slot 10, then let votes flow.
    let b1 = TestBlock::new(5, b"b1");
    for node in &nodes {
        node.observe_block(b1.clone(), 10).unwrap();
    }
    gate.open();

    // 3. Every replica finalizes the block, and only that block.
    wait_until("every replica finalized b1", || {
        nodes.iter().all(|node| node.finalized_blocks() == vec![b1.clone()])
    });
    wait_until("every FinalizeBlock event was handled", || {
        nodes.iter().all(|node| node.finalize_events() == vec![b1.hash()])
    });

    // 4. Late votes gossiped after the reset never finalize the block a second time.
    thread::sleep(Duration::from_millis(500));
    for node in &nodes {
        assert_eq!(node.finalized_blocks(), vec![b1.clone()], "replica {}", node.me());
    }
}

#[test]
fn three_live_replicas_of_four_finalize_test() {
    setup_logger(LevelFilter::Info);

    // 1. Start 3 of 4 replicas. The 4th never comes up, which is within the fault bound f = 1.
    let gate = DeliveryGate::default();
    let nodes = start_nodes(3, 4, &gate);

    let b1 = TestBlock::new(1, b"crash tolerant");
    for node in &nodes {
        node.observe_block(b1.clone(), 1).unwrap();
    }
    gate.open();

    // 2. Own Commit plus two peers' Commits is 3 > 2f.
    wait_until("every live replica finalized b1", || {
        nodes.iter().all(|node| node.finalized_blocks() == vec![b1.clone()])
    });
}

#[test]
fn successive_slots_finalize_in_order_test() {
    setup_logger(LevelFilter::Info);

    let gate = DeliveryGate::default();
    let nodes = start_nodes(4, 4, &gate);

    let blocks: Vec<TestBlock> = (1..=3)
        .map(|height| TestBlock::new(height, format!("block {}", height).as_bytes()))
        .collect();

    for (slot, block) in (10..).zip(&blocks) {
        // Hold back messages until every replica has moved on to the new slot, so that no vote for
        // the new block reaches a replica that is still in the previous one.
        gate.close();
        for node in &nodes {
            node.observe_block(block.clone(), slot).unwrap();
        }
        gate.open();

        wait_until("every replica finalized the block of the slot", || {
            nodes
                .iter()
                .all(|node| node.finalized_blocks().last() == Some(block))
        });
    }

    for node in &nodes {
        assert_eq!(node.finalized_blocks(), blocks, "replica {}", node.me());
    }
}
