use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Receiver, Sender, TryRecvError},
    Arc, Mutex,
};

use pbft_rs::networking::network::Network;

/// A switch shared by every stub of a mock network. While the gate is closed, `recv` returns `None` on
/// every stub, and broadcasts queue up in the inboxes.
#[derive(Clone, Default)]
pub(crate) struct DeliveryGate(Arc<AtomicBool>);

impl DeliveryGate {
    pub(crate) fn open(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    pub(crate) fn close(&self) {
        self.0.store(false, Ordering::SeqCst)
    }

    fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A mock network stub which passes messages from and to threads using channels.
#[derive(Clone)]
pub(crate) struct NetworkStub {
    all_peers: Vec<Sender<Vec<u8>>>,
    inbox: Arc<Mutex<Receiver<Vec<u8>>>>,
    gate: DeliveryGate,
}

impl Network for NetworkStub {
    fn broadcast(&mut self, message: Vec<u8>) {
        for peer in &self.all_peers {
            // The peer may have crashed.
            let _ = peer.send(message.clone());
        }
    }

    fn recv(&mut self) -> Option<Vec<u8>> {
        if !self.gate.is_open() {
            return None;
        }
        match self.inbox.lock().unwrap().try_recv() {
            Ok(message) => Some(message),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => panic!(),
        }
    }
}

/// Create `size` stubs connected to each other (and to themselves) through `gate`, which starts closed.
pub(crate) fn mock_network(size: usize, gate: &DeliveryGate) -> Vec<NetworkStub> {
    let (all_peers, inboxes): (Vec<Sender<Vec<u8>>>, Vec<Receiver<Vec<u8>>>) =
        (0..size).map(|_| mpsc::channel()).unzip();

    inboxes
        .into_iter()
        .map(|inbox| NetworkStub {
            all_peers: all_peers.clone(),
            inbox: Arc::new(Mutex::new(inbox)),
            gate: gate.clone(),
        })
        .collect()
}
