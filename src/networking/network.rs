/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

/// Broadcast-based transport that connects a replica to its peers.
///
/// Messages cross this boundary as opaque byte payloads; see [`messages`](super::messages) for their
/// encoding.
pub trait Network: Clone + Send {
    /// Send a message to all peers without blocking. Delivery is best-effort: pbft-rs never retries a
    /// broadcast, so any retry or backoff policy belongs to the implementation.
    fn broadcast(&mut self, message: Vec<u8>);

    /// Receive a message from any peer. Returns immediately with a None if no message is available now.
    fn recv(&mut self) -> Option<Vec<u8>>;
}
