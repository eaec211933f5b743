/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Wire encoding of [`PbftMessage`]s.
//!
//! A message is the [borsh](https://borsh.io) encoding of a `PbftMessage`: a one-byte variant tag
//! (`0` for Prepare, `1` for Commit) followed by the encoded [`StageVote`](crate::pbft::messages::StageVote).

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::pbft::messages::PbftMessage;

/// Number of variants of [`PbftMessage`], i.e., one past the largest valid tag.
const MESSAGE_TYPE_COUNT: u8 = 2;

/// The ways in which bytes received from the network can fail to decode into a [`PbftMessage`].
#[derive(Debug, Error)]
pub enum MessageDecodeError {
    #[error("received an empty message")]
    Empty,

    /// The sender speaks a message type that this replica does not know. This points at protocol
    /// confusion upstream rather than at a faulty peer.
    #[error("unknown message type {tag}")]
    UnknownMessageType { tag: u8 },

    #[error("malformed {kind} message: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Serialize a message into the bytes that are handed to [`Network::broadcast`](super::network::Network::broadcast).
pub fn encode_message(message: &PbftMessage) -> Vec<u8> {
    message
        .try_to_vec()
        .expect("serializing a PbftMessage into memory is infallible")
}

/// Deserialize bytes received from [`Network::recv`](super::network::Network::recv).
pub fn decode_message(bytes: &[u8]) -> Result<PbftMessage, MessageDecodeError> {
    let tag = *bytes.first().ok_or(MessageDecodeError::Empty)?;
    if tag >= MESSAGE_TYPE_COUNT {
        return Err(MessageDecodeError::UnknownMessageType { tag });
    }

    PbftMessage::try_from_slice(bytes).map_err(|source| MessageDecodeError::Malformed {
        kind: if tag == 0 { "Prepare" } else { "Commit" },
        source,
    })
}
