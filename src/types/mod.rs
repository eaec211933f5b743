/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Types and traits that are used across multiple components of pbft-rs.
//!
//! Other types and traits, specific to the voting protocol itself, can be found in
//! [`crate::pbft::types`].

pub mod block;

pub mod data_types;
