pub(crate) mod block;

pub(crate) mod chain;

pub(crate) mod logging;

pub(crate) mod network;

pub(crate) mod node;
