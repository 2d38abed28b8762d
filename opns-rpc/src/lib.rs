//! # OPNS RPC
//!
//! JSON-RPC over HTTP implementation of [`opns_core::ChainClient`].
//!
//! Only the handful of read-only `eth_*` methods the OPNS tools need are
//! covered. Node error objects are mapped onto [`opns_core::OpnsError`], with
//! reverts split out so callers can tell "the contract said no" from
//! "the node is unhappy".

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod client;

pub use client::{RpcClient, RpcConfig};
