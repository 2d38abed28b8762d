//! Common traits for the OPNS tools.
//!
//! Every remote lookup goes through [`ChainClient`], so callers can be handed
//! a real JSON-RPC client, an in-memory double, or nothing at all.

use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;

use crate::error::Result;
use crate::types::{LogFilter, RawLog};

// ═══════════════════════════════════════════════════════════════════════════════
// CHAIN CLIENT TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only access to an Ethereum-compatible node.
///
/// Implementations might use:
/// - JSON-RPC over HTTP (production)
/// - In-memory state (tests)
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Returns true if the node answers a cheap probe.
    async fn is_connected(&self) -> bool;

    /// Returns the latest block number.
    async fn block_number(&self) -> Result<u64>;

    /// Executes a read-only contract call at the latest block.
    ///
    /// A revert surfaces as [`OpnsError::ContractReverted`](crate::OpnsError::ContractReverted).
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Returns logs matching the filter within its block range.
    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>>;

    /// Returns the native balance of an address in wei.
    async fn get_balance(&self, address: Address) -> Result<U256>;
}
