//! In-memory chain used by the unit tests.

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use alloy::sol_types::{SolCall, SolEvent};
use async_trait::async_trait;
use parking_lot::Mutex;

use opns_core::error::{OpnsError, Result};
use opns_core::traits::ChainClient;
use opns_core::types::{address_topic, BlockRange, LogFilter, RawLog};

use crate::contracts::{IRegistrar, IResolver};

#[derive(Clone)]
enum Reply {
    Output(Vec<u8>),
    Revert(String),
    Transport(String),
}

/// Scripted [`ChainClient`]: calls are answered by exact calldata match.
pub struct MockChain {
    connected: bool,
    head: u64,
    calls: HashMap<(Address, Vec<u8>), Reply>,
    logs: Vec<RawLog>,
    failing_ranges: Vec<BlockRange>,
    log_queries: Mutex<Vec<BlockRange>>,
    call_count: Mutex<usize>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            connected: true,
            head: 0,
            calls: HashMap::new(),
            logs: Vec::new(),
            failing_ranges: Vec::new(),
            log_queries: Mutex::new(Vec::new()),
            call_count: Mutex::new(0),
        }
    }

    pub fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }

    pub fn with_head(mut self, head: u64) -> Self {
        self.head = head;
        self
    }

    pub fn with_raw_call(mut self, to: Address, calldata: Vec<u8>, output: Vec<u8>) -> Self {
        self.calls.insert((to, calldata), Reply::Output(output));
        self
    }

    pub fn with_revert<C: SolCall>(mut self, to: Address, call: C, reason: &str) -> Self {
        self.calls
            .insert((to, call.abi_encode()), Reply::Revert(reason.to_string()));
        self
    }

    pub fn with_transport_error<C: SolCall>(mut self, to: Address, call: C, reason: &str) -> Self {
        self.calls
            .insert((to, call.abi_encode()), Reply::Transport(reason.to_string()));
        self
    }

    pub fn with_token(self, registrar: Address, name: &str, token_id: u64) -> Self {
        let call = IRegistrar::nameToTokenIdCall {
            name: name.to_string(),
        };
        let output = IRegistrar::nameToTokenIdCall::abi_encode_returns(&(U256::from(token_id),));
        self.with_raw_call(registrar, call.abi_encode(), output)
    }

    pub fn with_owner(self, registrar: Address, token_id: u64, owner: Address) -> Self {
        let call = IRegistrar::ownerOfCall {
            tokenId: U256::from(token_id),
        };
        let output = IRegistrar::ownerOfCall::abi_encode_returns(&(owner,));
        self.with_raw_call(registrar, call.abi_encode(), output)
    }

    pub fn with_token_name(self, registrar: Address, token_id: u64, name: &str) -> Self {
        let call = IRegistrar::tokenIdToNameCall {
            tokenId: U256::from(token_id),
        };
        let output = IRegistrar::tokenIdToNameCall::abi_encode_returns(&(name.to_string(),));
        self.with_raw_call(registrar, call.abi_encode(), output)
    }

    pub fn with_resolved_address(self, resolver: Address, name: &str, target: Address) -> Self {
        let call = IResolver::resolveAddressCall {
            name: name.to_string(),
        };
        let output = IResolver::resolveAddressCall::abi_encode_returns(&(target,));
        self.with_raw_call(resolver, call.abi_encode(), output)
    }

    pub fn with_text(self, resolver: Address, name: &str, text: &str) -> Self {
        let call = IResolver::resolveTextCall {
            name: name.to_string(),
        };
        let output = IResolver::resolveTextCall::abi_encode_returns(&(text.to_string(),));
        self.with_raw_call(resolver, call.abi_encode(), output)
    }

    /// Adds an ERC-721 `Transfer(from, to, tokenId)` log.
    pub fn with_transfer(
        mut self,
        registrar: Address,
        from: Address,
        to: Address,
        token_id: u64,
        block: u64,
    ) -> Self {
        let log_index = self.logs.len() as u64;
        self.logs.push(RawLog {
            address: registrar,
            topics: vec![
                IRegistrar::Transfer::SIGNATURE_HASH,
                address_topic(&from),
                address_topic(&to),
                B256::from(U256::from(token_id)),
            ],
            data: Bytes::new(),
            block_number: Some(U64::from(block)),
            log_index: Some(U64::from(log_index)),
        });
        self
    }

    /// Adds a mint (transfer from the zero address).
    pub fn with_mint(self, registrar: Address, to: Address, token_id: u64, block: u64) -> Self {
        self.with_transfer(registrar, Address::ZERO, to, token_id, block)
    }

    /// Adds an arbitrary log.
    pub fn with_log(mut self, log: RawLog) -> Self {
        self.logs.push(log);
        self
    }

    /// Any log query overlapping `range` fails.
    pub fn with_failing_range(mut self, range: BlockRange) -> Self {
        self.failing_ranges.push(range);
        self
    }

    /// Ranges passed to `get_logs`, in call order.
    pub fn log_queries(&self) -> Vec<BlockRange> {
        self.log_queries.lock().clone()
    }

    /// Number of `call`s made.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(OpnsError::HttpError("connection refused".into()))
        }
    }
}

#[async_trait]
impl ChainClient for MockChain {
    async fn is_connected(&self) -> bool {
        self.connected
    }

    async fn block_number(&self) -> Result<u64> {
        self.ensure_connected()?;
        Ok(self.head)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        *self.call_count.lock() += 1;
        self.ensure_connected()?;

        match self.calls.get(&(to, data.to_vec())) {
            Some(Reply::Output(out)) => Ok(Bytes::from(out.clone())),
            Some(Reply::Revert(reason)) => Err(OpnsError::ContractReverted(reason.clone())),
            Some(Reply::Transport(reason)) => Err(OpnsError::HttpError(reason.clone())),
            // Unscripted calls behave like a contract rejecting unknown input.
            None => Err(OpnsError::ContractReverted("execution reverted".into())),
        }
    }

    async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>> {
        self.log_queries.lock().push(filter.range);
        self.ensure_connected()?;

        let overlaps = |r: &BlockRange| r.from <= filter.range.to && filter.range.from <= r.to;
        if self.failing_ranges.iter().any(overlaps) {
            return Err(OpnsError::RpcError {
                code: -32005,
                message: format!("query timeout for {}", filter.range),
            });
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| log.block().is_some_and(|b| filter.range.contains(b)))
            .filter(|log| filter.matches(log))
            .cloned()
            .collect())
    }

    async fn get_balance(&self, _address: Address) -> Result<U256> {
        self.ensure_connected()?;
        Ok(U256::ZERO)
    }
}
