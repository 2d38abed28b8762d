//! Owned-domains enumeration.
//!
//! Names are found by paging `eth_getLogs` backward from the chain head for
//! mint transfers (`Transfer(0x0, owner, tokenId)`) and reverse-resolving each
//! token through `tokenIdToName`. Failed chunks and failed lookups are skipped,
//! so the result may be incomplete but is never wrong.

use alloy::primitives::{Address, B256, U256};
use alloy::sol_types::SolEvent;
use tracing::{debug, info, instrument, warn};

use opns_core::address::{checksum, parse_address};
use opns_core::config::OpnsConfig;
use opns_core::constants::{DEFAULT_SCAN_BLOCK_WINDOW, DEFAULT_SCAN_CHUNK_SIZE};
use opns_core::error::{OpnsError, Result};
use opns_core::traits::ChainClient;
use opns_core::types::{address_topic, BlockRange, LogFilter, OwnedDomain, RawLog, TokenId};

use crate::abi::RegistrarAbi;
use crate::contracts::{IRegistrar, Registrar};

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Bounds of a mint-event scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanConfig {
    /// Blocks back from the head to search
    pub window: u64,
    /// Blocks per `eth_getLogs` query
    pub chunk_size: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_SCAN_BLOCK_WINDOW,
            chunk_size: DEFAULT_SCAN_CHUNK_SIZE,
        }
    }
}

impl From<&OpnsConfig> for ScanConfig {
    fn from(config: &OpnsConfig) -> Self {
        Self {
            window: config.scan_block_window,
            chunk_size: config.scan_chunk_size,
        }
    }
}

impl ScanConfig {
    /// Creates a scan configuration.
    pub fn new(window: u64, chunk_size: u64) -> Self {
        Self { window, chunk_size }
    }
}

/// Splits `[max(0, head - window), head]` into consecutive ranges of at most
/// `chunk_size` blocks.
pub fn plan_chunks(head: u64, window: u64, chunk_size: u64) -> Result<Vec<BlockRange>> {
    if chunk_size == 0 {
        return Err(OpnsError::ConfigError("chunk size must be greater than zero".into()));
    }

    let mut chunks = Vec::new();
    let mut from = head.saturating_sub(window);
    loop {
        let to = head.min(from.saturating_add(chunk_size - 1));
        chunks.push(BlockRange::new(from, to));
        if to == head {
            break;
        }
        from = to + 1;
    }
    Ok(chunks)
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCANNER
// ═══════════════════════════════════════════════════════════════════════════════

/// What happened to one chunk of the scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// Logs were fetched; holds the number of mint events found.
    Fetched(usize),
    /// The log query failed and the chunk was skipped.
    Failed(String),
}

/// Scans a registrar for names minted to an address.
pub struct OwnedDomainScanner<'a> {
    client: &'a dyn ChainClient,
    registrar: Registrar<'a>,
    transfer_topic: B256,
    config: ScanConfig,
}

impl<'a> OwnedDomainScanner<'a> {
    /// Creates a scanner over the given registrar.
    pub fn new(client: &'a dyn ChainClient, registrar: Address, config: ScanConfig) -> Self {
        Self {
            client,
            registrar: Registrar::new(client, registrar),
            transfer_topic: IRegistrar::Transfer::SIGNATURE_HASH,
            config,
        }
    }

    /// Takes the `Transfer` topic from a loaded ABI.
    pub fn with_abi(mut self, abi: &RegistrarAbi) -> Self {
        self.transfer_topic = abi.transfer_topic();
        self
    }

    /// Lists the names minted to `owner` within the configured window.
    pub async fn scan(&self, owner: Address) -> Result<Vec<OwnedDomain>> {
        self.scan_with_progress(owner, |_, _| {}).await
    }

    /// Like [`scan`](Self::scan), reporting each chunk as it completes.
    #[instrument(skip(self, owner, on_chunk), fields(owner = %checksum(&owner)))]
    pub async fn scan_with_progress<F>(&self, owner: Address, mut on_chunk: F) -> Result<Vec<OwnedDomain>>
    where
        F: FnMut(BlockRange, &ChunkOutcome),
    {
        let head = self.client.block_number().await?;
        let chunks = plan_chunks(head, self.config.window, self.config.chunk_size)?;
        info!(head, chunks = chunks.len(), "scanning for mint events");

        let mut domains = Vec::new();
        for range in chunks {
            let outcome = match self.mint_events(owner, range).await {
                Ok(events) => {
                    let found = events.len();
                    for event in events {
                        if let Some(domain) = self.resolve_event(&event).await {
                            domains.push(domain);
                        }
                    }
                    ChunkOutcome::Fetched(found)
                }
                Err(e) => {
                    warn!(%range, error = %e, "log query failed, skipping chunk");
                    ChunkOutcome::Failed(e.to_string())
                }
            };
            on_chunk(range, &outcome);
        }

        info!(found = domains.len(), "scan complete");
        Ok(domains)
    }

    /// Mint `Transfer` logs to `owner` within one block range.
    pub async fn mint_events(&self, owner: Address, range: BlockRange) -> Result<Vec<RawLog>> {
        let filter = LogFilter {
            address: self.registrar.address(),
            range,
            topics: vec![
                Some(self.transfer_topic),
                Some(address_topic(&Address::ZERO)),
                Some(address_topic(&owner)),
            ],
        };
        let logs = self.client.get_logs(&filter).await?;
        debug!(%range, count = logs.len(), "mint events");
        Ok(logs)
    }

    async fn resolve_event(&self, event: &RawLog) -> Option<OwnedDomain> {
        let token_id = token_id_from_log(event)?;

        match self.registrar.token_id_to_name(token_id).await {
            Ok(name) if name.is_empty() => {
                debug!(%token_id, "empty name, skipping");
                None
            }
            Ok(name) => Some(OwnedDomain::new(name, token_id)),
            Err(e) if e.is_contract_error() => {
                debug!(%token_id, error = %e, "tokenIdToName reverted, skipping");
                None
            }
            Err(e) => {
                warn!(%token_id, error = %e, "tokenIdToName failed, skipping");
                None
            }
        }
    }
}

/// Token ID carried in topic 3 of an ERC-721 `Transfer` log.
fn token_id_from_log(log: &RawLog) -> Option<TokenId> {
    match log.topics.get(3) {
        Some(topic) => Some(U256::from_be_bytes(topic.0)),
        None => {
            debug!(topics = log.topics.len(), "transfer log without token topic");
            None
        }
    }
}

/// Full owned-domains flow: connectivity, address parsing, ABI check, scan.
///
/// Every error returned here is fatal for the caller; per-chunk and per-name
/// failures are absorbed by the scan.
pub async fn list_owned_domains(
    client: &dyn ChainClient,
    config: &OpnsConfig,
    address: &str,
) -> Result<Vec<OwnedDomain>> {
    list_owned_domains_with_progress(client, config, address, |_, _| {}).await
}

/// [`list_owned_domains`] with a per-chunk callback.
pub async fn list_owned_domains_with_progress<F>(
    client: &dyn ChainClient,
    config: &OpnsConfig,
    address: &str,
    on_chunk: F,
) -> Result<Vec<OwnedDomain>>
where
    F: FnMut(BlockRange, &ChunkOutcome),
{
    if !client.is_connected().await {
        return Err(OpnsError::NotConnected(config.rpc_url.clone()));
    }

    let owner = parse_address(address)?;
    let abi = RegistrarAbi::load(&config.registrar_abi_path)?;

    OwnedDomainScanner::new(client, config.registrar, ScanConfig::from(config))
        .with_abi(&abi)
        .scan_with_progress(owner, on_chunk)
        .await
}
