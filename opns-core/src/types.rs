//! Domain types shared across the OPNS crates.

use alloy::primitives::{Address, Bytes, B256, U256, U64};
use serde::{Deserialize, Serialize};

/// Numeric identifier of a registered name. Zero means "not registered".
pub type TokenId = U256;

// ═══════════════════════════════════════════════════════════════════════════════
// AVAILABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of asking the registrar whether a name is free.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    /// The registrar reports token ID zero for the name.
    Available,
    /// The registrar reports a nonzero token ID.
    Taken,
    /// The lookup could not be made (no client, no connection, call failed).
    Unknown,
}

impl Availability {
    /// Classifies a registrar token ID.
    pub fn from_token_id(token_id: TokenId) -> Self {
        if token_id.is_zero() {
            Availability::Available
        } else {
            Availability::Taken
        }
    }

    /// Conservative boolean view: only a confirmed zero token is available.
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OWNED DOMAINS
// ═══════════════════════════════════════════════════════════════════════════════

/// A name minted to an address, recovered from a Transfer event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedDomain {
    /// Registered label (without TLD)
    pub name: String,
    /// Token ID as a decimal string
    #[serde(rename = "tokenId")]
    pub token_id: String,
}

impl OwnedDomain {
    /// Creates a record from a name and its token ID.
    pub fn new(name: impl Into<String>, token_id: TokenId) -> Self {
        Self {
            name: name.into(),
            token_id: token_id.to_string(),
        }
    }
}

/// Inclusive block range used to page `eth_getLogs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRange {
    /// First block (inclusive)
    pub from: u64,
    /// Last block (inclusive)
    pub to: u64,
}

impl BlockRange {
    /// Creates a range; `from` must not exceed `to`.
    pub fn new(from: u64, to: u64) -> Self {
        debug_assert!(from <= to, "empty block range {from}..={to}");
        Self { from, to }
    }

    /// Number of blocks covered.
    pub fn block_count(&self) -> u64 {
        self.to - self.from + 1
    }

    /// Whether `block` lies within the range.
    pub fn contains(&self, block: u64) -> bool {
        (self.from..=self.to).contains(&block)
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOGS
// ═══════════════════════════════════════════════════════════════════════════════

/// Filter for a historical log query.
///
/// `topics[i] = None` matches any value at position `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogFilter {
    /// Emitting contract
    pub address: Address,
    /// Blocks to search
    pub range: BlockRange,
    /// Positional topic filter
    pub topics: Vec<Option<B256>>,
}

impl LogFilter {
    /// Whether a log satisfies the address and topic constraints (block range excluded).
    pub fn matches(&self, log: &RawLog) -> bool {
        log.address == self.address
            && self.topics.iter().enumerate().all(|(i, want)| match want {
                Some(topic) => log.topics.get(i) == Some(topic),
                None => true,
            })
    }
}

/// A log entry as returned by `eth_getLogs`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLog {
    /// Emitting contract
    pub address: Address,
    /// Indexed topics; topic 0 is the event signature
    pub topics: Vec<B256>,
    /// Non-indexed data
    #[serde(default)]
    pub data: Bytes,
    /// Block the log was included in (absent for pending logs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<U64>,
    /// Position of the log in its block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<U64>,
}

impl RawLog {
    /// Block number as a plain integer.
    pub fn block(&self) -> Option<u64> {
        self.block_number.map(|b| b.to::<u64>())
    }
}

/// Left-pads an address into a 32-byte topic.
pub fn address_topic(address: &Address) -> B256 {
    address.into_word()
}
