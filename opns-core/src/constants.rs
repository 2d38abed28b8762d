//! Constants for the OPNS tools.
//!
//! Network defaults point at the IOPN testnet deployment. Every address here
//! can be overridden through [`OpnsConfig`](crate::OpnsConfig).

// ═══════════════════════════════════════════════════════════════════════════════
// NETWORK DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default JSON-RPC endpoint (IOPN testnet).
pub const DEFAULT_RPC_URL: &str = "https://testnet-rpc.iopn.tech";

/// Currently deployed registrar contract.
pub const DEFAULT_REGISTRAR_ADDRESS: &str = "0x80F58D856432eFB0C0c58468FB2a2a3397fF2da7";

/// Registrar contract from the previous deployment.
pub const DEFAULT_LEGACY_REGISTRAR_ADDRESS: &str = "0xc1F422EF0E93C915730aCc2B80eE6DD46E475978";

/// Resolver contract holding address and text records.
pub const DEFAULT_RESOLVER_ADDRESS: &str = "0xCA098dC5E77C620Ec7e72E7EB8A24b343bf0EDd1";

/// Default location of the registrar ABI file.
pub const DEFAULT_REGISTRAR_ABI_PATH: &str = "artifacts/IOPNRegistrar.abi.json";

/// Default HTTP timeout for RPC requests.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;

/// Native token symbol used when printing balances.
pub const NATIVE_SYMBOL: &str = "IOPN";

/// Top-level domain appended when displaying names.
pub const TLD: &str = "opns";

// ═══════════════════════════════════════════════════════════════════════════════
// NAME RULES
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimum label length in characters.
pub const NAME_MIN_LEN: usize = 3;

/// Maximum label length in characters.
pub const NAME_MAX_LEN: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════════
// LOG SCANNING
// ═══════════════════════════════════════════════════════════════════════════════

/// How many blocks back from the chain head the owned-domains scan looks.
pub const DEFAULT_SCAN_BLOCK_WINDOW: u64 = 100_000;

/// Blocks per `eth_getLogs` query. Most public endpoints cap ranges at 10k.
pub const DEFAULT_SCAN_CHUNK_SIZE: u64 = 10_000;

// ═══════════════════════════════════════════════════════════════════════════════
// DEMO FLOW
// ═══════════════════════════════════════════════════════════════════════════════

/// Names walked by the resolver demo.
pub const SAMPLE_NAMES: &[&str] = &["alice", "bob", "test123", "myname"];

/// First token ID probed by the demo.
pub const TOKEN_PROBE_FIRST: u64 = 1;

/// Last token ID probed by the demo (inclusive).
pub const TOKEN_PROBE_LAST: u64 = 10;

/// Address whose balance the demo prints.
pub const BALANCE_EXAMPLE_ADDRESS: &str = "0x742d35Cc6634C0532925a3b8D4C70b17cA3c98b8";

/// Error messages longer than this are truncated in demo diagnostics.
pub const DIAGNOSTIC_MAX_LEN: usize = 80;

/// Names checked by the known-names scan when none are given: `000`..=`020`, `team`, `dev`.
pub fn default_known_names() -> Vec<String> {
    (0..=20)
        .map(|i| format!("{:03}", i))
        .chain(["team", "dev"].into_iter().map(String::from))
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════════
// JSON-RPC
// ═══════════════════════════════════════════════════════════════════════════════

/// JSON-RPC error code geth-compatible nodes use for reverted calls.
pub const RPC_CODE_EXECUTION_REVERTED: i64 = 3;
