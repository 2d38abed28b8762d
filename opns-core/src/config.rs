//! Runtime configuration: RPC endpoint, contract addresses, scan bounds.

use std::path::PathBuf;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

use crate::address::parse_address;
use crate::constants::*;
use crate::error::{OpnsError, Result};

/// Configuration shared by every OPNS command.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpnsConfig {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Current registrar contract
    pub registrar: Address,
    /// Previous registrar contract (probed by the demo)
    pub legacy_registrar: Address,
    /// Resolver contract
    pub resolver: Address,
    /// Registrar ABI file used by the owned-domains lister
    pub registrar_abi_path: PathBuf,
    /// Blocks back from head scanned for mint events
    pub scan_block_window: u64,
    /// Blocks per log query
    pub scan_chunk_size: u64,
    /// HTTP timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for OpnsConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.into(),
            registrar: default_address(DEFAULT_REGISTRAR_ADDRESS),
            legacy_registrar: default_address(DEFAULT_LEGACY_REGISTRAR_ADDRESS),
            resolver: default_address(DEFAULT_RESOLVER_ADDRESS),
            registrar_abi_path: DEFAULT_REGISTRAR_ABI_PATH.into(),
            scan_block_window: DEFAULT_SCAN_BLOCK_WINDOW,
            scan_chunk_size: DEFAULT_SCAN_CHUNK_SIZE,
            timeout_seconds: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl OpnsConfig {
    /// Loads configuration from the process environment (and `.env`, if present).
    ///
    /// | Variable | Fallback |
    /// |---|---|
    /// | `RPC_URL` | [`DEFAULT_RPC_URL`] |
    /// | `REGISTRAR_ADDRESS`, `NEXT_PUBLIC_REGISTRAR_ADDRESS` | [`DEFAULT_REGISTRAR_ADDRESS`] |
    /// | `LEGACY_REGISTRAR_ADDRESS` | [`DEFAULT_LEGACY_REGISTRAR_ADDRESS`] |
    /// | `RESOLVER_ADDRESS`, `NEXT_PUBLIC_RESOLVER_ADDRESS` | [`DEFAULT_RESOLVER_ADDRESS`] |
    /// | `REGISTRAR_ABI_PATH` | [`DEFAULT_REGISTRAR_ABI_PATH`] |
    /// | `SCAN_BLOCK_WINDOW` | [`DEFAULT_SCAN_BLOCK_WINDOW`] |
    /// | `SCAN_CHUNK_SIZE` | [`DEFAULT_SCAN_CHUNK_SIZE`] |
    /// | `RPC_TIMEOUT_SECS` | [`DEFAULT_RPC_TIMEOUT_SECS`] |
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let rpc_url = match first_set(&lookup, &["RPC_URL"]) {
            Some(url) => validate_rpc_url(&url)?,
            None => defaults.rpc_url,
        };

        let config = Self {
            rpc_url,
            registrar: address_var(
                &lookup,
                &["REGISTRAR_ADDRESS", "NEXT_PUBLIC_REGISTRAR_ADDRESS"],
                defaults.registrar,
            )?,
            legacy_registrar: address_var(
                &lookup,
                &["LEGACY_REGISTRAR_ADDRESS"],
                defaults.legacy_registrar,
            )?,
            resolver: address_var(
                &lookup,
                &["RESOLVER_ADDRESS", "NEXT_PUBLIC_RESOLVER_ADDRESS"],
                defaults.resolver,
            )?,
            registrar_abi_path: first_set(&lookup, &["REGISTRAR_ABI_PATH"])
                .map(PathBuf::from)
                .unwrap_or(defaults.registrar_abi_path),
            scan_block_window: number_var(&lookup, "SCAN_BLOCK_WINDOW", defaults.scan_block_window)?,
            scan_chunk_size: number_var(&lookup, "SCAN_CHUNK_SIZE", defaults.scan_chunk_size)?,
            timeout_seconds: number_var(&lookup, "RPC_TIMEOUT_SECS", defaults.timeout_seconds)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Overrides the RPC URL.
    pub fn with_rpc(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// Overrides the current registrar address.
    pub fn with_registrar(mut self, registrar: Address) -> Self {
        self.registrar = registrar;
        self
    }

    /// Checks invariants that would otherwise fail deep inside a scan.
    pub fn validate(&self) -> Result<()> {
        validate_rpc_url(&self.rpc_url)?;
        if self.scan_chunk_size == 0 {
            return Err(OpnsError::ConfigError(
                "SCAN_CHUNK_SIZE must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(*key))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

fn address_var<F>(lookup: &F, keys: &[&str], fallback: Address) -> Result<Address>
where
    F: Fn(&str) -> Option<String>,
{
    match first_set(lookup, keys) {
        Some(raw) => parse_address(&raw)
            .map_err(|e| OpnsError::ConfigError(format!("{}: {}", keys[0], e))),
        None => Ok(fallback),
    }
}

fn number_var<F>(lookup: &F, key: &str, fallback: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match first_set(lookup, &[key]) {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|e| OpnsError::ConfigError(format!("{}: {}", key, e))),
        None => Ok(fallback),
    }
}

fn default_address(s: &str) -> Address {
    // Constants are checked by `test_defaults_parse`.
    parse_address(s).unwrap_or(Address::ZERO)
}

fn validate_rpc_url(raw: &str) -> Result<String> {
    let url = url::Url::parse(raw)
        .map_err(|e| OpnsError::ConfigError(format!("RPC_URL '{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(raw.to_string()),
        other => Err(OpnsError::ConfigError(format!(
            "RPC_URL must be http(s), got '{}'",
            other
        ))),
    }
}
