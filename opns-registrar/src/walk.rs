//! Resolution walk: token, owner, and resolver records for a name, plus a
//! token-ID probe over a registrar.
//!
//! Each lookup is isolated. A failing resolver call never hides the token or
//! owner that were already found, and one failing token ID never stops the
//! probe.

use std::ops::RangeInclusive;

use alloy::primitives::{Address, U256};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use opns_core::address::checksum;
use opns_core::constants::DIAGNOSTIC_MAX_LEN;
use opns_core::traits::ChainClient;
use opns_core::types::TokenId;

use crate::contracts::{Registrar, Resolver};

/// Contracts consulted by the walk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractSet {
    /// Registrar holding name ⇄ token mappings
    pub registrar: Address,
    /// Resolver holding address and text records
    pub resolver: Address,
}

/// Outcome of resolving one name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NameResolution {
    /// The registrar returned token ID zero.
    Unregistered {
        /// Name looked up
        name: String,
    },
    /// The name has a token and an owner.
    Registered(RegisteredName),
    /// The token or owner lookup failed.
    Failed {
        /// Name looked up
        name: String,
        /// Error message
        error: String,
    },
}

impl NameResolution {
    /// Name this outcome is about.
    pub fn name(&self) -> &str {
        match self {
            NameResolution::Unregistered { name } | NameResolution::Failed { name, .. } => name,
            NameResolution::Registered(registered) => &registered.name,
        }
    }
}

/// A registered name and its records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RegisteredName {
    /// Label
    pub name: String,
    /// Registrar token ID (decimal in JSON)
    #[serde(rename = "tokenId", serialize_with = "serialize_decimal")]
    pub token_id: TokenId,
    /// Token owner
    #[serde(serialize_with = "serialize_checksum")]
    pub owner: Address,
    /// Resolver address record
    pub address: AddressRecord,
    /// Resolver text record
    pub text: TextRecord,
}

/// Resolver address record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AddressRecord {
    /// A non-zero address is set.
    Custom(#[serde(serialize_with = "serialize_checksum")] Address),
    /// The resolver returned the zero address; the owner is the effective target.
    Unset,
    /// The resolver call failed.
    Failed(String),
}

/// Resolver text record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextRecord {
    /// A non-empty record is set.
    Set(String),
    /// The resolver returned an empty string.
    Empty,
    /// The resolver call failed.
    Failed(String),
}

/// Resolves one name through the registrar and resolver.
#[instrument(skip(client))]
pub async fn resolve_name(
    client: &dyn ChainClient,
    contracts: ContractSet,
    name: &str,
) -> NameResolution {
    let registrar = Registrar::new(client, contracts.registrar);
    let resolver = Resolver::new(client, contracts.resolver);

    let token_id = match registrar.name_to_token_id(name).await {
        Ok(id) if id.is_zero() => {
            return NameResolution::Unregistered {
                name: name.to_string(),
            }
        }
        Ok(id) => id,
        Err(e) => {
            return NameResolution::Failed {
                name: name.to_string(),
                error: e.to_string(),
            }
        }
    };

    let owner = match registrar.owner_of(token_id).await {
        Ok(owner) => owner,
        Err(e) => {
            return NameResolution::Failed {
                name: name.to_string(),
                error: e.to_string(),
            }
        }
    };

    let address = match resolver.resolve_address(name).await {
        Ok(addr) if addr == Address::ZERO => AddressRecord::Unset,
        Ok(addr) => AddressRecord::Custom(addr),
        Err(e) => {
            debug!(name, error = %e, "resolveAddress failed");
            AddressRecord::Failed(e.to_string())
        }
    };

    let text = match resolver.resolve_text(name).await {
        Ok(text) if text.is_empty() => TextRecord::Empty,
        Ok(text) => TextRecord::Set(text),
        Err(e) => {
            debug!(name, error = %e, "resolveText failed");
            TextRecord::Failed(e.to_string())
        }
    };

    NameResolution::Registered(RegisteredName {
        name: name.to_string(),
        token_id,
        owner,
        address,
        text,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// TOKEN PROBE
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of probing one token ID.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenProbe {
    /// `ownerOf` succeeded.
    Minted {
        /// Token probed
        token_id: u64,
        /// Current owner
        owner: Address,
        /// Reverse-resolved label, if the registrar could provide one
        name: Option<String>,
    },
    /// `ownerOf` failed; usually the token was never minted.
    NotMinted {
        /// Token probed
        token_id: u64,
        /// Truncated error message
        diagnostic: String,
    },
}

/// Probes each token ID in `ids` for an owner and a name.
#[instrument(skip(client))]
pub async fn scan_token_owners(
    client: &dyn ChainClient,
    registrar: Address,
    ids: RangeInclusive<u64>,
) -> Vec<TokenProbe> {
    let registrar = Registrar::new(client, registrar);
    let mut probes = Vec::new();

    for token_id in ids {
        let probe = match registrar.owner_of(U256::from(token_id)).await {
            Ok(owner) => {
                let name = match registrar.token_id_to_name(U256::from(token_id)).await {
                    Ok(name) => Some(name),
                    Err(e) => {
                        debug!(token_id, error = %e, "tokenIdToName failed");
                        None
                    }
                };
                TokenProbe::Minted {
                    token_id,
                    owner,
                    name,
                }
            }
            Err(e) => TokenProbe::NotMinted {
                token_id,
                diagnostic: truncate_diagnostic(&e.to_string()),
            },
        };
        probes.push(probe);
    }

    if probes.iter().all(|p| matches!(p, TokenProbe::NotMinted { .. })) {
        warn!("no minted tokens in probe range");
    }
    probes
}

/// Shortens an error message to [`DIAGNOSTIC_MAX_LEN`] characters, appending
/// `...` when anything was cut.
pub fn truncate_diagnostic(message: &str) -> String {
    if message.chars().count() > DIAGNOSTIC_MAX_LEN {
        let head: String = message.chars().take(DIAGNOSTIC_MAX_LEN).collect();
        format!("{}...", head)
    } else {
        message.to_string()
    }
}

fn serialize_decimal<S: serde::Serializer>(value: &U256, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&value.to_string())
}

fn serialize_checksum<S: serde::Serializer>(value: &Address, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&checksum(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{IRegistrar, IResolver};
    use crate::mock::MockChain;

    const REGISTRAR: Address = Address::new([0x01; 20]);
    const RESOLVER: Address = Address::new([0x02; 20]);
    const CONTRACTS: ContractSet = ContractSet {
        registrar: REGISTRAR,
        resolver: RESOLVER,
    };

    #[tokio::test]
    async fn test_unregistered_name() {
        let chain = MockChain::new().with_token(REGISTRAR, "bob", 0);
        let resolution = resolve_name(&chain, CONTRACTS, "bob").await;
        assert_eq!(
            resolution,
            NameResolution::Unregistered {
                name: "bob".into()
            }
        );
        // Owner and resolver are not consulted.
        assert_eq!(chain.call_count(), 1);
    }

    #[tokio::test]
    async fn test_registered_with_records() {
        let owner = Address::repeat_byte(0xaa);
        let target = Address::repeat_byte(0xbb);
        let chain = MockChain::new()
            .with_token(REGISTRAR, "alice", 3)
            .with_owner(REGISTRAR, 3, owner)
            .with_resolved_address(RESOLVER, "alice", target)
            .with_text(RESOLVER, "alice", "hi");

        match resolve_name(&chain, CONTRACTS, "alice").await {
            NameResolution::Registered(r) => {
                assert_eq!(r.token_id, U256::from(3u64));
                assert_eq!(r.owner, owner);
                assert_eq!(r.address, AddressRecord::Custom(target));
                assert_eq!(r.text, TextRecord::Set("hi".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_zero_address_and_empty_text_are_unset() {
        let chain = MockChain::new()
            .with_token(REGISTRAR, "alice", 3)
            .with_owner(REGISTRAR, 3, Address::repeat_byte(0xaa))
            .with_resolved_address(RESOLVER, "alice", Address::ZERO)
            .with_text(RESOLVER, "alice", "");

        match resolve_name(&chain, CONTRACTS, "alice").await {
            NameResolution::Registered(r) => {
                assert_eq!(r.address, AddressRecord::Unset);
                assert_eq!(r.text, TextRecord::Empty);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_resolver_failures_are_isolated() {
        let owner = Address::repeat_byte(0xaa);
        let chain = MockChain::new()
            .with_token(REGISTRAR, "alice", 3)
            .with_owner(REGISTRAR, 3, owner)
            .with_revert(
                RESOLVER,
                IResolver::resolveAddressCall {
                    name: "alice".into(),
                },
                "no record",
            )
            .with_text(RESOLVER, "alice", "still here");

        match resolve_name(&chain, CONTRACTS, "alice").await {
            NameResolution::Registered(r) => {
                assert_eq!(r.owner, owner);
                assert!(matches!(r.address, AddressRecord::Failed(_)));
                assert_eq!(r.text, TextRecord::Set("still here".into()));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_owner_failure_fails_the_name() {
        let chain = MockChain::new()
            .with_token(REGISTRAR, "alice", 3)
            .with_revert(
                REGISTRAR,
                IRegistrar::ownerOfCall {
                    tokenId: U256::from(3u64),
                },
                "ERC721: invalid token ID",
            );

        let resolution = resolve_name(&chain, CONTRACTS, "alice").await;
        assert!(matches!(resolution, NameResolution::Failed { .. }));
        assert_eq!(resolution.name(), "alice");
    }

    #[tokio::test]
    async fn test_token_failure_fails_the_name() {
        let chain = MockChain::new().with_transport_error(
            REGISTRAR,
            IRegistrar::nameToTokenIdCall {
                name: "alice".into(),
            },
            "connection reset",
        );
        match resolve_name(&chain, CONTRACTS, "alice").await {
            NameResolution::Failed { error, .. } => assert!(error.contains("connection reset")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_token_probe() {
        let owner = Address::repeat_byte(0xcc);
        let chain = MockChain::new()
            .with_owner(REGISTRAR, 1, owner)
            .with_token_name(REGISTRAR, 1, "first")
            .with_owner(REGISTRAR, 2, owner);

        let probes = scan_token_owners(&chain, REGISTRAR, 1..=3).await;
        assert_eq!(probes.len(), 3);
        assert_eq!(
            probes[0],
            TokenProbe::Minted {
                token_id: 1,
                owner,
                name: Some("first".into())
            }
        );
        assert_eq!(
            probes[1],
            TokenProbe::Minted {
                token_id: 2,
                owner,
                name: None
            }
        );
        assert!(matches!(probes[2], TokenProbe::NotMinted { token_id: 3, .. }));
    }

    #[test]
    fn test_truncate_diagnostic() {
        assert_eq!(truncate_diagnostic("short"), "short");

        let exact = "x".repeat(DIAGNOSTIC_MAX_LEN);
        assert_eq!(truncate_diagnostic(&exact), exact);

        let long = "y".repeat(DIAGNOSTIC_MAX_LEN + 5);
        let cut = truncate_diagnostic(&long);
        assert_eq!(cut.len(), DIAGNOSTIC_MAX_LEN + 3);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_registered_json() {
        let resolution = NameResolution::Registered(RegisteredName {
            name: "alice".into(),
            token_id: U256::from(3u64),
            owner: Address::repeat_byte(0xaa),
            address: AddressRecord::Unset,
            text: TextRecord::Set("hi".into()),
        });
        let json = serde_json::to_value(&resolution).unwrap();
        assert_eq!(json["status"], "registered");
        assert_eq!(json["tokenId"], "3");
        assert_eq!(json["address"]["kind"], "unset");
        assert_eq!(json["text"]["value"], "hi");
    }
}
