//! Registrar ABI loading.
//!
//! The owned-domains lister refuses to run against an ABI file that does not
//! describe the `Transfer` event and the `tokenIdToName` reverse lookup, so a
//! wrong artifact is reported up front instead of as an empty result.

use std::path::Path;

use alloy::json_abi::JsonAbi;
use alloy::primitives::B256;
use alloy::sol_types::{SolCall, SolEvent};
use tracing::debug;

use opns_core::error::{OpnsError, Result};

use crate::contracts::IRegistrar;

/// A registrar ABI that has been checked against the calls this crate makes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegistrarAbi {
    transfer_topic: B256,
}

impl RegistrarAbi {
    /// Reads and checks an ABI file.
    ///
    /// Accepts either a bare ABI array or a build artifact with an `abi` field.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|e| OpnsError::AbiLoad {
            path: label.clone(),
            reason: e.to_string(),
        })?;
        Self::from_json(&raw, &label)
    }

    /// Parses and checks ABI JSON. `source` names it in errors.
    pub fn from_json(raw: &str, source: &str) -> Result<Self> {
        let load_err = |reason: String| OpnsError::AbiLoad {
            path: source.to_string(),
            reason,
        };

        let mut value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| load_err(e.to_string()))?;
        if let Some(inner) = value.get_mut("abi") {
            value = inner.take();
        }
        let abi: JsonAbi = serde_json::from_value(value).map_err(|e| load_err(e.to_string()))?;

        let transfer_topic = abi
            .event("Transfer")
            .and_then(|events| {
                events
                    .iter()
                    .find(|e| !e.anonymous && e.selector() == IRegistrar::Transfer::SIGNATURE_HASH)
            })
            .map(|e| e.selector())
            .ok_or_else(|| load_err("missing event Transfer(address,address,uint256)".into()))?;

        let has_reverse = abi.function("tokenIdToName").is_some_and(|functions| {
            functions
                .iter()
                .any(|f| f.selector().0 == IRegistrar::tokenIdToNameCall::SELECTOR)
        });
        if !has_reverse {
            return Err(load_err("missing function tokenIdToName(uint256)".into()));
        }

        debug!(
            source,
            functions = abi.functions.len(),
            events = abi.events.len(),
            %transfer_topic,
            "loaded registrar ABI"
        );

        Ok(Self { transfer_topic })
    }

    /// Topic 0 of the `Transfer` event declared in the ABI.
    pub fn transfer_topic(&self) -> B256 {
        self.transfer_topic
    }
}
