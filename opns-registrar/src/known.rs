//! Ownership check over a fixed list of candidate names.
//!
//! Useful when the log window no longer reaches back to the mints.

use alloy::primitives::Address;
use serde::Serialize;
use tracing::{debug, instrument};

use opns_core::address::checksum;
use opns_core::traits::ChainClient;
use opns_core::types::OwnedDomain;

use crate::contracts::Registrar;

/// Result of [`scan_known_names`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KnownNamesReport {
    /// Address checked, checksummed
    pub owner: String,
    /// Number of candidates looked up
    pub checked: usize,
    /// Candidates registered to `owner`
    pub owned: Vec<OwnedDomain>,
    /// Candidates whose lookup failed
    pub errors: Vec<NameError>,
}

/// A failed lookup for one candidate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NameError {
    /// Candidate name
    pub name: String,
    /// Error message
    pub error: String,
}

/// Checks which of `names` are registered to `owner`.
#[instrument(skip(client, names), fields(candidates = names.len()))]
pub async fn scan_known_names(
    client: &dyn ChainClient,
    registrar: Address,
    owner: Address,
    names: &[String],
) -> KnownNamesReport {
    let registrar = Registrar::new(client, registrar);
    let mut owned = Vec::new();
    let mut errors = Vec::new();

    for name in names {
        let token_id = match registrar.name_to_token_id(name).await {
            Ok(id) if id.is_zero() => continue,
            Ok(id) => id,
            Err(e) => {
                errors.push(NameError {
                    name: name.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        match registrar.owner_of(token_id).await {
            Ok(holder) if holder == owner => {
                debug!(name = %name, %token_id, "owned");
                owned.push(OwnedDomain::new(name.clone(), token_id));
            }
            Ok(_) => {}
            Err(e) => errors.push(NameError {
                name: name.clone(),
                error: e.to_string(),
            }),
        }
    }

    KnownNamesReport {
        owner: checksum(&owner),
        checked: names.len(),
        owned,
        errors,
    }
}
