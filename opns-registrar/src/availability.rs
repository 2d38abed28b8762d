//! Availability check for a validated name.

use alloy::primitives::Address;
use tracing::{debug, warn};

use opns_core::traits::ChainClient;
use opns_core::types::Availability;

use crate::contracts::Registrar;

/// Asks the registrar whether `name` is free.
///
/// Never fails: a missing client, an unreachable node, or a failed call all
/// yield [`Availability::Unknown`], which reads as "not available".
pub async fn check_availability(
    client: Option<&dyn ChainClient>,
    registrar: Address,
    name: &str,
) -> Availability {
    let Some(client) = client else {
        debug!(name, "no chain client, availability unknown");
        return Availability::Unknown;
    };

    if !client.is_connected().await {
        warn!(name, "node unreachable, availability unknown");
        return Availability::Unknown;
    }

    match Registrar::new(client, registrar).name_to_token_id(name).await {
        Ok(token_id) => Availability::from_token_id(token_id),
        Err(e) => {
            warn!(name, error = %e, "nameToTokenId failed, availability unknown");
            Availability::Unknown
        }
    }
}
