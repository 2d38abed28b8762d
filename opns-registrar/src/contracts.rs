//! Typed wrappers around the registrar and resolver contracts.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use tracing::{debug, instrument};

use opns_core::error::{OpnsError, Result};
use opns_core::traits::ChainClient;
use opns_core::types::TokenId;

pub use bindings::{IRegistrar, IResolver};

#[allow(missing_docs)]
mod bindings {
    use alloy::sol;

    sol! {
        /// ERC-721 registrar mapping labels to token IDs.
        interface IRegistrar {
            event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

            function nameToTokenId(string name) external view returns (uint256);
            function tokenIdToName(uint256 tokenId) external view returns (string);
            function ownerOf(uint256 tokenId) external view returns (address);
        }

        /// Resolver holding per-name address and text records.
        interface IResolver {
            function resolveAddress(string name) external view returns (address);
            function resolveText(string name) external view returns (string);
        }
    }
}

/// Encodes `call`, executes it against `to`, and decodes the return data.
async fn call_contract<C: SolCall>(
    client: &dyn ChainClient,
    to: Address,
    call: C,
) -> Result<C::Return> {
    let data = Bytes::from(call.abi_encode());
    let output = client.call(to, data).await?;

    if output.is_empty() {
        return Err(OpnsError::AbiDecode(format!(
            "empty return data from {}",
            to
        )));
    }

    C::abi_decode_returns(&output, true).map_err(|e| OpnsError::AbiDecode(e.to_string()))
}

/// Read-only view of a registrar contract.
#[derive(Clone, Copy)]
pub struct Registrar<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> Registrar<'a> {
    /// Binds a registrar address to a client.
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Token ID for a label; zero when unregistered.
    #[instrument(skip(self), fields(registrar = %self.address))]
    pub async fn name_to_token_id(&self, name: &str) -> Result<TokenId> {
        let call = IRegistrar::nameToTokenIdCall {
            name: name.to_string(),
        };
        let token_id = call_contract(self.client, self.address, call).await?._0;
        debug!(name, %token_id, "nameToTokenId");
        Ok(token_id)
    }

    /// Label registered under a token ID. Reverts for unknown tokens.
    #[instrument(skip(self), fields(registrar = %self.address))]
    pub async fn token_id_to_name(&self, token_id: TokenId) -> Result<String> {
        let call = IRegistrar::tokenIdToNameCall { tokenId: token_id };
        Ok(call_contract(self.client, self.address, call).await?._0)
    }

    /// Current owner of a token. Reverts for tokens that were never minted.
    #[instrument(skip(self), fields(registrar = %self.address))]
    pub async fn owner_of(&self, token_id: TokenId) -> Result<Address> {
        let call = IRegistrar::ownerOfCall { tokenId: token_id };
        Ok(call_contract(self.client, self.address, call).await?._0)
    }
}

/// Read-only view of a resolver contract.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    client: &'a dyn ChainClient,
    address: Address,
}

impl<'a> Resolver<'a> {
    /// Binds a resolver address to a client.
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Address record for a label; the zero address when none is set.
    #[instrument(skip(self), fields(resolver = %self.address))]
    pub async fn resolve_address(&self, name: &str) -> Result<Address> {
        let call = IResolver::resolveAddressCall {
            name: name.to_string(),
        };
        Ok(call_contract(self.client, self.address, call).await?._0)
    }

    /// Text record for a label; empty when none is set.
    #[instrument(skip(self), fields(resolver = %self.address))]
    pub async fn resolve_text(&self, name: &str) -> Result<String> {
        let call = IResolver::resolveTextCall {
            name: name.to_string(),
        };
        Ok(call_contract(self.client, self.address, call).await?._0)
    }
}
