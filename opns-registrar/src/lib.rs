//! # OPNS Registrar
//!
//! Read-only lookups against the `.opns` registrar and resolver contracts.
//!
//! ## Features
//!
//! - **Availability**: Token-ID-zero check that degrades to "unknown" on any failure
//! - **Resolution walk**: Token, owner, address record, and text record per name,
//!   each lookup isolated from the others
//! - **Owned domains**: Chunked scan of mint `Transfer` events, reverse-resolved to names
//! - **Known names**: Ownership check over a fixed candidate list
//!
//! Every function takes a `&dyn ChainClient`, so the same flows run against a
//! live node or an in-memory double.
//!
//! ## Example
//!
//! ```rust,ignore
//! use opns_registrar::{check_availability, OwnedDomainScanner, ScanConfig};
//!
//! let availability = check_availability(Some(&client), registrar, "alice").await;
//! let scanner = OwnedDomainScanner::new(&client, registrar, ScanConfig::default());
//! let domains = scanner.scan(owner).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod abi;
pub mod availability;
pub mod contracts;
pub mod known;
pub mod owned;
pub mod walk;

#[cfg(test)]
mod mock;

pub use abi::RegistrarAbi;
pub use availability::check_availability;
pub use contracts::{Registrar, Resolver};
pub use known::{scan_known_names, KnownNamesReport, NameError};
pub use owned::{
    list_owned_domains, list_owned_domains_with_progress, plan_chunks, ChunkOutcome,
    OwnedDomainScanner, ScanConfig,
};
pub use walk::{
    resolve_name, scan_token_owners, truncate_diagnostic, AddressRecord, ContractSet,
    NameResolution, RegisteredName, TextRecord, TokenProbe,
};
