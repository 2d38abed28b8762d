//! # OPNS Core
//!
//! Core types, errors, and traits shared by the OPNS command-line tools.
//!
//! This crate provides the foundational building blocks used by all other OPNS crates:
//!
//! - **Name rules**: Canonicalization and validation of `.opns` labels
//! - **Errors**: A single error enum grouped by failure area
//! - **Config**: RPC endpoint and contract addresses, overridable from the environment
//! - **Traits**: The [`ChainClient`] capability every remote lookup goes through
//!
//! ## Example
//!
//! ```rust
//! use opns_core::validate_name;
//!
//! let verdict = validate_name(" Alice ");
//! assert!(verdict.is_valid);
//! assert_eq!(verdict.validated_name, "alice");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod address;
pub mod config;
pub mod constants;
pub mod error;
pub mod name;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use address::{checksum, parse_address};
pub use config::OpnsConfig;
pub use constants::*;
pub use error::{OpnsError, Result};
pub use name::{canonicalize, validate_name, NameVerdict};
pub use traits::ChainClient;
pub use types::*;
