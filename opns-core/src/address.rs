//! Address parsing and EIP-55 checksumming.

use alloy::primitives::Address;

use crate::error::{OpnsError, Result};

/// Parses a 20-byte hex address, with or without `0x`, in any letter case.
///
/// The checksum of mixed-case input is not enforced; the caller gets the
/// canonical [`Address`] back and can render it with [`checksum`].
pub fn parse_address(input: &str) -> Result<Address> {
    let trimmed = input.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if hex_part.len() != 40 {
        return Err(OpnsError::InvalidAddress {
            input: input.to_string(),
            reason: format!("expected 40 hex digits, got {}", hex_part.len()),
        });
    }

    let bytes = hex::decode(hex_part).map_err(|e| OpnsError::InvalidAddress {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Address::from_slice(&bytes))
}

/// Returns the EIP-55 checksummed form of an address.
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}
