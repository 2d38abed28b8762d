//! Error types for the OPNS tools.
//!
//! Library crates return [`Result`]. The CLI collapses every variant to its
//! display string at the output boundary.

use thiserror::Error;

/// Result type alias using `OpnsError`.
pub type Result<T> = std::result::Result<T, OpnsError>;

/// Main error type for all OPNS operations.
#[derive(Debug, Error)]
pub enum OpnsError {
    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// The string is not a 20-byte hex address.
    #[error("Invalid address '{input}': {reason}")]
    InvalidAddress {
        /// The rejected input, as given
        input: String,
        /// What is wrong with it
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSPORT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    RpcError {
        /// JSON-RPC error code
        code: i64,
        /// Message reported by the node
        message: String,
    },

    /// The node is unreachable or did not answer the connectivity probe.
    #[error("Cannot connect to RPC at {0}")]
    NotConnected(String),

    /// The node answered with something that is not valid JSON-RPC.
    #[error("Malformed RPC response: {0}")]
    MalformedResponse(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONTRACT ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// The contract call reverted (e.g. unknown name or token).
    #[error("Contract call reverted: {0}")]
    ContractReverted(String),

    /// Return data could not be ABI-decoded.
    #[error("ABI decode failed: {0}")]
    AbiDecode(String),

    /// The ABI file is missing, unreadable, or lacks a required entry.
    #[error("ABI load failed for '{path}': {reason}")]
    AbiLoad {
        /// File or label the ABI was read from
        path: String,
        /// Why it was rejected
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION / STORAGE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OpnsError {
    /// Returns true if this error is transient (a later attempt may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OpnsError::HttpError(_) | OpnsError::NotConnected(_) | OpnsError::RpcError { .. }
        )
    }

    /// Returns true if the contract itself rejected the call.
    pub fn is_contract_error(&self) -> bool {
        matches!(self, OpnsError::ContractReverted(_) | OpnsError::AbiDecode(_))
    }

    /// Returns true if this is an input validation error.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            OpnsError::ValidationError(_) | OpnsError::InvalidAddress { .. }
        )
    }
}
