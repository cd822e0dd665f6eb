//! Error types for oex-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) - Main error type, returned by most operations
//!   - [`ParseHexError`] - Malformed hexadecimal text
//!   - [`ParseAccountError`] - Invalid account name
//!   - [`ScalingError`] - Decimal amount that cannot be scaled to base units
//!   - [`RlpError`] - Malformed list encoding (decode direction only)
//!   - [`AbiError`] - Contract-call argument encoding or decoding failure
//!   - [`ValidationError`] - Structurally invalid contract interface description
//!   - [`SignerError`] - External signer failures
//!   - [`RpcError`] - Node transport failures
//!
//! Encoding and assembly errors are deterministic functions of their input and
//! are never retried. Only [`RpcError`] carries a retry classification.
//!
//! A payload that matches no function of an interface is *not* an error: see
//! [`parse_contract_call_payload`](crate::codec::parse_contract_call_payload),
//! which returns `Ok(None)` for that case.
//!
//! # Example
//!
//! ```rust
//! use oex_kit::{Error, ScalingError, scale_amount};
//!
//! match scale_amount("-1", 18) {
//!     Err(ScalingError::Negative(s)) => assert_eq!(s, "-1"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//!
//! let err: Error = oex_kit::ActionKind::from_code(0x999).unwrap_err();
//! assert!(matches!(err, Error::UnsupportedActionKind(0x999)));
//! ```

use thiserror::Error;

/// Error parsing hexadecimal text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseHexError {
    #[error("Invalid hex character '{character}' at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

/// Error parsing an account name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseAccountError {
    #[error("Account name is empty")]
    Empty,

    #[error("Account name '{0}' is too long (max 64 characters)")]
    TooLong(String),

    #[error("Account name '{0}' contains invalid character '{1}'")]
    InvalidChar(String, char),
}

/// Error scaling a decimal amount into integer base units.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScalingError {
    #[error("Amount is empty")]
    Empty,

    #[error("Amount '{0}' is negative")]
    Negative(String),

    #[error("Amount '{0}' is not a finite number")]
    NotFinite(String),

    #[error("Invalid number in amount: '{0}'")]
    InvalidNumber(String),

    #[error("Amount '{amount}' has more than {decimals} fractional digits")]
    PrecisionLoss { amount: String, decimals: u32 },
}

/// Error decoding list-encoded bytes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RlpError {
    #[error("Malformed list encoding: {0}")]
    Malformed(#[from] ::rlp::DecoderError),

    #[error("{0} trailing bytes after the encoded item")]
    TrailingBytes(usize),

    #[error("List nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("Expected a list item")]
    ExpectedList,

    #[error("Expected a byte string item")]
    ExpectedBytes,

    #[error("Integer has a leading zero byte")]
    LeadingZero,

    #[error("Integer too large for {0} bits")]
    IntegerOverflow(u32),
}

/// Error encoding or decoding contract-call arguments.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("Unsupported or malformed parameter type '{0}'")]
    InvalidType(String),

    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("Argument {index} does not match parameter type '{expected}'")]
    TypeMismatch { index: usize, expected: String },

    #[error("Argument {index} is out of range for parameter type '{ty}'")]
    ValueOutOfRange { index: usize, ty: String },

    #[error("Encoded arguments truncated: needed {needed} bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("Invalid offset or length in encoded arguments at offset {0}")]
    InvalidOffset(usize),

    #[error("Argument {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("Invalid boolean value at offset {0}")]
    InvalidBool(usize),

    #[error(transparent)]
    Format(#[from] ParseHexError),
}

/// Structural defect in a contract interface description.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Interface entry {index} has no 'type'")]
    MissingType { index: usize },

    #[error("Function entry {index} has no 'name'")]
    MissingName { index: usize },

    #[error("Input {input} of function '{function}' has no 'type'")]
    MissingInputType { function: String, input: usize },

    #[error("Input {input} of function '{function}' has invalid type '{ty}'")]
    InvalidInputType {
        function: String,
        input: usize,
        ty: String,
    },
}

/// Error reported by an external signer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Signer does not sign for account '{0}'")]
    WrongAccount(String),
}

// ============================================================================
// RPC Errors
// ============================================================================

/// Errors from the JSON-RPC transport.
#[derive(Debug, Error)]
pub enum RpcError {
    // ─── Network/Transport ───
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {message}")]
    Network {
        message: String,
        status_code: Option<u16>,
        retryable: bool,
    },

    #[error("Timeout after {0} retries")]
    Timeout(u32),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // ─── Node-reported failure ───
    #[error("RPC error: {message} (code: {code})")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },
}

impl RpcError {
    /// Check if this error is retryable.
    ///
    /// Errors reported by the node itself (`error.message` responses) are
    /// final: resubmitting the same request yields the same answer.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcError::Http(e) => e.is_timeout() || e.is_connect(),
            RpcError::Timeout(_) => true,
            RpcError::Network { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>, status_code: Option<u16>, retryable: bool) -> Self {
        RpcError::Network {
            message: message.into(),
            status_code,
            retryable,
        }
    }

    /// The node's failure message, if the node answered with an error.
    pub fn node_message(&self) -> Option<&str> {
        match self {
            RpcError::Rpc { message, .. } => Some(message),
            _ => None,
        }
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// Main error type for oex-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    // ─── Configuration ───
    #[error("No signer configured. Call .signer() on OexBuilder.")]
    NoSigner,

    #[error("Invalid configuration: {0}")]
    Config(String),

    // ─── Parsing ───
    #[error(transparent)]
    ParseHex(#[from] ParseHexError),

    #[error(transparent)]
    ParseAccount(#[from] ParseAccountError),

    #[error("Invalid amount in field '{field}': {source}")]
    Scaling {
        field: &'static str,
        #[source]
        source: ScalingError,
    },

    // ─── Encoding ───
    #[error(transparent)]
    Rlp(#[from] RlpError),

    #[error("Contract call encoding failed for '{function}': {source}")]
    Abi {
        function: String,
        #[source]
        source: AbiError,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid value in field '{field}': {source}")]
    InvalidField {
        field: &'static str,
        #[source]
        source: ParseHexError,
    },

    // ─── Assembly ───
    #[error("Unsupported action kind: {0:#x}")]
    UnsupportedActionKind(u16),

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    // ─── Collaborators ───
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Signing failed: {0}")]
    Signing(#[from] SignerError),

    // ─── Serialization ───
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Attach a field name to a scaling failure.
    pub(crate) fn scaling(field: &'static str, source: ScalingError) -> Self {
        Error::Scaling { field, source }
    }

    /// Attach a function name to an argument encoding failure.
    pub(crate) fn abi(function: impl Into<String>, source: AbiError) -> Self {
        Error::Abi {
            function: function.into(),
            source,
        }
    }

    /// Returns true if the failure came from the transport and may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Rpc(e) if e.is_retryable())
    }
}
