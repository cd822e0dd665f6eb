//! Action payload encoding and transaction assembly for OEX chain clients.
//!
//! **oex-kit** turns high-level intents ("create an account", "vote for a
//! candidate", "call a contract with several assets") into the exact payload
//! bytes and transaction envelope an OEX node accepts, then hands them to a
//! signer and submits them.
//!
//! # Quick Start
//!
//! ```rust
//! use oex_kit::*;
//!
//! let config = ChainConfig::new(1, "oexchain").unwrap();
//!
//! let intent = ActionIntent::new(
//!     "alice".parse().unwrap(),
//!     ActionPayload::vote("producer1".parse().unwrap(), "5"),
//! );
//! let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();
//!
//! let action = &envelope.actions()[0];
//! assert_eq!(action.to_account_name.as_str(), "oexchain.dpos");
//! assert!(action.amount.is_zero());
//! ```
//!
//! # Layers
//!
//! - [`codec`] - list encoding (RLP) and contract-call encoding (ABI), plus
//!   payload decoding against an interface description
//! - [`types`] - account names, amounts, action kinds and payloads, envelopes
//! - [`client`] - the assembler, the [`Signer`] / [`Submitter`] seams, and the
//!   [`Oex`] client with its JSON-RPC transport
//!
//! Everything below [`client`] is synchronous and pure: the same intent and
//! [`ChainConfig`] always produce the same bytes.
//!
//! # Amounts
//!
//! Human decimals are scaled exactly, never through floating point:
//!
//! ```
//! use oex_kit::{Amount, scale_amount};
//!
//! assert_eq!(scale_amount("1", 18).unwrap().to_string(), "0xde0b6b3a7640000");
//! assert_eq!(scale_amount("0", 18).unwrap(), Amount::Zero);
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{
    AbiError, Error, ParseAccountError, ParseHexError, RlpError, RpcError, ScalingError,
    SignerError, ValidationError,
};
pub use types::*;

pub use codec::{
    AbiType, AbiValue, ContractInterface, ParsedCall, ParsedParameter, RlpItem, get_rlp_data,
    parse_contract_call_payload,
};

// Re-export client types
pub use client::{
    ActionIntent, BlockNumber, CallbackSigner, Oex, OexBuilder, RetryConfig, RpcClient,
    SignFuture, SignatureInfo, Signer, SubmitFuture, Submitter, assemble, read_contract_message,
};
