//! Core types for OEX transactions.
//!
//! Value types here are plain data: they are `Send + Sync`, never share
//! mutable state, and encode deterministically.

mod account;
mod action;
mod chain;
mod hex;
mod transaction;
mod units;

pub use account::AccountName;
pub use action::{
    ActionKind, ActionPayload, AssetValue, ContractCall, IssueAssetParams, PayloadEncoding,
    compose_multi_asset_payload, decode_multi_asset_payload,
};
pub(crate) use action::candidate_min_stake;
pub use chain::{ChainConfig, DposParams, GasConfig};
pub use hex::{bytes_to_hex, hex_to_bytes};
pub use transaction::{Action, CallMessage, Payload, TransactionEnvelope};
pub use units::{Amount, scale_amount};
