//! Client module: assembly, signing and node transport.
//!
//! - [`assemble`] - Turn an [`ActionIntent`] into a [`TransactionEnvelope`](crate::TransactionEnvelope)
//! - [`Oex`] - The main client: assemble, sign and submit in one call
//! - [`OexBuilder`] - Fluent builder for configuring the client
//! - [`RpcClient`] - Low-level JSON-RPC client with retry logic
//!
//! # Collaborators
//!
//! | Trait | Role | Provided implementation |
//! |-------|------|-------------------------|
//! | [`Signer`] | Signs an envelope, returns the raw signed transaction | [`CallbackSigner`] |
//! | [`Submitter`] | Delivers a raw signed transaction to the ledger | [`RpcClient`] |

mod assembler;
mod oex;
mod rpc;
mod signer;

pub use assembler::{ActionIntent, assemble, read_contract_message};
pub use oex::{Oex, OexBuilder, RPC_URL_ENV};
pub use rpc::{BlockNumber, DEFAULT_RPC_URL, RetryConfig, RpcClient, SubmitFuture, Submitter};
pub use signer::{CallbackSigner, SignFuture, SignatureInfo, Signer};
