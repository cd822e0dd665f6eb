//! Signer trait and a closure-backed implementation.
//!
//! Key material never enters this crate. A [`Signer`] receives an assembled
//! [`TransactionEnvelope`] and returns the signed raw transaction, ready for
//! submission. Hardware wallets, remote signing services or an in-process
//! key store all fit behind the same trait.
//!
//! # Example
//!
//! ```rust
//! use oex_kit::{CallbackSigner, SignatureInfo, Signer};
//!
//! let signer = CallbackSigner::new("alice", |envelope, chain_id| {
//!     // Hand the envelope to the real signing backend here.
//!     let raw = serde_json::to_vec(envelope).unwrap_or_default();
//!     Ok(SignatureInfo::new(vec![chain_id as u8], raw))
//! })
//! .unwrap();
//!
//! assert_eq!(signer.account().as_str(), "alice");
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::error::{ParseAccountError, SignerError};
use crate::types::{AccountName, TransactionEnvelope};

// ============================================================================
// SignatureInfo
// ============================================================================

/// Output of a signer.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInfo {
    /// The signature over the transaction hash.
    #[serde_as(as = "Hex")]
    pub signature: Vec<u8>,
    /// The complete signed transaction, as submitted to the node.
    #[serde_as(as = "Hex")]
    pub raw_transaction: Vec<u8>,
}

impl SignatureInfo {
    pub fn new(signature: Vec<u8>, raw_transaction: Vec<u8>) -> Self {
        Self {
            signature,
            raw_transaction,
        }
    }
}

// ============================================================================
// Signer Trait
// ============================================================================

/// Future returned by [`Signer::sign`].
pub type SignFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SignatureInfo, SignerError>> + Send + 'a>>;

/// Trait for signing assembled transactions.
///
/// # Example Implementation
///
/// ```rust
/// use oex_kit::{AccountName, SignFuture, SignatureInfo, Signer, TransactionEnvelope};
///
/// struct RemoteSigner {
///     account: AccountName,
/// }
///
/// impl Signer for RemoteSigner {
///     fn account(&self) -> &AccountName {
///         &self.account
///     }
///
///     fn sign<'a>(&'a self, envelope: &'a TransactionEnvelope, chain_id: u64) -> SignFuture<'a> {
///         Box::pin(async move {
///             // e.g. POST the envelope to a signing service
///             let _ = (envelope, chain_id);
///             Ok(SignatureInfo::new(vec![], vec![]))
///         })
///     }
/// }
/// ```
pub trait Signer: Send + Sync {
    /// The account this signer signs for.
    fn account(&self) -> &AccountName;

    /// Sign a transaction for the given chain.
    fn sign<'a>(&'a self, envelope: &'a TransactionEnvelope, chain_id: u64) -> SignFuture<'a>;
}

/// Implement `Signer` for `Arc<dyn Signer>` for convenience.
impl Signer for Arc<dyn Signer> {
    fn account(&self) -> &AccountName {
        (**self).account()
    }

    fn sign<'a>(&'a self, envelope: &'a TransactionEnvelope, chain_id: u64) -> SignFuture<'a> {
        (**self).sign(envelope, chain_id)
    }
}

// ============================================================================
// CallbackSigner
// ============================================================================

type SignFn =
    dyn Fn(&TransactionEnvelope, u64) -> Result<SignatureInfo, SignerError> + Send + Sync;

/// A signer backed by a synchronous closure.
///
/// Useful for wrapping signing libraries that have no async interface.
#[derive(Clone)]
pub struct CallbackSigner {
    account: AccountName,
    sign_fn: Arc<SignFn>,
}

impl CallbackSigner {
    /// Create a signer for `account` that signs with `sign_fn`.
    pub fn new<F>(account: impl AsRef<str>, sign_fn: F) -> Result<Self, ParseAccountError>
    where
        F: Fn(&TransactionEnvelope, u64) -> Result<SignatureInfo, SignerError>
            + Send
            + Sync
            + 'static,
    {
        Ok(Self {
            account: account.as_ref().parse()?,
            sign_fn: Arc::new(sign_fn),
        })
    }
}

impl Signer for CallbackSigner {
    fn account(&self) -> &AccountName {
        &self.account
    }

    fn sign<'a>(&'a self, envelope: &'a TransactionEnvelope, chain_id: u64) -> SignFuture<'a> {
        let result = (self.sign_fn)(envelope, chain_id);
        Box::pin(async move { result })
    }
}

impl fmt::Debug for CallbackSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSigner")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}
