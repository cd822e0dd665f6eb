//! The main Oex client.

use std::sync::Arc;

use crate::error::{Error, SignerError};
use crate::types::{AccountName, ChainConfig, ContractCall, GasConfig};

use super::assembler::{ActionIntent, assemble, read_contract_message};
use super::rpc::{BlockNumber, DEFAULT_RPC_URL, RetryConfig, RpcClient, Submitter};
use super::signer::Signer;

/// Environment variable read by [`Oex::from_env`].
pub const RPC_URL_ENV: &str = "OEX_RPC_URL";

/// The main client for building, signing and submitting OEX transactions.
///
/// Chain parameters are never cached globally: fetch them once with
/// [`chain_config`](Self::chain_config) and pass them to each call.
///
/// # Example
///
/// ```rust,no_run
/// use oex_kit::*;
///
/// # async fn example(signer: CallbackSigner) -> Result<(), oex_kit::Error> {
/// let oex = Oex::custom("http://127.0.0.1:8545").signer(signer).build();
/// let config = oex.chain_config().await?;
///
/// let intent = ActionIntent::new(
///     "alice".parse()?,
///     ActionPayload::vote("producer1".parse()?, "10"),
/// );
/// let hash = oex.send(intent, &config).await?;
/// println!("submitted {}", hash);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Oex {
    rpc: Arc<RpcClient>,
    submitter: Arc<dyn Submitter>,
    signer: Option<Arc<dyn Signer>>,
    gas: GasConfig,
}

impl Oex {
    /// Create a builder with a custom RPC URL.
    pub fn custom(rpc_url: impl Into<String>) -> OexBuilder {
        OexBuilder::new(rpc_url)
    }

    /// Create a builder for a node on `127.0.0.1:8545`.
    pub fn local() -> OexBuilder {
        OexBuilder::new(DEFAULT_RPC_URL)
    }

    /// Create a read-only client from the environment.
    ///
    /// Reads `OEX_RPC_URL`, falling back to the local node URL when unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `OEX_RPC_URL` is set but is not an
    /// `http(s)://` URL.
    pub fn from_env() -> Result<Oex, Error> {
        let builder = match std::env::var(RPC_URL_ENV) {
            Ok(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Oex::custom(url)
            }
            Ok(url) => {
                return Err(Error::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    RPC_URL_ENV, url
                )));
            }
            Err(_) => Oex::local(),
        };
        Ok(builder.build())
    }

    /// The underlying RPC client.
    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    /// The configured signer, if any.
    pub fn signer(&self) -> Option<&Arc<dyn Signer>> {
        self.signer.as_ref()
    }

    /// Gas settings applied to assembled transactions.
    pub fn gas(&self) -> GasConfig {
        self.gas
    }

    /// Fetch the chain parameters from the node.
    pub async fn chain_config(&self) -> Result<ChainConfig, Error> {
        Ok(self.rpc.get_chain_config().await?)
    }

    /// Fetch the next nonce of an account.
    pub async fn nonce(&self, account: &AccountName) -> Result<u64, Error> {
        Ok(self.rpc.get_nonce(account).await?)
    }

    /// Assemble, sign and submit a single-action transaction.
    ///
    /// Returns the transaction hash reported by the node.
    ///
    /// # Errors
    ///
    /// - [`Error::NoSigner`] if no signer is configured
    /// - [`Error::Signing`] if the signer signs for a different account, or fails
    /// - assembly errors from [`assemble`]
    /// - [`Error::Rpc`] if submission fails
    pub async fn send(&self, intent: ActionIntent, config: &ChainConfig) -> Result<String, Error> {
        let signer = self.signer.as_ref().ok_or(Error::NoSigner)?;
        if signer.account() != intent.account() {
            return Err(SignerError::WrongAccount(intent.account().to_string()).into());
        }

        let envelope = assemble(intent, config, &self.gas)?;
        let signed = signer.sign(&envelope, config.chain_id).await?;

        tracing::debug!(
            raw_len = signed.raw_transaction.len(),
            chain_id = config.chain_id,
            "submitting signed transaction"
        );
        let hash = self.submitter.submit(&signed.raw_transaction).await?;
        tracing::debug!(%hash, "transaction submitted");

        Ok(hash)
    }

    /// Evaluate a contract function without creating a transaction.
    ///
    /// Returns the raw output reported by the node.
    pub async fn read_contract(
        &self,
        contract: AccountName,
        call: &ContractCall,
        config: &ChainConfig,
        block: BlockNumber,
    ) -> Result<String, Error> {
        let message = read_contract_message(contract, call, config)?;
        Ok(self.rpc.call_contract(&message, block).await?)
    }
}

impl std::fmt::Debug for Oex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oex")
            .field("rpc", &self.rpc)
            .field("signer", &self.signer.as_ref().map(|s| s.account().clone()))
            .field("gas", &self.gas)
            .finish()
    }
}

/// Builder for creating an [`Oex`] client.
pub struct OexBuilder {
    rpc_url: String,
    signer: Option<Arc<dyn Signer>>,
    submitter: Option<Arc<dyn Submitter>>,
    retry_config: RetryConfig,
    gas: GasConfig,
}

impl OexBuilder {
    fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            signer: None,
            submitter: None,
            retry_config: RetryConfig::default(),
            gas: GasConfig::default(),
        }
    }

    /// Set the signer for transactions.
    pub fn signer(mut self, signer: impl Signer + 'static) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Deliver signed transactions through `submitter` instead of the RPC client.
    pub fn submitter(mut self, submitter: impl Submitter + 'static) -> Self {
        self.submitter = Some(Arc::new(submitter));
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Set the gas price and limit for assembled transactions.
    pub fn gas(mut self, gas: GasConfig) -> Self {
        self.gas = gas;
        self
    }

    /// Build the client.
    pub fn build(self) -> Oex {
        let rpc = Arc::new(RpcClient::with_retry_config(
            self.rpc_url,
            self.retry_config,
        ));
        let submitter = self
            .submitter
            .unwrap_or_else(|| rpc.clone() as Arc<dyn Submitter>);
        Oex {
            rpc,
            submitter,
            signer: self.signer,
            gas: self.gas,
        }
    }
}

impl From<OexBuilder> for Oex {
    fn from(builder: OexBuilder) -> Self {
        builder.build()
    }
}
