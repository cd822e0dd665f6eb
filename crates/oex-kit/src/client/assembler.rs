//! Transaction assembly: intent in, single-action envelope out.
//!
//! Each action kind has a fixed routing rule: where the action is sent, and
//! whether its asset and amount come from the caller, are forced to the system
//! asset with zero amount, or carry the minimum candidate stake.
//!
//! | kinds | destination | asset / amount |
//! |-------|-------------|----------------|
//! | contract calls, transfer | caller supplied | caller |
//! | contract deployment | the acting account | caller |
//! | account management | account registry | caller (delete: system / 0) |
//! | asset management | asset registry | system / 0 (destroy: caller) |
//! | candidate registration | consensus | system / minimum stake |
//! | other candidate actions | consensus | system / 0 |
//! | fee withdrawal | fee account | system / 0 |

use crate::error::Error;
use crate::types::{
    AccountName, Action, ActionKind, ActionPayload, Amount, CallMessage, ChainConfig,
    ContractCall, GasConfig, Payload, TransactionEnvelope, candidate_min_stake,
};

/// High-level description of one action, consumed by [`assemble`].
///
/// # Example
///
/// ```
/// use oex_kit::{ActionIntent, ActionPayload, ChainConfig, GasConfig, assemble, scale_amount};
///
/// let config = ChainConfig::new(1, "oexchain").unwrap();
/// let intent = ActionIntent::new("alice".parse().unwrap(), ActionPayload::Transfer)
///     .to("bob".parse().unwrap())
///     .amount(scale_amount("2.5", 18).unwrap())
///     .remark("lunch");
///
/// let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();
/// let action = &envelope.actions()[0];
/// assert_eq!(action.to_account_name.as_str(), "bob");
/// assert_eq!(action.amount.to_string(), "0x22b1c8c1227a0000");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionIntent {
    account: AccountName,
    to: Option<AccountName>,
    asset_id: Option<u64>,
    amount: Option<Amount>,
    remark: String,
    nonce: Option<u64>,
    payload: ActionPayload,
}

impl ActionIntent {
    /// Start an intent for `account` with the given payload.
    pub fn new(account: AccountName, payload: ActionPayload) -> Self {
        Self {
            account,
            to: None,
            asset_id: None,
            amount: None,
            remark: String::new(),
            nonce: None,
            payload,
        }
    }

    /// Destination for contract calls and transfers. Ignored by kinds sent to
    /// a well-known account.
    pub fn to(mut self, to: AccountName) -> Self {
        self.to = Some(to);
        self
    }

    /// Asset sent with the action. Defaults to the system asset.
    pub fn asset_id(mut self, asset_id: u64) -> Self {
        self.asset_id = Some(asset_id);
        self
    }

    /// Amount in base units. Defaults to zero.
    pub fn amount(mut self, amount: impl Into<Amount>) -> Self {
        self.amount = Some(amount.into());
        self
    }

    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = remark.into();
        self
    }

    /// Use an explicit nonce instead of leaving it to the signer.
    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    /// The acting account.
    pub fn account(&self) -> &AccountName {
        &self.account
    }

    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Destination {
    Caller,
    Acting,
    AccountRegistry,
    AssetRegistry,
    Consensus,
    Fee,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AssetRule {
    Caller,
    SystemZero,
    CandidateStake,
}

fn route(kind: ActionKind) -> (Destination, AssetRule) {
    use ActionKind::*;

    match kind {
        CallContract | CallContractMultiAsset | Transfer => (Destination::Caller, AssetRule::Caller),
        CreateContract => (Destination::Acting, AssetRule::Caller),

        CreateAccount | UpdateAccountFounder | UpdateAccountAuthor | UpdateAccountDesc => {
            (Destination::AccountRegistry, AssetRule::Caller)
        }
        DeleteAccount => (Destination::AccountRegistry, AssetRule::SystemZero),

        DestroyAsset => (Destination::AssetRegistry, AssetRule::Caller),
        IncreaseAsset | IssueAsset | SetAssetOwner | UpdateAssetFounder | UpdateAssetContract => {
            (Destination::AssetRegistry, AssetRule::SystemZero)
        }

        RegCandidate => (Destination::Consensus, AssetRule::CandidateStake),
        UpdateCandidateUrl | UnregCandidate | RefundCandidate | VoteCandidate
        | UpdateCandidatePublicKey | KickedCandidate | ExitTakeover | RemoveKickedCandidate => {
            (Destination::Consensus, AssetRule::SystemZero)
        }

        WithdrawFee => (Destination::Fee, AssetRule::SystemZero),
    }
}

/// Build a single-action transaction envelope from an intent.
///
/// Gas is always paid in the system asset. The payload is composed per the
/// action kind, scaling any decimal quantities it carries.
///
/// # Errors
///
/// - [`Error::MissingField`] when a contract call or transfer has no destination
/// - [`Error::Scaling`] / [`Error::Abi`] when the payload cannot be composed
pub fn assemble(
    intent: ActionIntent,
    config: &ChainConfig,
    gas: &GasConfig,
) -> Result<TransactionEnvelope, Error> {
    let kind = intent.payload.kind();
    let (destination, asset_rule) = route(kind);

    let to_account_name = match destination {
        Destination::Caller => intent.to.ok_or(Error::MissingField("toAccountName"))?,
        Destination::Acting => intent.account.clone(),
        Destination::AccountRegistry => config.account_name.clone(),
        Destination::AssetRegistry => config.asset_name.clone(),
        Destination::Consensus => config.dpos_name.clone(),
        Destination::Fee => config.fee_name.clone(),
    };

    let (asset_id, amount) = match asset_rule {
        AssetRule::Caller => (
            intent.asset_id.unwrap_or(config.sys_token_id),
            intent.amount.unwrap_or_default(),
        ),
        AssetRule::SystemZero => {
            if intent.amount.as_ref().is_some_and(|a| !a.is_zero()) {
                tracing::debug!(%kind, "ignoring caller amount for management action");
            }
            (config.sys_token_id, Amount::Zero)
        }
        AssetRule::CandidateStake => (config.sys_token_id, candidate_min_stake(config)),
    };

    let payload = intent.payload.compose(config)?;

    tracing::debug!(
        %kind,
        from = %intent.account,
        to = %to_account_name,
        asset_id,
        %amount,
        payload_len = payload.len(),
        "assembled action"
    );

    let action = Action {
        action_type: kind,
        account_name: intent.account,
        nonce: intent.nonce,
        gas_limit: gas.gas_limit,
        to_account_name,
        asset_id,
        amount,
        payload: Payload::new(payload),
        remark: intent.remark,
    };

    Ok(TransactionEnvelope::new(
        config.sys_token_id,
        gas.gas_price,
        vec![action],
    ))
}

/// Build the message for a read-only contract call.
///
/// The call is sent from the system account with the read-only gas settings,
/// the system asset and a zero value.
pub fn read_contract_message(
    contract: AccountName,
    call: &ContractCall,
    config: &ChainConfig,
) -> Result<CallMessage, Error> {
    let gas = GasConfig::read_only();
    Ok(CallMessage {
        gas_price: gas.gas_price,
        action_type: ActionKind::CallContract,
        from: config.system_name.clone(),
        gas_limit: gas.gas_limit,
        to_account_name: contract,
        asset_id: config.sys_token_id,
        value: Amount::Zero,
        payload: Payload::new(call.encode()?),
        remark: String::new(),
    })
}
