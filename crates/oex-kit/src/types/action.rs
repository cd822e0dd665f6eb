//! Action kinds and their payloads.
//!
//! Every action carries a payload whose layout depends on its kind. Account,
//! asset and candidate management use list encoding, contract calls use
//! call encoding, deployments carry raw code, and multi-asset calls wrap a
//! call payload together with the assets sent along.

use std::fmt;

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::account::AccountName;
use super::chain::ChainConfig;
use super::units::{Amount, scale_amount};
use crate::codec::{AbiValue, RlpItem, abi, rlp};
use crate::error::{Error, RlpError};

// ============================================================================
// ActionKind
// ============================================================================

/// Network-defined action type tags.
///
/// The numeric codes are fixed by the ledger and serialized as plain integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ActionKind {
    CallContract = 0x000,
    CreateContract = 0x001,
    CallContractMultiAsset = 0x002,

    CreateAccount = 0x100,
    UpdateAccountFounder = 0x101,
    DeleteAccount = 0x102,
    UpdateAccountAuthor = 0x103,
    UpdateAccountDesc = 0x104,

    IncreaseAsset = 0x200,
    IssueAsset = 0x201,
    DestroyAsset = 0x202,
    SetAssetOwner = 0x203,
    UpdateAssetFounder = 0x204,
    Transfer = 0x205,
    UpdateAssetContract = 0x206,

    RegCandidate = 0x300,
    UpdateCandidateUrl = 0x301,
    UnregCandidate = 0x302,
    RefundCandidate = 0x303,
    VoteCandidate = 0x304,
    UpdateCandidatePublicKey = 0x305,

    KickedCandidate = 0x400,
    ExitTakeover = 0x401,
    RemoveKickedCandidate = 0x402,

    WithdrawFee = 0x500,
}

impl ActionKind {
    /// Every kind, in code order.
    pub const ALL: [ActionKind; 25] = [
        ActionKind::CallContract,
        ActionKind::CreateContract,
        ActionKind::CallContractMultiAsset,
        ActionKind::CreateAccount,
        ActionKind::UpdateAccountFounder,
        ActionKind::DeleteAccount,
        ActionKind::UpdateAccountAuthor,
        ActionKind::UpdateAccountDesc,
        ActionKind::IncreaseAsset,
        ActionKind::IssueAsset,
        ActionKind::DestroyAsset,
        ActionKind::SetAssetOwner,
        ActionKind::UpdateAssetFounder,
        ActionKind::Transfer,
        ActionKind::UpdateAssetContract,
        ActionKind::RegCandidate,
        ActionKind::UpdateCandidateUrl,
        ActionKind::UnregCandidate,
        ActionKind::RefundCandidate,
        ActionKind::VoteCandidate,
        ActionKind::UpdateCandidatePublicKey,
        ActionKind::KickedCandidate,
        ActionKind::ExitTakeover,
        ActionKind::RemoveKickedCandidate,
        ActionKind::WithdrawFee,
    ];

    /// The wire code.
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Look up a kind by wire code.
    ///
    /// ```
    /// use oex_kit::ActionKind;
    ///
    /// assert_eq!(ActionKind::from_code(0x304).unwrap(), ActionKind::VoteCandidate);
    /// assert!(ActionKind::from_code(0x306).is_err());
    /// ```
    pub fn from_code(code: u16) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or(Error::UnsupportedActionKind(code))
    }
}

impl TryFrom<u16> for ActionKind {
    type Error = Error;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<ActionKind> for u16 {
    fn from(kind: ActionKind) -> Self {
        kind.code()
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:#x})", self, self.code())
    }
}

impl Serialize for ActionKind {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u16(self.code())
    }
}

impl<'de> Deserialize<'de> for ActionKind {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let code = u16::deserialize(d)?;
        Self::from_code(code).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Payload building blocks
// ============================================================================

/// A contract function invocation: name, parameter types and argument values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractCall {
    pub function_name: String,
    pub parameter_types: Vec<String>,
    pub parameter_values: Vec<AbiValue>,
}

impl ContractCall {
    /// Create a call description.
    ///
    /// ```
    /// use oex_kit::{AbiValue, ContractCall};
    ///
    /// let call = ContractCall::new("baz", ["uint32", "bool"], [AbiValue::from(69u64), true.into()]);
    /// assert_eq!(&call.encode().unwrap()[..4], &[0xcd, 0xcd, 0x77, 0xc0]);
    /// ```
    pub fn new<S: Into<String>>(
        function_name: impl Into<String>,
        parameter_types: impl IntoIterator<Item = S>,
        parameter_values: impl IntoIterator<Item = AbiValue>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
            parameter_values: parameter_values.into_iter().collect(),
        }
    }

    /// Selector followed by the encoded arguments.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        abi::encode_call(
            &self.function_name,
            &self.parameter_types,
            &self.parameter_values,
        )
        .map_err(|e| Error::abi(&self.function_name, e))
    }
}

/// An asset sent along with a multi-asset contract call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetValue {
    pub asset_id: u64,
    pub value: Amount,
}

impl AssetValue {
    pub fn new(asset_id: u64, value: impl Into<Amount>) -> Self {
        Self {
            asset_id,
            value: value.into(),
        }
    }
}

/// Build a multi-asset call payload: `list[list[[assetId, value]...], callPayload]`.
///
/// ```
/// use oex_kit::{AssetValue, compose_multi_asset_payload, decode_multi_asset_payload};
///
/// let assets = vec![AssetValue::new(1, 100u64), AssetValue::new(2, 0u64)];
/// let payload = compose_multi_asset_payload(&assets, &[0xde, 0xad, 0xbe, 0xef]);
///
/// let (decoded, call) = decode_multi_asset_payload(&payload).unwrap();
/// assert_eq!(decoded, assets);
/// assert_eq!(call, vec![0xde, 0xad, 0xbe, 0xef]);
/// ```
pub fn compose_multi_asset_payload(assets: &[AssetValue], call_payload: &[u8]) -> Vec<u8> {
    let pairs = assets
        .iter()
        .map(|a| RlpItem::list(vec![a.asset_id.into(), (&a.value).into()]))
        .collect();
    rlp::encode_list(&[RlpItem::List(pairs), call_payload.into()])
}

/// Split a multi-asset call payload back into its assets and call payload.
pub fn decode_multi_asset_payload(payload: &[u8]) -> Result<(Vec<AssetValue>, Vec<u8>), RlpError> {
    let item = rlp::decode(payload)?;
    let [pairs, call] = item.as_list()? else {
        return Err(RlpError::ExpectedList);
    };

    let assets = pairs
        .as_list()?
        .iter()
        .map(|pair| match pair.as_list()? {
            [id, value] => Ok(AssetValue {
                asset_id: id.as_u64()?,
                value: Amount::from_base_units(value.as_biguint()?),
            }),
            _ => Err(RlpError::ExpectedList),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((assets, call.as_bytes()?.to_vec()))
}

// ============================================================================
// PayloadEncoding
// ============================================================================

/// How a payload is turned into bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PayloadEncoding {
    /// Bytes used as-is. Empty for kinds without a payload.
    Raw(Vec<u8>),
    /// A single list of items.
    ListEncoded(Vec<RlpItem>),
    /// Selector plus encoded arguments.
    CallEncoded(ContractCall),
    /// Assets and a call payload wrapped in one list.
    MultiAssetComposite {
        assets: Vec<AssetValue>,
        call: ContractCall,
    },
}

impl PayloadEncoding {
    /// Produce the payload bytes.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        match self {
            PayloadEncoding::Raw(bytes) => Ok(bytes.clone()),
            PayloadEncoding::ListEncoded(items) => Ok(rlp::encode_list(items)),
            PayloadEncoding::CallEncoded(call) => call.encode(),
            PayloadEncoding::MultiAssetComposite { assets, call } => {
                Ok(compose_multi_asset_payload(assets, &call.encode()?))
            }
        }
    }
}

// ============================================================================
// ActionPayload
// ============================================================================

/// Parameters of an asset issuance. Quantities are human decimals, scaled by
/// the asset's own `decimals`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueAssetParams {
    pub name: String,
    pub symbol: String,
    pub amount: String,
    pub decimals: u32,
    pub founder: AccountName,
    pub owner: AccountName,
    pub upper_limit: String,
    /// Contract account bound to the asset. `None` encodes as an empty name.
    pub contract: Option<AccountName>,
    pub desc: String,
}

/// Kind-specific payload parameters of an action.
///
/// The variant determines the [`ActionKind`]; [`encoding`](Self::encoding)
/// maps the parameters to their ordered wire fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionPayload {
    CallContract(ContractCall),
    CreateContract {
        code: Vec<u8>,
    },
    CallContractMultiAsset {
        assets: Vec<AssetValue>,
        call: ContractCall,
    },

    CreateAccount {
        new_account: AccountName,
        creator: AccountName,
        public_key: Vec<u8>,
        desc: String,
    },
    UpdateAccountFounder {
        founder: AccountName,
    },
    DeleteAccount,
    UpdateAccountAuthor {
        threshold: u64,
        update_author_threshold: u64,
        /// Author update entries, each already structured by the caller.
        author_updates: Vec<RlpItem>,
    },
    UpdateAccountDesc {
        desc: String,
    },

    IncreaseAsset {
        asset_id: u64,
        add_amount: Amount,
        to_account: AccountName,
    },
    IssueAsset(IssueAssetParams),
    /// An empty description produces an empty payload.
    DestroyAsset {
        desc: String,
    },
    SetAssetOwner {
        asset_id: u64,
        owner: AccountName,
    },
    UpdateAssetFounder {
        asset_id: u64,
        founder: AccountName,
    },
    Transfer,
    /// `contract: None` unbinds the asset from its contract.
    UpdateAssetContract {
        asset_id: u64,
        contract: Option<AccountName>,
    },

    RegCandidate {
        url: String,
    },
    UpdateCandidateUrl {
        url: String,
    },
    UnregCandidate,
    RefundCandidate,
    /// `stake` is a human decimal of the system asset.
    VoteCandidate {
        candidate: AccountName,
        stake: String,
    },
    UpdateCandidatePublicKey {
        public_key: Vec<u8>,
    },

    KickedCandidate {
        candidates: Vec<AccountName>,
    },
    ExitTakeover,
    RemoveKickedCandidate {
        candidates: Vec<AccountName>,
    },

    WithdrawFee {
        object_name: String,
        object_type: u64,
    },
}

impl ActionPayload {
    /// Call a contract function.
    pub fn call(call: ContractCall) -> Self {
        ActionPayload::CallContract(call)
    }

    /// Vote for a candidate with a human decimal stake.
    pub fn vote(candidate: AccountName, stake: impl Into<String>) -> Self {
        ActionPayload::VoteCandidate {
            candidate,
            stake: stake.into(),
        }
    }

    /// The action kind this payload belongs to.
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::CallContract(_) => ActionKind::CallContract,
            ActionPayload::CreateContract { .. } => ActionKind::CreateContract,
            ActionPayload::CallContractMultiAsset { .. } => ActionKind::CallContractMultiAsset,
            ActionPayload::CreateAccount { .. } => ActionKind::CreateAccount,
            ActionPayload::UpdateAccountFounder { .. } => ActionKind::UpdateAccountFounder,
            ActionPayload::DeleteAccount => ActionKind::DeleteAccount,
            ActionPayload::UpdateAccountAuthor { .. } => ActionKind::UpdateAccountAuthor,
            ActionPayload::UpdateAccountDesc { .. } => ActionKind::UpdateAccountDesc,
            ActionPayload::IncreaseAsset { .. } => ActionKind::IncreaseAsset,
            ActionPayload::IssueAsset(_) => ActionKind::IssueAsset,
            ActionPayload::DestroyAsset { .. } => ActionKind::DestroyAsset,
            ActionPayload::SetAssetOwner { .. } => ActionKind::SetAssetOwner,
            ActionPayload::UpdateAssetFounder { .. } => ActionKind::UpdateAssetFounder,
            ActionPayload::Transfer => ActionKind::Transfer,
            ActionPayload::UpdateAssetContract { .. } => ActionKind::UpdateAssetContract,
            ActionPayload::RegCandidate { .. } => ActionKind::RegCandidate,
            ActionPayload::UpdateCandidateUrl { .. } => ActionKind::UpdateCandidateUrl,
            ActionPayload::UnregCandidate => ActionKind::UnregCandidate,
            ActionPayload::RefundCandidate => ActionKind::RefundCandidate,
            ActionPayload::VoteCandidate { .. } => ActionKind::VoteCandidate,
            ActionPayload::UpdateCandidatePublicKey { .. } => ActionKind::UpdateCandidatePublicKey,
            ActionPayload::KickedCandidate { .. } => ActionKind::KickedCandidate,
            ActionPayload::ExitTakeover => ActionKind::ExitTakeover,
            ActionPayload::RemoveKickedCandidate { .. } => ActionKind::RemoveKickedCandidate,
            ActionPayload::WithdrawFee { .. } => ActionKind::WithdrawFee,
        }
    }

    /// Map the parameters to their wire encoding, scaling decimal quantities.
    ///
    /// # Errors
    ///
    /// [`Error::Scaling`] naming the field whose decimal quantity is invalid.
    pub fn encoding(&self, config: &ChainConfig) -> Result<PayloadEncoding, Error> {
        use PayloadEncoding::{ListEncoded, Raw};

        let encoding = match self {
            ActionPayload::CallContract(call) => PayloadEncoding::CallEncoded(call.clone()),
            ActionPayload::CreateContract { code } => Raw(code.clone()),
            ActionPayload::CallContractMultiAsset { assets, call } => {
                PayloadEncoding::MultiAssetComposite {
                    assets: assets.clone(),
                    call: call.clone(),
                }
            }

            ActionPayload::CreateAccount {
                new_account,
                creator,
                public_key,
                desc,
            } => ListEncoded(vec![
                new_account.into(),
                creator.into(),
                public_key.as_slice().into(),
                desc.into(),
            ]),
            ActionPayload::UpdateAccountFounder { founder } => ListEncoded(vec![founder.into()]),
            ActionPayload::UpdateAccountAuthor {
                threshold,
                update_author_threshold,
                author_updates,
            } => ListEncoded(vec![
                (*threshold).into(),
                (*update_author_threshold).into(),
                RlpItem::List(author_updates.clone()),
            ]),
            ActionPayload::UpdateAccountDesc { desc } => ListEncoded(vec![desc.into()]),

            ActionPayload::IncreaseAsset {
                asset_id,
                add_amount,
                to_account,
            } => ListEncoded(vec![
                (*asset_id).into(),
                add_amount.into(),
                to_account.into(),
            ]),
            ActionPayload::IssueAsset(issue) => {
                let amount = scale_amount(&issue.amount, issue.decimals)
                    .map_err(|e| Error::scaling("amount", e))?;
                let upper_limit = scale_amount(&issue.upper_limit, issue.decimals)
                    .map_err(|e| Error::scaling("upperLimit", e))?;
                ListEncoded(vec![
                    (&issue.name).into(),
                    (&issue.symbol).into(),
                    (&amount).into(),
                    issue.decimals.into(),
                    (&issue.founder).into(),
                    (&issue.owner).into(),
                    (&upper_limit).into(),
                    optional_name(issue.contract.as_ref()),
                    (&issue.desc).into(),
                ])
            }
            ActionPayload::DestroyAsset { desc } if desc.is_empty() => Raw(Vec::new()),
            ActionPayload::DestroyAsset { desc } => ListEncoded(vec![desc.into()]),
            ActionPayload::SetAssetOwner { asset_id, owner } => {
                ListEncoded(vec![(*asset_id).into(), owner.into()])
            }
            ActionPayload::UpdateAssetFounder { asset_id, founder } => {
                ListEncoded(vec![(*asset_id).into(), founder.into()])
            }
            ActionPayload::UpdateAssetContract { asset_id, contract } => {
                ListEncoded(vec![(*asset_id).into(), optional_name(contract.as_ref())])
            }

            ActionPayload::RegCandidate { url } | ActionPayload::UpdateCandidateUrl { url } => {
                ListEncoded(vec![url.into()])
            }
            ActionPayload::VoteCandidate { candidate, stake } => {
                let stake = scale_amount(stake, config.sys_token_decimal)
                    .map_err(|e| Error::scaling("stake", e))?
                    .times(&config.dpos_params.unit_stake);
                ListEncoded(vec![candidate.into(), (&stake).into()])
            }
            ActionPayload::UpdateCandidatePublicKey { public_key } => {
                ListEncoded(vec![public_key.as_slice().into()])
            }
            ActionPayload::KickedCandidate { candidates }
            | ActionPayload::RemoveKickedCandidate { candidates } => {
                ListEncoded(vec![RlpItem::List(
                    candidates.iter().map(RlpItem::from).collect(),
                )])
            }

            ActionPayload::WithdrawFee {
                object_name,
                object_type,
            } => ListEncoded(vec![object_name.into(), (*object_type).into()]),

            ActionPayload::DeleteAccount
            | ActionPayload::Transfer
            | ActionPayload::UnregCandidate
            | ActionPayload::RefundCandidate
            | ActionPayload::ExitTakeover => Raw(Vec::new()),
        };

        Ok(encoding)
    }

    /// Compose the payload bytes.
    pub fn compose(&self, config: &ChainConfig) -> Result<Vec<u8>, Error> {
        self.encoding(config)?.encode()
    }
}

fn optional_name(name: Option<&AccountName>) -> RlpItem {
    name.map_or_else(RlpItem::empty, RlpItem::from)
}

/// Minimum candidate stake in base units: `candidateMinQuantity × 10^sysTokenDecimal`.
pub(crate) fn candidate_min_stake(config: &ChainConfig) -> Amount {
    let factor = BigUint::from(10u32).pow(config.sys_token_decimal);
    Amount::from_base_units(&config.dpos_params.candidate_min_quantity * factor)
}
