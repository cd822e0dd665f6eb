//! Chain parameters the assembler depends on.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use super::account::AccountName;
use super::units::{deserialize_biguint, serialize_biguint};
use crate::error::ParseAccountError;

/// Consensus parameters that affect candidate registration and voting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DposParams {
    /// Minimum candidate stake, in whole system-asset units (not base units).
    #[serde(
        serialize_with = "serialize_biguint",
        deserialize_with = "deserialize_biguint"
    )]
    pub candidate_min_quantity: BigUint,
    /// Multiplier applied to scaled vote stakes.
    #[serde(
        serialize_with = "serialize_biguint",
        deserialize_with = "deserialize_biguint"
    )]
    pub unit_stake: BigUint,
}

/// Snapshot of chain parameters, as returned by `oex_getChainConfig`.
///
/// Passed explicitly to every assembly call; there is no process-wide
/// configuration. Node responses carry more keys than these, which are ignored.
///
/// # Example
///
/// ```
/// use oex_kit::ChainConfig;
///
/// let config: ChainConfig = serde_json::from_str(r#"{
///     "chainId": 1,
///     "systemName": "oexchain",
///     "accountName": "oexchain.account",
///     "assetName": "oexchain.asset",
///     "dposName": "oexchain.dpos",
///     "feeName": "oexchain.fee",
///     "sysTokenID": 0,
///     "sysTokenDecimal": 18,
///     "dposParams": { "candidateMinQuantity": 10, "unitStake": 1 },
///     "snapshotInterval": 3600000
/// }"#).unwrap();
///
/// assert_eq!(config.dpos_name.as_str(), "oexchain.dpos");
/// assert_eq!(config.sys_token_decimal, 18);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(rename = "chainId")]
    pub chain_id: u64,
    /// The system account. Read-only contract calls are sent from it.
    #[serde(rename = "systemName")]
    pub system_name: AccountName,
    /// Account registry: destination of account management actions.
    #[serde(rename = "accountName")]
    pub account_name: AccountName,
    /// Asset registry: destination of asset management actions.
    #[serde(rename = "assetName")]
    pub asset_name: AccountName,
    /// Consensus account: destination of candidate and vote actions.
    #[serde(rename = "dposName")]
    pub dpos_name: AccountName,
    /// Fee account: destination of fee withdrawals.
    #[serde(rename = "feeName")]
    pub fee_name: AccountName,
    /// Id of the system asset, used for gas.
    #[serde(rename = "sysTokenID")]
    pub sys_token_id: u64,
    #[serde(rename = "sysTokenDecimal")]
    pub sys_token_decimal: u32,
    #[serde(rename = "dposParams")]
    pub dpos_params: DposParams,
}

impl ChainConfig {
    /// Build a configuration following the usual naming layout, where every
    /// well-known account is `<system>.<role>` (`oexchain.account`,
    /// `oexchain.asset`, `oexchain.dpos`, `oexchain.fee`).
    ///
    /// The system asset defaults to id 0 with 18 decimals, the minimum
    /// candidate stake to 0 and the unit stake to 1. Override with the
    /// `with_*` methods.
    pub fn new(chain_id: u64, system_name: &str) -> Result<Self, ParseAccountError> {
        let role = |suffix: &str| AccountName::new(format!("{}.{}", system_name, suffix));
        Ok(Self {
            chain_id,
            system_name: AccountName::new(system_name)?,
            account_name: role("account")?,
            asset_name: role("asset")?,
            dpos_name: role("dpos")?,
            fee_name: role("fee")?,
            sys_token_id: 0,
            sys_token_decimal: 18,
            dpos_params: DposParams {
                candidate_min_quantity: BigUint::from(0u32),
                unit_stake: BigUint::from(1u32),
            },
        })
    }

    /// Set the system asset id and its decimals.
    pub fn with_system_asset(mut self, id: u64, decimals: u32) -> Self {
        self.sys_token_id = id;
        self.sys_token_decimal = decimals;
        self
    }

    /// Set the consensus stake parameters.
    pub fn with_dpos_params(
        mut self,
        candidate_min_quantity: impl Into<BigUint>,
        unit_stake: impl Into<BigUint>,
    ) -> Self {
        self.dpos_params = DposParams {
            candidate_min_quantity: candidate_min_quantity.into(),
            unit_stake: unit_stake.into(),
        };
        self
    }
}

/// Gas settings applied to an assembled transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GasConfig {
    /// Price per gas unit, in base units of the system asset.
    pub gas_price: u64,
    /// Gas limit of the single action.
    pub gas_limit: u64,
}

impl GasConfig {
    /// Gas price used for read-only contract calls.
    pub const READ_GAS_PRICE: u64 = 10_000_000_000;
    /// Gas limit used for read-only contract calls.
    pub const READ_GAS_LIMIT: u64 = 200_000_000;

    pub fn new(gas_price: u64, gas_limit: u64) -> Self {
        Self {
            gas_price,
            gas_limit,
        }
    }

    /// Settings used for `oex_call`.
    pub fn read_only() -> Self {
        Self::new(Self::READ_GAS_PRICE, Self::READ_GAS_LIMIT)
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self::new(100_000_000_000, 200_000)
    }
}
