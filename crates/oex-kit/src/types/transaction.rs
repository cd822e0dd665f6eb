//! Transaction envelope and read-only call message.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::account::AccountName;
use super::action::ActionKind;
use super::hex::{bytes_to_hex, hex_to_bytes};
use super::units::Amount;

/// Action payload bytes.
///
/// Serialized as `0x`-prefixed lowercase hex, or as an empty string when
/// there is no payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            Ok(())
        } else {
            f.write_str(&bytes_to_hex(&self.0))
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct PayloadVisitor;

        impl Visitor<'_> for PayloadVisitor {
            type Value = Payload;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a hex string")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Payload, E> {
                hex_to_bytes(v).map(Payload).map_err(E::custom)
            }
        }

        d.deserialize_str(PayloadVisitor)
    }
}

/// One action of a transaction envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub action_type: ActionKind,
    /// The acting account.
    pub account_name: AccountName,
    /// Explicit nonce, or `null` to let the signer resolve it.
    pub nonce: Option<u64>,
    pub gas_limit: u64,
    pub to_account_name: AccountName,
    pub asset_id: u64,
    pub amount: Amount,
    pub payload: Payload,
    pub remark: String,
}

/// A transaction ready for signing.
///
/// Built by [`assemble`](crate::assemble) with exactly one action; the fields
/// are read-only afterwards. Serializes to the JSON form signers and nodes
/// expect:
///
/// ```json
/// {
///   "gasAssetId": 0,
///   "gasPrice": 100000000000,
///   "actions": [{
///     "actionType": 772,
///     "accountName": "alice",
///     "nonce": null,
///     "gasLimit": 200000,
///     "toAccountName": "oexchain.dpos",
///     "assetId": 0,
///     "amount": 0,
///     "payload": "0x…",
///     "remark": ""
///   }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEnvelope {
    gas_asset_id: u64,
    gas_price: u64,
    actions: Vec<Action>,
}

impl TransactionEnvelope {
    pub(crate) fn new(gas_asset_id: u64, gas_price: u64, actions: Vec<Action>) -> Self {
        Self {
            gas_asset_id,
            gas_price,
            actions,
        }
    }

    /// Asset used to pay for gas (always the system asset).
    pub fn gas_asset_id(&self) -> u64 {
        self.gas_asset_id
    }

    pub fn gas_price(&self) -> u64 {
        self.gas_price
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The acting account of the first action.
    pub fn sender(&self) -> Option<&AccountName> {
        self.actions.first().map(|a| &a.account_name)
    }
}

/// Message for a read-only contract call (`oex_call`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallMessage {
    pub gas_price: u64,
    pub action_type: ActionKind,
    pub from: AccountName,
    pub gas_limit: u64,
    pub to_account_name: AccountName,
    pub asset_id: u64,
    pub value: Amount,
    pub payload: Payload,
    pub remark: String,
}
