//! Wire encodings used in action payloads.
//!
//! - [`rlp`] - recursive length-prefix list encoding, used by account, asset
//!   and candidate actions and by the multi-asset composite.
//! - [`abi`] - contract-call argument encoding (selector + head/tail layout).
//! - Interface descriptions and payload decoding via
//!   [`parse_contract_call_payload`].

pub mod abi;
mod interface;
pub mod rlp;

pub use abi::{
    AbiType, AbiValue, compute_selector, decode_arguments, encode_arguments, encode_call,
    parse_types, selector,
};
pub use interface::{
    ContractInterface, InterfaceEntry, InterfaceParam, ParsedCall, ParsedParameter,
    parse_contract_call_payload,
};
pub use self::rlp::RlpItem;

/// List-encode a sequence of items as one list.
///
/// ```
/// use oex_kit::codec::get_rlp_data;
///
/// assert_eq!(get_rlp_data(&["cat".into(), "dog".into()]), hex::decode("c88363617483646f67").unwrap());
/// ```
pub fn get_rlp_data(items: &[RlpItem]) -> Vec<u8> {
    self::rlp::encode_list(items)
}
