//! Contract interface descriptions and call-payload decoding.
//!
//! An interface description is the JSON list of function descriptors emitted
//! by contract compilers:
//!
//! ```json
//! [{ "type": "function", "name": "transfer",
//!    "inputs": [{ "name": "to", "type": "address" }, { "name": "value", "type": "uint256" }] }]
//! ```
//!
//! [`parse_contract_call_payload`] finds which function a payload calls and
//! decodes its arguments.

use serde::{Deserialize, Serialize};

use super::abi::{self, AbiType, AbiValue};
use crate::error::{AbiError, Error, ValidationError};
use crate::types::hex_to_bytes;

/// One parameter of an interface entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
}

/// One entry of an interface description.
///
/// Entries other than `"function"` (events, constructors, fallbacks) are kept
/// but never matched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InterfaceParam>,
}

impl InterfaceEntry {
    fn is_function(&self) -> bool {
        self.kind.as_deref() == Some("function")
    }
}

/// An ordered list of interface entries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractInterface(Vec<InterfaceEntry>);

impl ContractInterface {
    /// Wrap already-parsed entries.
    pub fn new(entries: Vec<InterfaceEntry>) -> Self {
        Self(entries)
    }

    /// Parse an interface description from JSON text.
    ///
    /// Anything other than a JSON list of objects is rejected here; field-level
    /// checks happen in [`validate`](Self::validate).
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// All entries, in declaration order.
    pub fn entries(&self) -> &[InterfaceEntry] {
        &self.0
    }

    /// Check every entry declares a `type`, every function a `name`, and every
    /// function input a parseable `type`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (index, entry) in self.0.iter().enumerate() {
            if entry.kind.is_none() {
                return Err(ValidationError::MissingType { index });
            }
            if !entry.is_function() {
                continue;
            }
            let function = entry
                .name
                .as_ref()
                .ok_or(ValidationError::MissingName { index })?;
            for (input, param) in entry.inputs.iter().enumerate() {
                let ty = param.ty.as_ref().ok_or_else(|| ValidationError::MissingInputType {
                    function: function.clone(),
                    input,
                })?;
                if ty.parse::<AbiType>().is_err() {
                    return Err(ValidationError::InvalidInputType {
                        function: function.clone(),
                        input,
                        ty: ty.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A decoded argument, with the parameter's declared name and type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedParameter {
    pub name: String,
    pub ty: String,
    pub value: AbiValue,
}

/// The function a payload calls and its decoded arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedCall {
    pub function_name: String,
    pub parameters: Vec<ParsedParameter>,
}

impl ParsedCall {
    /// Argument values in declaration order.
    pub fn arguments(&self) -> impl Iterator<Item = &AbiValue> {
        self.parameters.iter().map(|p| &p.value)
    }
}

/// Identify and decode a contract-call payload.
///
/// Returns `Ok(None)` when no function's selector matches the payload, when
/// the payload is shorter than a selector, or when the interface fails
/// [`ContractInterface::validate`] (the payload is not inspected in that case).
/// The first matching function wins.
///
/// # Errors
///
/// [`AbiError::Format`] for malformed payload hex, and decoding errors when a
/// selector matches but the arguments do not fit the declared types.
///
/// # Example
///
/// ```
/// use oex_kit::codec::{encode_call, parse_contract_call_payload, ContractInterface, AbiValue};
///
/// let interface = ContractInterface::from_json(r#"[
///     {"type":"function","name":"setValue","inputs":[{"name":"v","type":"uint64"}]}
/// ]"#).unwrap();
///
/// let payload = encode_call("setValue", &["uint64"], &[AbiValue::from(7u64)]).unwrap();
/// let parsed = parse_contract_call_payload(&interface, &hex::encode(&payload)).unwrap().unwrap();
/// assert_eq!(parsed.function_name, "setValue");
/// assert_eq!(parsed.parameters[0].value, AbiValue::from(7u64));
///
/// assert!(parse_contract_call_payload(&interface, "0xdeadbeef").unwrap().is_none());
/// ```
pub fn parse_contract_call_payload(
    interface: &ContractInterface,
    payload_hex: &str,
) -> Result<Option<ParsedCall>, AbiError> {
    if let Err(e) = interface.validate() {
        tracing::debug!(error = %e, "rejecting invalid interface description");
        return Ok(None);
    }

    let payload = hex_to_bytes(payload_hex)?;
    if payload.len() < 4 {
        return Ok(None);
    }
    let (selector, arguments) = payload.split_at(4);

    for entry in interface.entries().iter().filter(|e| e.is_function()) {
        // validate() guarantees name and parseable input types on functions.
        let Some(name) = entry.name.as_deref() else {
            continue;
        };
        let types = abi::parse_types(
            &entry
                .inputs
                .iter()
                .map(|p| p.ty.as_deref().unwrap_or_default())
                .collect::<Vec<_>>(),
        )?;

        if abi::selector(name, &types) != selector {
            continue;
        }

        tracing::trace!(function = name, "payload selector matched");
        let values = abi::decode_arguments(&types, arguments)?;
        let parameters = entry
            .inputs
            .iter()
            .zip(types.iter())
            .zip(values)
            .map(|((param, ty), value)| ParsedParameter {
                name: param.name.clone(),
                ty: ty.to_string(),
                value,
            })
            .collect();

        return Ok(Some(ParsedCall {
            function_name: name.to_string(),
            parameters,
        }));
    }

    Ok(None)
}
