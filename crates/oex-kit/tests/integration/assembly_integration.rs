//! End-to-end assembly: intent, envelope JSON, signing.

use num_bigint::BigUint;
use oex_kit::codec::{AbiValue, rlp};
use oex_kit::*;
use serde_json::json;

fn name(s: &str) -> AccountName {
    s.parse().unwrap()
}

fn chain_config(unit_stake: u32) -> ChainConfig {
    ChainConfig::new(1, "oexchain")
        .unwrap()
        .with_system_asset(0, 18)
        .with_dpos_params(100u32, unit_stake)
}

// =============================================================================
// Vote
// =============================================================================

#[test]
fn test_vote_end_to_end() {
    super::init_tracing();

    let config = chain_config(1);
    let intent = ActionIntent::new(name("alice"), ActionPayload::vote(name("producer1"), "5"));
    let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();

    let action = &envelope.actions()[0];
    let expected = rlp::encode_list(&[
        "producer1".into(),
        (&scale_amount("5", 18).unwrap()).into(),
    ]);
    assert_eq!(action.payload.as_bytes(), expected.as_slice());
    assert_eq!(action.asset_id, config.sys_token_id);
    assert_eq!(action.amount, Amount::Zero);
    assert_eq!(action.to_account_name, config.dpos_name);
    assert_eq!(action.action_type, ActionKind::VoteCandidate);
    assert_eq!(envelope.gas_asset_id(), config.sys_token_id);
}

#[test]
fn test_vote_applies_unit_stake() {
    let config = chain_config(1000);
    let intent = ActionIntent::new(name("alice"), ActionPayload::vote(name("producer1"), "0.5"));
    let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();

    let decoded = rlp::decode(envelope.actions()[0].payload.as_bytes()).unwrap();
    let stake = decoded.as_list().unwrap()[1].as_biguint().unwrap();
    // 0.5 * 10^18 * 1000
    assert_eq!(stake, BigUint::from(500_000_000_000_000_000_000u128));
}

// =============================================================================
// Envelope JSON
// =============================================================================

#[test]
fn test_envelope_json_for_registration() {
    let config = chain_config(1);
    let intent = ActionIntent::new(
        name("alice"),
        ActionPayload::RegCandidate {
            url: "www.alice.io".to_string(),
        },
    )
    .nonce(3)
    .remark("join");

    let envelope = assemble(intent, &config, &GasConfig::new(100_000_000_000, 500_000)).unwrap();
    let value = serde_json::to_value(&envelope).unwrap();

    assert_eq!(
        value,
        json!({
            "gasAssetId": 0,
            "gasPrice": 100_000_000_000u64,
            "actions": [{
                "actionType": 0x300,
                "accountName": "alice",
                "nonce": 3,
                "gasLimit": 500_000,
                "toAccountName": "oexchain.dpos",
                "assetId": 0,
                "amount": scale_amount("100", 18).unwrap().to_string(),
                "payload": bytes_to_hex(&rlp::encode_list(&["www.alice.io".into()])),
                "remark": "join"
            }]
        })
    );
}

#[test]
fn test_envelope_json_empty_payload_and_zero_amount() {
    let config = chain_config(1);
    let envelope = assemble(
        ActionIntent::new(name("alice"), ActionPayload::UnregCandidate),
        &config,
        &GasConfig::default(),
    )
    .unwrap();
    let value = serde_json::to_value(&envelope).unwrap();
    assert_eq!(value["actions"][0]["payload"], "");
    assert_eq!(value["actions"][0]["amount"], 0);
    assert_eq!(value["actions"][0]["nonce"], serde_json::Value::Null);
}

// =============================================================================
// Contract actions
// =============================================================================

#[test]
fn test_multi_asset_call_envelope() {
    let config = chain_config(1);
    let call = ContractCall::new("buy", ["uint64"], [AbiValue::from(2u64)]);
    let assets = vec![AssetValue::new(0, 10u64), AssetValue::new(5, 20u64)];
    let intent = ActionIntent::new(
        name("alice"),
        ActionPayload::CallContractMultiAsset {
            assets: assets.clone(),
            call: call.clone(),
        },
    )
    .to(name("shop"))
    .asset_id(0)
    .amount(10u64);

    let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();
    let action = &envelope.actions()[0];
    assert_eq!(action.action_type.code(), 0x002);
    assert_eq!(action.to_account_name, name("shop"));

    let (decoded_assets, call_payload) = decode_multi_asset_payload(action.payload.as_bytes()).unwrap();
    assert_eq!(decoded_assets, assets);
    assert_eq!(call_payload, call.encode().unwrap());
}

#[test]
fn test_contract_call_payload_is_parseable() {
    let config = chain_config(1);
    let interface = ContractInterface::from_json(
        r#"[{"type":"function","name":"setGreeting","inputs":[{"name":"greeting","type":"string"}]}]"#,
    )
    .unwrap();
    let intent = ActionIntent::new(
        name("alice"),
        ActionPayload::call(ContractCall::new("setGreeting", ["string"], [AbiValue::from("hello")])),
    )
    .to(name("greeter"));

    let envelope = assemble(intent, &config, &GasConfig::default()).unwrap();
    let payload_hex = envelope.actions()[0].payload.to_string();
    let parsed = parse_contract_call_payload(&interface, &payload_hex)
        .unwrap()
        .unwrap();
    assert_eq!(parsed.function_name, "setGreeting");
    assert_eq!(parsed.parameters[0].value, AbiValue::from("hello"));
}

#[test]
fn test_unsupported_kind_from_wire() {
    let json = r#"{"gasAssetId":0,"gasPrice":1,"actions":[{
        "actionType": 1638, "accountName": "alice", "nonce": null, "gasLimit": 1,
        "toAccountName": "bob", "assetId": 0, "amount": 0, "payload": "", "remark": ""
    }]}"#;
    let err = serde_json::from_str::<TransactionEnvelope>(json).unwrap_err();
    assert!(err.to_string().contains("Unsupported action kind: 0x666"));
}

// =============================================================================
// Signing
// =============================================================================

#[test]
fn test_callback_signer_signs_assembled_envelope() {
    let config = chain_config(1);
    let envelope = assemble(
        ActionIntent::new(name("alice"), ActionPayload::Transfer)
            .to(name("bob"))
            .amount(scale_amount("1", 18).unwrap()),
        &config,
        &GasConfig::default(),
    )
    .unwrap();

    let signer = CallbackSigner::new("alice", |envelope, chain_id| {
        let json = serde_json::to_vec(envelope)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        Ok(SignatureInfo::new(chain_id.to_be_bytes().to_vec(), json))
    })
    .unwrap();

    let signed = tokio_test::block_on(signer.sign(&envelope, config.chain_id)).unwrap();
    assert_eq!(signed.signature, 1u64.to_be_bytes().to_vec());
    let back: TransactionEnvelope = serde_json::from_slice(&signed.raw_transaction).unwrap();
    assert_eq!(back, envelope);
}
