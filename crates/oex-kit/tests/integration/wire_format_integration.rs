//! Wire-format properties of the encoders.

use num_bigint::BigUint;
use oex_kit::codec::{AbiValue, ContractInterface, compute_selector, encode_call, rlp};
use oex_kit::*;

// =============================================================================
// Hex
// =============================================================================

#[test]
fn test_hex_roundtrip() {
    let samples: Vec<Vec<u8>> = vec![
        vec![],
        vec![0x00],
        vec![0x0f],
        vec![0xff, 0x00, 0x10],
        (0u8..=255).collect(),
    ];
    for bytes in samples {
        let text = bytes_to_hex(&bytes);
        assert!(text.starts_with("0x"));
        assert_eq!(text, text.to_lowercase());
        assert_eq!(hex_to_bytes(&text).unwrap(), bytes);
    }
}

#[test]
fn test_hex_format_error_names_position() {
    let err = hex_to_bytes("0x12g4").unwrap_err();
    assert_eq!(
        err,
        ParseHexError::InvalidCharacter {
            character: 'g',
            position: 4
        }
    );
}

// =============================================================================
// List encoding
// =============================================================================

#[test]
fn test_integer_roundtrip() {
    let samples = [0u64, 1, 0x7f, 0x80, 0xff, 0x100, 1024, 0xffff_ffff, u64::MAX];
    for n in samples {
        let encoded = rlp::encode(&RlpItem::from(n));
        assert_eq!(rlp::decode(&encoded).unwrap().as_u64().unwrap(), n);
    }

    assert_eq!(rlp::encode(&RlpItem::from(0u64)), vec![0x80]);
    assert_eq!(rlp::encode(&RlpItem::from(1024u64)), vec![0x82, 0x04, 0x00]);

    let big = BigUint::parse_bytes(b"123456789012345678901234567890123456789", 10).unwrap();
    let encoded = rlp::encode(&RlpItem::uint(&big));
    assert_eq!(rlp::decode(&encoded).unwrap().as_biguint().unwrap(), big);
}

#[test]
fn test_structural_roundtrip() {
    let long_text = "x".repeat(60);
    let structure = RlpItem::list(vec![
        RlpItem::list(vec![]),
        RlpItem::list(vec![1u64.into(), RlpItem::list(vec!["a".into()])]),
        long_text.as_str().into(),
        RlpItem::list((0u64..30).map(RlpItem::from).collect()),
        RlpItem::empty(),
    ]);
    let encoded = rlp::encode(&structure);
    assert_eq!(rlp::decode(&encoded).unwrap(), structure);
}

#[test]
fn test_get_rlp_data_matches_list_encoding() {
    let items = vec!["alice".into(), 5u64.into()];
    assert_eq!(get_rlp_data(&items), rlp::encode(&RlpItem::list(items.clone())));
}

// =============================================================================
// Amount scaling
// =============================================================================

#[test]
fn test_scaling_zero_and_one() {
    for decimals in 0..=36 {
        let zero = scale_amount("0", decimals).unwrap();
        assert_eq!(serde_json::to_value(&zero).unwrap(), serde_json::json!(0));
    }
    let one = scale_amount("1", 18).unwrap();
    assert_eq!(
        serde_json::to_value(&one).unwrap(),
        serde_json::json!("0xde0b6b3a7640000")
    );
}

// =============================================================================
// Call encoding
// =============================================================================

#[test]
fn test_selector_is_stable_and_distinct() {
    let first = compute_selector("transfer", &["address", "uint256"]).unwrap();
    for _ in 0..10 {
        assert_eq!(compute_selector("transfer", &["address", "uint256"]).unwrap(), first);
    }

    let others = [
        compute_selector("transfer", &["address", "uint128"]).unwrap(),
        compute_selector("transfer", &["address"]).unwrap(),
        compute_selector("transferFrom", &["address", "address", "uint256"]).unwrap(),
        compute_selector("approve", &["address", "uint256"]).unwrap(),
        compute_selector("Transfer", &["address", "uint256"]).unwrap(),
    ];
    for other in others {
        assert_ne!(other, first);
    }
}

#[test]
fn test_parse_payload_match_and_no_match() {
    let interface = ContractInterface::from_json(
        r#"[
            {"type":"function","name":"vote","inputs":[{"name":"candidate","type":"string"},{"name":"weights","type":"uint32[]"}]},
            {"type":"function","name":"withdraw","inputs":[{"name":"amount","type":"uint256"}]}
        ]"#,
    )
    .unwrap();

    let payload = encode_call(
        "vote",
        &["string", "uint32[]"],
        &["producer1".into(), vec![1u64, 2, 3].into()],
    )
    .unwrap();
    let parsed = parse_contract_call_payload(&interface, &bytes_to_hex(&payload))
        .unwrap()
        .unwrap();
    assert_eq!(parsed.function_name, "vote");
    let names: Vec<&str> = parsed.parameters.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["candidate", "weights"]);
    assert_eq!(parsed.parameters[0].value, AbiValue::from("producer1"));
    assert_eq!(parsed.parameters[1].value, AbiValue::from(vec![1u64, 2, 3]));
    assert_eq!(parsed.parameters[1].ty, "uint32[]");

    let unknown = encode_call("deposit", &["uint256"], &[1u64.into()]).unwrap();
    assert!(
        parse_contract_call_payload(&interface, &bytes_to_hex(&unknown))
            .unwrap()
            .is_none()
    );
}

// =============================================================================
// Multi-asset composite
// =============================================================================

#[test]
fn test_multi_asset_composite_roundtrip() {
    let method_payload = encode_call("deposit", &["uint64"], &[42u64.into()]).unwrap();
    let assets = vec![
        AssetValue::new(1, scale_amount("1.5", 18).unwrap()),
        AssetValue::new(7, 300u64),
    ];

    let composite = compose_multi_asset_payload(&assets, &method_payload);
    let (decoded_assets, decoded_payload) = decode_multi_asset_payload(&composite).unwrap();

    assert_eq!(decoded_assets, assets);
    assert_eq!(decoded_payload, method_payload);

    // Outer shape is [[pairs...], payload].
    let outer = rlp::decode(&composite).unwrap();
    let fields = outer.as_list().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].as_list().unwrap().len(), 2);
}
