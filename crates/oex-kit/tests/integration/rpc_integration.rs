//! RPC client and `Oex` client against a scripted local HTTP node.

use oex_kit::codec::AbiValue;
use oex_kit::*;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// A node that answers one scripted response per connection, then stops.
struct FakeNode {
    url: String,
    requests: JoinHandle<Vec<Value>>,
}

impl FakeNode {
    async fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let requests = tokio::spawn(async move {
            let mut seen = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_body(&mut socket).await;
                seen.push(serde_json::from_slice(&request).unwrap());

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    if status == 200 { "OK" } else { "Error" },
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                let _ = socket.shutdown().await;
            }
            seen
        });

        Self { url, requests }
    }

    async fn requests(self) -> Vec<Value> {
        self.requests.await.unwrap()
    }
}

async fn read_body(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return Vec::new();
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
        let length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        let start = end + 4;
        if buf.len() >= start + length {
            return buf[start..start + length].to_vec();
        }
    }
}

fn ok(result: Value) -> (u16, String) {
    (200, json!({"jsonrpc": "2.0", "id": 0, "result": result}).to_string())
}

fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_retries: 2,
        initial_delay_ms: 1,
        max_delay_ms: 5,
    }
}

fn chain_config_json() -> Value {
    json!({
        "chainId": 100,
        "systemName": "oexchain",
        "accountName": "oexchain.account",
        "assetName": "oexchain.asset",
        "dposName": "oexchain.dpos",
        "feeName": "oexchain.fee",
        "sysTokenID": 0,
        "sysTokenDecimal": 18,
        "dposParams": {"candidateMinQuantity": 1000, "unitStake": 1}
    })
}

// =============================================================================
// RpcClient
// =============================================================================

#[tokio::test]
async fn test_get_nonce() {
    super::init_tracing();

    let node = FakeNode::start(vec![ok(json!(12))]).await;
    let rpc = RpcClient::with_retry_config(&node.url, RetryConfig::none());

    let nonce = rpc.get_nonce(&"alice".parse().unwrap()).await.unwrap();
    assert_eq!(nonce, 12);

    let requests = node.requests().await;
    assert_eq!(requests[0]["jsonrpc"], "2.0");
    assert_eq!(requests[0]["method"], "account_getNonce");
    assert_eq!(requests[0]["params"], json!(["alice"]));
}

#[tokio::test]
async fn test_get_chain_config() {
    let node = FakeNode::start(vec![ok(chain_config_json())]).await;
    let rpc = RpcClient::with_retry_config(&node.url, RetryConfig::none());

    let config = rpc.get_chain_config().await.unwrap();
    assert_eq!(config.chain_id, 100);
    assert_eq!(config.dpos_name.as_str(), "oexchain.dpos");

    let requests = node.requests().await;
    assert_eq!(requests[0]["method"], "oex_getChainConfig");
    assert_eq!(requests[0]["params"], json!([]));
}

#[tokio::test]
async fn test_node_error_is_typed_and_not_retried() {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 0,
        "error": {"code": -32000, "message": "insufficient balance"}
    });
    // Only one response is scripted: a retry would hit a closed listener.
    let node = FakeNode::start(vec![(200, body.to_string())]).await;
    let rpc = RpcClient::with_retry_config(&node.url, fast_retries());

    let err = rpc
        .send_raw_transaction(&[0xf8, 0x01])
        .await
        .unwrap_err();
    match &err {
        RpcError::Rpc { code, message, .. } => {
            assert_eq!(*code, -32000);
            assert_eq!(message, "insufficient balance");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(!err.is_retryable());

    let requests = node.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["params"], json!(["0xf801"]));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let node = FakeNode::start(vec![
        (503, "busy".to_string()),
        (502, "bad gateway".to_string()),
        ok(json!(7)),
    ])
    .await;
    let rpc = RpcClient::with_retry_config(&node.url, fast_retries());

    let nonce = rpc.get_nonce(&"alice".parse().unwrap()).await.unwrap();
    assert_eq!(nonce, 7);

    let requests = node.requests().await;
    assert_eq!(requests.len(), 3);
    let ids: Vec<u64> = requests.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let node = FakeNode::start(vec![(400, "bad request".to_string())]).await;
    let rpc = RpcClient::with_retry_config(&node.url, fast_retries());

    let err = rpc
        .get_nonce(&"alice".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RpcError::Network {
            status_code: Some(400),
            retryable: false,
            ..
        }
    ));
    assert_eq!(node.requests().await.len(), 1);
}

#[tokio::test]
async fn test_missing_result() {
    let node = FakeNode::start(vec![(200, r#"{"jsonrpc":"2.0","id":0}"#.to_string())]).await;
    let rpc = RpcClient::with_retry_config(&node.url, RetryConfig::none());
    let err = rpc
        .get_nonce(&"alice".parse().unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_rpc_client_as_submitter() {
    let node = FakeNode::start(vec![ok(json!("0xabc"))]).await;
    let rpc = RpcClient::with_retry_config(&node.url, RetryConfig::none());
    let submitter: &dyn Submitter = &rpc;

    let hash = submitter.submit(&[0x01, 0x02]).await.unwrap();
    assert_eq!(hash, "0xabc");

    let requests = node.requests().await;
    assert_eq!(requests[0]["method"], "oex_sendRawTransaction");
    assert_eq!(requests[0]["params"], json!(["0x0102"]));
}

// =============================================================================
// Oex client
// =============================================================================

#[tokio::test]
async fn test_read_contract_call_message() {
    let node = FakeNode::start(vec![ok(json!("0x2a"))]).await;
    let oex = Oex::custom(&node.url)
        .retry_config(RetryConfig::none())
        .build();
    let config = ChainConfig::new(1, "oexchain").unwrap();
    let call = ContractCall::new("balanceOf", ["string"], [AbiValue::from("alice")]);

    let output = oex
        .read_contract("token".parse().unwrap(), &call, &config, BlockNumber::Latest)
        .await
        .unwrap();
    assert_eq!(output, "0x2a");

    let requests = node.requests().await;
    assert_eq!(requests[0]["method"], "oex_call");
    let params = requests[0]["params"].as_array().unwrap();
    assert_eq!(params.len(), 2);
    assert_eq!(params[1], -1);

    let message = &params[0];
    assert_eq!(message["from"], "oexchain");
    assert_eq!(message["toAccountName"], "token");
    assert_eq!(message["gasPrice"], 10_000_000_000u64);
    assert_eq!(message["gasLimit"], 200_000_000);
    assert_eq!(message["value"], 0);
    assert_eq!(message["actionType"], 0);
    assert_eq!(message["assetId"], 0);
    assert_eq!(message["payload"], bytes_to_hex(&call.encode().unwrap()));
}

#[tokio::test]
async fn test_oex_send_end_to_end() {
    let node = FakeNode::start(vec![ok(chain_config_json()), ok(json!("0xfeed"))]).await;

    let signer = CallbackSigner::new("alice", |envelope, chain_id| {
        let mut raw = chain_id.to_be_bytes().to_vec();
        raw.extend(serde_json::to_vec(envelope).map_err(|e| SignerError::SigningFailed(e.to_string()))?);
        Ok(SignatureInfo::new(vec![], raw))
    })
    .unwrap();

    let oex = Oex::custom(&node.url)
        .signer(signer)
        .retry_config(RetryConfig::none())
        .build();

    let config = oex.chain_config().await.unwrap();
    let intent = ActionIntent::new(
        "alice".parse().unwrap(),
        ActionPayload::vote("producer1".parse().unwrap(), "5"),
    );
    let hash = oex.send(intent, &config).await.unwrap();
    assert_eq!(hash, "0xfeed");

    let requests = node.requests().await;
    assert_eq!(requests[1]["method"], "oex_sendRawTransaction");

    let raw = hex_to_bytes(requests[1]["params"][0].as_str().unwrap()).unwrap();
    assert_eq!(&raw[..8], &100u64.to_be_bytes());
    let envelope: TransactionEnvelope = serde_json::from_slice(&raw[8..]).unwrap();
    let action = &envelope.actions()[0];
    assert_eq!(action.to_account_name.as_str(), "oexchain.dpos");
    assert_eq!(action.amount, Amount::Zero);
}
