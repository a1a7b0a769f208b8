//! Minimal Solana JSON-RPC client over `reqwest`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;
use tv_api_types::{Address, Commitment, TxSignature};
use tv_chain_client::{ChainError, ChainResult};

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
struct AccountValue {
    data: (String, String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    #[serde(default)]
    pub confirmation_status: Option<String>,
    #[serde(default)]
    pub err: Option<Value>,
}

pub struct RpcClient {
    endpoint: String,
    commitment: Commitment,
    http: reqwest::Client,
}

impl RpcClient {
    pub fn new(endpoint: &str, commitment: Commitment) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            commitment,
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> ChainResult<T> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };
        debug!(method, endpoint = %self.endpoint, "rpc call");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Transport(format!("{method}: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChainError::Transport(format!("{method}: {e}")))?;
        if !status.is_success() {
            return Err(ChainError::Transport(format!("{method} HTTP {status}: {text}")));
        }

        parse_response(method, &text)
    }

    pub async fn latest_blockhash(&self) -> ChainResult<[u8; 32]> {
        let reply: WithContext<BlockhashValue> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": self.commitment.as_str() }]),
            )
            .await?;
        decode_blockhash(&reply.value.blockhash)
    }

    /// `Ok(None)` when the account does not exist.
    pub async fn account_data(&self, address: &Address) -> ChainResult<Option<Vec<u8>>> {
        let reply: WithContext<Option<AccountValue>> = self
            .call(
                "getAccountInfo",
                json!([
                    address.to_string(),
                    { "encoding": "base64", "commitment": self.commitment.as_str() }
                ]),
            )
            .await?;
        reply.value.map(decode_account_data).transpose()
    }

    pub async fn send_transaction(&self, wire: &[u8]) -> ChainResult<TxSignature> {
        let signature: String = self
            .call(
                "sendTransaction",
                json!([
                    STANDARD.encode(wire),
                    { "encoding": "base64", "preflightCommitment": self.commitment.as_str() }
                ]),
            )
            .await?;
        Ok(TxSignature(signature))
    }

    pub async fn signature_status(&self, signature: &TxSignature) -> ChainResult<Option<SignatureStatus>> {
        let reply: WithContext<Vec<Option<SignatureStatus>>> = self
            .call("getSignatureStatuses", json!([[signature.0]]))
            .await?;
        Ok(reply.value.into_iter().next().flatten())
    }
}

fn parse_response<T: DeserializeOwned>(method: &str, text: &str) -> ChainResult<T> {
    let response: RpcResponse<T> = serde_json::from_str(text)
        .map_err(|e| ChainError::Transport(format!("{method} returned malformed JSON: {e}")))?;
    if let Some(error) = response.error {
        return Err(ChainError::Rpc {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| ChainError::Transport(format!("{method} returned neither result nor error")))
}

fn decode_blockhash(encoded: &str) -> ChainResult<[u8; 32]> {
    let bytes = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| ChainError::Transport(format!("blockhash {encoded:?}: {e}")))?;
    bytes
        .try_into()
        .map_err(|_| ChainError::Transport(format!("blockhash {encoded:?} is not 32 bytes")))
}

fn decode_account_data(value: AccountValue) -> ChainResult<Vec<u8>> {
    let (payload, encoding) = value.data;
    if encoding != "base64" {
        return Err(ChainError::AccountDecode(format!(
            "unexpected account encoding {encoding:?}"
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| ChainError::AccountDecode(format!("account base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_maps_to_chain_error() {
        let text = r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32002,"message":"Transaction simulation failed"}}"#;
        let result: ChainResult<String> = parse_response("sendTransaction", text);
        assert_eq!(
            result,
            Err(ChainError::Rpc {
                code: -32002,
                message: "Transaction simulation failed".into(),
            })
        );
    }

    #[test]
    fn missing_account_is_none() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":null}}"#;
        let reply: WithContext<Option<AccountValue>> =
            parse_response("getAccountInfo", text).expect("parse");
        assert!(reply.value.is_none());
    }

    #[test]
    fn account_data_is_base64_decoded() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":{"data":["AQID","base64"],"executable":false,"lamports":10,"owner":"11111111111111111111111111111111","rentEpoch":0}}}"#;
        let reply: WithContext<Option<AccountValue>> =
            parse_response("getAccountInfo", text).expect("parse");
        let data = reply.value.map(decode_account_data).transpose().expect("decode");
        assert_eq!(data, Some(vec![1, 2, 3]));
    }

    #[test]
    fn blockhash_decodes_to_32_bytes() {
        let encoded = bs58::encode([7_u8; 32]).into_string();
        assert_eq!(decode_blockhash(&encoded).expect("blockhash"), [7; 32]);
        assert!(decode_blockhash("111").is_err());
    }

    #[test]
    fn signature_status_parses_nullable_entries() {
        let text = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":[{"slot":4,"confirmations":0,"err":null,"confirmationStatus":"processed"}]}}"#;
        let reply: WithContext<Vec<Option<SignatureStatus>>> =
            parse_response("getSignatureStatuses", text).expect("parse");
        let status = reply.value.into_iter().next().flatten().expect("status");
        assert_eq!(status.confirmation_status.as_deref(), Some("processed"));
        assert!(status.err.is_none());

        let empty = r#"{"jsonrpc":"2.0","id":1,"result":{"context":{"slot":5},"value":[null]}}"#;
        let reply: WithContext<Vec<Option<SignatureStatus>>> =
            parse_response("getSignatureStatuses", empty).expect("parse");
        assert_eq!(reply.value, vec![None]);
    }

    #[test]
    fn malformed_body_is_transport_error() {
        let result: ChainResult<String> = parse_response("getLatestBlockhash", "<html>");
        assert!(matches!(result, Err(ChainError::Transport(_))));
    }
}
