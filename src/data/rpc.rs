use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error code a wallet returns when asked to switch to a chain it has not
/// been configured with (EIP-3085).
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

/// Failure at the wallet boundary.
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("wallet endpoint unreachable: {0}")]
    Unreachable(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("wallet error {code}: {message}")]
    Provider { code: i64, message: String },
    #[error("malformed wallet response: {0}")]
    InvalidResponse(String),
}

impl RpcError {
    /// The provider-assigned error code, when the wallet itself answered.
    pub fn code(&self) -> Option<i64> {
        match self {
            RpcError::Provider { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// The wallet capability: a request/response surface following the standard
/// provider method/error-code contract (`eth_accounts`, `eth_requestAccounts`,
/// `wallet_switchEthereumChain`, ...). Injected everywhere it is needed so
/// the whole stack runs against a fake in tests.
#[async_trait]
pub trait WalletRpc: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;
}

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

/// JSON-RPC 2.0 over HTTP to a local wallet endpoint (a desktop signing
/// wallet conventionally listens on 127.0.0.1:1248).
pub struct HttpWalletRpc {
    client: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpWalletRpc {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }
}

#[async_trait]
impl WalletRpc for HttpWalletRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Unreachable(e.to_string())
                } else {
                    RpcError::Transport(e.to_string())
                }
            })?;

        let parsed: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(RpcError::Provider {
                code: err.code,
                message: err.message,
            });
        }

        Ok(parsed.result.unwrap_or(Value::Null))
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeWallet;
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn fake_wallet_replays_last_response() {
        let wallet = FakeWallet::new();
        wallet.respond("eth_blockNumber", json!("0x1"));
        wallet.respond("eth_blockNumber", json!("0x2"));

        assert_eq!(
            wallet.request("eth_blockNumber", json!([])).await.unwrap(),
            json!("0x1")
        );
        assert_eq!(
            wallet.request("eth_blockNumber", json!([])).await.unwrap(),
            json!("0x2")
        );
        // Last scripted response is sticky.
        assert_eq!(
            wallet.request("eth_blockNumber", json!([])).await.unwrap(),
            json!("0x2")
        );
    }

    #[tokio::test]
    async fn unscripted_method_is_unreachable() {
        let wallet = FakeWallet::new();
        let err = wallet.request("eth_accounts", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Unreachable(_)));
        assert_eq!(err.code(), None);
    }

    #[test]
    fn provider_code_is_exposed() {
        let err = RpcError::Provider {
            code: UNRECOGNIZED_CHAIN,
            message: "unknown chain".to_string(),
        };
        assert_eq!(err.code(), Some(4902));
    }
}
