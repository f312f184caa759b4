use std::sync::Arc;

use alloy::primitives::Address;
use serde_json::json;
use tracing::{debug, info};

use crate::data::ErrorSink;
use crate::data::chain::TARGET_CHAIN;
use crate::data::rpc::{RpcError, UNRECOGNIZED_CHAIN, WalletRpc};

/// Handshake layer over the wallet capability. Every operation catches its
/// own failures, reports them to the sink, and continues; callers observe
/// failure only as the account staying unset.
#[derive(Clone)]
pub struct WalletGateway {
    rpc: Arc<dyn WalletRpc>,
    on_error: ErrorSink,
}

impl WalletGateway {
    pub fn new(rpc: Arc<dyn WalletRpc>, on_error: ErrorSink) -> Self {
        Self { rpc, on_error }
    }

    /// Ask the wallet which accounts are already authorized, without
    /// prompting the user. Logs what it finds and nothing more.
    pub async fn check_connection(&self) {
        match self.rpc.request("eth_accounts", json!([])).await {
            Ok(raw) => match serde_json::from_value::<Vec<Address>>(raw) {
                Ok(accounts) => {
                    if let Some(account) = accounts.first() {
                        info!(%account, "wallet is already authorized");
                    } else {
                        info!("wallet reachable, no account authorized yet");
                    }
                }
                Err(e) => (self.on_error)(format!("unexpected eth_accounts response: {e}")),
            },
            Err(e) => (self.on_error)(format!("wallet account check failed: {e}")),
        }
    }

    /// Steer the wallet to the target chain. A 4902 answer means the wallet
    /// has never seen the chain, so register its parameters and leave the
    /// actual switch to the wallet. Every other failure is reported and
    /// ignored; the caller proceeds either way.
    pub async fn ensure_chain(&self) {
        let switch = json!([{ "chainId": TARGET_CHAIN.chain_id_hex() }]);
        match self.rpc.request("wallet_switchEthereumChain", switch).await {
            Ok(_) => debug!(chain = TARGET_CHAIN.name, "active chain confirmed"),
            Err(err) if err.code() == Some(UNRECOGNIZED_CHAIN) => {
                let add = json!([TARGET_CHAIN.add_chain_params()]);
                if let Err(e) = self.rpc.request("wallet_addEthereumChain", add).await {
                    (self.on_error)(format!("failed to register chain with wallet: {e}"));
                }
            }
            Err(e) => (self.on_error)(format!("chain switch failed: {e}")),
        }
    }

    /// Full connection handshake: probe that a wallet is listening, steer it
    /// to the target chain, then request account authorization (the wallet
    /// prompts the user if needed). Returns the first authorized account,
    /// or `None` after any failure.
    pub async fn connect(&self) -> Option<Address> {
        if let Err(err @ RpcError::Unreachable(_)) =
            self.rpc.request("eth_accounts", json!([])).await
        {
            (self.on_error)(format!("no wallet available: {err}"));
            return None;
        }

        self.ensure_chain().await;

        match self.rpc.request("eth_requestAccounts", json!([])).await {
            Ok(raw) => match serde_json::from_value::<Vec<Address>>(raw) {
                Ok(accounts) => {
                    let account = accounts.first().copied();
                    match account {
                        Some(account) => info!(%account, "wallet connected"),
                        None => (self.on_error)("wallet returned no accounts".to_string()),
                    }
                    account
                }
                Err(e) => {
                    (self.on_error)(format!("unexpected eth_requestAccounts response: {e}"));
                    None
                }
            },
            Err(e) => {
                (self.on_error)(format!("wallet connection failed: {e}"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::data::rpc::testing::FakeWallet;

    fn collecting_sink() -> (ErrorSink, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: ErrorSink = Arc::new(move |msg| sink_seen.lock().unwrap().push(msg));
        (sink, seen)
    }

    const ACCOUNT_A: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";
    const ACCOUNT_B: &str = "0x0000000000000000000000000000000000000b0b";

    #[tokio::test]
    async fn connect_without_wallet_yields_no_account() {
        let wallet = FakeWallet::new();
        let (sink, seen) = collecting_sink();
        let gateway = WalletGateway::new(wallet.clone(), sink);

        let account = gateway.connect().await;

        assert_eq!(account, None);
        assert!(!seen.lock().unwrap().is_empty());
        // The attempt was aborted before any authorization prompt.
        assert!(wallet.calls_for("eth_requestAccounts").is_empty());
    }

    #[tokio::test]
    async fn connect_returns_first_account() {
        let wallet = FakeWallet::new();
        wallet.respond("eth_accounts", serde_json::json!([]));
        wallet.respond("wallet_switchEthereumChain", serde_json::Value::Null);
        wallet.respond("eth_requestAccounts", serde_json::json!([ACCOUNT_A, ACCOUNT_B]));
        let (sink, seen) = collecting_sink();
        let gateway = WalletGateway::new(wallet, sink);

        let account = gateway.connect().await;

        assert_eq!(account, Some(ACCOUNT_A.parse().unwrap()));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unrecognized_chain_triggers_registration() {
        let wallet = FakeWallet::new();
        wallet.fail(
            "wallet_switchEthereumChain",
            RpcError::Provider {
                code: UNRECOGNIZED_CHAIN,
                message: "unknown chain".to_string(),
            },
        );
        wallet.respond("wallet_addEthereumChain", serde_json::Value::Null);
        let (sink, seen) = collecting_sink();
        let gateway = WalletGateway::new(wallet.clone(), sink);

        gateway.ensure_chain().await;

        let adds = wallet.calls_for("wallet_addEthereumChain");
        assert_eq!(adds.len(), 1);
        assert_eq!(adds[0][0]["chainId"], "0x4");
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn other_chain_errors_are_swallowed_without_registration() {
        let wallet = FakeWallet::new();
        wallet.fail(
            "wallet_switchEthereumChain",
            RpcError::Provider {
                code: -32603,
                message: "internal".to_string(),
            },
        );
        let (sink, seen) = collecting_sink();
        let gateway = WalletGateway::new(wallet.clone(), sink);

        gateway.ensure_chain().await;

        assert!(wallet.calls_for("wallet_addEthereumChain").is_empty());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn check_connection_swallows_failures() {
        let wallet = FakeWallet::new();
        let (sink, seen) = collecting_sink();
        let gateway = WalletGateway::new(wallet, sink);

        gateway.check_connection().await;

        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
