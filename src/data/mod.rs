pub mod chain;
pub mod contract;
pub mod rpc;
pub mod subscription;
pub mod types;
pub mod wallet;

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::data::contract::{COFFEE_PRICE_WEI, CONTRACT_ADDRESS};
use crate::data::rpc::WalletRpc;
use crate::data::subscription::MemoSubscription;
use crate::data::wallet::WalletGateway;
use crate::events::AppEvent;

/// Failure hook shared by the wallet and contract paths. Operations report
/// here and continue; callers observe failure only as a missing state change.
pub type ErrorSink = Arc<dyn Fn(String) + Send + Sync>;

/// Sink that only writes a diagnostic record.
pub fn log_sink() -> ErrorSink {
    Arc::new(|msg| tracing::warn!("{msg}"))
}

/// Name used when the tipper leaves the name field empty.
const DEFAULT_NAME: &str = "Ryuu";
/// Message used when the tipper leaves the message field empty.
const DEFAULT_MESSAGE: &str = "Enjoy your coffee!";

const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Background-task facade between the UI loop and the wallet endpoint.
/// Every operation spawns, reports its outcome over the event channel, and
/// never returns an error to the caller.
pub struct CoffeeService {
    rpc: Arc<dyn WalletRpc>,
    gateway: WalletGateway,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    poll_interval: Duration,
    on_error: ErrorSink,
}

impl CoffeeService {
    pub fn new(
        rpc: Arc<dyn WalletRpc>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        poll_interval: Duration,
        on_error: ErrorSink,
    ) -> Self {
        let gateway = WalletGateway::new(Arc::clone(&rpc), on_error.clone());
        Self {
            rpc,
            gateway,
            event_tx,
            poll_interval,
            on_error,
        }
    }

    /// Log whether the wallet already has an authorized account.
    pub fn check_connection(&self) {
        let gateway = self.gateway.clone();
        tokio::spawn(async move {
            gateway.check_connection().await;
        });
    }

    /// Run the connection handshake; a `WalletConnected` event follows on
    /// success, nothing at all on failure.
    pub fn connect_wallet(&self) {
        let gateway = self.gateway.clone();
        let tx = self.event_tx.clone();
        tokio::spawn(async move {
            if let Some(account) = gateway.connect().await {
                let _ = tx.send(AppEvent::WalletConnected(account));
            }
        });
    }

    /// Fetch the complete memo history with one read call.
    pub fn load_memos(&self) {
        let rpc = Arc::clone(&self.rpc);
        let tx = self.event_tx.clone();
        let on_error = self.on_error.clone();

        tokio::spawn(async move {
            let call = json!([
                { "to": CONTRACT_ADDRESS, "data": contract::get_memos_data() },
                "latest",
            ]);
            let raw = match rpc.request("eth_call", call).await {
                Ok(raw) => raw,
                Err(e) => {
                    on_error(format!("failed to fetch memos: {e}"));
                    return;
                }
            };
            match contract::decode_memos(raw) {
                Ok(memos) => {
                    info!(count = memos.len(), "fetched memo history");
                    let _ = tx.send(AppEvent::MemosLoaded(memos));
                }
                Err(e) => on_error(format!("could not decode memo list: {e}")),
            }
        });
    }

    /// Submit a tip. Skipped outright while no account is connected. Empty
    /// fields fall back to the fixed defaults; the task waits for on-chain
    /// inclusion before announcing `CoffeeConfirmed`.
    pub fn buy_coffee(&self, from: Option<Address>, name: String, message: String) {
        let Some(from) = from else {
            debug!("coffee submit skipped: wallet not connected");
            return;
        };

        let rpc = Arc::clone(&self.rpc);
        let tx = self.event_tx.clone();
        let on_error = self.on_error.clone();

        tokio::spawn(async move {
            let name = if name.is_empty() { DEFAULT_NAME.to_string() } else { name };
            let message = if message.is_empty() {
                DEFAULT_MESSAGE.to_string()
            } else {
                message
            };

            info!(%from, %name, "buying coffee");
            let params = json!([{
                "from": from,
                "to": CONTRACT_ADDRESS,
                "value": format!("0x{COFFEE_PRICE_WEI:x}"),
                "data": contract::buy_coffee_data(&name, &message),
            }]);
            let raw = match rpc.request("eth_sendTransaction", params).await {
                Ok(raw) => raw,
                Err(e) => {
                    on_error(format!("coffee transaction not sent: {e}"));
                    return;
                }
            };
            let hash: B256 = match serde_json::from_value(raw) {
                Ok(hash) => hash,
                Err(e) => {
                    on_error(format!("unexpected eth_sendTransaction response: {e}"));
                    return;
                }
            };
            let _ = tx.send(AppEvent::CoffeePending(hash));

            // Wait for inclusion. No timeout: a stalled transaction stays
            // pending until the wallet answers.
            loop {
                match rpc.request("eth_getTransactionReceipt", json!([hash])).await {
                    Ok(Value::Null) => {}
                    Ok(receipt) => {
                        if receipt.get("status").and_then(Value::as_str) == Some("0x1") {
                            info!(%hash, "coffee purchased");
                            let _ = tx.send(AppEvent::CoffeeConfirmed(hash));
                        } else {
                            on_error(format!("coffee transaction {hash} reverted"));
                        }
                        return;
                    }
                    Err(e) => {
                        on_error(format!("receipt poll failed: {e}"));
                        return;
                    }
                }
                tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
            }
        });
    }

    /// Install the live NewMemo subscription; the returned handle tears it
    /// down on `stop` or drop.
    pub fn subscribe_memos(&self) -> MemoSubscription {
        MemoSubscription::start(
            Arc::clone(&self.rpc),
            self.event_tx.clone(),
            self.poll_interval,
            self.on_error.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use alloy::primitives::{U256, address};
    use alloy::sol_types::{SolCall, SolValue};

    use super::contract::BuyMeACoffee;
    use super::rpc::testing::FakeWallet;
    use super::*;

    const SENDER: Address = address!("d8dA6BF26964aF9D7eEd9e03E53415D37aA96045");
    const TX_HASH: &str = "0xabcdef1234567890abcdef1234567890abcdef1234567890abcdef1234567890";

    fn service(
        wallet: Arc<FakeWallet>,
    ) -> (CoffeeService, mpsc::UnboundedReceiver<AppEvent>, Arc<Mutex<Vec<String>>>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink: ErrorSink = Arc::new(move |msg| sink_seen.lock().unwrap().push(msg));
        let service = CoffeeService::new(wallet, event_tx, Duration::from_millis(10), sink);
        (service, event_rx, seen)
    }

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<AppEvent>) -> AppEvent {
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no event arrived")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn submit_without_account_makes_no_call() {
        let wallet = FakeWallet::new();
        let (service, _event_rx, _seen) = service(wallet.clone());

        service.buy_coffee(None, "N".to_string(), "M".to_string());
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(wallet.calls().is_empty());
    }

    #[tokio::test]
    async fn submit_applies_defaults_and_fixed_price() {
        let wallet = FakeWallet::new();
        wallet.respond("eth_sendTransaction", serde_json::json!(TX_HASH));
        wallet.respond(
            "eth_getTransactionReceipt",
            serde_json::json!({ "status": "0x1", "transactionHash": TX_HASH }),
        );
        let (service, mut event_rx, seen) = service(wallet.clone());

        service.buy_coffee(Some(SENDER), String::new(), String::new());

        assert!(matches!(next_event(&mut event_rx).await, AppEvent::CoffeePending(_)));
        assert!(matches!(next_event(&mut event_rx).await, AppEvent::CoffeeConfirmed(_)));
        assert!(seen.lock().unwrap().is_empty());

        let sends = wallet.calls_for("eth_sendTransaction");
        assert_eq!(sends.len(), 1);
        let call = &sends[0][0];
        assert_eq!(call["value"], "0x38d7ea4c68000");

        let data: alloy::primitives::Bytes =
            serde_json::from_value(call["data"].clone()).unwrap();
        let decoded = BuyMeACoffee::buyCoffeeCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded._name, "Ryuu");
        assert_eq!(decoded._message, "Enjoy your coffee!");
    }

    #[tokio::test]
    async fn reverted_transaction_reports_and_never_confirms() {
        let wallet = FakeWallet::new();
        wallet.respond("eth_sendTransaction", serde_json::json!(TX_HASH));
        wallet.respond(
            "eth_getTransactionReceipt",
            serde_json::json!({ "status": "0x0", "transactionHash": TX_HASH }),
        );
        let (service, mut event_rx, seen) = service(wallet);

        service.buy_coffee(Some(SENDER), "N".to_string(), "M".to_string());

        assert!(matches!(next_event(&mut event_rx).await, AppEvent::CoffeePending(_)));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(event_rx.try_recv().is_err());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].contains("reverted"));
    }

    #[tokio::test]
    async fn load_memos_preserves_call_order() {
        let entries: Vec<BuyMeACoffee::Memo> = (0..4u64)
            .map(|i| BuyMeACoffee::Memo {
                from: SENDER,
                timestamp: U256::from(1_700_000_000 + i),
                name: format!("m{i}"),
                message: "M".to_string(),
            })
            .collect();
        let encoded = (entries,).abi_encode_params();

        let wallet = FakeWallet::new();
        wallet.respond(
            "eth_call",
            serde_json::json!(format!("0x{}", alloy::primitives::hex::encode(encoded))),
        );
        let (service, mut event_rx, _seen) = service(wallet);

        service.load_memos();

        match next_event(&mut event_rx).await {
            AppEvent::MemosLoaded(memos) => {
                assert_eq!(memos.len(), 4);
                let names: Vec<&str> = memos.iter().map(|m| m.name.as_str()).collect();
                assert_eq!(names, ["m0", "m1", "m2", "m3"]);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_wallet_leaves_feed_untouched() {
        let wallet = FakeWallet::new();
        let (service, mut event_rx, seen) = service(wallet);

        service.load_memos();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(event_rx.try_recv().is_err());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
