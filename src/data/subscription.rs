use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tracing::debug;

use crate::data::ErrorSink;
use alloy::sol_types::SolEvent;

use crate::data::contract::{self, BuyMeACoffee, CONTRACT_ADDRESS};
use crate::data::rpc::WalletRpc;
use crate::events::AppEvent;

/// Live NewMemo stream: a log filter installed at the wallet endpoint and
/// polled for changes. The handle owns the polling task; dropping it (or
/// calling `stop`) uninstalls the filter and ends the task, so a torn-down
/// view can never receive another event.
pub struct MemoSubscription {
    shutdown_tx: Option<mpsc::UnboundedSender<()>>,
}

impl MemoSubscription {
    pub fn start(
        rpc: Arc<dyn WalletRpc>,
        event_tx: mpsc::UnboundedSender<AppEvent>,
        poll_interval: Duration,
        on_error: ErrorSink,
    ) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::unbounded_channel::<()>();

        tokio::spawn(async move {
            let params = json!([{
                "address": CONTRACT_ADDRESS,
                "fromBlock": "latest",
                "topics": [BuyMeACoffee::NewMemo::SIGNATURE_HASH],
            }]);
            let filter_id = match rpc.request("eth_newFilter", params).await {
                Ok(id) => id,
                Err(e) => {
                    on_error(format!("memo subscription unavailable: {e}"));
                    return;
                }
            };
            debug!(?filter_id, "listening for new memos");

            loop {
                tokio::select! {
                    _ = tokio::time::sleep(poll_interval) => {
                        match rpc.request("eth_getFilterChanges", json!([filter_id.clone()])).await {
                            Ok(changes) => match contract::decode_memo_logs(changes) {
                                Ok(memos) => {
                                    for memo in memos {
                                        let _ = event_tx.send(AppEvent::MemoReceived(memo));
                                    }
                                }
                                Err(e) => on_error(format!("could not decode memo event: {e}")),
                            },
                            Err(e) => on_error(format!("memo poll failed: {e}")),
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        let _ = rpc.request("eth_uninstallFilter", json!([filter_id])).await;
                        debug!("memo subscription stopped");
                        return;
                    }
                }
            }
        });

        Self {
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Tear the subscription down. Idempotent.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MemoSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}
