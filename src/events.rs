use alloy::primitives::{Address, B256};

use crate::data::types::Memo;

/// Events flowing into the main app loop: outcomes reported by background
/// tasks, plus the two actions UI components ask the service to perform.
#[derive(Debug, Clone)]
pub enum AppEvent {
    // UI-originated
    ConnectRequested,
    SubmitRequested { name: String, message: String },

    // Background outcomes
    WalletConnected(Address),
    MemosLoaded(Vec<Memo>),
    MemoReceived(Memo),
    CoffeePending(B256),
    CoffeeConfirmed(B256),

    // Status
    Error(String),
}
