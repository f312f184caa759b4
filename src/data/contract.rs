use alloy::primitives::{Address, Bytes, U256, address};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::{SolCall, SolEvent};
use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use serde_json::Value;

use crate::data::types::Memo;

sol! {
    /// On-chain interface of the tip jar.
    contract BuyMeACoffee {
        struct Memo {
            address from;
            uint256 timestamp;
            string name;
            string message;
        }

        event NewMemo(address indexed from, uint256 timestamp, string name, string message);

        function buyCoffee(string _name, string _message) external payable;
        function getMemos() external view returns (Memo[] memory);
    }
}

/// The one deployment this frontend is bound to.
pub const CONTRACT_ADDRESS: Address = address!("BD124a793CBb44Da617Eef74f67AbB8139ac9FE7");

/// Fixed price of one coffee: 0.001 ETH.
pub const COFFEE_PRICE_WEI: U256 = U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]);

/// Call data for `getMemos()`.
pub fn get_memos_data() -> Bytes {
    BuyMeACoffee::getMemosCall {}.abi_encode().into()
}

/// Call data for `buyCoffee(name, message)`.
pub fn buy_coffee_data(name: &str, message: &str) -> Bytes {
    BuyMeACoffee::buyCoffeeCall {
        _name: name.to_string(),
        _message: message.to_string(),
    }
    .abi_encode()
    .into()
}

/// Decode an `eth_call` result for `getMemos()` into the feed's order.
pub fn decode_memos(raw: Value) -> Result<Vec<Memo>> {
    let bytes: Bytes = serde_json::from_value(raw)?;
    let decoded = BuyMeACoffee::getMemosCall::abi_decode_returns(&bytes, true)?;
    Ok(decoded._0.iter().map(memo_from_entry).collect())
}

/// Decode an `eth_getFilterChanges` result (a batch of NewMemo logs).
pub fn decode_memo_logs(raw: Value) -> Result<Vec<Memo>> {
    let logs: Vec<Log> = serde_json::from_value(raw)?;
    let mut memos = Vec::with_capacity(logs.len());
    for log in &logs {
        let event = BuyMeACoffee::NewMemo::decode_log_data(&log.inner.data, true)?;
        memos.push(memo_from_event(&event));
    }
    Ok(memos)
}

fn memo_from_entry(entry: &BuyMeACoffee::Memo) -> Memo {
    Memo {
        from: entry.from,
        timestamp: chain_timestamp(entry.timestamp),
        name: entry.name.clone(),
        message: entry.message.clone(),
    }
}

fn memo_from_event(event: &BuyMeACoffee::NewMemo) -> Memo {
    Memo {
        from: event.from,
        timestamp: chain_timestamp(event.timestamp),
        name: event.name.clone(),
        message: event.message.clone(),
    }
}

/// Seconds-since-epoch as reported by the chain, converted once here so the
/// bulk fetch and the live stream agree on the representation.
fn chain_timestamp(timestamp: U256) -> DateTime<Utc> {
    let secs = i64::try_from(timestamp).unwrap_or(i64::MAX);
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
