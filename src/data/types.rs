use alloy::primitives::Address;
use chrono::{DateTime, Utc};

/// One recorded tip, as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Memo {
    pub from: Address,
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub message: String,
}

/// Ordered, append-only collection of memos. Insertion order is arrival
/// order: the bulk fetch first, live events after. An arrival identical to
/// an entry already present (same sender, timestamp, name, and message) is
/// dropped, which absorbs the overlap between the initial fetch and events
/// fired while it was in flight.
#[derive(Debug, Default)]
pub struct MemoFeed {
    entries: Vec<Memo>,
}

impl MemoFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole feed with a freshly fetched history.
    pub fn replace(&mut self, memos: Vec<Memo>) {
        self.entries = memos;
    }

    /// Append a live arrival at the end, unless it is already present.
    pub fn push(&mut self, memo: Memo) {
        if self.entries.contains(&memo) {
            tracing::debug!(from = %memo.from, "dropping duplicate memo");
            return;
        }
        self.entries.push(memo);
    }

    pub fn entries(&self) -> &[Memo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
