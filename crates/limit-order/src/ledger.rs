//! Storage of every maker's invalidation state.
//!
//! The ledger stores raw words. What they mean is up to the invalidators in
//! [`crate::invalidators`]: a zero word is always the untouched state.

use {
    alloy_primitives::{Address, B256, U256},
    parking_lot::Mutex,
    std::collections::HashMap,
};

/// Journal position a ledger can be reverted to.
pub type Snapshot = usize;

#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Ledger: Send + Sync {
    /// Remaining invalidator word of a standard order.
    fn remaining(&self, maker: Address, order_hash: B256) -> U256;
    fn set_remaining(&self, maker: Address, order_hash: B256, value: U256);

    /// One 256 bit slot of a maker's bit invalidator.
    fn bit_invalidator(&self, maker: Address, slot: U256) -> U256;
    fn set_bit_invalidator(&self, maker: Address, slot: U256, value: U256);

    /// Nonce, or epoch, of one of a maker's series.
    fn nonce(&self, maker: Address, series: u64) -> U256;
    fn set_nonce(&self, maker: Address, series: u64, value: U256);

    /// Every snapshot is released exactly once, innermost first, by either
    /// [`Ledger::revert_to`] or [`Ledger::commit`].
    fn snapshot(&self) -> Snapshot;
    /// Undoes every write made since the snapshot was taken. Snapshots taken
    /// after it become invalid.
    fn revert_to(&self, snapshot: Snapshot);
    /// Keeps the writes made since the snapshot was taken. They are still
    /// undone when an enclosing snapshot is reverted.
    fn commit(&self, snapshot: Snapshot);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Key {
    Remaining(Address, B256),
    Bits(Address, U256),
    Nonce(Address, u64),
}

/// Ledger kept in process memory. While a snapshot is open every write
/// records the value it replaced so that snapshots are journal positions.
/// The journal is dropped once the outermost snapshot is committed.
#[derive(Debug, Default)]
pub struct InMemoryLedger(Mutex<State>);

#[derive(Debug, Default)]
struct State {
    words: HashMap<Key, U256>,
    journal: Vec<(Key, U256)>,
    open: usize,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, key: Key) -> U256 {
        self.0.lock().words.get(&key).copied().unwrap_or_default()
    }

    fn set(&self, key: Key, value: U256) {
        let mut state = self.0.lock();
        let previous = if value.is_zero() {
            state.words.remove(&key)
        } else {
            state.words.insert(key, value)
        };
        if state.open > 0 {
            state.journal.push((key, previous.unwrap_or_default()));
        }
    }

    #[cfg(test)]
    pub(crate) fn undo_records(&self) -> usize {
        self.0.lock().journal.len()
    }
}

impl Ledger for InMemoryLedger {
    fn remaining(&self, maker: Address, order_hash: B256) -> U256 {
        self.get(Key::Remaining(maker, order_hash))
    }

    fn set_remaining(&self, maker: Address, order_hash: B256, value: U256) {
        self.set(Key::Remaining(maker, order_hash), value)
    }

    fn bit_invalidator(&self, maker: Address, slot: U256) -> U256 {
        self.get(Key::Bits(maker, slot))
    }

    fn set_bit_invalidator(&self, maker: Address, slot: U256, value: U256) {
        self.set(Key::Bits(maker, slot), value)
    }

    fn nonce(&self, maker: Address, series: u64) -> U256 {
        self.get(Key::Nonce(maker, series))
    }

    fn set_nonce(&self, maker: Address, series: u64, value: U256) {
        self.set(Key::Nonce(maker, series), value)
    }

    fn snapshot(&self) -> Snapshot {
        let mut state = self.0.lock();
        state.open += 1;
        state.journal.len()
    }

    fn revert_to(&self, snapshot: Snapshot) {
        let mut state = self.0.lock();
        state.open = state.open.saturating_sub(1);
        while state.journal.len() > snapshot {
            let Some((key, previous)) = state.journal.pop() else {
                break;
            };
            if previous.is_zero() {
                state.words.remove(&key);
            } else {
                state.words.insert(key, previous);
            }
        }
    }

    fn commit(&self, _: Snapshot) {
        let mut state = self.0.lock();
        state.open = state.open.saturating_sub(1);
        if state.open == 0 {
            state.journal.clear();
        }
    }
}
