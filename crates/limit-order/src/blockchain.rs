use {
    crate::{error::Revert, events::Event, ledger::Snapshot},
    alloy_primitives::{Address, Bytes, U256},
};

/// The host the protocol runs on: the chain's clock, accounts and contracts.
///
/// Calls are synchronous and observe each other's effects immediately. A call
/// that reverts leaves no effects behind; state changes of calls that
/// succeeded are undone by reverting to an earlier snapshot.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
pub trait Blockchain: Send + Sync {
    /// Timestamp of the block being executed.
    fn timestamp(&self) -> u64;

    fn is_contract(&self, address: Address) -> bool;

    /// Calls `to` without allowing it to change any state.
    fn static_call(&self, from: Address, to: Address, data: Bytes) -> Result<Bytes, Revert>;

    /// Calls `to`, sending `value` of the native token along.
    fn call(&self, from: Address, to: Address, data: Bytes, value: U256) -> Result<Bytes, Revert>;

    fn snapshot(&self) -> Snapshot;

    fn revert_to(&self, snapshot: Snapshot);

    /// Releases a snapshot, keeping the state changes made since.
    fn commit(&self, snapshot: Snapshot);

    /// Appends an event to the log of the current transaction.
    fn emit(&self, event: Event);
}

/// What the read only parts of the engine (predicates, amount getters and
/// signature checks) can observe.
pub trait StaticContext {
    fn timestamp(&self) -> u64;

    fn is_contract(&self, address: Address) -> bool;

    /// Read only call from the protocol contract.
    fn static_call(&self, target: Address, data: Bytes) -> Result<Bytes, Revert>;

    fn nonce(&self, maker: Address, series: u64) -> U256;
}

/// Reads the first word of call return data.
pub fn return_word(data: &[u8]) -> Option<U256> {
    data.get(..32).map(U256::from_be_slice)
}
