//! An in-memory chain to run the protocol against.
//!
//! Accounts are either plain addresses or have code: the built-in ERC-20,
//! WETH and Permit2 implementations of [`crate::tokens`] or a Rust closure.
//! Calls run synchronously and may call back into the chain or the protocol.
//! State is snapshotted by copy; a call that fails rolls back to the state it
//! started from.

use {
    crate::tokens,
    alloy_primitives::{Address, Bytes, U256},
    limit_order::{Blockchain, Event, Revert, ledger::Snapshot},
    parking_lot::{Mutex, RwLock},
    std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    },
};

/// Code of a contract account. It runs with the chain's state unlocked.
pub type Code = Arc<dyn Fn(&Call) -> Result<Bytes, Revert> + Send + Sync>;

/// A call as the callee sees it.
pub struct Call<'a> {
    pub chain: &'a TestChain,
    pub from: Address,
    /// The called contract.
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    /// Read only calls may not change state or make state changing calls.
    pub is_static: bool,
}

#[derive(Clone)]
enum Account {
    Token,
    Weth,
    Permit2,
    Contract(Code),
}

#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub timestamp: u64,
    pub native: HashMap<Address, U256>,
    /// `(token, owner)`
    pub balances: HashMap<(Address, Address), U256>,
    /// `(token, owner, spender)`
    pub allowances: HashMap<(Address, Address, Address), U256>,
    /// `(owner, token, spender)`
    pub permit2_allowances: HashMap<(Address, Address, Address), U256>,
    pub events: Vec<Event>,
}

#[derive(Default)]
pub struct TestChain {
    state: Mutex<State>,
    snapshots: Mutex<Vec<State>>,
    accounts: RwLock<HashMap<Address, Account>>,
    static_depth: AtomicUsize,
}

pub fn revert(reason: &str) -> Revert {
    Revert(Bytes::copy_from_slice(reason.as_bytes()))
}

impl TestChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Deploys a contract running `code`.
    pub fn deploy(
        &self,
        address: Address,
        code: impl Fn(&Call) -> Result<Bytes, Revert> + Send + Sync + 'static,
    ) {
        self.accounts
            .write()
            .insert(address, Account::Contract(Arc::new(code)));
    }

    pub fn deploy_token(&self, address: Address) {
        self.accounts.write().insert(address, Account::Token);
    }

    pub fn deploy_weth(&self, address: Address) {
        self.accounts.write().insert(address, Account::Weth);
    }

    pub fn deploy_permit2(&self, address: Address) {
        self.accounts.write().insert(address, Account::Permit2);
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.with_state(|state| state.timestamp = timestamp);
    }

    pub fn mint(&self, token: Address, owner: Address, amount: U256) {
        self.with_state(|state| {
            *state.balances.entry((token, owner)).or_default() += amount;
        });
    }

    pub fn balance_of(&self, token: Address, owner: Address) -> U256 {
        self.with_state(|state| {
            state
                .balances
                .get(&(token, owner))
                .copied()
                .unwrap_or_default()
        })
    }

    pub fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) {
        self.with_state(|state| {
            state.allowances.insert((token, owner, spender), amount);
        });
    }

    pub fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
        self.with_state(|state| {
            state
                .allowances
                .get(&(token, owner, spender))
                .copied()
                .unwrap_or_default()
        })
    }

    /// Lets `spender` move `owner`'s `token` through Permit2.
    pub fn permit2_approve(&self, owner: Address, token: Address, spender: Address, amount: U256) {
        self.with_state(|state| {
            state
                .permit2_allowances
                .insert((owner, token, spender), amount);
        });
    }

    pub fn fund(&self, account: Address, amount: U256) {
        self.with_state(|state| *state.native.entry(account).or_default() += amount);
    }

    pub fn native_balance(&self, account: Address) -> U256 {
        self.with_state(|state| state.native.get(&account).copied().unwrap_or_default())
    }

    /// Events emitted by transactions that did not revert.
    pub fn events(&self) -> Vec<Event> {
        self.with_state(|state| state.events.clone())
    }

    pub fn is_static(&self) -> bool {
        self.static_depth.load(Ordering::SeqCst) > 0
    }

    fn move_native(&self, from: Address, to: Address, value: U256) -> Result<(), Revert> {
        self.with_state(|state| {
            let balance = state.native.entry(from).or_default();
            *balance = balance
                .checked_sub(value)
                .ok_or_else(|| revert("insufficient native balance"))?;
            *state.native.entry(to).or_default() += value;
            Ok(())
        })
    }

    fn execute(
        &self,
        from: Address,
        to: Address,
        data: Bytes,
        value: U256,
        is_static: bool,
    ) -> Result<Bytes, Revert> {
        if !value.is_zero() {
            self.move_native(from, to, value)?;
        }
        let account = self.accounts.read().get(&to).cloned();
        match account {
            None => Ok(Bytes::new()),
            Some(Account::Token) => tokens::erc20(self, from, to, &data, is_static),
            Some(Account::Weth) => tokens::weth(self, from, to, &data, is_static),
            Some(Account::Permit2) => tokens::permit2(self, from, &data, is_static),
            Some(Account::Contract(code)) => code(&Call {
                chain: self,
                from,
                to,
                data,
                value,
                is_static,
            }),
        }
    }
}

impl Blockchain for TestChain {
    fn timestamp(&self) -> u64 {
        self.with_state(|state| state.timestamp)
    }

    fn is_contract(&self, address: Address) -> bool {
        self.accounts.read().contains_key(&address)
    }

    fn static_call(&self, from: Address, to: Address, data: Bytes) -> Result<Bytes, Revert> {
        self.static_depth.fetch_add(1, Ordering::SeqCst);
        let result = self.execute(from, to, data, U256::ZERO, true);
        self.static_depth.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn call(&self, from: Address, to: Address, data: Bytes, value: U256) -> Result<Bytes, Revert> {
        if self.is_static() {
            return Err(revert("state change in static call"));
        }
        let snapshot = self.snapshot();
        let result = self.execute(from, to, data, value, false);
        match result {
            Ok(_) => self.commit(snapshot),
            Err(_) => self.revert_to(snapshot),
        }
        result
    }

    fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().clone();
        let mut snapshots = self.snapshots.lock();
        snapshots.push(state);
        snapshots.len() - 1
    }

    fn revert_to(&self, snapshot: Snapshot) {
        let mut snapshots = self.snapshots.lock();
        let Some(state) = snapshots.get(snapshot).cloned() else {
            tracing::warn!(snapshot, "reverting to unknown snapshot");
            return;
        };
        snapshots.truncate(snapshot);
        *self.state.lock() = state;
    }

    fn commit(&self, snapshot: Snapshot) {
        self.snapshots.lock().truncate(snapshot);
    }

    fn emit(&self, event: Event) {
        tracing::debug!(?event, "event");
        self.with_state(|state| state.events.push(event));
    }
}
