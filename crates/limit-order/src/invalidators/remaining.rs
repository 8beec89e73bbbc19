use {
    crate::{Error, Result, ledger::Ledger},
    alloy_primitives::{Address, B256, U256},
};

/// Remaining making amount of a standard order as the ledger stores it: the
/// bitwise complement of the remaining amount. Zero therefore means the order
/// was never touched and [`U256::MAX`] that nothing is left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RemainingInvalidator(U256);

impl RemainingInvalidator {
    pub fn load(ledger: &dyn Ledger, maker: Address, order_hash: B256) -> Self {
        Self(ledger.remaining(maker, order_hash))
    }

    pub fn store(self, ledger: &dyn Ledger, maker: Address, order_hash: B256) {
        ledger.set_remaining(maker, order_hash, self.0)
    }

    pub fn fully_filled() -> Self {
        Self(U256::MAX)
    }

    /// The state after `made` of `remaining` was filled.
    pub fn remains(remaining: U256, made: U256) -> Self {
        Self(!remaining.saturating_sub(made))
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_new_order(&self) -> bool {
        self.0.is_zero()
    }

    pub fn remaining(&self) -> Result<U256> {
        if self.is_new_order() {
            return Err(Error::UnknownOrder);
        }
        Ok(!self.0)
    }

    /// Remaining amount, counting a new order as entirely unfilled.
    pub fn remaining_or(&self, making_amount: U256) -> U256 {
        if self.is_new_order() {
            making_amount
        } else {
            !self.0
        }
    }
}
