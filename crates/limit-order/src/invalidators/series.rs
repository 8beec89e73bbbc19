//! Per-series nonces. A series is an independent counter a maker can bind
//! orders to; advancing it invalidates all of them at once. The epoch check
//! of maker traits reads the same counters.

use {
    crate::{Error, Result, ledger::Ledger},
    alloy_primitives::{Address, U256},
};

/// Largest step a single advance may take.
pub const MAX_ADVANCE: u64 = 255;

/// Advances the series nonce by `amount` and returns the new nonce.
pub fn advance(ledger: &dyn Ledger, maker: Address, series: u64, amount: U256) -> Result<U256> {
    if amount.is_zero() || amount > U256::from(MAX_ADVANCE) {
        return Err(Error::AdvanceNonceFailed);
    }
    let nonce = ledger
        .nonce(maker, series)
        .checked_add(amount)
        .ok_or(Error::AdvanceNonceFailed)?;
    ledger.set_nonce(maker, series, nonce);
    Ok(nonce)
}

pub fn increase(ledger: &dyn Ledger, maker: Address, series: u64) -> Result<U256> {
    advance(ledger, maker, series, U256::from(1))
}

pub fn nonce_equals(ledger: &dyn Ledger, maker: Address, series: u64, nonce: U256) -> bool {
    ledger.nonce(maker, series) == nonce
}

pub use nonce_equals as epoch_equals;
