use {
    crate::{Error, Result, ledger::Ledger},
    alloy_primitives::{Address, U256},
};

/// Slot and single bit mask a nonce selects in a maker's bitmap.
pub fn position(nonce: U256) -> (U256, U256) {
    let slot = nonce >> 8;
    let bit = U256::from(1) << (nonce.as_limbs()[0] & 0xff) as usize;
    (slot, bit)
}

pub fn is_invalidated(ledger: &dyn Ledger, maker: Address, nonce: U256) -> bool {
    let (slot, bit) = position(nonce);
    !(ledger.bit_invalidator(maker, slot) & bit).is_zero()
}

/// Sets the nonce's bit, failing if it is already set.
pub fn check_and_invalidate(ledger: &dyn Ledger, maker: Address, nonce: U256) -> Result<()> {
    let (slot, bit) = position(nonce);
    let word = ledger.bit_invalidator(maker, slot);
    if !(word & bit).is_zero() {
        return Err(Error::InvalidatedOrder);
    }
    ledger.set_bit_invalidator(maker, slot, word | bit);
    Ok(())
}

/// Sets the nonce's bit together with every bit of `additional_mask` in the
/// same slot. Returns the slot and its new value.
pub fn mass_invalidate(
    ledger: &dyn Ledger,
    maker: Address,
    nonce: U256,
    additional_mask: U256,
) -> (U256, U256) {
    let (slot, bit) = position(nonce);
    let word = ledger.bit_invalidator(maker, slot) | bit | additional_mask;
    ledger.set_bit_invalidator(maker, slot, word);
    (slot, word)
}
