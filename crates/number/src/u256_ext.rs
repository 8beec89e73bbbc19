//! Extension trait for U256 arithmetic operations.

use alloy_primitives::{U256, U512};

/// Extension trait for U256 to add utility methods.
pub trait U256Ext: Sized {
    /// Ceiling division: (self + other - 1) / other
    fn checked_ceil_div(&self, other: &Self) -> Option<Self>;

    /// Computes `self * q / d` rounding down.
    ///
    /// Returns `None` if `d` is `0` or if the result overflows a 256-bit
    /// integer. The intermediate product never overflows.
    fn checked_mul_div(&self, q: &Self, d: &Self) -> Option<Self>;

    /// Computes `self * q / d` rounding up.
    ///
    /// Returns `None` if `d` is `0` or if the result overflows a 256-bit
    /// integer.
    fn checked_mul_div_ceil(&self, q: &Self, d: &Self) -> Option<Self>;
}

impl U256Ext for U256 {
    fn checked_ceil_div(&self, other: &Self) -> Option<Self> {
        if other.is_zero() {
            return None;
        }
        let (div, rem) = self.div_rem(*other);
        div.checked_add(U256::from(!rem.is_zero()))
    }

    fn checked_mul_div(&self, q: &Self, d: &Self) -> Option<Self> {
        if d.is_zero() {
            return None;
        }

        // fast path when math in U256 doesn't overflow
        if let Some(res) = self.checked_mul(*q) {
            return Some(res / *d);
        }

        let div = (U512::from(*self) * U512::from(*q)) / U512::from(*d);
        narrow(div)
    }

    fn checked_mul_div_ceil(&self, q: &Self, d: &Self) -> Option<Self> {
        if d.is_zero() {
            return None;
        }

        // fast path when math in U256 doesn't overflow
        if let Some(p) = self.checked_mul(*q) {
            let (div, rem) = p.div_rem(*d);
            return div.checked_add(U256::from(!rem.is_zero()));
        }

        let p = U512::from(*self) * U512::from(*q);
        let (div, rem) = p.div_rem(U512::from(*d));
        narrow(div)?.checked_add(U256::from(!rem.is_zero()))
    }
}

fn narrow(value: U512) -> Option<U256> {
    let limbs = value.into_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return None;
    }
    Some(U256::from_limbs_slice(&limbs[..4]))
}
