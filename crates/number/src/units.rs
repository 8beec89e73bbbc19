//! Token amounts written in whole units.

use alloy_primitives::U256;

pub trait EthUnit: Sized {
    /// The amount in the token's smallest unit.
    fn wei(self) -> U256;

    /// The amount of whole tokens of a token with `decimals` decimals.
    fn units(self, decimals: u8) -> U256 {
        self.wei() * U256::from(10).pow(U256::from(decimals))
    }

    /// Whole USDC-like tokens, 6 decimals.
    fn mwei(self) -> U256 {
        self.units(6)
    }

    fn gwei(self) -> U256 {
        self.units(9)
    }

    /// Whole ether-like tokens, 18 decimals.
    fn eth(self) -> U256 {
        self.units(18)
    }
}

impl EthUnit for u64 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}

impl EthUnit for u128 {
    fn wei(self) -> U256 {
        U256::from(self)
    }
}
