//! Contract code to deploy on the test chain.

use {
    crate::chain::{Call, revert},
    alloy_primitives::{Address, Bytes, U256},
    alloy_sol_types::SolCall,
    limit_order::{Blockchain, Revert, amounts::dutch_auction},
    model::{
        abi::{
            EIP1271_MAGIC_VALUE,
            IDutchAuctionCalculator::{getMakingAmountCall, getTakingAmountCall},
            IERC1271,
        },
        signature,
    },
};

fn word(value: U256) -> Bytes {
    value.to_be_bytes::<32>().to_vec().into()
}

/// Dutch auction amount getter pricing against the chain's clock.
pub fn dutch_auction_calculator() -> impl Fn(&Call) -> Result<Bytes, Revert> + Send + Sync {
    |call| {
        let now = call.chain.timestamp();
        let amount = if let Ok(getter) = getTakingAmountCall::abi_decode(&call.data) {
            dutch_auction::taking_amount(
                getter.startTimeEndTime,
                getter.takingAmountStart,
                getter.takingAmountEnd,
                getter.makingAmount,
                getter.requestedMakingAmount,
                now,
            )
        } else if let Ok(getter) = getMakingAmountCall::abi_decode(&call.data) {
            dutch_auction::making_amount(
                getter.startTimeEndTime,
                getter.takingAmountStart,
                getter.takingAmountEnd,
                getter.makingAmount,
                getter.requestedTakingAmount,
                now,
            )
        } else {
            return Err(revert("unknown selector"));
        };
        amount.map(word).ok_or_else(|| revert("auction cannot price"))
    }
}

/// Smart contract wallet accepting whatever `owner` signs.
pub fn wallet(owner: Address) -> impl Fn(&Call) -> Result<Bytes, Revert> + Send + Sync {
    move |call| {
        let check = IERC1271::isValidSignatureCall::abi_decode(&call.data)
            .map_err(|_| revert("unknown selector"))?;
        if signature::recover(&check.hash, &check.signature).ok() != Some(owner) {
            return Ok(Bytes::from(vec![0; 32]));
        }
        let mut magic = [0; 32];
        magic[..4].copy_from_slice(&EIP1271_MAGIC_VALUE);
        Ok(magic.to_vec().into())
    }
}

/// A contract answering every call with `value`.
pub fn constant(value: U256) -> impl Fn(&Call) -> Result<Bytes, Revert> + Send + Sync {
    move |_| Ok(word(value))
}
