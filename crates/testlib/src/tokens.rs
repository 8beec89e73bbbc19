//! Token contracts of the test chain and the addresses they are deployed at.

use {
    crate::chain::{TestChain, revert},
    alloy_primitives::{Address, B256, Bytes, U256, keccak256},
    alloy_sol_types::{SolCall, SolValue},
    hex_literal::hex,
    limit_order::{Blockchain, Revert},
    model::{
        abi::{IERC20, IPermit2, IWETH},
        signature::EcdsaSignature,
    },
};

/// Wrapped native token.
pub const WETH: Address = Address::new(hex!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"));

/// Canonical Permit2 deployment.
pub const PERMIT2: Address = Address::new(hex!("000000000022d473030f116ddee9f6b43ac78ba3"));

pub const DAI: Address = Address::new(hex!("6b175474e89094c44da98b954eedeac495271d0f"));

pub const USDC: Address = Address::new(hex!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));

fn word(value: U256) -> Bytes {
    value.to_be_bytes::<32>().to_vec().into()
}

fn success() -> Bytes {
    word(U256::from(1))
}

fn decode<C: SolCall>(data: &[u8]) -> Result<C, Revert> {
    C::abi_decode(data).map_err(|_| revert("bad calldata"))
}

fn selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4)?.try_into().ok()
}

fn mutable(is_static: bool) -> Result<(), Revert> {
    if is_static {
        return Err(revert("state change in static call"));
    }
    Ok(())
}

/// The digest an owner signs to permit a spender, a simplified EIP-2612.
pub fn permit_digest(
    token: Address,
    owner: Address,
    spender: Address,
    value: U256,
    deadline: U256,
) -> B256 {
    keccak256((token, owner, spender, value, deadline).abi_encode())
}

fn move_balance(
    chain: &TestChain,
    token: Address,
    from: Address,
    to: Address,
    amount: U256,
) -> Result<(), Revert> {
    chain.with_state(|state| {
        let balance = state.balances.entry((token, from)).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or_else(|| revert("insufficient balance"))?;
        *state.balances.entry((token, to)).or_default() += amount;
        Ok(())
    })
}

fn spend_allowance(
    chain: &TestChain,
    token: Address,
    owner: Address,
    spender: Address,
    amount: U256,
) -> Result<(), Revert> {
    if owner == spender {
        return Ok(());
    }
    chain.with_state(|state| {
        let allowance = state.allowances.entry((token, owner, spender)).or_default();
        if *allowance != U256::MAX {
            *allowance = allowance
                .checked_sub(amount)
                .ok_or_else(|| revert("insufficient allowance"))?;
        }
        Ok(())
    })
}

pub(crate) fn erc20(
    chain: &TestChain,
    sender: Address,
    token: Address,
    data: &[u8],
    is_static: bool,
) -> Result<Bytes, Revert> {
    let selector = selector(data).ok_or_else(|| revert("missing selector"))?;
    if selector == IERC20::balanceOfCall::SELECTOR {
        let call = decode::<IERC20::balanceOfCall>(data)?;
        return Ok(word(chain.balance_of(token, call.account)));
    }

    mutable(is_static)?;
    if selector == IERC20::transferFromCall::SELECTOR {
        // Calldata suffixes are ignored.
        let end = data.len().min(4 + 3 * 32);
        let call = decode::<IERC20::transferFromCall>(&data[..end])?;
        spend_allowance(chain, token, call.from, sender, call.amount)?;
        move_balance(chain, token, call.from, call.to, call.amount)?;
        Ok(success())
    } else if selector == IERC20::transferCall::SELECTOR {
        let call = decode::<IERC20::transferCall>(data)?;
        move_balance(chain, token, sender, call.to, call.amount)?;
        Ok(success())
    } else if selector == IERC20::approveCall::SELECTOR {
        let call = decode::<IERC20::approveCall>(data)?;
        chain.approve(token, sender, call.spender, call.amount);
        Ok(success())
    } else if selector == IERC20::permitCall::SELECTOR {
        let call = decode::<IERC20::permitCall>(data)?;
        if call.deadline < U256::from(chain.timestamp()) {
            return Err(revert("permit expired"));
        }
        let digest = permit_digest(token, call.owner, call.spender, call.value, call.deadline);
        let signature = EcdsaSignature {
            r: call.r,
            s: call.s,
            v: call.v,
        };
        if signature.recover(&digest).ok() != Some(call.owner) {
            return Err(revert("invalid permit"));
        }
        chain.approve(token, call.owner, call.spender, call.value);
        Ok(Bytes::new())
    } else {
        Err(revert("unknown selector"))
    }
}

/// An ERC-20 whose tokens can be withdrawn as the native token.
pub(crate) fn weth(
    chain: &TestChain,
    sender: Address,
    weth: Address,
    data: &[u8],
    is_static: bool,
) -> Result<Bytes, Revert> {
    if selector(data) != Some(IWETH::withdrawCall::SELECTOR) {
        return erc20(chain, sender, weth, data, is_static);
    }
    mutable(is_static)?;
    let call = decode::<IWETH::withdrawCall>(data)?;
    chain.with_state(|state| {
        let balance = state.balances.entry((weth, sender)).or_default();
        *balance = balance
            .checked_sub(call.amount)
            .ok_or_else(|| revert("insufficient balance"))?;
        *state.native.entry(sender).or_default() += call.amount;
        Ok(Bytes::new())
    })
}

/// Permit2's allowance transfer: the owner approves Permit2 on the token and
/// the spender on Permit2.
pub(crate) fn permit2(
    chain: &TestChain,
    sender: Address,
    data: &[u8],
    is_static: bool,
) -> Result<Bytes, Revert> {
    mutable(is_static)?;
    let call = decode::<IPermit2::transferFromCall>(data)?;
    let amount = U256::from(call.amount);
    chain.with_state(|state| {
        let allowance = state
            .permit2_allowances
            .entry((call.from, call.token, sender))
            .or_default();
        *allowance = allowance
            .checked_sub(amount)
            .ok_or_else(|| revert("insufficient permit2 allowance"))?;
        Ok::<_, Revert>(())
    })?;
    spend_allowance(chain, call.token, call.from, PERMIT2, amount)?;
    move_balance(chain, call.token, call.from, call.to, amount)?;
    Ok(Bytes::new())
}
