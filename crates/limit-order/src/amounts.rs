//! Amounts a fill moves.
//!
//! Without a getter in the order's extension the order prices linearly and
//! rounding always favours the maker: a making amount is priced with the
//! taking amount rounded up, a taking amount buys a making amount rounded
//! down. A getter is called with its fixed arguments followed by the known
//! amount as one more word and its first returned word is used as is.

use {
    crate::{
        Error,
        Result,
        blockchain::{StaticContext, return_word},
    },
    alloy_primitives::{U256, U512},
    model::{
        extension::{Extension, Field},
        interaction::Interaction,
        order::{Order, RfqOrder},
        traits::TakerTraits,
    },
    number::U256Ext,
};

/// The amount a taker fixes; the other one is derived from the order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AmountRequest {
    Making(U256),
    Taking(U256),
}

impl AmountRequest {
    pub fn new(amount: U256, is_making_amount: bool) -> Self {
        if is_making_amount {
            Self::Making(amount)
        } else {
            Self::Taking(amount)
        }
    }

    /// Builds a request from a making and a taking amount of which exactly
    /// one must be non-zero.
    pub fn from_parts(making_amount: U256, taking_amount: U256) -> Result<Self> {
        match (making_amount.is_zero(), taking_amount.is_zero()) {
            (false, true) => Ok(Self::Making(making_amount)),
            (true, false) => Ok(Self::Taking(taking_amount)),
            _ => Err(Error::InvalidAmountRequest),
        }
    }
}

/// Making and taking amount of one fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Amounts {
    pub making: U256,
    pub taking: U256,
}

/// Taking amount for a making amount, rounded up.
pub fn linear_taking_amount(
    order_making_amount: U256,
    order_taking_amount: U256,
    making_amount: U256,
) -> Result<U256> {
    making_amount
        .checked_mul_div_ceil(&order_taking_amount, &order_making_amount)
        .ok_or(Error::SwappingAmountTooLow)
}

/// Making amount for a taking amount, rounded down.
pub fn linear_making_amount(
    order_making_amount: U256,
    order_taking_amount: U256,
    taking_amount: U256,
) -> Result<U256> {
    taking_amount
        .checked_mul_div(&order_making_amount, &order_taking_amount)
        .ok_or(Error::SwappingAmountTooLow)
}

pub fn taking_amount(
    context: &dyn StaticContext,
    order: &Order,
    extension: &Extension,
    making_amount: U256,
) -> Result<U256> {
    let getter = extension.get(Field::TakingAmountGetter);
    if getter.is_empty() {
        return linear_taking_amount(order.making_amount, order.taking_amount, making_amount);
    }
    call_getter(context, getter, making_amount)
}

pub fn making_amount(
    context: &dyn StaticContext,
    order: &Order,
    extension: &Extension,
    taking_amount: U256,
) -> Result<U256> {
    let getter = extension.get(Field::MakingAmountGetter);
    if getter.is_empty() {
        return linear_making_amount(order.making_amount, order.taking_amount, taking_amount);
    }
    call_getter(context, getter, taking_amount)
}

fn call_getter(context: &dyn StaticContext, segment: &[u8], amount: U256) -> Result<U256> {
    let getter = Interaction::decode(segment).ok_or(Error::GetAmountCallFailed)?;
    let data = [&getter.data[..], &amount.to_be_bytes::<32>()[..]].concat();
    match context.static_call(getter.target, data.into()) {
        Ok(returned) => return_word(&returned).ok_or(Error::GetAmountCallFailed),
        Err(err) => {
            tracing::debug!(target = %getter.target, %err, "amount getter failed");
            Err(Error::GetAmountCallFailed)
        }
    }
}

/// Amounts of a standard order fill.
///
/// A making amount request is clamped to what remains. A taking amount
/// request whose making amount exceeds what remains is re-priced for the
/// remaining making amount and fails if that costs more than requested. The
/// taker's threshold bounds the rate: a maximum taking amount for `amount`
/// when filling by making amount, a minimum making amount otherwise.
pub fn resolve(
    context: &dyn StaticContext,
    order: &Order,
    extension: &Extension,
    remaining: U256,
    amount: U256,
    taker_traits: &TakerTraits,
) -> Result<Amounts> {
    let threshold = taker_traits.threshold;
    let amounts = if taker_traits.is_making_amount {
        let making = amount.min(remaining);
        let taking = taking_amount(context, order, extension, making)?;
        // taking / making <= threshold / amount
        if !threshold.is_zero()
            && if amount == making {
                taking > threshold
            } else {
                wide_mul(taking, amount) > wide_mul(threshold, making)
            }
        {
            return Err(Error::TakingAmountTooHigh);
        }
        Amounts { making, taking }
    } else {
        let mut taking = amount;
        let mut making = making_amount(context, order, extension, taking)?;
        if making > remaining {
            making = remaining;
            taking = taking_amount(context, order, extension, making)?;
            if taking > amount {
                return Err(Error::TakingAmountExceeded);
            }
        }
        // making / taking >= threshold / amount
        if !threshold.is_zero()
            && if amount == taking {
                making < threshold
            } else {
                wide_mul(making, amount) < wide_mul(threshold, taking)
            }
        {
            return Err(Error::MakingAmountTooLow);
        }
        Amounts { making, taking }
    };

    if !order.maker_traits.allow_partial_fills() && amounts.making != order.making_amount {
        return Err(Error::PartialFillNotAllowed);
    }
    if amounts.making.is_zero() || amounts.taking.is_zero() {
        return Err(Error::ZeroFillAmount);
    }
    Ok(amounts)
}

/// Amounts of an RFQ order fill. RFQ orders fill at most their own amounts
/// and always price linearly.
pub fn resolve_rfq(order: &RfqOrder, request: AmountRequest) -> Result<Amounts> {
    let amounts = match request {
        AmountRequest::Making(making) => {
            if making > order.making_amount {
                return Err(Error::MakingAmountExceeded);
            }
            Amounts {
                making,
                taking: linear_taking_amount(order.making_amount, order.taking_amount, making)?,
            }
        }
        AmountRequest::Taking(taking) => {
            if taking > order.taking_amount {
                return Err(Error::TakingAmountExceeded);
            }
            Amounts {
                making: linear_making_amount(order.making_amount, order.taking_amount, taking)?,
                taking,
            }
        }
    };
    if amounts.making.is_zero() || amounts.taking.is_zero() {
        return Err(Error::ZeroFillAmount);
    }
    Ok(amounts)
}

fn wide_mul(a: U256, b: U256) -> U512 {
    U512::from(a) * U512::from(b)
}

/// Pricing of the dutch auction amount getter: the taking amount for the
/// whole order decays linearly from a start to an end amount over a time
/// window and stays flat outside of it.
pub mod dutch_auction {
    use {
        super::*,
        alloy_primitives::Address,
        alloy_sol_types::SolCall,
        model::abi::IDutchAuctionCalculator,
    };

    /// Packs a window the way the calculator takes it: start time in the high
    /// 128 bits, end time in the low ones.
    pub fn pack_window(start: u64, end: u64) -> U256 {
        (U256::from(start) << 128) | U256::from(end)
    }

    pub fn unpack_window(window: U256) -> (U256, U256) {
        let low = (U256::from(1) << 128) - U256::from(1);
        (window >> 128, window & low)
    }

    /// Taking amount for the whole order at `now`.
    pub fn auction_taking_amount(
        window: U256,
        taking_amount_start: U256,
        taking_amount_end: U256,
        now: u64,
    ) -> Option<U256> {
        let (start, end) = unpack_window(window);
        if start >= end {
            return None;
        }
        let now = U256::from(now).clamp(start, end);
        let weighted = U512::from(taking_amount_start) * U512::from(end - now)
            + U512::from(taking_amount_end) * U512::from(now - start);
        let limbs = (weighted / U512::from(end - start)).into_limbs();
        limbs[4..]
            .iter()
            .all(|limb| *limb == 0)
            .then(|| U256::from_limbs_slice(&limbs[..4]))
    }

    /// Taking amount for `requested_making_amount` at `now`, rounded up.
    pub fn taking_amount(
        window: U256,
        taking_amount_start: U256,
        taking_amount_end: U256,
        making_amount: U256,
        requested_making_amount: U256,
        now: u64,
    ) -> Option<U256> {
        let auction = auction_taking_amount(window, taking_amount_start, taking_amount_end, now)?;
        requested_making_amount.checked_mul_div_ceil(&auction, &making_amount)
    }

    /// Making amount for `requested_taking_amount` at `now`, rounded down.
    pub fn making_amount(
        window: U256,
        taking_amount_start: U256,
        taking_amount_end: U256,
        making_amount: U256,
        requested_taking_amount: U256,
        now: u64,
    ) -> Option<U256> {
        let auction = auction_taking_amount(window, taking_amount_start, taking_amount_end, now)?;
        requested_taking_amount.checked_mul_div(&making_amount, &auction)
    }

    /// Extension getter segment pricing taking amounts through a deployed
    /// calculator. The engine appends the requested making amount.
    pub fn taking_amount_getter(
        calculator: Address,
        window: U256,
        taking_amount_start: U256,
        taking_amount_end: U256,
        making_amount: U256,
    ) -> Interaction {
        let call = IDutchAuctionCalculator::getTakingAmountCall {
            startTimeEndTime: window,
            takingAmountStart: taking_amount_start,
            takingAmountEnd: taking_amount_end,
            makingAmount: making_amount,
            requestedMakingAmount: U256::ZERO,
        };
        Interaction::new(calculator, without_last_word(call.abi_encode()))
    }

    /// Extension getter segment pricing making amounts through a deployed
    /// calculator. The engine appends the requested taking amount.
    pub fn making_amount_getter(
        calculator: Address,
        window: U256,
        taking_amount_start: U256,
        taking_amount_end: U256,
        making_amount: U256,
    ) -> Interaction {
        let call = IDutchAuctionCalculator::getMakingAmountCall {
            startTimeEndTime: window,
            takingAmountStart: taking_amount_start,
            takingAmountEnd: taking_amount_end,
            makingAmount: making_amount,
            requestedTakingAmount: U256::ZERO,
        };
        Interaction::new(calculator, without_last_word(call.abi_encode()))
    }

    fn without_last_word(mut calldata: Vec<u8>) -> Vec<u8> {
        calldata.truncate(calldata.len().saturating_sub(32));
        calldata
    }
}
