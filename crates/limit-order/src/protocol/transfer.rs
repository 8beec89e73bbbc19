//! Calls the protocol makes into tokens, permits and hooks.

use {
    super::Protocol,
    crate::{Error, Result, blockchain::return_word, error::Revert},
    alloy_primitives::{Address, B256, Bytes, U256, aliases::U160},
    alloy_sol_types::SolCall,
    model::{
        abi::{IERC20, IPermit2, IPostInteraction, IPreInteraction, ITakerInteraction, IWETH},
        interaction::Interaction,
        order::Order,
    },
    tracing::warn,
};

/// What every hook is told about the fill it runs in.
pub(super) struct Hook<'a> {
    pub order: &'a Order,
    pub extension: &'a [u8],
    pub order_hash: B256,
    pub taker: Address,
    pub making_amount: U256,
    pub taking_amount: U256,
    /// Remaining making amount before the fill.
    pub remaining: U256,
}

impl Hook<'_> {
    fn pre_interaction(&self, extra_data: Bytes) -> Vec<u8> {
        IPreInteraction::preInteractionCall {
            order: self.order.to_sol(),
            extension: Bytes::copy_from_slice(self.extension),
            orderHash: self.order_hash,
            taker: self.taker,
            makingAmount: self.making_amount,
            takingAmount: self.taking_amount,
            remainingMakingAmount: self.remaining,
            extraData: extra_data,
        }
        .abi_encode()
    }

    fn post_interaction(&self, extra_data: Bytes) -> Vec<u8> {
        IPostInteraction::postInteractionCall {
            order: self.order.to_sol(),
            extension: Bytes::copy_from_slice(self.extension),
            orderHash: self.order_hash,
            taker: self.taker,
            makingAmount: self.making_amount,
            takingAmount: self.taking_amount,
            remainingMakingAmount: self.remaining,
            extraData: extra_data,
        }
        .abi_encode()
    }

    fn taker_interaction(&self, extra_data: Bytes) -> Vec<u8> {
        ITakerInteraction::takerInteractionCall {
            order: self.order.to_sol(),
            extension: Bytes::copy_from_slice(self.extension),
            orderHash: self.order_hash,
            taker: self.taker,
            makingAmount: self.making_amount,
            takingAmount: self.taking_amount,
            remainingMakingAmount: self.remaining,
            extraData: extra_data,
        }
        .abi_encode()
    }
}

/// Target of a maker hook segment. Without a target of its own the hook
/// calls the maker and the whole segment is extra data.
fn maker_hook(order: &Order, segment: &[u8]) -> Interaction {
    Interaction::decode(segment).unwrap_or_else(|| Interaction::new(order.maker, segment.to_vec()))
}

impl Protocol {
    fn call(&self, target: Address, data: impl Into<Bytes>, value: U256) -> Result<Bytes, Revert> {
        self.chain
            .call(self.contracts.protocol, target, data.into(), value)
    }

    /// Moves `amount` of `token` with the protocol as spender. Tokens may
    /// return nothing instead of `true`. Permit2 transfers are limited to
    /// 160 bit amounts.
    pub(super) fn transfer_from(
        &self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
        suffix: &[u8],
        use_permit2: bool,
    ) -> bool {
        if use_permit2 {
            if !(amount >> 160usize).is_zero() {
                return false;
            }
            let amount = amount.to::<U160>();
            let call = IPermit2::transferFromCall {
                from,
                to,
                amount,
                token,
            };
            return self.call(self.contracts.permit2, call.abi_encode(), U256::ZERO).is_ok();
        }

        let call = IERC20::transferFromCall { from, to, amount };
        let data = [call.abi_encode().as_slice(), suffix].concat();
        match self.call(token, data, U256::ZERO) {
            Ok(returned) if returned.is_empty() => self.chain.is_contract(token),
            Ok(returned) => return_word(&returned) == Some(U256::from(1)),
            Err(err) => {
                tracing::debug!(%token, %from, %to, %err, "transferFrom failed");
                false
            }
        }
    }

    /// Unwraps WETH the protocol holds and sends the native token on.
    pub(super) fn unwrap_weth(&self, to: Address, amount: U256) -> Result<()> {
        let withdraw = IWETH::withdrawCall { amount };
        self.call(self.contracts.weth, withdraw.abi_encode(), U256::ZERO)
            .and_then(|_| self.call(to, Bytes::new(), amount))
            .map(|_| ())
            .map_err(|err| {
                tracing::debug!(%to, %err, "unwrap failed");
                Error::UnwrapFailed
            })
    }

    /// Calls `permit` on the token a segment starts with, completing the
    /// call with `owner` and the protocol as spender.
    fn permit(&self, owner: Address, segment: &[u8]) -> Result<(), Revert> {
        let permit = Interaction::decode(segment).ok_or_else(Revert::default)?;
        let data = [
            IERC20::permitCall::SELECTOR.as_slice(),
            owner.into_word().as_slice(),
            self.contracts.protocol.into_word().as_slice(),
            &permit.data,
        ]
        .concat();
        self.call(permit.target, data, U256::ZERO).map(|_| ())
    }

    /// Runs the maker's permit. A failing permit is skipped, the transfer
    /// that follows decides whether the fill goes through.
    pub(super) fn maker_permit(&self, maker: Address, segment: &[u8]) {
        let ledger = self.ledger.snapshot();
        let chain = self.chain.snapshot();
        match self.permit(maker, segment) {
            Ok(()) => {
                self.ledger.commit(ledger);
                self.chain.commit(chain);
            }
            Err(err) => {
                warn!(%maker, %err, "maker permit failed");
                self.ledger.revert_to(ledger);
                self.chain.revert_to(chain);
            }
        }
    }

    pub(super) fn taker_permit(&self, taker: Address, segment: &[u8]) -> Result<()> {
        self.permit(taker, segment).map_err(|err| {
            tracing::debug!(%taker, %err, "taker permit failed");
            Error::PermitFailed
        })
    }

    pub(super) fn pre_interaction(&self, hook: &Hook, segment: &[u8]) -> Result<()> {
        let interaction = maker_hook(hook.order, segment);
        self.call(
            interaction.target,
            hook.pre_interaction(interaction.data),
            U256::ZERO,
        )
        .map(|_| ())
        .map_err(Error::InteractionFailed)
    }

    pub(super) fn post_interaction(&self, hook: &Hook, segment: &[u8]) -> Result<()> {
        let interaction = maker_hook(hook.order, segment);
        self.call(
            interaction.target,
            hook.post_interaction(interaction.data),
            U256::ZERO,
        )
        .map(|_| ())
        .map_err(Error::InteractionFailed)
    }

    pub(super) fn taker_interaction(&self, hook: &Hook, segment: &[u8]) -> Result<()> {
        let interaction = Interaction::decode(segment).ok_or(Error::MalformedArgs)?;
        self.call(
            interaction.target,
            hook.taker_interaction(interaction.data),
            U256::ZERO,
        )
        .map(|_| ())
        .map_err(Error::InteractionFailed)
    }
}
