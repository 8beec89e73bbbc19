//! RFQ order fills. RFQ orders fill once, price linearly and carry neither an
//! extension nor hooks.

use {
    super::{Fill, Protocol},
    crate::{
        Error,
        Result,
        amounts::{self, AmountRequest, Amounts},
        blockchain::StaticContext,
        events::Event,
        invalidators::bit,
        signature,
    },
    alloy_primitives::{Address, B256, U256},
    model::{
        order::{RfqFlags, RfqOrder},
        signature::CompactSignature,
    },
    tracing::{debug, info, instrument},
};

impl Protocol {
    /// Fills an RFQ order for `amount`, a making or a taking amount as the
    /// flags say.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    pub fn fill_order_rfq(
        &self,
        sender: Address,
        order: &RfqOrder,
        signature: &[u8],
        amount: U256,
        flags: RfqFlags,
    ) -> Result<Fill> {
        let request = AmountRequest::new(amount, flags.is_making_amount);
        self.transact(|| {
            self.fill_rfq(sender, order, signature, request, flags.unwrap_weth, sender)
        })
    }

    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    pub fn fill_order_rfq_compact(
        &self,
        sender: Address,
        order: &RfqOrder,
        r: B256,
        vs: B256,
        amount: U256,
        flags: RfqFlags,
    ) -> Result<Fill> {
        let signature = CompactSignature { r, vs }.to_bytes();
        let request = AmountRequest::new(amount, flags.is_making_amount);
        self.transact(|| {
            self.fill_rfq(sender, order, &signature, request, flags.unwrap_weth, sender)
        })
    }

    /// Runs the taker's permit, then fills for exactly one non-zero amount
    /// sending the maker asset to `target`.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker, %target))]
    #[allow(clippy::too_many_arguments)]
    pub fn fill_order_rfq_to_with_permit(
        &self,
        sender: Address,
        order: &RfqOrder,
        signature: &[u8],
        making_amount: U256,
        taking_amount: U256,
        target: Address,
        permit: &[u8],
    ) -> Result<Fill> {
        self.transact(|| {
            let request = AmountRequest::from_parts(making_amount, taking_amount)?;
            self.taker_permit(sender, permit)?;
            self.fill_rfq(sender, order, signature, request, false, target)
        })
    }

    fn fill_rfq(
        &self,
        sender: Address,
        order: &RfqOrder,
        signature: &[u8],
        request: AmountRequest,
        unwrap_weth: bool,
        target: Address,
    ) -> Result<Fill> {
        let maker = order.maker;
        let order_hash = order.hash(&self.domain);

        if sender != maker && !signature::is_valid(self, maker, &order_hash, signature) {
            return Err(Error::BadSignature);
        }
        if !order.is_allowed_sender(&sender) {
            return Err(Error::PrivateOrder);
        }
        if order.maker_traits.is_expired(self.timestamp()) {
            return Err(Error::OrderExpired);
        }
        bit::check_and_invalidate(self.ledger(), maker, order.salt)?;
        debug!(%order_hash, slot = %order.invalidator_slot(), "RFQ order invalidated");

        let Amounts {
            making: making_amount,
            taking: taking_amount,
        } = amounts::resolve_rfq(order, request)?;

        if unwrap_weth {
            if order.maker_asset != self.contracts.weth {
                return Err(Error::UnwrapFailed);
            }
            if !self.transfer_from(
                order.maker_asset,
                maker,
                self.contracts.protocol,
                making_amount,
                &[],
                order.maker_traits.use_permit2,
            ) {
                return Err(Error::TransferFromMakerToTakerFailed);
            }
            self.unwrap_weth(target, making_amount)?;
        } else if !self.transfer_from(
            order.maker_asset,
            maker,
            target,
            making_amount,
            &[],
            order.maker_traits.use_permit2,
        ) {
            return Err(Error::TransferFromMakerToTakerFailed);
        }
        let receiver = order.receiver_or_maker();
        if order.maker_traits.unwrap_weth {
            if order.taker_asset != self.contracts.weth {
                return Err(Error::UnwrapFailed);
            }
            if !self.transfer_from(
                order.taker_asset,
                sender,
                self.contracts.protocol,
                taking_amount,
                &[],
                false,
            ) {
                return Err(Error::TransferFromTakerToMakerFailed);
            }
            self.unwrap_weth(receiver, taking_amount)?;
        } else if !self.transfer_from(
            order.taker_asset,
            sender,
            receiver,
            taking_amount,
            &[],
            false,
        ) {
            return Err(Error::TransferFromTakerToMakerFailed);
        }

        self.chain.emit(Event::OrderFilledRfq {
            order_hash,
            making_amount,
            taking_amount,
        });
        info!(%order_hash, %making_amount, %taking_amount, "RFQ order filled");

        Ok(Fill {
            making_amount,
            taking_amount,
            order_hash,
        })
    }
}
