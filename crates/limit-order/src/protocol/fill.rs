//! Standard order fills.

use {
    super::{Fill, Protocol, TakerArgs, transfer::Hook},
    crate::{
        Error,
        Result,
        amounts::{self, Amounts},
        blockchain::StaticContext,
        events::Event,
        invalidators::{RemainingInvalidator, bit, series},
        predicate,
        signature,
    },
    alloy_primitives::{Address, B256, U256},
    model::{extension::Field, order::Order, signature::CompactSignature, traits::TakerTraits},
    tracing::{debug, info, instrument},
};

impl Protocol {
    /// Fills an order signed by an externally owned account with a compact
    /// signature.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    pub fn fill_order(
        &self,
        sender: Address,
        order: &Order,
        r: B256,
        vs: B256,
        amount: U256,
        taker_traits: TakerTraits,
    ) -> Result<Fill> {
        let signature = CompactSignature { r, vs }.to_bytes();
        self.transact(|| self.fill_with_args(sender, order, &signature, amount, taker_traits, &[]))
    }

    /// [`Self::fill_order`] with taker args.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    #[allow(clippy::too_many_arguments)]
    pub fn fill_order_args(
        &self,
        sender: Address,
        order: &Order,
        r: B256,
        vs: B256,
        amount: U256,
        taker_traits: TakerTraits,
        args: &[u8],
    ) -> Result<Fill> {
        let signature = CompactSignature { r, vs }.to_bytes();
        self.transact(|| self.fill_with_args(sender, order, &signature, amount, taker_traits, args))
    }

    /// Fills an order with arbitrary signature bytes, typically one of a
    /// smart contract maker.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    pub fn fill_contract_order(
        &self,
        sender: Address,
        order: &Order,
        signature: &[u8],
        amount: U256,
        taker_traits: TakerTraits,
    ) -> Result<Fill> {
        self.transact(|| self.fill_with_args(sender, order, signature, amount, taker_traits, &[]))
    }

    /// [`Protocol::fill_contract_order`] with taker args.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    pub fn fill_contract_order_args(
        &self,
        sender: Address,
        order: &Order,
        signature: &[u8],
        amount: U256,
        taker_traits: TakerTraits,
        args: &[u8],
    ) -> Result<Fill> {
        self.transact(|| self.fill_with_args(sender, order, signature, amount, taker_traits, args))
    }

    /// Runs the taker's permit for the taker asset, a token address followed
    /// by the permit arguments after owner and spender, then fills.
    #[instrument(skip_all, fields(taker = %sender, maker = %order.maker))]
    #[allow(clippy::too_many_arguments)]
    pub fn fill_order_to_with_permit(
        &self,
        sender: Address,
        order: &Order,
        r: B256,
        vs: B256,
        amount: U256,
        taker_traits: TakerTraits,
        args: &[u8],
        permit: &[u8],
    ) -> Result<Fill> {
        let signature = CompactSignature { r, vs }.to_bytes();
        self.transact(|| {
            self.taker_permit(sender, permit)?;
            self.fill_with_args(sender, order, &signature, amount, taker_traits, args)
        })
    }

    fn fill_with_args(
        &self,
        sender: Address,
        order: &Order,
        signature: &[u8],
        amount: U256,
        taker_traits: TakerTraits,
        args: &[u8],
    ) -> Result<Fill> {
        let args = TakerArgs::parse(&taker_traits, args)?;
        self.fill(sender, order, signature, amount, taker_traits, args)
    }

    fn fill(
        &self,
        sender: Address,
        order: &Order,
        signature: &[u8],
        amount: U256,
        taker_traits: TakerTraits,
        args: TakerArgs,
    ) -> Result<Fill> {
        let maker = order.maker;
        let maker_traits = order.maker_traits;
        let order_hash = order.hash(&self.domain);

        if sender != maker && !signature::is_valid(self, maker, &order_hash, signature) {
            return Err(Error::BadSignature);
        }
        debug!(%order_hash, "authenticated");

        if !maker_traits.is_allowed_sender(&sender) {
            return Err(Error::PrivateOrder);
        }
        if maker_traits.is_expired(self.timestamp()) {
            return Err(Error::OrderExpired);
        }
        if maker_traits.need_check_epoch_manager {
            if maker_traits.use_bit_invalidator() {
                return Err(Error::EpochManagerAndBitInvalidatorsAreIncompatible);
            }
            let epoch = U256::from(maker_traits.nonce_or_epoch);
            if !series::epoch_equals(self.ledger(), maker, maker_traits.series, epoch) {
                return Err(Error::WrongSeriesNonce);
            }
        }
        let extension = order.validate_extension(args.extension)?;
        let condition = extension.get(Field::Predicate);
        if !condition.is_empty() && !predicate::check(condition, self)? {
            return Err(Error::PredicateIsNotTrue);
        }
        debug!(%order_hash, "constraints checked");

        let remaining = if maker_traits.use_bit_invalidator() {
            order.making_amount
        } else {
            RemainingInvalidator::load(self.ledger(), maker, order_hash)
                .remaining_or(order.making_amount)
        };
        if remaining.is_zero() {
            return Err(Error::RemainingAmountIsZero);
        }
        let Amounts {
            making: making_amount,
            taking: taking_amount,
        } = amounts::resolve(self, order, &extension, remaining, amount, &taker_traits)?;
        debug!(%order_hash, %making_amount, %taking_amount, "amounts resolved");

        // Invalidate before calling out so that reentrant fills see the fill.
        let left = if maker_traits.use_bit_invalidator() {
            let nonce = U256::from(maker_traits.nonce_or_epoch);
            bit::check_and_invalidate(self.ledger(), maker, nonce)?;
            U256::ZERO
        } else {
            RemainingInvalidator::remains(remaining, making_amount).store(
                self.ledger(),
                maker,
                order_hash,
            );
            remaining - making_amount
        };

        let hook = Hook {
            order,
            extension: args.extension,
            order_hash,
            taker: sender,
            making_amount,
            taking_amount,
            remaining,
        };

        let permit = extension.get(Field::MakerPermit);
        if !taker_traits.skip_maker_permit && !permit.is_empty() && remaining == order.making_amount
        {
            self.maker_permit(maker, permit);
        }

        let pre_interaction = extension.get(Field::PreInteraction);
        if maker_traits.pre_interaction_call || !pre_interaction.is_empty() {
            self.pre_interaction(&hook, pre_interaction)?;
            debug!(%order_hash, "pre-interaction run");
        }

        let target = args.target.unwrap_or(sender);
        if taker_traits.unwrap_weth {
            if order.maker_asset != self.contracts.weth {
                return Err(Error::UnwrapFailed);
            }
            if !self.transfer_from(
                order.maker_asset,
                maker,
                self.contracts.protocol,
                making_amount,
                extension.get(Field::MakerAssetSuffix),
                maker_traits.use_permit2,
            ) {
                return Err(Error::TransferFromMakerToTakerFailed);
            }
            self.unwrap_weth(target, making_amount)?;
        } else if !self.transfer_from(
            order.maker_asset,
            maker,
            target,
            making_amount,
            extension.get(Field::MakerAssetSuffix),
            maker_traits.use_permit2,
        ) {
            return Err(Error::TransferFromMakerToTakerFailed);
        }

        if !args.interaction.is_empty() {
            self.taker_interaction(&hook, args.interaction)?;
            debug!(%order_hash, "taker interaction run");
        }

        let receiver = order.receiver_or_maker();
        if maker_traits.unwrap_weth {
            if order.taker_asset != self.contracts.weth {
                return Err(Error::UnwrapFailed);
            }
            if !self.transfer_from(
                order.taker_asset,
                sender,
                self.contracts.protocol,
                taking_amount,
                extension.get(Field::TakerAssetSuffix),
                taker_traits.use_permit2,
            ) {
                return Err(Error::TransferFromTakerToMakerFailed);
            }
            self.unwrap_weth(receiver, taking_amount)?;
        } else if !self.transfer_from(
            order.taker_asset,
            sender,
            receiver,
            taking_amount,
            extension.get(Field::TakerAssetSuffix),
            taker_traits.use_permit2,
        ) {
            return Err(Error::TransferFromTakerToMakerFailed);
        }
        debug!(%order_hash, "assets transferred");

        let post_interaction = extension.get(Field::PostInteraction);
        if maker_traits.post_interaction_call || !post_interaction.is_empty() {
            self.post_interaction(&hook, post_interaction)?;
            debug!(%order_hash, "post-interaction run");
        }

        self.chain.emit(Event::OrderFilled {
            order_hash,
            making_amount,
            taking_amount,
            remaining: left,
        });
        info!(%order_hash, %making_amount, %taking_amount, remaining = %left, "order filled");

        Ok(Fill {
            making_amount,
            taking_amount,
            order_hash,
        })
    }
}
