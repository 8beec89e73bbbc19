//! The protocol contract: fill entrypoints, order management and views over a
//! [`Ledger`] and a [`Blockchain`] host.
//!
//! Every state changing entrypoint runs as one transaction. It either
//! completes or leaves the ledger and the host exactly as it found them.
//! Hooks and tokens the engine calls may call back into it; the nested call
//! sees all state written so far.

mod args;
mod fill;
mod rfq;
mod transfer;

pub use args::TakerArgs;
use {
    crate::{
        Error,
        Result,
        blockchain::{Blockchain, StaticContext},
        error::Revert,
        events::Event,
        invalidators::{RemainingInvalidator, bit, series},
        ledger::Ledger,
        predicate,
    },
    alloy_primitives::{Address, B256, Bytes, U256},
    model::{
        DomainSeparator,
        order::{Order, RfqOrder},
        traits::MakerTraits,
    },
    std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    tracing::{info, instrument},
};

/// Addresses the protocol works with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Contracts {
    /// The protocol itself: spender of maker and taker assets and sender of
    /// every call it makes.
    pub protocol: Address,
    pub weth: Address,
    pub permit2: Address,
}

/// Outcome of a successful fill.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Fill {
    pub making_amount: U256,
    pub taking_amount: U256,
    pub order_hash: B256,
}

pub struct Protocol {
    contracts: Contracts,
    domain: DomainSeparator,
    ledger: Arc<dyn Ledger>,
    chain: Arc<dyn Blockchain>,
    /// Number of read only calls the protocol is currently inside of.
    static_depth: AtomicUsize,
}

impl Protocol {
    pub fn new(
        contracts: Contracts,
        domain: DomainSeparator,
        ledger: Arc<dyn Ledger>,
        chain: Arc<dyn Blockchain>,
    ) -> Self {
        Self {
            contracts,
            domain,
            ledger,
            chain,
            static_depth: AtomicUsize::new(0),
        }
    }

    pub fn contracts(&self) -> &Contracts {
        &self.contracts
    }

    /// Runs a state changing call, undoing all of its effects if it fails.
    fn transact<T>(&self, call: impl FnOnce() -> Result<T>) -> Result<T> {
        if self.static_depth.load(Ordering::SeqCst) > 0 {
            return Err(Error::StaticCallViolation);
        }
        let ledger = self.ledger.snapshot();
        let chain = self.chain.snapshot();
        let result = call();
        match &result {
            Ok(_) => {
                self.ledger.commit(ledger);
                self.chain.commit(chain);
            }
            Err(err) => {
                tracing::debug!(%err, "reverting");
                self.ledger.revert_to(ledger);
                self.chain.revert_to(chain);
            }
        }
        result
    }

    fn ledger(&self) -> &dyn Ledger {
        self.ledger.as_ref()
    }

    /// Cancels one of the sender's orders. Cancelling twice is the same as
    /// cancelling once.
    #[instrument(skip_all, fields(maker = %sender, %order_hash))]
    pub fn cancel_order(
        &self,
        sender: Address,
        maker_traits: MakerTraits,
        order_hash: B256,
    ) -> Result<()> {
        self.transact(|| {
            self.cancel(sender, maker_traits, order_hash);
            Ok(())
        })
    }

    #[instrument(skip_all, fields(maker = %sender, orders = order_hashes.len()))]
    pub fn cancel_orders(
        &self,
        sender: Address,
        maker_traits: &[MakerTraits],
        order_hashes: &[B256],
    ) -> Result<()> {
        if maker_traits.len() != order_hashes.len() {
            return Err(Error::MalformedArgs);
        }
        self.transact(|| {
            for (traits, order_hash) in maker_traits.iter().zip(order_hashes) {
                self.cancel(sender, *traits, *order_hash);
            }
            Ok(())
        })
    }

    fn cancel(&self, maker: Address, maker_traits: MakerTraits, order_hash: B256) {
        if maker_traits.use_bit_invalidator() {
            let nonce = U256::from(maker_traits.nonce_or_epoch);
            let (slot, value) = bit::mass_invalidate(self.ledger(), maker, nonce, U256::ZERO);
            self.chain
                .emit(Event::BitInvalidatorUpdated { maker, slot, value });
        } else {
            RemainingInvalidator::fully_filled().store(self.ledger(), maker, order_hash);
            self.chain.emit(Event::OrderCancelled { maker, order_hash });
        }
        info!(%order_hash, "order cancelled");
    }

    /// Invalidates the RFQ order with the given salt.
    #[instrument(skip_all, fields(maker = %sender))]
    pub fn cancel_order_rfq(&self, sender: Address, salt: U256) -> Result<()> {
        self.transact(|| {
            let (slot, value) = bit::mass_invalidate(self.ledger(), sender, salt, U256::ZERO);
            self.chain.emit(Event::BitInvalidatorUpdated {
                maker: sender,
                slot,
                value,
            });
            info!(%slot, "RFQ order cancelled");
            Ok(())
        })
    }

    /// Sets the bit of the order's nonce together with `additional_mask` in
    /// its slot of the sender's bit invalidator.
    #[instrument(skip_all, fields(maker = %sender))]
    pub fn bits_invalidate_for_order(
        &self,
        sender: Address,
        maker_traits: MakerTraits,
        additional_mask: U256,
    ) -> Result<()> {
        if !maker_traits.use_bit_invalidator() {
            return Err(Error::WrongInvalidator);
        }
        self.transact(|| {
            let nonce = U256::from(maker_traits.nonce_or_epoch);
            let (slot, value) = bit::mass_invalidate(self.ledger(), sender, nonce, additional_mask);
            self.chain.emit(Event::BitInvalidatorUpdated {
                maker: sender,
                slot,
                value,
            });
            info!(%slot, %value, "bits invalidated");
            Ok(())
        })
    }

    /// Advances one of the sender's series by 1 to 255 and returns the new
    /// nonce.
    #[instrument(skip_all, fields(maker = %sender, series))]
    pub fn advance_nonce(&self, sender: Address, series: u64, amount: U256) -> Result<U256> {
        self.transact(|| {
            let nonce = series::advance(self.ledger(), sender, series, amount)?;
            self.chain.emit(Event::NonceIncreased {
                maker: sender,
                series,
                nonce,
            });
            info!(%nonce, "nonce advanced");
            Ok(nonce)
        })
    }

    pub fn increase_nonce(&self, sender: Address, series: u64) -> Result<U256> {
        self.advance_nonce(sender, series, U256::from(1))
    }

    /// Remaining making amount of an order that has been filled or cancelled
    /// before.
    pub fn remaining(&self, maker: Address, order_hash: B256) -> Result<U256> {
        RemainingInvalidator::load(self.ledger(), maker, order_hash).remaining()
    }

    /// The stored word: zero for unknown orders, otherwise the complement of
    /// the remaining amount.
    pub fn raw_remaining(&self, maker: Address, order_hash: B256) -> U256 {
        RemainingInvalidator::load(self.ledger(), maker, order_hash).raw()
    }

    pub fn bit_invalidator_for_order(&self, maker: Address, slot: U256) -> U256 {
        self.ledger.bit_invalidator(maker, slot)
    }

    /// RFQ orders share the maker's bit invalidator with bit invalidated
    /// standard orders.
    pub fn invalidator_for_order_rfq(&self, maker: Address, slot: U256) -> U256 {
        self.ledger.bit_invalidator(maker, slot)
    }

    pub fn nonce(&self, maker: Address, series: u64) -> U256 {
        self.ledger.nonce(maker, series)
    }

    pub fn epoch(&self, maker: Address, series: u64) -> U256 {
        self.nonce(maker, series)
    }

    pub fn nonce_equals(&self, maker: Address, series: u64, nonce: U256) -> bool {
        series::nonce_equals(self.ledger(), maker, series, nonce)
    }

    pub fn epoch_equals(&self, maker: Address, series: u64, epoch: U256) -> bool {
        series::epoch_equals(self.ledger(), maker, series, epoch)
    }

    /// Evaluates an encoded predicate the way a fill would.
    pub fn check_predicate(&self, predicate: &[u8]) -> Result<bool> {
        Ok(predicate::check(predicate, self)?)
    }

    pub fn hash_order(&self, order: &Order) -> B256 {
        order.hash(&self.domain)
    }

    pub fn hash_order_rfq(&self, order: &RfqOrder) -> B256 {
        order.hash(&self.domain)
    }

    pub fn domain_separator(&self) -> DomainSeparator {
        self.domain
    }
}

impl StaticContext for Protocol {
    fn timestamp(&self) -> u64 {
        self.chain.timestamp()
    }

    fn is_contract(&self, address: Address) -> bool {
        self.chain.is_contract(address)
    }

    fn static_call(&self, target: Address, data: Bytes) -> Result<Bytes, Revert> {
        self.static_depth.fetch_add(1, Ordering::SeqCst);
        let _depth = scopeguard::guard((), |_| {
            self.static_depth.fetch_sub(1, Ordering::SeqCst);
        });
        self.chain.static_call(self.contracts.protocol, target, data)
    }

    fn nonce(&self, maker: Address, series: u64) -> U256 {
        self.ledger.nonce(maker, series)
    }
}
