use alloy_primitives::{Address, B256, U256};

/// Events the protocol emits to the host's log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    OrderFilled {
        order_hash: B256,
        making_amount: U256,
        taking_amount: U256,
        /// Making amount left after the fill. Zero for bit invalidated
        /// orders.
        remaining: U256,
    },
    OrderFilledRfq {
        order_hash: B256,
        making_amount: U256,
        taking_amount: U256,
    },
    OrderCancelled {
        maker: Address,
        order_hash: B256,
    },
    BitInvalidatorUpdated {
        maker: Address,
        slot: U256,
        value: U256,
    },
    NonceIncreased {
        maker: Address,
        series: u64,
        nonce: U256,
    },
}
