//! The packed constraint words of an order.
//!
//! Both [`MakerTraits`] and [`TakerTraits`] travel as a single 256-bit word.
//! In memory they are plain structs; `encode`/`decode` convert between the
//! two forms. Every word decodes to some trait set; whether it makes sense
//! for a given fill is decided by the engine.
//!
//! Maker traits layout:
//!
//! ```text
//! 255      no partial fills
//! 254      no multiple fills
//! 252      pre-interaction call
//! 251      post-interaction call
//! 250      check epoch manager
//! 249      has extension
//! 248      use permit2
//! 247      unwrap WETH
//! 160..200 series
//! 120..160 nonce or epoch
//!  80..120 expiration timestamp
//!   0..80  low 80 bits of the allowed sender
//! ```
//!
//! Taker traits layout:
//!
//! ```text
//! 255      amount is a making amount
//! 254      unwrap WETH
//! 253      skip maker permit
//! 252      use permit2
//! 251      args start with a target address
//! 224..248 length of the extension in args
//! 200..224 length of the taker interaction in args
//!   0..184 threshold
//! ```

use {
    alloy_primitives::{Address, U256},
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Deserializer, Serialize, Serializer},
    serde_with::{DeserializeAs, SerializeAs},
};

const NO_PARTIAL_FILLS_FLAG: usize = 255;
const NO_MULTIPLE_FILLS_FLAG: usize = 254;
const PRE_INTERACTION_CALL_FLAG: usize = 252;
const POST_INTERACTION_CALL_FLAG: usize = 251;
const NEED_CHECK_EPOCH_MANAGER_FLAG: usize = 250;
const HAS_EXTENSION_FLAG: usize = 249;
const USE_PERMIT2_FLAG: usize = 248;
const UNWRAP_WETH_FLAG: usize = 247;

const ALLOWED_SENDER_BITS: usize = 80;
const EXPIRATION_OFFSET: usize = 80;
const NONCE_OR_EPOCH_OFFSET: usize = 120;
const SERIES_OFFSET: usize = 160;
const UINT40_BITS: usize = 40;

/// Largest value the 40-bit expiration, nonce and series fields hold.
pub const MAX_UINT40: u64 = (1 << 40) - 1;

const MAKER_AMOUNT_FLAG: usize = 255;
const TAKER_UNWRAP_WETH_FLAG: usize = 254;
const SKIP_ORDER_PERMIT_FLAG: usize = 253;
const TAKER_USE_PERMIT2_FLAG: usize = 252;
const ARGS_HAS_TARGET_FLAG: usize = 251;
const ARGS_EXTENSION_LENGTH_OFFSET: usize = 224;
const ARGS_INTERACTION_LENGTH_OFFSET: usize = 200;
const ARGS_LENGTH_BITS: usize = 24;
const THRESHOLD_BITS: usize = 184;

/// Largest length the 24-bit args length fields hold.
pub const MAX_ARGS_LENGTH: u32 = (1 << 24) - 1;

fn mask(bits: usize) -> U256 {
    (U256::from(1) << bits) - U256::from(1)
}

fn field(word: U256, offset: usize, bits: usize) -> U256 {
    (word >> offset) & mask(bits)
}

fn low_u64(word: U256, offset: usize, bits: usize) -> u64 {
    field(word, offset, bits).to::<u64>()
}

/// Low 80 bits of an address, the part of it a maker traits word stores.
fn address_low_bits(address: &Address) -> u128 {
    let bytes = address.as_slice();
    let mut low = [0u8; 16];
    low[6..].copy_from_slice(&bytes[10..]);
    u128::from_be_bytes(low)
}

/// Constraints the maker signs as part of an order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct MakerTraits {
    pub no_partial_fills: bool,
    pub no_multiple_fills: bool,
    pub pre_interaction_call: bool,
    pub post_interaction_call: bool,
    pub need_check_epoch_manager: bool,
    pub has_extension: bool,
    pub use_permit2: bool,
    pub unwrap_weth: bool,
    /// Low 80 bits of the only address allowed to fill, or 0 for anyone.
    pub allowed_sender: u128,
    /// Timestamp after which the order can no longer be filled, 0 for never.
    pub expiration: u64,
    pub nonce_or_epoch: u64,
    pub series: u64,
}

impl MakerTraits {
    pub fn decode(word: U256) -> Self {
        Self {
            no_partial_fills: word.bit(NO_PARTIAL_FILLS_FLAG),
            no_multiple_fills: word.bit(NO_MULTIPLE_FILLS_FLAG),
            pre_interaction_call: word.bit(PRE_INTERACTION_CALL_FLAG),
            post_interaction_call: word.bit(POST_INTERACTION_CALL_FLAG),
            need_check_epoch_manager: word.bit(NEED_CHECK_EPOCH_MANAGER_FLAG),
            has_extension: word.bit(HAS_EXTENSION_FLAG),
            use_permit2: word.bit(USE_PERMIT2_FLAG),
            unwrap_weth: word.bit(UNWRAP_WETH_FLAG),
            allowed_sender: field(word, 0, ALLOWED_SENDER_BITS).to::<u128>(),
            expiration: low_u64(word, EXPIRATION_OFFSET, UINT40_BITS),
            nonce_or_epoch: low_u64(word, NONCE_OR_EPOCH_OFFSET, UINT40_BITS),
            series: low_u64(word, SERIES_OFFSET, UINT40_BITS),
        }
    }

    /// Packs the traits into their word. Numeric fields wider than their
    /// slot are truncated to it.
    pub fn encode(&self) -> U256 {
        let mut word = U256::ZERO;
        for (bit, set) in [
            (NO_PARTIAL_FILLS_FLAG, self.no_partial_fills),
            (NO_MULTIPLE_FILLS_FLAG, self.no_multiple_fills),
            (PRE_INTERACTION_CALL_FLAG, self.pre_interaction_call),
            (POST_INTERACTION_CALL_FLAG, self.post_interaction_call),
            (NEED_CHECK_EPOCH_MANAGER_FLAG, self.need_check_epoch_manager),
            (HAS_EXTENSION_FLAG, self.has_extension),
            (USE_PERMIT2_FLAG, self.use_permit2),
            (UNWRAP_WETH_FLAG, self.unwrap_weth),
        ] {
            word.set_bit(bit, set);
        }
        word |= U256::from(self.allowed_sender) & mask(ALLOWED_SENDER_BITS);
        word |= (U256::from(self.expiration) & mask(UINT40_BITS)) << EXPIRATION_OFFSET;
        word |= (U256::from(self.nonce_or_epoch) & mask(UINT40_BITS)) << NONCE_OR_EPOCH_OFFSET;
        word |= (U256::from(self.series) & mask(UINT40_BITS)) << SERIES_OFFSET;
        word
    }

    pub fn with_allowed_sender(mut self, sender: Address) -> Self {
        self.allowed_sender = address_low_bits(&sender);
        self
    }

    pub fn is_allowed_sender(&self, sender: &Address) -> bool {
        self.allowed_sender == 0 || self.allowed_sender == address_low_bits(sender)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expiration != 0 && self.expiration < now
    }

    pub fn allow_partial_fills(&self) -> bool {
        !self.no_partial_fills
    }

    pub fn allow_multiple_fills(&self) -> bool {
        !self.no_multiple_fills
    }

    /// Orders that can only be filled once are invalidated through a single
    /// bit keyed by their nonce instead of a remaining amount counter.
    pub fn use_bit_invalidator(&self) -> bool {
        !self.allow_partial_fills() || !self.allow_multiple_fills()
    }
}

impl From<U256> for MakerTraits {
    fn from(word: U256) -> Self {
        Self::decode(word)
    }
}

impl From<MakerTraits> for U256 {
    fn from(traits: MakerTraits) -> Self {
        traits.encode()
    }
}

impl Serialize for MakerTraits {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        HexOrDecimalU256::serialize_as(&self.encode(), serializer)
    }
}

impl<'de> Deserialize<'de> for MakerTraits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        HexOrDecimalU256::deserialize_as(deserializer).map(Self::decode)
    }
}

/// Parameters the taker chooses per fill. They are not signed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TakerTraits {
    /// The fill amount is a making amount and the threshold a maximum taking
    /// amount. Otherwise the amount is a taking amount and the threshold a
    /// minimum making amount.
    pub is_making_amount: bool,
    pub unwrap_weth: bool,
    pub skip_maker_permit: bool,
    pub use_permit2: bool,
    pub args_has_target: bool,
    pub args_extension_length: u32,
    pub args_interaction_length: u32,
    /// Worst acceptable counter amount for the requested amount, 0 for no
    /// limit.
    pub threshold: U256,
}

impl TakerTraits {
    pub fn decode(word: U256) -> Self {
        Self {
            is_making_amount: word.bit(MAKER_AMOUNT_FLAG),
            unwrap_weth: word.bit(TAKER_UNWRAP_WETH_FLAG),
            skip_maker_permit: word.bit(SKIP_ORDER_PERMIT_FLAG),
            use_permit2: word.bit(TAKER_USE_PERMIT2_FLAG),
            args_has_target: word.bit(ARGS_HAS_TARGET_FLAG),
            args_extension_length: field(word, ARGS_EXTENSION_LENGTH_OFFSET, ARGS_LENGTH_BITS)
                .to::<u32>(),
            args_interaction_length: field(word, ARGS_INTERACTION_LENGTH_OFFSET, ARGS_LENGTH_BITS)
                .to::<u32>(),
            threshold: field(word, 0, THRESHOLD_BITS),
        }
    }

    /// Packs the traits into their word. Lengths and the threshold are
    /// truncated to their slots.
    pub fn encode(&self) -> U256 {
        let mut word = U256::ZERO;
        for (bit, set) in [
            (MAKER_AMOUNT_FLAG, self.is_making_amount),
            (TAKER_UNWRAP_WETH_FLAG, self.unwrap_weth),
            (SKIP_ORDER_PERMIT_FLAG, self.skip_maker_permit),
            (TAKER_USE_PERMIT2_FLAG, self.use_permit2),
            (ARGS_HAS_TARGET_FLAG, self.args_has_target),
        ] {
            word.set_bit(bit, set);
        }
        word |= (U256::from(self.args_extension_length) & mask(ARGS_LENGTH_BITS))
            << ARGS_EXTENSION_LENGTH_OFFSET;
        word |= (U256::from(self.args_interaction_length) & mask(ARGS_LENGTH_BITS))
            << ARGS_INTERACTION_LENGTH_OFFSET;
        word |= self.threshold & mask(THRESHOLD_BITS);
        word
    }

    /// Traits filling by making amount without a rate limit.
    pub fn making_amount() -> Self {
        Self {
            is_making_amount: true,
            ..Default::default()
        }
    }

    /// Traits filling by taking amount without a rate limit.
    pub fn taking_amount() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: U256) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn args_has_extension(&self) -> bool {
        self.args_extension_length > 0
    }

    pub fn args_has_interaction(&self) -> bool {
        self.args_interaction_length > 0
    }
}

impl From<U256> for TakerTraits {
    fn from(word: U256) -> Self {
        Self::decode(word)
    }
}

impl From<TakerTraits> for U256 {
    fn from(traits: TakerTraits) -> Self {
        traits.encode()
    }
}
