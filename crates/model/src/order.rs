//! Signed orders and their JSON form.

use {
    crate::{
        DomainSeparator,
        abi,
        extension::{self, Extension},
        hashed_eip712_message,
        traits::MakerTraits,
    },
    alloy_primitives::{Address, B256, Bytes, U256},
    alloy_sol_types::SolStruct,
    number::serialization::HexOrDecimalU256,
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
};

/// A standard, partially fillable limit order.
#[serde_as]
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    pub maker: Address,
    /// Recipient of the taker asset, the maker when zero.
    pub receiver: Address,
    pub maker_asset: Address,
    pub taker_asset: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub making_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub taking_amount: U256,
    pub maker_traits: MakerTraits,
}

impl Order {
    pub fn to_sol(&self) -> abi::Order {
        abi::Order {
            salt: self.salt,
            maker: self.maker,
            receiver: self.receiver,
            makerAsset: self.maker_asset,
            takerAsset: self.taker_asset,
            makingAmount: self.making_amount,
            takingAmount: self.taking_amount,
            makerTraits: self.maker_traits.encode(),
        }
    }

    /// EIP-712 struct hash of the order.
    pub fn hash_struct(&self) -> B256 {
        self.to_sol().eip712_hash_struct()
    }

    /// The order hash: the EIP-712 digest the maker signs and the key of its
    /// fill state.
    pub fn hash(&self, domain: &DomainSeparator) -> B256 {
        hashed_eip712_message(domain, &self.hash_struct())
    }

    pub fn receiver_or_maker(&self) -> Address {
        if self.receiver.is_zero() {
            self.maker
        } else {
            self.receiver
        }
    }

    /// Checks a supplied extension against the order's commitment and parses
    /// it.
    pub fn validate_extension(&self, extension: &[u8]) -> Result<Extension, extension::Error> {
        if !self.maker_traits.has_extension {
            if !extension.is_empty() {
                return Err(extension::Error::UnexpectedOrderExtension);
            }
            return Ok(Extension::default());
        }
        if extension.is_empty() {
            return Err(extension::Error::MissingOrderExtension);
        }
        if extension::commitment(extension) != self.salt & extension::salt_commitment_mask() {
            return Err(extension::Error::InvalidExtensionHash);
        }
        Extension::decode(extension)
    }
}

#[derive(Clone, Default, Debug)]
pub struct OrderBuilder(Order);

impl OrderBuilder {
    pub fn with_salt(mut self, salt: U256) -> Self {
        self.0.salt = salt;
        self
    }

    pub fn with_maker(mut self, maker: Address) -> Self {
        self.0.maker = maker;
        self
    }

    pub fn with_receiver(mut self, receiver: Address) -> Self {
        self.0.receiver = receiver;
        self
    }

    pub fn with_maker_asset(mut self, maker_asset: Address) -> Self {
        self.0.maker_asset = maker_asset;
        self
    }

    pub fn with_taker_asset(mut self, taker_asset: Address) -> Self {
        self.0.taker_asset = taker_asset;
        self
    }

    pub fn with_making_amount(mut self, making_amount: U256) -> Self {
        self.0.making_amount = making_amount;
        self
    }

    pub fn with_taking_amount(mut self, taking_amount: U256) -> Self {
        self.0.taking_amount = taking_amount;
        self
    }

    pub fn with_maker_traits(mut self, maker_traits: MakerTraits) -> Self {
        self.0.maker_traits = maker_traits;
        self
    }

    /// Commits the order to the extension: sets the has-extension flag and
    /// replaces the low 160 bits of the salt. Call after `with_salt`.
    pub fn with_extension(mut self, extension: &Extension) -> Self {
        let mask = extension::salt_commitment_mask();
        self.0.maker_traits.has_extension = true;
        self.0.salt = (self.0.salt & !mask) | extension.salt_commitment();
        self
    }

    pub fn build(self) -> Order {
        self.0
    }
}

/// An order together with what a taker needs to fill it.
#[derive(Eq, PartialEq, Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOrder {
    #[serde(flatten)]
    pub order: Order,
    /// 65 byte `r, s, v`, 64 byte compact or EIP-1271 signature bytes.
    pub signature: Bytes,
    #[serde(default)]
    pub extension: Bytes,
}

/// A fill-once order invalidated through a single bit of the maker's bit
/// invalidator.
#[serde_as]
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RfqOrder {
    /// Low 8 bits select the invalidator bit, the rest the slot.
    #[serde_as(as = "HexOrDecimalU256")]
    pub salt: U256,
    pub maker: Address,
    pub receiver: Address,
    /// The only address allowed to fill, anyone when zero.
    pub allowed_sender: Address,
    pub maker_asset: Address,
    pub taker_asset: Address,
    #[serde_as(as = "HexOrDecimalU256")]
    pub making_amount: U256,
    #[serde_as(as = "HexOrDecimalU256")]
    pub taking_amount: U256,
    /// Only the expiration and permit2 and unwrap flags apply to RFQ orders.
    pub maker_traits: MakerTraits,
}

impl RfqOrder {
    pub fn to_sol(&self) -> abi::OrderRFQ {
        abi::OrderRFQ {
            salt: self.salt,
            maker: self.maker,
            receiver: self.receiver,
            allowedSender: self.allowed_sender,
            makerAsset: self.maker_asset,
            takerAsset: self.taker_asset,
            makingAmount: self.making_amount,
            takingAmount: self.taking_amount,
            makerTraits: self.maker_traits.encode(),
        }
    }

    pub fn hash_struct(&self) -> B256 {
        self.to_sol().eip712_hash_struct()
    }

    pub fn hash(&self, domain: &DomainSeparator) -> B256 {
        hashed_eip712_message(domain, &self.hash_struct())
    }

    pub fn receiver_or_maker(&self) -> Address {
        if self.receiver.is_zero() {
            self.maker
        } else {
            self.receiver
        }
    }

    pub fn is_allowed_sender(&self, sender: &Address) -> bool {
        self.allowed_sender.is_zero() || self.allowed_sender == *sender
    }

    pub fn invalidator_slot(&self) -> U256 {
        self.salt >> 8
    }

    pub fn invalidator_bit(&self) -> U256 {
        U256::from(1) << (self.salt.as_limbs()[0] & 0xff) as usize
    }
}

const RFQ_MAKER_AMOUNT_FLAG: usize = 255;
const RFQ_UNWRAP_WETH_FLAG: usize = 252;
const RFQ_AMOUNT_BITS: usize = 252;

/// Taker options of an RFQ fill. They travel in the high bits of the fill
/// amount word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RfqFlags {
    pub is_making_amount: bool,
    pub unwrap_weth: bool,
}

impl RfqFlags {
    /// Splits an amount word into its flags and the low 252 bit amount.
    pub fn unpack(word: U256) -> (Self, U256) {
        let flags = Self {
            is_making_amount: word.bit(RFQ_MAKER_AMOUNT_FLAG),
            unwrap_weth: word.bit(RFQ_UNWRAP_WETH_FLAG),
        };
        let amount = word & ((U256::from(1) << RFQ_AMOUNT_BITS) - U256::from(1));
        (flags, amount)
    }

    pub fn pack(&self, amount: U256) -> U256 {
        let mut word = amount & ((U256::from(1) << RFQ_AMOUNT_BITS) - U256::from(1));
        word.set_bit(RFQ_MAKER_AMOUNT_FLAG, self.is_making_amount);
        word.set_bit(RFQ_UNWRAP_WETH_FLAG, self.unwrap_weth);
        word
    }
}
