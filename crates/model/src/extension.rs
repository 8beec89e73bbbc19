//! Order extensions.
//!
//! An extension is the variable length data an order carries besides its
//! signed struct. On the wire it is a 32-byte offsets word followed by the
//! concatenated field bytes. The offsets word packs eight cumulative `u32`
//! end offsets, field `i` in bits `[32 * i, 32 * i + 32)`, relative to the
//! first byte after the word. Whatever follows the last field is custom
//! data.

use {
    crate::interaction::Interaction,
    alloy_primitives::{B256, Bytes, U256, keccak256},
    strum::{EnumCount, EnumIter},
};

/// Number of low salt bits an extension commitment occupies.
pub const SALT_COMMITMENT_BITS: usize = 160;

const OFFSETS_WORD_SIZE: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumCount, EnumIter)]
pub enum Field {
    /// Appended to the maker asset `transferFrom` calldata.
    MakerAssetSuffix,
    /// Appended to the taker asset `transferFrom` calldata.
    TakerAssetSuffix,
    /// Getter contract and its fixed arguments computing making amounts.
    MakingAmountGetter,
    /// Getter contract and its fixed arguments computing taking amounts.
    TakingAmountGetter,
    /// Encoded predicate gating the fill.
    Predicate,
    /// Token address followed by permit calldata for the maker asset.
    MakerPermit,
    /// Optional hook target followed by its extra data.
    PreInteraction,
    /// Optional hook target followed by its extra data.
    PostInteraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("extension is shorter than its offsets require")]
    IncorrectExtensionLength,
    #[error("extension offsets are not monotonically non-decreasing")]
    OffsetsNotMonotonic,
    #[error("order declares an extension but none was supplied")]
    MissingOrderExtension,
    #[error("extension supplied for an order without one")]
    UnexpectedOrderExtension,
    #[error("extension does not match the order's commitment")]
    InvalidExtensionHash,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extension {
    fields: [Bytes; Field::COUNT],
    custom_data: Bytes,
}

impl Extension {
    pub fn builder() -> ExtensionBuilder {
        ExtensionBuilder::default()
    }

    /// Parses the wire form. An empty buffer is the empty extension.
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        if data.is_empty() {
            return Ok(Self::default());
        }
        if data.len() < OFFSETS_WORD_SIZE {
            return Err(Error::IncorrectExtensionLength);
        }
        let offsets = U256::from_be_slice(&data[..OFFSETS_WORD_SIZE]);
        let concat = &data[OFFSETS_WORD_SIZE..];

        let mut fields: [Bytes; Field::COUNT] = Default::default();
        let mut begin = 0usize;
        for (index, slot) in fields.iter_mut().enumerate() {
            let end = ((offsets >> (32 * index)) & U256::from(u32::MAX)).to::<usize>();
            if end < begin {
                return Err(Error::OffsetsNotMonotonic);
            }
            if end > concat.len() {
                return Err(Error::IncorrectExtensionLength);
            }
            *slot = Bytes::copy_from_slice(&concat[begin..end]);
            begin = end;
        }

        Ok(Self {
            fields,
            custom_data: Bytes::copy_from_slice(&concat[begin..]),
        })
    }

    /// Serializes to the wire form. The empty extension encodes to no bytes
    /// at all. Fields beyond `u32` offsets encode to data that fails to
    /// decode.
    pub fn encode(&self) -> Bytes {
        if self.is_empty() {
            return Bytes::new();
        }
        let mut offsets = U256::ZERO;
        let mut end = 0usize;
        for (index, field) in self.fields.iter().enumerate() {
            end += field.len();
            let end = u32::try_from(end).unwrap_or(u32::MAX);
            offsets |= U256::from(end) << (32 * index);
        }

        let mut data = Vec::with_capacity(OFFSETS_WORD_SIZE + end + self.custom_data.len());
        data.extend_from_slice(&offsets.to_be_bytes::<32>());
        for field in &self.fields {
            data.extend_from_slice(field);
        }
        data.extend_from_slice(&self.custom_data);
        data.into()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|field| field.is_empty()) && self.custom_data.is_empty()
    }

    pub fn get(&self, field: Field) -> &Bytes {
        &self.fields[field as usize]
    }

    pub fn custom_data(&self) -> &Bytes {
        &self.custom_data
    }

    /// The getter interaction of an amount field, if one is set.
    pub fn interaction(&self, field: Field) -> Option<Interaction> {
        Interaction::decode(self.get(field))
    }

    pub fn hash(&self) -> B256 {
        keccak256(self.encode())
    }

    /// The value an order's salt carries in its low 160 bits to commit to
    /// this extension.
    pub fn salt_commitment(&self) -> U256 {
        commitment(&self.encode())
    }
}

/// Low 160 bits of the hash of an encoded extension.
pub fn commitment(encoded: &[u8]) -> U256 {
    U256::from_be_bytes(keccak256(encoded).0) & salt_commitment_mask()
}

pub fn salt_commitment_mask() -> U256 {
    (U256::from(1) << SALT_COMMITMENT_BITS) - U256::from(1)
}

#[derive(Clone, Debug, Default)]
pub struct ExtensionBuilder(Extension);

impl ExtensionBuilder {
    pub fn field(mut self, field: Field, data: impl Into<Bytes>) -> Self {
        self.0.fields[field as usize] = data.into();
        self
    }

    pub fn maker_asset_suffix(self, suffix: impl Into<Bytes>) -> Self {
        self.field(Field::MakerAssetSuffix, suffix)
    }

    pub fn taker_asset_suffix(self, suffix: impl Into<Bytes>) -> Self {
        self.field(Field::TakerAssetSuffix, suffix)
    }

    pub fn making_amount_getter(self, getter: Interaction) -> Self {
        self.field(Field::MakingAmountGetter, getter.encode())
    }

    pub fn taking_amount_getter(self, getter: Interaction) -> Self {
        self.field(Field::TakingAmountGetter, getter.encode())
    }

    /// Sets the raw predicate field. The engine crate provides the typed
    /// predicate encoding.
    pub fn predicate(self, predicate: impl Into<Bytes>) -> Self {
        self.field(Field::Predicate, predicate)
    }

    pub fn maker_permit(self, permit: Interaction) -> Self {
        self.field(Field::MakerPermit, permit.encode())
    }

    pub fn pre_interaction(self, interaction: Interaction) -> Self {
        self.field(Field::PreInteraction, interaction.encode())
    }

    pub fn post_interaction(self, interaction: Interaction) -> Self {
        self.field(Field::PostInteraction, interaction.encode())
    }

    pub fn custom_data(mut self, data: impl Into<Bytes>) -> Self {
        self.0.custom_data = data.into();
        self
    }

    pub fn build(self) -> Extension {
        self.0
    }
}
