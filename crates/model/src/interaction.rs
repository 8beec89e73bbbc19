use {
    alloy_primitives::{Address, Bytes},
    serde::{Deserialize, Serialize},
    std::fmt::{self, Debug, Formatter},
};

const ADDRESS_LEN: usize = 20;

/// A call target followed by opaque data, the shape shared by hooks, amount
/// getters, maker permits and taker interactions.
#[derive(Eq, PartialEq, Clone, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub target: Address,
    pub data: Bytes,
}

impl Interaction {
    pub fn new(target: Address, data: impl Into<Bytes>) -> Self {
        Self {
            target,
            data: data.into(),
        }
    }

    /// Splits a segment into its leading 20 byte target and the rest. Returns
    /// `None` for segments too short to hold an address.
    pub fn decode(segment: &[u8]) -> Option<Self> {
        if segment.len() < ADDRESS_LEN {
            return None;
        }
        let (target, data) = segment.split_at(ADDRESS_LEN);
        Some(Self {
            target: Address::from_slice(target),
            data: Bytes::copy_from_slice(data),
        })
    }

    pub fn encode(&self) -> Bytes {
        [self.target.as_slice(), &self.data].concat().into()
    }
}

impl Debug for Interaction {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Interaction")
            .field("target", &self.target)
            .field("data", &format_args!("{}", self.data))
            .finish()
    }
}
