use {
    alloy_primitives::{Address, B256, U256},
    alloy_signer::SignerSync,
    serde::{Deserialize, Serialize, de},
    std::fmt::{self, Debug, Formatter},
};

/// Half the order of the secp256k1 curve. Signatures with an `s` above it are
/// the malleable twin of a canonical one and are rejected.
const SECP256K1N_HALF: U256 = U256::from_be_bytes(hex_literal::hex!(
    "7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0"
));

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("ECDSA signature must be 64 or 65 bytes long, got {0}")]
    InvalidLength(usize),
    #[error("recovery byte must be 27 or 28, got {0}")]
    InvalidV(u8),
    #[error("signature s value is not in the lower half of the curve order")]
    HighS,
    #[error("no public key can be recovered from the signature")]
    Recovery,
}

/// Signature over an EIP-712 digest in `r`, `s`, `v` form.
#[derive(Eq, PartialEq, Clone, Copy, Debug, Default, Hash)]
pub struct EcdsaSignature {
    pub r: B256,
    pub s: B256,
    pub v: u8,
}

impl EcdsaSignature {
    /// r + s + v
    pub fn to_bytes(self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..64].copy_from_slice(self.s.as_slice());
        bytes[64] = self.v;
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 65]) -> Self {
        EcdsaSignature {
            r: B256::from_slice(&bytes[..32]),
            s: B256::from_slice(&bytes[32..64]),
            v: bytes[64],
        }
    }

    pub fn recover(&self, hash: &B256) -> Result<Address, Error> {
        let parity = match self.v {
            27 => false,
            28 => true,
            v => return Err(Error::InvalidV(v)),
        };
        let s = U256::from_be_bytes(self.s.0);
        if s > SECP256K1N_HALF {
            return Err(Error::HighS);
        }
        alloy_primitives::Signature::new(U256::from_be_bytes(self.r.0), s, parity)
            .recover_address_from_prehash(hash)
            .map_err(|_| Error::Recovery)
    }

    pub fn sign(hash: &B256, signer: &impl SignerSync) -> alloy_signer::Result<Self> {
        let signature = signer.sign_hash_sync(hash)?.normalized_s();
        Ok(Self {
            r: signature.r().into(),
            s: signature.s().into(),
            v: 27 + u8::from(signature.v()),
        })
    }

    pub fn to_compact(self) -> CompactSignature {
        let mut vs = self.s;
        if self.v == 28 {
            vs.0[0] |= 0x80;
        }
        CompactSignature { r: self.r, vs }
    }
}

impl Serialize for EcdsaSignature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&const_hex::encode_prefixed(self.to_bytes()))
    }
}

impl<'de> Deserialize<'de> for EcdsaSignature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor {}
        impl de::Visitor<'_> for Visitor {
            type Value = EcdsaSignature;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(
                    formatter,
                    "the 65 ecdsa signature bytes as a hex encoded string, ordered as r, s, v, \
                     where v is either 27 or 28"
                )
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let hex = s.strip_prefix("0x").ok_or_else(|| {
                    de::Error::custom(format!(
                        "{s:?} can't be decoded as hex ecdsa signature because it does not start \
                         with '0x'"
                    ))
                })?;
                let bytes = const_hex::decode_to_array::<_, 65>(hex).map_err(|err| {
                    de::Error::custom(format!(
                        "failed to decode {s:?} as hex ecdsa signature: {err}"
                    ))
                })?;
                Ok(EcdsaSignature::from_bytes(&bytes))
            }
        }

        deserializer.deserialize_str(Visitor {})
    }
}

/// EIP-2098 compact signature. Bit 255 of `vs` is the recovery parity, the
/// remaining 255 bits are `s`.
#[derive(Eq, PartialEq, Clone, Copy, Default, Hash, Serialize, Deserialize)]
pub struct CompactSignature {
    pub r: B256,
    pub vs: B256,
}

impl CompactSignature {
    pub fn to_bytes(self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[..32].copy_from_slice(self.r.as_slice());
        bytes[32..].copy_from_slice(self.vs.as_slice());
        bytes
    }

    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        Self {
            r: B256::from_slice(&bytes[..32]),
            vs: B256::from_slice(&bytes[32..]),
        }
    }

    pub fn to_ecdsa(self) -> EcdsaSignature {
        let mut s = self.vs;
        let parity = s.0[0] & 0x80 != 0;
        s.0[0] &= 0x7f;
        EcdsaSignature {
            r: self.r,
            s,
            v: 27 + u8::from(parity),
        }
    }

    pub fn recover(&self, hash: &B256) -> Result<Address, Error> {
        self.to_ecdsa().recover(hash)
    }
}

impl Debug for CompactSignature {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("CompactSignature")
            .field("r", &self.r)
            .field("vs", &self.vs)
            .finish()
    }
}

/// Recovers the signer of a digest from either the 65 byte `r, s, v` or the
/// 64 byte compact `r, vs` encoding.
pub fn recover(hash: &B256, signature: &[u8]) -> Result<Address, Error> {
    if let Ok(bytes) = <&[u8; 65]>::try_from(signature) {
        return EcdsaSignature::from_bytes(bytes).recover(hash);
    }
    if let Ok(bytes) = <&[u8; 64]>::try_from(signature) {
        return CompactSignature::from_bytes(bytes).recover(hash);
    }
    Err(Error::InvalidLength(signature.len()))
}
