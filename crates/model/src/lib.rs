//! Contains the order data model shared between the fill engine, its test
//! harness and anything relaying signed orders: orders, their packed trait
//! words, extensions and signatures.

pub mod abi;
pub mod extension;
pub mod interaction;
pub mod order;
pub mod signature;
pub mod traits;

use {
    alloy_primitives::{Address, B256, U256, keccak256},
    alloy_sol_types::{SolType, sol},
    std::{fmt, sync::LazyLock},
};

type DomainSeparatorSol = sol! {
    tuple(
        bytes32, // EIP712_DOMAIN_TYPEHASH
        bytes32, // keccak(domain.name)
        bytes32, // keccak(domain.version)
        uint256, // block.chainId
        address, // address(this)
    )
};

/// The EIP-712 domain name the protocol signs orders under unless a
/// deployment configures another one.
pub const DEFAULT_DOMAIN_NAME: &str = "1inch Limit Order Protocol";

/// The EIP-712 domain version matching [`DEFAULT_DOMAIN_NAME`].
pub const DEFAULT_DOMAIN_VERSION: &str = "4";

#[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct DomainSeparator(pub B256);

impl std::str::FromStr for DomainSeparator {
    type Err = const_hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(B256::from(const_hex::decode_to_array::<_, 32>(s)?)))
    }
}

impl fmt::Debug for DomainSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&const_hex::encode(self.0))
    }
}

impl DomainSeparator {
    /// Domain separator of a deployment using the default name and version.
    pub fn new(chain_id: u64, contract_address: Address) -> Self {
        static DOMAIN_NAME: LazyLock<B256> =
            LazyLock::new(|| keccak256(DEFAULT_DOMAIN_NAME.as_bytes()));
        static DOMAIN_VERSION: LazyLock<B256> =
            LazyLock::new(|| keccak256(DEFAULT_DOMAIN_VERSION.as_bytes()));

        Self::from_hashed_parts(*DOMAIN_NAME, *DOMAIN_VERSION, chain_id, contract_address)
    }

    pub fn with_name_and_version(
        name: &str,
        version: &str,
        chain_id: u64,
        contract_address: Address,
    ) -> Self {
        Self::from_hashed_parts(
            keccak256(name.as_bytes()),
            keccak256(version.as_bytes()),
            chain_id,
            contract_address,
        )
    }

    fn from_hashed_parts(name: B256, version: B256, chain_id: u64, contract: Address) -> Self {
        static DOMAIN_TYPE_HASH: LazyLock<B256> = LazyLock::new(|| {
            keccak256(
                b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
            )
        });

        Self(keccak256(DomainSeparatorSol::abi_encode_sequence(&(
            *DOMAIN_TYPE_HASH,
            name,
            version,
            U256::from(chain_id),
            contract,
        ))))
    }
}

/// Returns the EIP-712 digest of a struct hash under the given domain, the
/// value that gets signed and recovered.
///
/// https://eips.ethereum.org/EIPS/eip-712#specification
pub fn hashed_eip712_message(domain_separator: &DomainSeparator, struct_hash: &B256) -> B256 {
    let mut message = [0u8; 66];
    message[0..2].copy_from_slice(&[0x19, 0x01]);
    message[2..34].copy_from_slice(domain_separator.0.as_slice());
    message[34..66].copy_from_slice(struct_hash.as_slice());
    keccak256(message)
}
