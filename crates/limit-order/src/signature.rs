//! Authentication of the maker of an order.
//!
//! Makers with code are smart contract wallets and are asked through EIP-1271
//! whether they accept the signature. For every other maker the signature has
//! to be an ECDSA signature, in its 65 byte or 64 byte compact form, that
//! recovers to the maker.

use {
    crate::blockchain::StaticContext,
    alloy_primitives::{Address, B256, Bytes},
    alloy_sol_types::SolCall,
    model::{
        abi::{EIP1271_MAGIC_VALUE, IERC1271},
        signature,
    },
};

/// Whether `signature` is `signer`'s approval of `hash`.
pub fn is_valid(
    context: &dyn StaticContext,
    signer: Address,
    hash: &B256,
    signature: &[u8],
) -> bool {
    if context.is_contract(signer) {
        is_valid_eip1271(context, signer, hash, signature)
    } else {
        is_valid_ecdsa(signer, hash, signature)
    }
}

pub fn is_valid_ecdsa(signer: Address, hash: &B256, signature: &[u8]) -> bool {
    match signature::recover(hash, signature) {
        Ok(recovered) => !signer.is_zero() && recovered == signer,
        Err(err) => {
            tracing::debug!(?err, "signature does not recover");
            false
        }
    }
}

/// Accepts exactly one returned word holding the magic value.
pub fn is_valid_eip1271(
    context: &dyn StaticContext,
    signer: Address,
    hash: &B256,
    signature: &[u8],
) -> bool {
    let call = IERC1271::isValidSignatureCall {
        hash: *hash,
        signature: Bytes::copy_from_slice(signature),
    };
    match context.static_call(signer, call.abi_encode().into()) {
        Ok(returned) => {
            returned.len() == 32
                && returned[..4] == EIP1271_MAGIC_VALUE
                && returned[4..].iter().all(|byte| *byte == 0)
        }
        Err(err) => {
            tracing::debug!(%signer, %err, "isValidSignature failed");
            false
        }
    }
}
