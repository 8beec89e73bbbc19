//! Deterministic externally owned accounts and the signatures they produce.

use {
    crate::tokens::permit_digest,
    alloy_primitives::{Address, B256, U256},
    alloy_signer_local::PrivateKeySigner,
    model::{
        DomainSeparator,
        interaction::Interaction,
        order::{Order, RfqOrder},
        signature::{CompactSignature, EcdsaSignature},
    },
};

#[derive(Clone, Debug)]
pub struct Account(PrivateKeySigner);

impl Account {
    /// The account whose private key is `seed` repeated 32 times. Seed must
    /// not be zero.
    pub fn new(seed: u8) -> Self {
        Self(PrivateKeySigner::from_slice(&[seed; 32]).expect("non-zero seed is a valid key"))
    }

    pub fn maker() -> Self {
        Self::new(0x11)
    }

    pub fn taker() -> Self {
        Self::new(0x22)
    }

    pub fn address(&self) -> Address {
        self.0.address()
    }

    pub fn sign(&self, hash: &B256) -> EcdsaSignature {
        EcdsaSignature::sign(hash, &self.0).expect("local signing cannot fail")
    }

    pub fn sign_order(&self, order: &Order, domain: &DomainSeparator) -> CompactSignature {
        self.sign(&order.hash(domain)).to_compact()
    }

    pub fn sign_rfq_order(&self, order: &RfqOrder, domain: &DomainSeparator) -> EcdsaSignature {
        self.sign(&order.hash(domain))
    }

    /// Permit segment letting `spender` move `value` of `token`: the token
    /// followed by the permit arguments after owner and spender.
    pub fn permit(
        &self,
        token: Address,
        spender: Address,
        value: U256,
        deadline: u64,
    ) -> Interaction {
        let deadline = U256::from(deadline);
        let signature = self.sign(&permit_digest(token, self.address(), spender, value, deadline));
        let args = [
            value.to_be_bytes::<32>().as_slice(),
            deadline.to_be_bytes::<32>().as_slice(),
            U256::from(signature.v).to_be_bytes::<32>().as_slice(),
            signature.r.as_slice(),
            signature.s.as_slice(),
        ]
        .concat();
        Interaction::new(token, args)
    }
}
