//! A protocol deployment on a fresh test chain.

use {
    crate::{
        accounts::Account,
        chain::TestChain,
        tokens::{DAI, PERMIT2, USDC, WETH},
    },
    alloy_primitives::{Address, U256},
    hex_literal::hex,
    limit_order::{Contracts, InMemoryLedger, Protocol},
    model::DomainSeparator,
    std::sync::Arc,
};

/// Address the protocol is deployed at.
pub const PROTOCOL: Address = Address::new(hex!("111111125421ca6dc452d289314280a0f8842a65"));

pub const CHAIN_ID: u64 = 1;

pub struct Deployment {
    pub chain: Arc<TestChain>,
    pub ledger: Arc<InMemoryLedger>,
    pub protocol: Arc<Protocol>,
    pub domain: DomainSeparator,
}

impl Deployment {
    /// Deploys the protocol together with WETH, Permit2, DAI and USDC.
    pub fn new() -> Self {
        let chain = Arc::new(TestChain::new());
        chain.deploy_weth(WETH);
        chain.deploy_permit2(PERMIT2);
        chain.deploy_token(DAI);
        chain.deploy_token(USDC);

        let ledger = Arc::new(InMemoryLedger::new());
        let domain = DomainSeparator::new(CHAIN_ID, PROTOCOL);
        let protocol = Arc::new(Protocol::new(
            Contracts {
                protocol: PROTOCOL,
                weth: WETH,
                permit2: PERMIT2,
            },
            domain,
            ledger.clone(),
            chain.clone(),
        ));
        Self {
            chain,
            ledger,
            protocol,
            domain,
        }
    }

    /// Gives `account` `amount` of `token` and approves the protocol to
    /// spend all of it.
    pub fn fund(&self, account: &Account, token: Address, amount: U256) {
        self.chain.mint(token, account.address(), amount);
        self.chain
            .approve(token, account.address(), PROTOCOL, U256::MAX);
    }

    pub fn balance(&self, token: Address, account: Address) -> U256 {
        self.chain.balance_of(token, account)
    }
}

impl Default for Deployment {
    fn default() -> Self {
        Self::new()
    }
}
