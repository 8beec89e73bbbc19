//! Test host for the limit order protocol: an in-memory chain with tokens,
//! WETH and Permit2, contracts written as closures and deterministic
//! accounts.

pub mod accounts;
pub mod chain;
pub mod contracts;
pub mod protocol;
pub mod tokens;

pub use {
    accounts::Account,
    chain::{Call, TestChain},
    protocol::Deployment,
};
