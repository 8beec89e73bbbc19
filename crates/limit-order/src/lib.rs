//! Fill engine of a signed limit order exchange protocol.
//!
//! Makers sign orders off chain. Takers fill them, in full or in parts,
//! through [`Protocol`], which authenticates the maker, enforces the order's
//! constraints, tracks how much of every order is left and moves both assets.
//! Invalidation state lives in a [`Ledger`]; balances, contracts and the clock
//! belong to the [`Blockchain`] the protocol runs on.

pub mod amounts;
pub mod blockchain;
pub mod error;
pub mod events;
pub mod invalidators;
pub mod ledger;
pub mod predicate;
pub mod protocol;
pub mod signature;

pub use {
    blockchain::{Blockchain, StaticContext},
    error::{Error, Result, Revert},
    events::Event,
    ledger::{InMemoryLedger, Ledger},
    protocol::{Contracts, Fill, Protocol, TakerArgs},
};
