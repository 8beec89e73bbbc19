//! Fills, cancellations and hooks against the test chain.

mod extensions;
mod management;
mod rfq;
mod transfers;

use {
    alloy_primitives::{Bytes, U256},
    limit_order::{Fill, Result, TakerArgs},
    model::{
        extension::Extension,
        order::{Order, OrderBuilder},
        traits::TakerTraits,
    },
    number::units::EthUnit,
    testlib::{
        Account,
        Deployment,
        tokens::{DAI, USDC},
    },
};

/// A deployment with a maker holding 1000 DAI and a taker holding 1000 USDC,
/// both approved to the protocol.
fn setup() -> (Deployment, Account, Account) {
    observe::tracing::initialize_reentrant("warn,limit_order=debug");
    let deployment = Deployment::new();
    let (maker, taker) = (Account::maker(), Account::taker());
    deployment.fund(&maker, DAI, 1000u64.wei());
    deployment.fund(&taker, USDC, 1000u64.wei());
    (deployment, maker, taker)
}

/// Sells 100 DAI for 100 USDC.
fn order(maker: &Account) -> OrderBuilder {
    OrderBuilder::default()
        .with_salt(U256::from(1))
        .with_maker(maker.address())
        .with_maker_asset(DAI)
        .with_taker_asset(USDC)
        .with_making_amount(100u64.wei())
        .with_taking_amount(100u64.wei())
}

fn fill(
    deployment: &Deployment,
    maker: &Account,
    taker: &Account,
    order: &Order,
    amount: U256,
    taker_traits: TakerTraits,
) -> Result<Fill> {
    let signature = maker.sign_order(order, &deployment.domain);
    deployment.protocol.fill_order(
        taker.address(),
        order,
        signature.r,
        signature.vs,
        amount,
        taker_traits,
    )
}

fn fill_making(
    deployment: &Deployment,
    maker: &Account,
    taker: &Account,
    order: &Order,
    amount: U256,
) -> Result<Fill> {
    fill(deployment, maker, taker, order, amount, TakerTraits::making_amount())
}

/// Fills an order passing `extension` in the taker args.
fn fill_with_extension(
    deployment: &Deployment,
    maker: &Account,
    taker: &Account,
    order: &Order,
    extension: &Extension,
    amount: U256,
    taker_traits: TakerTraits,
) -> Result<Fill> {
    let extension = extension.encode();
    let (taker_traits, args) = args(&extension, taker_traits);
    let signature = maker.sign_order(order, &deployment.domain);
    deployment.protocol.fill_order_args(
        taker.address(),
        order,
        signature.r,
        signature.vs,
        amount,
        taker_traits,
        &args,
    )
}

fn args(extension: &[u8], taker_traits: TakerTraits) -> (TakerTraits, Bytes) {
    TakerArgs {
        target: None,
        extension,
        interaction: &[],
    }
    .encode(taker_traits)
}
