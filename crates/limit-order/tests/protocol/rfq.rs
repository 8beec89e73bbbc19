use {
    super::*,
    limit_order::{Error, Event},
    model::{
        order::{RfqFlags, RfqOrder},
        traits::MakerTraits,
    },
    testlib::{protocol::PROTOCOL, tokens::WETH},
};

fn rfq_order(maker: &Account, salt: u64) -> RfqOrder {
    RfqOrder {
        salt: U256::from(salt),
        maker: maker.address(),
        maker_asset: DAI,
        taker_asset: USDC,
        making_amount: 100u64.wei(),
        taking_amount: 50u64.wei(),
        ..Default::default()
    }
}

fn by_making() -> RfqFlags {
    RfqFlags {
        is_making_amount: true,
        ..Default::default()
    }
}

#[test]
fn fills_once() {
    let (deployment, maker, taker) = setup();
    let order = rfq_order(&maker, 0x0105);
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_bytes();

    let fill = deployment
        .protocol
        .fill_order_rfq(taker.address(), &order, &signature, 40u64.wei(), by_making())
        .unwrap();
    assert_eq!((fill.making_amount, fill.taking_amount), (40u64.wei(), 20u64.wei()));
    assert_eq!(deployment.balance(DAI, taker.address()), 40u64.wei());
    assert_eq!(deployment.balance(USDC, maker.address()), 20u64.wei());
    assert_eq!(
        deployment
            .protocol
            .invalidator_for_order_rfq(maker.address(), U256::from(1)),
        U256::from(1) << 5
    );
    assert_eq!(
        deployment.chain.events(),
        vec![Event::OrderFilledRfq {
            order_hash: order.hash(&deployment.domain),
            making_amount: 40u64.wei(),
            taking_amount: 20u64.wei(),
        }]
    );

    assert_eq!(
        deployment.protocol.fill_order_rfq(
            taker.address(),
            &order,
            &signature,
            10u64.wei(),
            by_making()
        ),
        Err(Error::InvalidatedOrder)
    );
}

#[test]
fn compact_signatures_and_taking_amounts() {
    let (deployment, maker, taker) = setup();
    let order = rfq_order(&maker, 7);
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_compact();

    let fill = deployment
        .protocol
        .fill_order_rfq_compact(
            taker.address(),
            &order,
            signature.r,
            signature.vs,
            25u64.wei(),
            RfqFlags::default(),
        )
        .unwrap();
    assert_eq!((fill.making_amount, fill.taking_amount), (50u64.wei(), 25u64.wei()));
}

#[test]
fn amounts_are_bounded_by_the_order() {
    let (deployment, maker, taker) = setup();
    let order = rfq_order(&maker, 9);
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_bytes();

    assert_eq!(
        deployment.protocol.fill_order_rfq(
            taker.address(),
            &order,
            &signature,
            101u64.wei(),
            by_making()
        ),
        Err(Error::MakingAmountExceeded)
    );
    // The failed fill did not burn the order.
    assert_eq!(
        deployment
            .protocol
            .invalidator_for_order_rfq(maker.address(), U256::ZERO),
        U256::ZERO
    );
    assert_eq!(
        deployment.protocol.fill_order_rfq_to_with_permit(
            taker.address(),
            &order,
            &signature,
            10u64.wei(),
            10u64.wei(),
            taker.address(),
            &[],
        ),
        Err(Error::InvalidAmountRequest)
    );
}

#[test]
fn private_rfq_orders() {
    let (deployment, maker, taker) = setup();
    let order = RfqOrder {
        allowed_sender: maker.address(),
        ..rfq_order(&maker, 11)
    };
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_bytes();

    assert_eq!(
        deployment.protocol.fill_order_rfq(
            taker.address(),
            &order,
            &signature,
            10u64.wei(),
            by_making()
        ),
        Err(Error::PrivateOrder)
    );
}

#[test]
fn cancelled_rfq_orders_cannot_fill() {
    let (deployment, maker, taker) = setup();
    let order = rfq_order(&maker, 12);
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_bytes();

    deployment
        .protocol
        .cancel_order_rfq(maker.address(), order.salt)
        .unwrap();
    assert_eq!(
        deployment.protocol.fill_order_rfq(
            taker.address(),
            &order,
            &signature,
            10u64.wei(),
            by_making()
        ),
        Err(Error::InvalidatedOrder)
    );
}

#[test]
fn maker_receives_unwrapped_weth() {
    let (deployment, maker, taker) = setup();
    deployment.fund(&taker, WETH, 100u64.wei());
    let unwrap = MakerTraits {
        unwrap_weth: true,
        ..Default::default()
    };
    let weth_order = RfqOrder {
        taker_asset: WETH,
        maker_traits: unwrap,
        ..rfq_order(&maker, 11)
    };
    let signature = maker.sign_rfq_order(&weth_order, &deployment.domain).to_bytes();

    deployment
        .protocol
        .fill_order_rfq(taker.address(), &weth_order, &signature, 40u64.wei(), by_making())
        .unwrap();
    assert_eq!(deployment.chain.native_balance(maker.address()), 20u64.wei());
    assert_eq!(deployment.balance(WETH, maker.address()), U256::ZERO);
    assert_eq!(deployment.balance(WETH, taker.address()), 80u64.wei());
    assert_eq!(deployment.chain.native_balance(PROTOCOL), U256::ZERO);

    let usdc_order = RfqOrder {
        maker_traits: unwrap,
        ..rfq_order(&maker, 12)
    };
    let signature = maker.sign_rfq_order(&usdc_order, &deployment.domain).to_bytes();
    assert_eq!(
        deployment.protocol.fill_order_rfq(
            taker.address(),
            &usdc_order,
            &signature,
            40u64.wei(),
            by_making()
        ),
        Err(Error::UnwrapFailed)
    );
}

#[test]
fn sends_maker_asset_to_target_after_taker_permit() {
    let (deployment, maker, taker) = setup();
    let recipient = Account::new(0x55);
    deployment.chain.approve(USDC, taker.address(), PROTOCOL, U256::ZERO);
    let permit = taker.permit(USDC, PROTOCOL, 50u64.wei(), u64::MAX);
    let order = rfq_order(&maker, 13);
    let signature = maker.sign_rfq_order(&order, &deployment.domain).to_bytes();

    deployment
        .protocol
        .fill_order_rfq_to_with_permit(
            taker.address(),
            &order,
            &signature,
            U256::ZERO,
            50u64.wei(),
            recipient.address(),
            &permit.encode(),
        )
        .unwrap();
    assert_eq!(deployment.balance(DAI, recipient.address()), 100u64.wei());
    assert_eq!(deployment.balance(USDC, maker.address()), 50u64.wei());
}
