use {
    super::*,
    alloy_primitives::Address,
    limit_order::{Error, Event, predicate::Predicate},
    model::traits::MakerTraits,
    parking_lot::Mutex,
    std::sync::Arc,
};

#[test]
fn cancelling_twice_is_cancelling_once() {
    let (deployment, maker, taker) = setup();
    let order = order(&maker).build();
    let order_hash = order.hash(&deployment.domain);

    for _ in 0..2 {
        deployment
            .protocol
            .cancel_order(maker.address(), order.maker_traits, order_hash)
            .unwrap();
        assert_eq!(
            deployment.protocol.remaining(maker.address(), order_hash),
            Ok(U256::ZERO)
        );
    }
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &order, 40u64.wei()),
        Err(Error::RemainingAmountIsZero)
    );
    assert_eq!(
        deployment.chain.events(),
        vec![
            Event::OrderCancelled {
                maker: maker.address(),
                order_hash,
            };
            2
        ]
    );
}

#[test]
fn cancels_are_scoped_to_the_sender() {
    let (deployment, maker, taker) = setup();
    let order = order(&maker).build();
    let order_hash = order.hash(&deployment.domain);

    deployment
        .protocol
        .cancel_order(taker.address(), order.maker_traits, order_hash)
        .unwrap();
    assert!(fill_making(&deployment, &maker, &taker, &order, 40u64.wei()).is_ok());
}

#[test]
fn cancels_batches() {
    let (deployment, maker, taker) = setup();
    let single = MakerTraits {
        no_multiple_fills: true,
        nonce_or_epoch: 300,
        ..Default::default()
    };
    let orders = [
        order(&maker).build(),
        order(&maker).with_maker_traits(single).build(),
    ];
    let traits = orders.map(|order| order.maker_traits);
    let hashes = orders.map(|order| order.hash(&deployment.domain));

    assert_eq!(
        deployment
            .protocol
            .cancel_orders(maker.address(), &traits, &hashes[..1]),
        Err(Error::MalformedArgs)
    );
    deployment
        .protocol
        .cancel_orders(maker.address(), &traits, &hashes)
        .unwrap();

    assert_eq!(
        fill_making(&deployment, &maker, &taker, &orders[0], 40u64.wei()),
        Err(Error::RemainingAmountIsZero)
    );
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &orders[1], 40u64.wei()),
        Err(Error::InvalidatedOrder)
    );
    assert_eq!(
        deployment
            .protocol
            .bit_invalidator_for_order(maker.address(), U256::from(1)),
        U256::from(1) << 44
    );
}

#[test]
fn mass_invalidation() {
    let (deployment, maker, taker) = setup();
    let traits = |nonce| MakerTraits {
        no_partial_fills: true,
        nonce_or_epoch: nonce,
        ..Default::default()
    };

    assert_eq!(
        deployment.protocol.bits_invalidate_for_order(
            maker.address(),
            MakerTraits::default(),
            U256::ZERO
        ),
        Err(Error::WrongInvalidator)
    );
    deployment
        .protocol
        .bits_invalidate_for_order(maker.address(), traits(1), U256::from(0b1100))
        .unwrap();

    for nonce in [1, 2, 3] {
        let order = order(&maker).with_maker_traits(traits(nonce)).build();
        assert_eq!(
            fill_making(&deployment, &maker, &taker, &order, 100u64.wei()),
            Err(Error::InvalidatedOrder)
        );
    }
    let order = order(&maker).with_maker_traits(traits(4)).build();
    assert!(fill_making(&deployment, &maker, &taker, &order, 100u64.wei()).is_ok());
}

#[test]
fn nonces_only_move_forward() {
    let (deployment, maker, _) = setup();
    let protocol = &deployment.protocol;

    assert_eq!(
        protocol.advance_nonce(maker.address(), 0, U256::from(256)),
        Err(Error::AdvanceNonceFailed)
    );
    assert_eq!(
        protocol.advance_nonce(maker.address(), 0, U256::ZERO),
        Err(Error::AdvanceNonceFailed)
    );
    assert_eq!(protocol.advance_nonce(maker.address(), 0, U256::from(255)), Ok(U256::from(255)));
    assert_eq!(protocol.increase_nonce(maker.address(), 0), Ok(U256::from(256)));
    assert_eq!(protocol.nonce(maker.address(), 0), U256::from(256));
    assert_eq!(protocol.epoch(maker.address(), 1), U256::ZERO);
    assert!(protocol.nonce_equals(maker.address(), 0, U256::from(256)));
    assert!(protocol.epoch_equals(maker.address(), 1, U256::ZERO));
}

#[test]
fn epoch_orders_expire_with_their_epoch() {
    let (deployment, maker, taker) = setup();
    let epoch = |epoch| MakerTraits {
        need_check_epoch_manager: true,
        series: 2,
        nonce_or_epoch: epoch,
        ..Default::default()
    };
    let current = order(&maker).with_maker_traits(epoch(0)).build();
    let next = order(&maker).with_maker_traits(epoch(1)).build();

    assert!(fill_making(&deployment, &maker, &taker, &current, 10u64.wei()).is_ok());
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &next, 10u64.wei()),
        Err(Error::WrongSeriesNonce)
    );

    deployment
        .protocol
        .increase_nonce(maker.address(), 2)
        .unwrap();
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &current, 10u64.wei()),
        Err(Error::WrongSeriesNonce)
    );
    assert!(fill_making(&deployment, &maker, &taker, &next, 10u64.wei()).is_ok());

    let incompatible = order(&maker)
        .with_maker_traits(MakerTraits {
            no_partial_fills: true,
            ..epoch(1)
        })
        .build();
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &incompatible, 100u64.wei()),
        Err(Error::EpochManagerAndBitInvalidatorsAreIncompatible)
    );
}

/// A contract a predicate reads that tries to change state while being read.
#[test]
fn read_only_calls_cannot_change_state() {
    let (deployment, _, _) = setup();
    let spy = Address::repeat_byte(0x66);
    let attempts = Arc::new(Mutex::new(Vec::new()));
    {
        let protocol = deployment.protocol.clone();
        let attempts = attempts.clone();
        deployment.chain.deploy(spy, move |_| {
            attempts.lock().push(protocol.increase_nonce(spy, 0));
            Ok(U256::from(1).to_be_bytes::<32>().to_vec().into())
        });
    }

    let predicate = Predicate::ArbitraryCall {
        target: spy,
        data: Bytes::new(),
    };
    assert_eq!(deployment.protocol.check_predicate(&predicate.encode()), Ok(true));
    assert_eq!(*attempts.lock(), vec![Err(Error::StaticCallViolation)]);
    assert_eq!(deployment.protocol.nonce(spy, 0), U256::ZERO);
}
