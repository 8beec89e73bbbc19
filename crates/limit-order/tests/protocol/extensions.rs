use {
    super::*,
    alloy_primitives::{Address, address},
    alloy_sol_types::SolCall,
    limit_order::{Error, amounts::dutch_auction, predicate::Predicate},
    model::{abi::IPreInteraction, interaction::Interaction},
    parking_lot::Mutex,
    std::sync::Arc,
    testlib::{contracts, protocol::PROTOCOL},
};

const CALCULATOR: Address = address!("00000000000000000000000000000000000ca1c0");

#[test]
fn timestamp_predicate() {
    let (deployment, maker, taker) = setup();
    let extension = Extension::builder()
        .predicate(Predicate::TimestampBelow(2_000).encode())
        .build();
    let order = order(&maker).with_extension(&extension).build();
    let traits = TakerTraits::making_amount();

    deployment.chain.set_timestamp(2_000);
    assert_eq!(
        fill_with_extension(&deployment, &maker, &taker, &order, &extension, 40u64.wei(), traits),
        Err(Error::PredicateIsNotTrue)
    );
    deployment.chain.set_timestamp(1_999);
    assert!(
        fill_with_extension(&deployment, &maker, &taker, &order, &extension, 40u64.wei(), traits)
            .is_ok()
    );
}

#[test]
fn predicates_can_call_contracts() {
    let (deployment, maker, taker) = setup();
    let oracle = Address::repeat_byte(0x0c);
    deployment
        .chain
        .deploy(oracle, contracts::constant(U256::from(42)));
    let passing = Predicate::And(vec![
        Predicate::gt(U256::from(41), oracle, Vec::new()),
        Predicate::not(Predicate::eq(U256::from(7), oracle, Vec::new())),
    ]);
    let failing = Predicate::Or(vec![
        Predicate::lt(U256::from(42), oracle, Vec::new()),
        Predicate::ArbitraryCall {
            target: oracle,
            data: Bytes::new(),
        },
    ]);

    assert_eq!(deployment.protocol.check_predicate(&passing.encode()), Ok(true));
    assert_eq!(deployment.protocol.check_predicate(&failing.encode()), Ok(false));

    let extension = Extension::builder().predicate(failing.encode()).build();
    let order = order(&maker).with_extension(&extension).build();
    assert_eq!(
        fill_with_extension(
            &deployment,
            &maker,
            &taker,
            &order,
            &extension,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::PredicateIsNotTrue)
    );
}

#[test]
fn extension_is_bound_to_the_order() {
    let (deployment, maker, taker) = setup();
    let extension = Extension::builder().custom_data(vec![1, 2, 3]).build();
    let other = Extension::builder().custom_data(vec![1, 2, 4]).build();
    let order = order(&maker).with_extension(&extension).build();
    let traits = TakerTraits::making_amount();

    assert_eq!(
        fill_with_extension(&deployment, &maker, &taker, &order, &other, 40u64.wei(), traits),
        Err(Error::InvalidExtensionHash)
    );
    assert_eq!(
        fill(&deployment, &maker, &taker, &order, 40u64.wei(), traits),
        Err(Error::MissingOrderExtension)
    );
    assert!(
        fill_with_extension(&deployment, &maker, &taker, &order, &extension, 40u64.wei(), traits)
            .is_ok()
    );

    let plain = super::order(&maker).build();
    assert_eq!(
        fill_with_extension(&deployment, &maker, &taker, &plain, &extension, 40u64.wei(), traits),
        Err(Error::UnexpectedOrderExtension)
    );
}

#[test]
fn dutch_auction_prices_by_time() {
    let (deployment, maker, taker) = setup();
    deployment
        .chain
        .deploy(CALCULATOR, contracts::dutch_auction_calculator());
    let window = dutch_auction::pack_window(1_000, 2_000);
    let extension = Extension::builder()
        .making_amount_getter(dutch_auction::making_amount_getter(
            CALCULATOR,
            window,
            200u64.wei(),
            100u64.wei(),
            100u64.wei(),
        ))
        .taking_amount_getter(dutch_auction::taking_amount_getter(
            CALCULATOR,
            window,
            200u64.wei(),
            100u64.wei(),
            100u64.wei(),
        ))
        .build();
    let order = order(&maker).with_extension(&extension).build();

    deployment.chain.set_timestamp(1_500);
    let by_making = fill_with_extension(
        &deployment,
        &maker,
        &taker,
        &order,
        &extension,
        40u64.wei(),
        TakerTraits::making_amount(),
    )
    .unwrap();
    assert_eq!(by_making.taking_amount, 60u64.wei());

    deployment.chain.set_timestamp(2_500);
    let by_taking = fill_with_extension(
        &deployment,
        &maker,
        &taker,
        &order,
        &extension,
        30u64.wei(),
        TakerTraits::taking_amount(),
    )
    .unwrap();
    assert_eq!(by_taking.making_amount, 30u64.wei());
    assert_eq!(
        deployment.protocol.remaining(maker.address(), order.hash(&deployment.domain)),
        Ok(30u64.wei())
    );
}

#[test]
fn failing_getter_fails_the_fill() {
    let (deployment, maker, taker) = setup();
    let extension = Extension::builder()
        .taking_amount_getter(Interaction::new(CALCULATOR, vec![0xde, 0xad]))
        .build();
    deployment
        .chain
        .deploy(CALCULATOR, contracts::dutch_auction_calculator());
    let order = order(&maker).with_extension(&extension).build();

    assert_eq!(
        fill_with_extension(
            &deployment,
            &maker,
            &taker,
            &order,
            &extension,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::GetAmountCallFailed)
    );
}

#[test]
fn pre_interaction_sees_the_fill() {
    let (deployment, maker, taker) = setup();
    let hook = Address::repeat_byte(0x45);
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        deployment.chain.deploy(hook, move |call| {
            let hook = IPreInteraction::preInteractionCall::abi_decode(&call.data).unwrap();
            seen.lock().push((
                call.from,
                hook.taker,
                hook.makingAmount,
                hook.takingAmount,
                hook.remainingMakingAmount,
                hook.extraData,
            ));
            Ok(Bytes::new())
        });
    }
    let extension = Extension::builder()
        .pre_interaction(Interaction::new(hook, vec![0xbe, 0xef]))
        .build();
    let order = order(&maker).with_extension(&extension).build();
    let traits = TakerTraits::making_amount();

    fill_with_extension(&deployment, &maker, &taker, &order, &extension, 40u64.wei(), traits)
        .unwrap();
    fill_with_extension(&deployment, &maker, &taker, &order, &extension, 10u64.wei(), traits)
        .unwrap();
    assert_eq!(
        *seen.lock(),
        vec![
            (
                PROTOCOL,
                taker.address(),
                40u64.wei(),
                40u64.wei(),
                100u64.wei(),
                Bytes::from(vec![0xbe, 0xef]),
            ),
            (
                PROTOCOL,
                taker.address(),
                10u64.wei(),
                10u64.wei(),
                60u64.wei(),
                Bytes::from(vec![0xbe, 0xef]),
            ),
        ]
    );
}

#[test]
fn reverting_hook_reverts_the_fill() {
    let (deployment, maker, taker) = setup();
    let hook = Address::repeat_byte(0x46);
    deployment
        .chain
        .deploy(hook, |_| Err(testlib::chain::revert("no")));
    let extension = Extension::builder()
        .post_interaction(Interaction::new(hook, Vec::new()))
        .build();
    let order = order(&maker).with_extension(&extension).build();

    assert!(matches!(
        fill_with_extension(
            &deployment,
            &maker,
            &taker,
            &order,
            &extension,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::InteractionFailed(_))
    ));
    assert_eq!(deployment.balance(DAI, taker.address()), U256::ZERO);
    assert_eq!(
        deployment
            .protocol
            .raw_remaining(maker.address(), order.hash(&deployment.domain)),
        U256::ZERO
    );
}

#[test]
fn malformed_predicate_fails() {
    let (deployment, maker, taker) = setup();
    let extension = Extension::builder().predicate(vec![0xff]).build();
    let order = order(&maker).with_extension(&extension).build();

    assert!(matches!(
        fill_with_extension(
            &deployment,
            &maker,
            &taker,
            &order,
            &extension,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::MalformedPredicate(_))
    ));
}
