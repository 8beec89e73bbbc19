use {
    super::*,
    alloy_primitives::Address,
    alloy_sol_types::SolCall,
    limit_order::Error,
    model::{abi::ITakerInteraction, interaction::Interaction, traits::MakerTraits},
    parking_lot::Mutex,
    std::sync::Arc,
    testlib::{
        contracts,
        protocol::PROTOCOL,
        tokens::{PERMIT2, WETH},
    },
};

#[test]
fn maker_permit_replaces_the_approval() {
    let (deployment, maker, taker) = setup();
    deployment
        .chain
        .approve(DAI, maker.address(), PROTOCOL, U256::ZERO);
    let extension = Extension::builder()
        .maker_permit(maker.permit(DAI, PROTOCOL, 100u64.wei(), u64::MAX))
        .build();
    let order = order(&maker).with_extension(&extension).build();
    let traits = TakerTraits::making_amount();

    fill_with_extension(&deployment, &maker, &taker, &order, &extension, 40u64.wei(), traits)
        .unwrap();
    assert_eq!(deployment.balance(DAI, taker.address()), 40u64.wei());
    assert_eq!(
        deployment.chain.allowance(DAI, maker.address(), PROTOCOL),
        60u64.wei()
    );

    // Only the first fill runs the permit.
    fill_with_extension(&deployment, &maker, &taker, &order, &extension, 60u64.wei(), traits)
        .unwrap();
    assert_eq!(
        deployment.chain.allowance(DAI, maker.address(), PROTOCOL),
        U256::ZERO
    );
}

#[test]
fn failing_maker_permit_is_skipped() {
    let (deployment, maker, taker) = setup();
    let stranger = Account::new(0x77);
    let extension = Extension::builder()
        .maker_permit(stranger.permit(DAI, PROTOCOL, 100u64.wei(), u64::MAX))
        .build();
    let order = order(&maker).with_extension(&extension).build();

    let fill = fill_with_extension(
        &deployment,
        &maker,
        &taker,
        &order,
        &extension,
        40u64.wei(),
        TakerTraits::making_amount(),
    )
    .unwrap();
    assert_eq!(fill.making_amount, 40u64.wei());
}

#[test]
fn taker_permit_runs_before_the_fill() {
    let (deployment, maker, taker) = setup();
    deployment
        .chain
        .approve(USDC, taker.address(), PROTOCOL, U256::ZERO);
    let order = order(&maker).build();
    let signature = maker.sign_order(&order, &deployment.domain);

    let fill = |permit: &[u8]| {
        deployment.protocol.fill_order_to_with_permit(
            taker.address(),
            &order,
            signature.r,
            signature.vs,
            40u64.wei(),
            TakerTraits::making_amount(),
            &[],
            permit,
        )
    };
    let expired = taker.permit(USDC, PROTOCOL, 40u64.wei(), 0);
    deployment.chain.set_timestamp(1);
    assert_eq!(fill(&expired.encode()), Err(Error::PermitFailed));

    let permit = taker.permit(USDC, PROTOCOL, 40u64.wei(), u64::MAX);
    assert!(fill(&permit.encode()).is_ok());
    assert_eq!(deployment.balance(USDC, maker.address()), 40u64.wei());
}

#[test]
fn permit2_transfers() {
    let (deployment, maker, taker) = setup();
    deployment
        .chain
        .approve(DAI, maker.address(), PROTOCOL, U256::ZERO);
    deployment
        .chain
        .approve(DAI, maker.address(), PERMIT2, U256::MAX);
    deployment
        .chain
        .permit2_approve(maker.address(), DAI, PROTOCOL, 50u64.wei());
    let order = order(&maker)
        .with_maker_traits(MakerTraits {
            use_permit2: true,
            ..Default::default()
        })
        .build();

    fill_making(&deployment, &maker, &taker, &order, 40u64.wei()).unwrap();
    assert_eq!(deployment.balance(DAI, taker.address()), 40u64.wei());
    assert_eq!(
        fill_making(&deployment, &maker, &taker, &order, 20u64.wei()),
        Err(Error::TransferFromMakerToTakerFailed)
    );
}

#[test]
fn taker_receives_unwrapped_weth() {
    let (deployment, maker, taker) = setup();
    deployment.fund(&maker, WETH, 100u64.wei());
    let weth_order = order(&maker).with_maker_asset(WETH).build();
    let traits = TakerTraits {
        unwrap_weth: true,
        ..TakerTraits::making_amount()
    };

    fill(&deployment, &maker, &taker, &weth_order, 40u64.wei(), traits).unwrap();
    assert_eq!(deployment.chain.native_balance(taker.address()), 40u64.wei());
    assert_eq!(deployment.balance(WETH, taker.address()), U256::ZERO);
    assert_eq!(deployment.chain.native_balance(PROTOCOL), U256::ZERO);

    let dai_order = order(&maker).build();
    assert_eq!(
        fill(&deployment, &maker, &taker, &dai_order, 40u64.wei(), traits),
        Err(Error::UnwrapFailed)
    );
}

#[test]
fn maker_receives_unwrapped_weth() {
    let (deployment, maker, taker) = setup();
    deployment.fund(&taker, WETH, 100u64.wei());
    let order = order(&maker)
        .with_taker_asset(WETH)
        .with_maker_traits(MakerTraits {
            unwrap_weth: true,
            ..Default::default()
        })
        .build();

    fill_making(&deployment, &maker, &taker, &order, 40u64.wei()).unwrap();
    assert_eq!(deployment.chain.native_balance(maker.address()), 40u64.wei());
}

#[test]
fn target_and_taker_interaction() {
    let (deployment, maker, taker) = setup();
    let recipient = Address::repeat_byte(0x88);
    let hook = Address::repeat_byte(0x89);
    let seen = Arc::new(Mutex::new(Vec::new()));
    {
        let seen = seen.clone();
        deployment.chain.deploy(hook, move |call| {
            let interaction =
                ITakerInteraction::takerInteractionCall::abi_decode(&call.data).unwrap();
            // The maker leg has settled, the taker leg has not.
            seen.lock().push((
                interaction.makingAmount,
                call.chain.balance_of(DAI, recipient),
                call.chain.balance_of(USDC, interaction.order.maker),
            ));
            Ok(Bytes::new())
        });
    }
    let order = order(&maker).build();
    let signature = maker.sign_order(&order, &deployment.domain);
    let interaction = Interaction::new(hook, Bytes::new()).encode();
    let (traits, args) = TakerArgs {
        target: Some(recipient),
        extension: &[],
        interaction: &interaction,
    }
    .encode(TakerTraits::making_amount());

    deployment
        .protocol
        .fill_order_args(
            taker.address(),
            &order,
            signature.r,
            signature.vs,
            40u64.wei(),
            traits,
            &args,
        )
        .unwrap();
    assert_eq!(*seen.lock(), vec![(40u64.wei(), 40u64.wei(), U256::ZERO)]);
    assert_eq!(deployment.balance(DAI, recipient), 40u64.wei());
    assert_eq!(deployment.balance(USDC, maker.address()), 40u64.wei());
}

#[test]
fn smart_contract_makers_sign_through_eip1271() {
    let (deployment, owner, taker) = setup();
    let wallet = Address::repeat_byte(0x99);
    deployment.chain.deploy(wallet, contracts::wallet(owner.address()));
    deployment.chain.mint(DAI, wallet, 100u64.wei());
    deployment
        .chain
        .approve(DAI, wallet, PROTOCOL, U256::MAX);
    let order = order(&owner).with_maker(wallet).build();
    let hash = order.hash(&deployment.domain);

    let forged = taker.sign(&hash).to_bytes();
    assert_eq!(
        deployment.protocol.fill_contract_order(
            taker.address(),
            &order,
            &forged,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::BadSignature)
    );

    let signature = owner.sign(&hash).to_bytes();
    let fill = deployment
        .protocol
        .fill_contract_order(
            taker.address(),
            &order,
            &signature,
            40u64.wei(),
            TakerTraits::making_amount(),
        )
        .unwrap();
    assert_eq!(fill.making_amount, 40u64.wei());
    assert_eq!(deployment.balance(USDC, wallet), 40u64.wei());
}

#[test]
fn smart_contract_makers_fill_with_args() {
    let (deployment, owner, taker) = setup();
    let wallet = Address::repeat_byte(0x9a);
    deployment.chain.deploy(wallet, contracts::wallet(owner.address()));
    deployment.chain.mint(DAI, wallet, 100u64.wei());
    deployment.chain.approve(DAI, wallet, PROTOCOL, U256::MAX);
    let extension = Extension::builder().custom_data(vec![7]).build();
    let order = order(&owner)
        .with_maker(wallet)
        .with_extension(&extension)
        .build();
    let signature = owner.sign(&order.hash(&deployment.domain)).to_bytes();
    let extension = extension.encode();
    let (traits, args) = args(&extension, TakerTraits::making_amount());

    assert_eq!(
        deployment.protocol.fill_contract_order(
            taker.address(),
            &order,
            &signature,
            40u64.wei(),
            TakerTraits::making_amount(),
        ),
        Err(Error::MissingOrderExtension)
    );
    let fill = deployment
        .protocol
        .fill_contract_order_args(taker.address(), &order, &signature, 40u64.wei(), traits, &args)
        .unwrap();
    assert_eq!(fill.making_amount, 40u64.wei());
    assert_eq!(deployment.balance(DAI, taker.address()), 40u64.wei());
    assert_eq!(deployment.balance(USDC, wallet), 40u64.wei());
}

#[test]
fn asset_suffixes_are_appended() {
    let (deployment, maker, taker) = setup();
    let proxy = Address::repeat_byte(0xa1);
    let calls = Arc::new(Mutex::new(Vec::new()));
    {
        let calls = calls.clone();
        deployment.chain.deploy(proxy, move |call| {
            calls.lock().push(call.data.clone());
            Ok(U256::from(1).to_be_bytes::<32>().to_vec().into())
        });
    }
    let extension = Extension::builder()
        .maker_asset_suffix(Bytes::from_static(&[0xaa; 8]))
        .build();
    let order = order(&maker)
        .with_maker_asset(proxy)
        .with_extension(&extension)
        .build();

    fill_with_extension(
        &deployment,
        &maker,
        &taker,
        &order,
        &extension,
        40u64.wei(),
        TakerTraits::making_amount(),
    )
    .unwrap();
    let calls = calls.lock();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].len(), 4 + 3 * 32 + 8);
    assert!(calls[0].ends_with(&[0xaa; 8]));
}
