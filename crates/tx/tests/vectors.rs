//! End-to-end vectors: encode, sign, recover, and decode complete
//! transactions, with every digest and signature byte pinned.

use alloy_primitives::{address, b256, b64, hex, Address, B256, U256};
use assert_matches::assert_matches;
use meridian_tx::{
    Clause, Reserved, Transaction, TransactionBuilder, TransactionError, TransactionSigned,
    TxDynamicFee, TxType,
};

const SENDER_KEY: B256 =
    b256!("7582be841ca040aa940fff6c05773129e135623e41acce3e0b8ba520dc1ae26a");
const DELEGATOR_KEY: B256 =
    b256!("321d6443bc6177273b5abf54210fe806d451d6b7973bccc2384ef78bbcd0bf51");
const SENDER_ADDRESS: Address = address!("d989829d88b0ed1b06edf5c50174ecfa64f14a64");
const DELEGATOR_ADDRESS: Address = address!("d3ae78222beadb038203be21ed5ce7c9b1bff602");
const RECIPIENT: Address = address!("7567d83b7b8d80addcb281a71d54fc7b3364ffed");

fn legacy_transfer() -> Transaction {
    TransactionBuilder::new()
        .chain_tag(0x4A)
        .block_ref(b64!("00000000aabbccdd"))
        .expiration(32)
        .clause(Clause::new(RECIPIENT).with_value(U256::from(10_000u64)))
        .gas_price_coef(128)
        .gas(21_000)
        .nonce(12_345_678)
        .build()
}

fn dynamic_transfer() -> Transaction {
    TransactionBuilder::new()
        .chain_tag(0x4A)
        .block_ref(b64!("00000000aabbccdd"))
        .expiration(720)
        .clause(
            Clause::new(RECIPIENT)
                .with_value(U256::from(10_000u64))
                .with_data(hex!("000000606060").into()),
        )
        .clause(Clause::create_contract(hex!("deadbeef").into()))
        .max_priority_fee_per_gas(U256::from(1_000u64))
        .max_fee_per_gas(U256::from(10_000_000u64))
        .gas(210_000)
        .nonce(12_345_678)
        .build()
}

fn delegated_transfer() -> Transaction {
    TransactionBuilder::new()
        .chain_tag(0x4A)
        .block_ref(b64!("00000000aabbccdd"))
        .expiration(32)
        .clause(Clause::new(RECIPIENT).with_value(U256::from(10_000u64)))
        .gas_price_coef(0)
        .gas(21_000)
        .nonce(0x00D0_B1A5)
        .delegated()
        .build()
}

#[test]
fn legacy_sign_and_recover() {
    let signed = legacy_transfer().sign(&SENDER_KEY).unwrap();

    assert_eq!(
        signed.signing_hash(),
        b256!("05db13884d8bc4e2602ccd830bfb6b0d8373d4c384a58395133dce28dd4ddb2f")
    );
    assert_eq!(
        signed.signature.as_slice(),
        hex!(
            "294fc72692cd7020eb7f8dbb5b31223e9c47b44b7a1297bb9bc2bd6b0cd674761de79c1d726c238f017b7263c8075914f732629b226e6cf67f765a6ed20c27b100"
        )
    );
    assert_eq!(signed.origin().unwrap(), SENDER_ADDRESS);
    assert_eq!(signed.delegator().unwrap(), None);
    assert_eq!(
        signed.encoded().as_ref(),
        hex!(
            "f8734a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed8227108081808252088083bc614eb841294fc72692cd7020eb7f8dbb5b31223e9c47b44b7a1297bb9bc2bd6b0cd674761de79c1d726c238f017b7263c8075914f732629b226e6cf67f765a6ed20c27b100"
        )
    );
    assert_eq!(
        signed.id(),
        b256!("0568a98c41d3a88f6418df08617e01febb1a1731d731919b913ff527dfd59a2f")
    );

    let decoded = TransactionSigned::decode(&signed.encoded()).unwrap();
    assert_eq!(decoded, signed);
    assert_eq!(decoded.id(), signed.id());
}

#[test]
fn dynamic_fee_sign_and_recover() {
    let signed = dynamic_transfer().sign(&SENDER_KEY).unwrap();

    assert_eq!(signed.tx_type(), TxType::DynamicFee);
    assert_eq!(
        signed.signing_hash(),
        b256!("14b70442fd065c760ffa75f7940ffdb76f2e184c98b1f411d0d3ae8948f8152e")
    );
    assert_eq!(
        signed.signature.as_slice(),
        hex!(
            "99214dc6d7722e2f4ae86499a445aa8439ec701f945f21bdf974dbcbcc9c99f7406f079c5a73af95e949a428761e2982d8a4c9879c8de152799743f04394e19c01"
        )
    );
    assert_eq!(signed.origin().unwrap(), SENDER_ADDRESS);
    assert_eq!(
        signed.encoded().as_ref(),
        hex!(
            "51f8894a8800000000aabbccdd8202d0e8df947567d83b7b8d80addcb281a71d54fc7b3364ffed82271086000000606060c7808084deadbeef8203e883989680830334508083bc614eb84199214dc6d7722e2f4ae86499a445aa8439ec701f945f21bdf974dbcbcc9c99f7406f079c5a73af95e949a428761e2982d8a4c9879c8de152799743f04394e19c01"
        )
    );
    assert_eq!(
        signed.id(),
        b256!("1a2cf3a4d12d7ef39016d58415c26b534ffe65e94e1d83be7edc1443550c750b")
    );

    let decoded = TransactionSigned::decode(&signed.encoded()).unwrap();
    assert_eq!(decoded, signed);
}

#[test]
fn delegated_sign_and_recover() {
    let body = delegated_transfer();
    assert!(body.is_delegated());
    assert_eq!(
        body.encoded().as_ref(),
        hex!(
            "f14a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed82271080808252088083d0b1a5c101"
        )
    );
    assert_eq!(
        body.signing_hash(),
        b256!("a5d66c4043147eecff305df27b84ef7f2c7ec90316a003927b84a95a086fc8ed")
    );
    assert_eq!(
        body.delegation_signing_hash(SENDER_ADDRESS),
        b256!("4a9217789e998ac8286f1f20ebfbf8503c3eec59e2d2a90aaf55c69a5e8fff9c")
    );

    let signed = body.sign_delegated(&SENDER_KEY, &DELEGATOR_KEY).unwrap();
    assert_eq!(
        signed.signature.as_slice(),
        hex!(
            "238b8118ca366cce3b776e19fa0722181bf1c2f732c291a5cdb134c909d4bfa15e5b5f8aa839fbd1ddd287d537ab631f4dbdf60e9d7f8620f75b1022915caf1f01"
        )
    );
    assert_eq!(
        signed.delegator_signature.unwrap().as_slice(),
        hex!(
            "253adaf3d7b73beff8d3ebb146aac80df46a0ab6f849c0e4e93ddbfa924530f36d847d735b08330bdfa4569c260929527cef558441e70a26823cddf8245a83ba01"
        )
    );
    assert_eq!(signed.origin().unwrap(), SENDER_ADDRESS);
    assert_eq!(signed.delegator().unwrap(), Some(DELEGATOR_ADDRESS));
    assert_eq!(
        signed.encoded().as_ref(),
        hex!(
            "f8b54a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed82271080808252088083d0b1a5c101b882238b8118ca366cce3b776e19fa0722181bf1c2f732c291a5cdb134c909d4bfa15e5b5f8aa839fbd1ddd287d537ab631f4dbdf60e9d7f8620f75b1022915caf1f01253adaf3d7b73beff8d3ebb146aac80df46a0ab6f849c0e4e93ddbfa924530f36d847d735b08330bdfa4569c260929527cef558441e70a26823cddf8245a83ba01"
        )
    );
    assert_eq!(
        signed.id(),
        b256!("d386152e9d221b6236ec9c9e213cd6a9608c4e1783e670d4dd3ab386b1ec9673")
    );

    let decoded = TransactionSigned::decode(&signed.encoded()).unwrap();
    assert_eq!(decoded, signed);
    assert_eq!(decoded.delegator().unwrap(), Some(DELEGATOR_ADDRESS));
}

#[test]
fn delegation_hash_binds_the_origin() {
    // a gas payer signs for one specific sender; a different origin yields
    // a different digest
    let body = delegated_transfer();
    assert_ne!(
        body.delegation_signing_hash(SENDER_ADDRESS),
        body.delegation_signing_hash(DELEGATOR_ADDRESS),
    );
}

#[test]
fn delegator_recovery_is_independent_of_the_sender_key() {
    // same body, same gas-payer key, two different sender keys
    let first = delegated_transfer().sign_delegated(&SENDER_KEY, &DELEGATOR_KEY).unwrap();
    let second = delegated_transfer().sign_delegated(&DELEGATOR_KEY, &DELEGATOR_KEY).unwrap();

    assert_eq!(first.origin().unwrap(), SENDER_ADDRESS);
    assert_eq!(second.origin().unwrap(), DELEGATOR_ADDRESS);
    // the gas payer signs a digest bound to each origin, so the raw
    // signatures differ while the recovered address does not
    assert_ne!(first.delegator_signature, second.delegator_signature);
    assert_eq!(first.delegator().unwrap(), Some(DELEGATOR_ADDRESS));
    assert_eq!(second.delegator().unwrap(), Some(DELEGATOR_ADDRESS));
}

#[test]
fn unknown_reserved_entries_survive_a_round_trip() {
    let Transaction::Legacy(mut tx) = delegated_transfer() else { unreachable!() };
    tx.reserved = Reserved { features: 1, unused: vec![hex!("1234").into()] };
    let body = Transaction::Legacy(tx);
    assert_eq!(
        body.encoded().as_ref(),
        hex!(
            "f44a8800000000aabbccdd20dad9947567d83b7b8d80addcb281a71d54fc7b3364ffed82271080808252088083d0b1a5c401821234"
        )
    );

    let signed = body.sign_delegated(&SENDER_KEY, &DELEGATOR_KEY).unwrap();
    assert_eq!(
        signed.id(),
        b256!("cb3a508baa9e625999e612a10c93357cf0b41064a28bc88e36d4baeee0ce8b5f")
    );
    let decoded = TransactionSigned::decode(&signed.encoded()).unwrap();
    assert_eq!(decoded.transaction.reserved().unused, vec![alloy_primitives::Bytes::from(hex!("1234"))]);
    assert_eq!(decoded.encoded(), signed.encoded());
}

#[test]
fn intrinsic_gas_matches_declared_limits() {
    // one empty transfer clause prices at the familiar 21000
    assert_eq!(legacy_transfer().intrinsic_gas(), 21_000);
    // a call clause plus a creation clause, with their payload bytes
    let data_gas = (3 * 4 + 3 * 68) + 4 * 68;
    assert_eq!(dynamic_transfer().intrinsic_gas(), 5_000 + 16_000 + 48_000 + data_gas);
}

#[test]
fn foreign_type_discriminators_are_rejected() {
    assert_matches!(
        TransactionSigned::decode(&hex!("52c0")),
        Err(TransactionError::UnsupportedTxType(0x52))
    );
    assert_matches!(
        Transaction::decode(&hex!("01c0")),
        Err(TransactionError::UnsupportedTxType(0x01))
    );
}

#[test]
fn signing_a_tampered_body_changes_every_digest() {
    let baseline = legacy_transfer().sign(&SENDER_KEY).unwrap();
    let Transaction::Legacy(mut tx) = legacy_transfer() else { unreachable!() };
    tx.nonce += 1;
    let tampered = Transaction::Legacy(tx).sign(&SENDER_KEY).unwrap();
    assert_ne!(baseline.signing_hash(), tampered.signing_hash());
    assert_ne!(baseline.id(), tampered.id());
    // origin recovery still agrees, the key did not change
    assert_eq!(tampered.origin().unwrap(), SENDER_ADDRESS);
}

#[test]
fn builder_and_struct_literals_encode_identically() {
    let built = dynamic_transfer();
    let literal = Transaction::DynamicFee(TxDynamicFee {
        chain_tag: 0x4A,
        block_ref: b64!("00000000aabbccdd"),
        expiration: 720,
        clauses: vec![
            Clause {
                to: Some(RECIPIENT),
                value: U256::from(10_000u64),
                data: hex!("000000606060").into(),
            },
            Clause { to: None, value: U256::ZERO, data: hex!("deadbeef").into() },
        ],
        max_priority_fee_per_gas: U256::from(1_000u64),
        max_fee_per_gas: U256::from(10_000_000u64),
        gas: 210_000,
        depends_on: None,
        nonce: 12_345_678,
        reserved: Reserved::default(),
    });
    assert_eq!(built, literal);
    assert_eq!(built.encoded(), literal.encoded());
}

#[test]
fn depends_on_is_carried_and_recovered() {
    let parent = b256!("0568a98c41d3a88f6418df08617e01febb1a1731d731919b913ff527dfd59a2f");
    let Transaction::Legacy(mut tx) = legacy_transfer() else { unreachable!() };
    tx.depends_on = Some(parent);
    let body = Transaction::Legacy(tx);
    let decoded = Transaction::decode(&body.encoded()).unwrap();
    assert_eq!(decoded.depends_on(), Some(parent));

    // the all-zero id folds to the absent form on the wire
    let Transaction::Legacy(mut tx) = legacy_transfer() else { unreachable!() };
    tx.depends_on = Some(B256::ZERO);
    let folded = Transaction::decode(&Transaction::Legacy(tx).encoded()).unwrap();
    assert_eq!(folded.depends_on(), None);
}

#[test]
fn different_keys_give_different_origins() {
    let signed = legacy_transfer().sign(&DELEGATOR_KEY).unwrap();
    assert_eq!(signed.origin().unwrap(), DELEGATOR_ADDRESS);
    assert_ne!(signed.id(), legacy_transfer().sign(&SENDER_KEY).unwrap().id());
}
