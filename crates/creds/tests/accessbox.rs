//! Integration tests for the access-box credential flow
//!
//! These exercise the full issuance-to-retrieval path the way the gateway
//! uses it: build bundles, pack a box, marshal it into "storage", then have
//! each gateway node unmarshal and recover its own bundle.

use rand_core::OsRng;

use creds::prelude::*;

fn shared_bundle() -> GateBundle {
    GateBundle::new(
        Some(BearerToken::from(b"signed-bearer-token".as_slice())),
        vec![
            SessionToken::from(b"session-token-acl".as_slice()),
            SessionToken::from(b"session-token-policy".as_slice()),
        ],
    )
}

#[test]
fn test_ten_recipients_recover_identical_bundle() {
    let owner = SecretKey::generate();

    let keys: Vec<SecretKey> = (0..10).map(|_| SecretKey::generate()).collect();
    let entries = keys
        .iter()
        .map(|k| (k.public(), shared_bundle()))
        .collect();

    let boxed = AccessBox::pack(&owner, entries, &mut OsRng).unwrap();

    // the box travels through external storage as opaque bytes
    let stored = boxed.marshal();
    let fetched = AccessBox::unmarshal(&stored).unwrap();

    for (i, key) in keys.iter().enumerate() {
        let bundle = fetched.get_gate_bundle(key).unwrap();
        assert_eq!(bundle, shared_bundle(), "recipient #{}", i);
    }

    // one wrong key gets unknown-key, not garbage and not a decryption error
    let wrong = SecretKey::generate();
    assert!(matches!(
        fetched.get_gate_bundle(&wrong),
        Err(AccessBoxError::UnknownKey)
    ));
}

#[test]
fn test_distinct_bundles_per_gateway_node() {
    let owner = SecretKey::generate();
    let node_a = SecretKey::generate();
    let node_b = SecretKey::generate();

    // node A handles objects only, node B additionally manages one container
    let bundle_a = GateBundle::new(Some(BearerToken::from(b"bearer-a".as_slice())), vec![]);
    let bundle_b = GateBundle::new(
        Some(BearerToken::from(b"bearer-b".as_slice())),
        vec![SessionToken::from(b"session-b".as_slice())],
    );

    let boxed = AccessBox::pack(
        &owner,
        vec![
            (node_a.public(), bundle_a.clone()),
            (node_b.public(), bundle_b.clone()),
        ],
        &mut OsRng,
    )
    .unwrap();

    assert_eq!(boxed.get_gate_bundle(&node_a).unwrap(), bundle_a);
    assert_eq!(boxed.get_gate_bundle(&node_b).unwrap(), bundle_b);
}

#[test]
fn test_flipping_any_ciphertext_byte_is_detected() {
    let owner = SecretKey::generate();
    let recipient = SecretKey::generate();

    let boxed = AccessBox::pack(
        &owner,
        vec![(recipient.public(), shared_bundle())],
        &mut OsRng,
    )
    .unwrap();
    let bytes = boxed.marshal();

    // owner key (32) + count (4) + recipient key (32) + nonce (12) + len (4)
    let ciphertext_start = 32 + 4 + 32 + 12 + 4;
    assert!(bytes.len() > ciphertext_start);

    for i in ciphertext_start..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 0x01;

        let err = AccessBox::unmarshal(&tampered)
            .unwrap()
            .get_gate_bundle(&recipient)
            .unwrap_err();
        assert!(
            matches!(err, AccessBoxError::Decryption(_)),
            "flipped byte {} gave {:?}",
            i,
            err
        );
    }
}

#[test]
fn test_session_only_and_empty_bundles_survive_storage() {
    let owner = SecretKey::generate();
    let session_only = SecretKey::generate();
    let empty = SecretKey::generate();

    let boxed = AccessBox::pack(
        &owner,
        vec![
            (
                session_only.public(),
                GateBundle::new(None, vec![SessionToken::from(b"acl-only".as_slice())]),
            ),
            (empty.public(), GateBundle::empty()),
        ],
        &mut OsRng,
    )
    .unwrap();

    let fetched = AccessBox::unmarshal(&boxed.marshal()).unwrap();

    let bundle = fetched.get_gate_bundle(&session_only).unwrap();
    assert!(bundle.bearer().is_none());
    assert_eq!(bundle.sessions().len(), 1);

    let bundle = fetched.get_gate_bundle(&empty).unwrap();
    assert_eq!(bundle, GateBundle::empty());
}

#[test]
fn test_record_order_survives_storage() {
    let owner = SecretKey::generate();
    let keys: Vec<SecretKey> = (0..5).map(|_| SecretKey::generate()).collect();
    let entries = keys
        .iter()
        .map(|k| (k.public(), GateBundle::empty()))
        .collect();

    let boxed = AccessBox::pack(&owner, entries, &mut OsRng).unwrap();
    let fetched = AccessBox::unmarshal(&boxed.marshal()).unwrap();

    let original: Vec<_> = boxed.records().iter().map(|r| *r.recipient()).collect();
    let restored: Vec<_> = fetched.records().iter().map(|r| *r.recipient()).collect();
    assert_eq!(original, restored);

    let expected: Vec<_> = keys.iter().map(|k| k.public()).collect();
    assert_eq!(original, expected);
}
