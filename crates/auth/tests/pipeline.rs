use passkey_auth::{
    CHECK_AUTH, NormalizedTransaction, Signature, SignerKey, add_signature, address_credentials,
    attach_policy, check_auth_target, entry_payload, scval, signatures,
    xdr::{ScVal, SorobanAuthorizedFunction},
};
use passkey_crypto::{Curve, Ed25519, Ed25519Keypair};
use passkey_test_utils::{
    ResultAssertsExt,
    fixtures::{POLICY, TESTNET, TOKEN, WALLET, auth_entry, invoke_envelope, transfer_args},
};
use rstest::rstest;

#[rstest]
fn policy_for_wallet_transfer() {
    let keypair = Ed25519Keypair::from_seed(&[3; 32]);
    let mut tx = NormalizedTransaction::new(invoke_envelope(vec![auth_entry(WALLET, 7)])).unwrap();
    attach_policy(&mut tx, 0, POLICY, WALLET).assert_error_contains("must be signed");
    assert_eq!(tx.auth_entries().len(), 1);

    let entry = &mut tx.auth_entries_mut()[0];
    let payload = entry_payload(TESTNET, entry, 1_060).unwrap();
    add_signature(
        entry,
        &SignerKey::from(keypair.public_key()),
        Some(&Signature::Ed25519(keypair.sign(&payload))),
        1_060,
    )
    .unwrap();
    let signed = entry.clone();
    attach_policy(&mut tx, 0, POLICY, WALLET).unwrap();

    let rebuilt = NormalizedTransaction::new(tx.to_xdr_base64().unwrap()).unwrap();
    let [wallet_entry, policy_entry]: [_; 2] = rebuilt.auth_entries().to_vec().try_into().unwrap();
    assert_eq!(wallet_entry, signed);

    let wallet = address_credentials(&wallet_entry).unwrap();
    let credentials = address_credentials(&policy_entry).unwrap();
    assert_eq!(credentials.address, POLICY.to_sc_address());
    assert_eq!(credentials.nonce, wallet.nonce);
    assert_eq!(
        credentials.signature_expiration_ledger,
        wallet.signature_expiration_ledger
    );
    assert_eq!(credentials.signature, ScVal::Void);
    assert_eq!(check_auth_target(&policy_entry), Some(&WALLET.to_sc_address()));

    let SorobanAuthorizedFunction::ContractFn(call) = &policy_entry.root_invocation.function else {
        panic!("expected a contract call");
    };
    assert_eq!(call.function_name.0.as_slice(), CHECK_AUTH.as_bytes());
    let [context] = call.args.as_slice() else {
        panic!("expected a single context argument");
    };
    let (tag, [fields]) = scval::as_variant(context, "context").unwrap() else {
        panic!("expected a context with one field");
    };
    assert_eq!(tag, b"Contract");
    let fields = scval::as_map(fields, "contract context").unwrap();
    assert_eq!(
        scval::field(fields, "contract", "contract context").unwrap(),
        &ScVal::Address(TOKEN.to_sc_address())
    );
    assert_eq!(
        scval::field(fields, "args", "contract context").unwrap(),
        &ScVal::Vec(Some(transfer_args().args.to_vec().try_into().unwrap()))
    );
}

#[rstest]
fn keypair_signature_end_to_end() {
    let keypair = Ed25519Keypair::from_seed(&[3; 32]);
    let mut tx = NormalizedTransaction::new(invoke_envelope(vec![
        auth_entry(TOKEN, 1),
        auth_entry(WALLET, 2),
    ]))
    .unwrap();

    let entry = &mut tx.auth_entries_mut()[1];
    let payload = entry_payload(TESTNET, entry, 500).unwrap();
    add_signature(
        entry,
        &SignerKey::from(keypair.public_key()),
        Some(&Signature::Ed25519(keypair.sign(&payload))),
        500,
    )
    .unwrap();

    let decoded = NormalizedTransaction::new(tx.to_xdr_base64().unwrap()).unwrap();
    let entries = decoded.auth_entries();
    assert_eq!(entries[0], auth_entry(TOKEN, 1));
    assert_eq!(
        address_credentials(&entries[1])
            .unwrap()
            .signature_expiration_ledger,
        500
    );

    let [(signer, Some(Signature::Ed25519(signature)))]: [_; 1] =
        signatures(&entries[1]).unwrap().try_into().unwrap()
    else {
        panic!("expected a single ed25519 signature");
    };
    assert_eq!(signer, SignerKey::Ed25519(keypair.public_key().0));
    assert_eq!(entry_payload(TESTNET, &entries[1], 500).unwrap(), payload);
    assert!(Ed25519::verify(&signature, &payload, &keypair.public_key().0).is_some());
}
