use hex_literal::hex;
use passkey_auth::{
    ContractAddress,
    xdr::{
        Hash, HostFunction, InvokeContractArgs, InvokeHostFunctionOp, Memo, MuxedAccount, Operation,
        OperationBody, Preconditions, ScAddress, ScSymbol, ScVal, SequenceNumber,
        SorobanAddressCredentials, SorobanAuthorizationEntry, SorobanAuthorizedFunction,
        SorobanAuthorizedInvocation, SorobanCredentials, Transaction, TransactionEnvelope,
        TransactionExt, TransactionV1Envelope, Uint256, VecM,
    },
};
use passkey_wallet_sdk::Network;
use passkey_webauthn::COSE_EC2_P256_HEADER;

pub const TESTNET: &str = Network::TESTNET_PASSPHRASE;

pub const WALLET: ContractAddress = ContractAddress([0xc0; 32]);
pub const FACTORY: ContractAddress = ContractAddress([0xfa; 32]);
pub const POLICY: ContractAddress = ContractAddress([0xb0; 32]);
pub const TOKEN: ContractAddress = ContractAddress([0x70; 32]);

/// SHA-256 of `localhost`
pub const RP_ID_HASH: [u8; 32] =
    hex!("49960de5880e8c687434170f6476605b8fe4aeb9a28632c7995cf3ba831d9763");

pub const CREDENTIAL_ID: [u8; 20] = hex!("7db07573390caca2ae5e5defdffb701f4fd5a895");
pub const PUBLIC_KEY_X: [u8; 32] =
    hex!("91610ab866a7448b71a73e61344e72af9229abad5480f3839f69a6337b862af5");
pub const PUBLIC_KEY_Y: [u8; 32] =
    hex!("226a34d02d1bd2e0d8aff28377876e41d482aad7d51464791f6c8c9a0d73c6b8");

/// DER signature whose R has its high bit set, hence the `00` pad
pub const DER_SIGNATURE: [u8; 71] = hex!(
    "3045022100"
    "9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c"
    "0220"
    "1111111111111111111111111111111111111111111111111111111111111111"
);
pub const COMPACT_SIGNATURE: [u8; 64] = hex!(
    "9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c9c"
    "1111111111111111111111111111111111111111111111111111111111111111"
);

/// Registration authenticator data: flags `UP | UV | AT`, 20-byte
/// credential id, COSE EC2 P-256 key
pub fn attested_authenticator_data() -> Vec<u8> {
    [
        RP_ID_HASH.as_slice(),
        [0x45u8].as_slice(),
        0u32.to_be_bytes().as_slice(),
        [0u8; 16].as_slice(),
        hex!("0014").as_slice(),
        CREDENTIAL_ID.as_slice(),
        COSE_EC2_P256_HEADER.as_slice(),
        PUBLIC_KEY_X.as_slice(),
        hex!("225820").as_slice(),
        PUBLIC_KEY_Y.as_slice(),
    ]
    .concat()
}

/// Uncompressed point of the fixture key
pub fn fixture_public_key() -> [u8; 65] {
    let mut public_key = [0u8; 65];
    public_key[0] = 0x04;
    public_key[1..33].copy_from_slice(&PUBLIC_KEY_X);
    public_key[33..].copy_from_slice(&PUBLIC_KEY_Y);
    public_key
}

pub fn transfer_args() -> InvokeContractArgs {
    InvokeContractArgs {
        contract_address: TOKEN.to_sc_address(),
        function_name: ScSymbol("transfer".try_into().unwrap()),
        args: vec![
            ScVal::Address(WALLET.to_sc_address()),
            ScVal::Address(ScAddress::Contract(Hash([0xdd; 32]))),
            ScVal::U32(100),
        ]
        .try_into()
        .unwrap(),
    }
}

pub fn transfer_invocation() -> SorobanAuthorizedInvocation {
    SorobanAuthorizedInvocation {
        function: SorobanAuthorizedFunction::ContractFn(transfer_args()),
        sub_invocations: VecM::default(),
    }
}

/// Unsigned entry of `address` for [`transfer_invocation`]
pub fn auth_entry(address: ContractAddress, nonce: i64) -> SorobanAuthorizationEntry {
    SorobanAuthorizationEntry {
        credentials: SorobanCredentials::Address(SorobanAddressCredentials {
            address: address.to_sc_address(),
            nonce,
            signature_expiration_ledger: 0,
            signature: ScVal::Void,
        }),
        root_invocation: transfer_invocation(),
    }
}

pub fn envelope(operations: Vec<Operation>) -> TransactionEnvelope {
    TransactionEnvelope::Tx(TransactionV1Envelope {
        tx: Transaction {
            source_account: MuxedAccount::Ed25519(Uint256([0x5a; 32])),
            fee: 1_234_567,
            seq_num: SequenceNumber(42),
            cond: Preconditions::None,
            memo: Memo::None,
            operations: operations.try_into().unwrap(),
            ext: TransactionExt::V0,
        },
        signatures: VecM::default(),
    })
}

/// Single `transfer` invocation authorized by `auth`
pub fn invoke_envelope(auth: Vec<SorobanAuthorizationEntry>) -> TransactionEnvelope {
    envelope(vec![Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(transfer_args()),
            auth: auth.try_into().unwrap(),
        }),
    }])
}

/// Registration captured from a browser: `publicKey` SPKI, its
/// `authenticatorData` with a 64-byte credential id, and the matching
/// `attestationObject`, all base64url
pub const BROWSER_PUBLIC_KEY: &str = "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEIWhAQyE5H-_9WM__87tYZq3yJPQ0rostof00z3MMSMqG3SuBh2TaTUHQDwd4CHyArPQ4EhKoScPbq0zxm1k_Dw";
pub const BROWSER_AUTHENTICATOR_DATA: &str = "SZYN5YgOjGh0NBcPZHZgW4_krrmihjLHmVzzuoMdl2NBAAAABAAAAAAAAAAAAAAAAAAAAAAAQA8EYfqizPJVk0HtwVdqazrXmAyb7tuHDD7PzBmf6gFOyCngKjd1RCTIQHCpS3SMyeYULBg7Ykx6n1usOd5PlSilAQIDJiABIVggIWhAQyE5H-_9WM__87tYZq3yJPQ0rostof00z3MMSMoiWCCG3SuBh2TaTUHQDwd4CHyArPQ4EhKoScPbq0zxm1k_Dw";
pub const BROWSER_ATTESTATION_OBJECT: &str = "o2NmbXRkbm9uZWdhdHRTdG10oGhhdXRoRGF0YVjESZYN5YgOjGh0NBcPZHZgW4_krrmihjLHmVzzuoMdl2NBAAAABAAAAAAAAAAAAAAAAAAAAAAAQA8EYfqizPJVk0HtwVdqazrXmAyb7tuHDD7PzBmf6gFOyCngKjd1RCTIQHCpS3SMyeYULBg7Ykx6n1usOd5PlSilAQIDJiABIVggIWhAQyE5H-_9WM__87tYZq3yJPQ0rostof00z3MMSMoiWCCG3SuBh2TaTUHQDwd4CHyArPQ4EhKoScPbq0zxm1k_Dw";
/// Uncompressed point all three browser fields carry
pub const BROWSER_KEY: [u8; 65] = hex!(
    "04"
    "2168404321391feffd58cffff3bb5866adf224f434ae8b2da1fd34cf730c48ca"
    "86dd2b818764da4d41d00f0778087c80acf4381212a849c3dbab4cf19b593f0f"
);
