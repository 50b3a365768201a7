use passkey_crypto::{CryptoHash, sha256};
use stellar_xdr::curr::{
    Hash, HashIdPreimage, HashIdPreimageSorobanAuthorization, Limits, SorobanAuthorizationEntry,
    SorobanAuthorizedInvocation, SorobanCredentials, WriteXdr,
};

use crate::{Error, Result};

/// Network id is the SHA-256 of the network passphrase
#[inline]
pub fn network_id(passphrase: &str) -> Hash {
    Hash(sha256(passphrase))
}

pub fn authorization_preimage(
    passphrase: &str,
    nonce: i64,
    signature_expiration_ledger: u32,
    invocation: SorobanAuthorizedInvocation,
) -> HashIdPreimage {
    HashIdPreimage::SorobanAuthorization(HashIdPreimageSorobanAuthorization {
        network_id: network_id(passphrase),
        nonce,
        signature_expiration_ledger,
        invocation,
    })
}

/// SHA-256 of the XDR encoded preimage, i.e. the bytes signers sign
pub fn authorization_payload(
    passphrase: &str,
    nonce: i64,
    signature_expiration_ledger: u32,
    invocation: SorobanAuthorizedInvocation,
) -> Result<CryptoHash> {
    let preimage =
        authorization_preimage(passphrase, nonce, signature_expiration_ledger, invocation);
    Ok(sha256(preimage.to_xdr(Limits::none())?))
}

/// Payload of an entry with address credentials, signed to expire at
/// `signature_expiration_ledger`
pub fn entry_payload(
    passphrase: &str,
    entry: &SorobanAuthorizationEntry,
    signature_expiration_ledger: u32,
) -> Result<CryptoHash> {
    let SorobanCredentials::Address(credentials) = &entry.credentials else {
        return Err(Error::UnsupportedCredentials("source account"));
    };
    authorization_payload(
        passphrase,
        credentials.nonce,
        signature_expiration_ledger,
        entry.root_invocation.clone(),
    )
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;
    use stellar_xdr::curr::{
        Hash, InvokeContractArgs, ScAddress, ScSymbol, ScVal, SorobanAuthorizedFunction, VecM,
    };

    use super::*;

    const TESTNET: &str = "Test SDF Network ; September 2015";

    fn invocation(function_name: &str) -> SorobanAuthorizedInvocation {
        SorobanAuthorizedInvocation {
            function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                contract_address: ScAddress::Contract(Hash([1; 32])),
                function_name: ScSymbol(function_name.try_into().unwrap()),
                args: vec![ScVal::U32(7)].try_into().unwrap(),
            }),
            sub_invocations: VecM::default(),
        }
    }

    #[test]
    fn testnet_network_id() {
        assert_eq!(
            network_id(TESTNET).0,
            hex!("cee0302d59844d32bdca915c8203dd44b33fbb7edc19051ea37abedf28ecd472")
        );
    }

    #[test]
    fn preimage_xdr_layout() {
        let preimage = authorization_preimage(TESTNET, -1, 0x0102_0304, invocation("transfer"));
        let xdr = preimage.to_xdr(Limits::none()).unwrap();

        // ENVELOPE_TYPE_SOROBAN_AUTHORIZATION
        assert_eq!(&xdr[..4], &9u32.to_be_bytes());
        assert_eq!(&xdr[4..36], &network_id(TESTNET).0);
        assert_eq!(&xdr[36..44], &(-1i64).to_be_bytes());
        assert_eq!(&xdr[44..48], &hex!("01020304"));
    }

    #[test]
    fn deterministic() {
        let a = authorization_payload(TESTNET, 42, 1000, invocation("transfer")).unwrap();
        let b = authorization_payload(TESTNET, 42, 1000, invocation("transfer")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn every_field_is_committed() {
        let base = authorization_payload(TESTNET, 42, 1000, invocation("transfer")).unwrap();

        for other in [
            authorization_payload(
                "Public Global Stellar Network ; September 2015",
                42,
                1000,
                invocation("transfer"),
            ),
            authorization_payload(TESTNET, 43, 1000, invocation("transfer")),
            authorization_payload(TESTNET, 42, 1001, invocation("transfer")),
            authorization_payload(TESTNET, 42, 1000, invocation("approve")),
        ] {
            assert_ne!(other.unwrap(), base);
        }
    }

    #[test]
    fn source_account_credentials_are_unsupported() {
        let entry = SorobanAuthorizationEntry {
            credentials: SorobanCredentials::SourceAccount,
            root_invocation: invocation("transfer"),
        };
        assert!(matches!(
            entry_payload(TESTNET, &entry, 1),
            Err(Error::UnsupportedCredentials(_))
        ));
    }
}
