use stellar_xdr::curr::{
    ScMap, ScMapEntry, ScVal, SorobanAddressCredentials, SorobanAuthorizationEntry,
    SorobanCredentials,
};

use crate::{Error, Result, Signature, SignerKey};

/// Adds `(signer, signature)` to the entry's signature map and sets its
/// expiration ledger.
///
/// A `Void` signature becomes a map holding just this pair. An existing map
/// keeps its entries and gains the new one, ordered by key. Duplicate keys
/// are not checked. Nothing is modified on error.
pub fn add_signature(
    entry: &mut SorobanAuthorizationEntry,
    signer: &SignerKey,
    signature: Option<&Signature>,
    signature_expiration_ledger: u32,
) -> Result<()> {
    let credentials = address_credentials_mut(entry)?;

    let mut signatures = match &credentials.signature {
        ScVal::Void => Vec::with_capacity(1),
        ScVal::Map(Some(map)) => map.0.to_vec(),
        ScVal::Map(None) => Vec::with_capacity(1),
        other => return Err(Error::UnsupportedSignatureContainer(other.name())),
    };

    signatures.push(ScMapEntry {
        key: signer.to_sc_val()?,
        val: Signature::option_to_sc_val(signature)?,
    });
    // stable, so colliding keys keep insertion order
    signatures.sort_by(|a, b| a.key.cmp(&b.key));
    let signatures = ScVal::Map(Some(ScMap(signatures.try_into()?)));

    credentials.signature = signatures;
    credentials.signature_expiration_ledger = signature_expiration_ledger;
    Ok(())
}

/// Value-returning form of [`add_signature`]
pub fn with_signature(
    mut entry: SorobanAuthorizationEntry,
    signer: &SignerKey,
    signature: Option<&Signature>,
    signature_expiration_ledger: u32,
) -> Result<SorobanAuthorizationEntry> {
    add_signature(&mut entry, signer, signature, signature_expiration_ledger)?;
    Ok(entry)
}

/// Decodes the signature map of an entry, in map order
pub fn signatures(
    entry: &SorobanAuthorizationEntry,
) -> Result<Vec<(SignerKey, Option<Signature>)>> {
    let credentials = address_credentials(entry)?;
    match &credentials.signature {
        ScVal::Void | ScVal::Map(None) => Ok(Vec::new()),
        ScVal::Map(Some(map)) => map
            .0
            .iter()
            .map(|e| {
                Ok((
                    SignerKey::from_sc_val(&e.key)?,
                    Signature::option_from_sc_val(&e.val)?,
                ))
            })
            .collect(),
        other => Err(Error::UnsupportedSignatureContainer(other.name())),
    }
}

pub fn address_credentials(
    entry: &SorobanAuthorizationEntry,
) -> Result<&SorobanAddressCredentials> {
    match &entry.credentials {
        SorobanCredentials::Address(credentials) => Ok(credentials),
        SorobanCredentials::SourceAccount => Err(Error::UnsupportedCredentials("source account")),
    }
}

pub fn address_credentials_mut(
    entry: &mut SorobanAuthorizationEntry,
) -> Result<&mut SorobanAddressCredentials> {
    match &mut entry.credentials {
        SorobanCredentials::Address(credentials) => Ok(credentials),
        SorobanCredentials::SourceAccount => Err(Error::UnsupportedCredentials("source account")),
    }
}

#[cfg(test)]
mod tests {
    use passkey_crypto::P256Signature;
    use passkey_webauthn::Secp256r1Signature;
    use rstest::{fixture, rstest};
    use stellar_xdr::curr::{
        Hash, InvokeContractArgs, ScAddress, ScSymbol, SorobanAuthorizedFunction,
        SorobanAuthorizedInvocation, VecM,
    };

    use super::*;
    use crate::ContractAddress;

    #[fixture]
    fn entry() -> SorobanAuthorizationEntry {
        SorobanAuthorizationEntry {
            credentials: SorobanCredentials::Address(SorobanAddressCredentials {
                address: ScAddress::Contract(Hash([0xc0; 32])),
                nonce: 5,
                signature_expiration_ledger: 0,
                signature: ScVal::Void,
            }),
            root_invocation: SorobanAuthorizedInvocation {
                function: SorobanAuthorizedFunction::ContractFn(InvokeContractArgs {
                    contract_address: ScAddress::Contract(Hash([1; 32])),
                    function_name: ScSymbol("transfer".try_into().unwrap()),
                    args: VecM::default(),
                }),
                sub_invocations: VecM::default(),
            },
        }
    }

    fn passkey(id: u8) -> (SignerKey, Signature) {
        (
            SignerKey::Secp256r1(vec![id; 16]),
            Signature::Secp256r1(Secp256r1Signature {
                authenticator_data: vec![id; 37],
                client_data_json: b"{}".to_vec(),
                signature: P256Signature([id; 64]),
            }),
        )
    }

    #[rstest]
    fn void_becomes_single_entry_map(mut entry: SorobanAuthorizationEntry) {
        let (key, signature) = passkey(1);
        add_signature(&mut entry, &key, Some(&signature), 100).unwrap();

        assert_eq!(signatures(&entry).unwrap(), [(key, Some(signature))]);
        assert_eq!(
            address_credentials(&entry).unwrap().signature_expiration_ledger,
            100
        );
    }

    #[rstest]
    fn signatures_accumulate(mut entry: SorobanAuthorizationEntry) {
        let mut expected = Vec::new();
        for (n, id) in [3u8, 1, 2].into_iter().enumerate() {
            let (key, signature) = passkey(id);
            add_signature(&mut entry, &key, Some(&signature), 200 + u32::from(id)).unwrap();
            expected.push((key, Some(signature)));

            let got = signatures(&entry).unwrap();
            assert_eq!(got.len(), n + 1);
            for pair in &expected {
                assert!(got.contains(pair));
            }
        }

        let keys: Vec<_> = signatures(&entry).unwrap().into_iter().map(|(k, _)| k).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        // last write wins
        assert_eq!(
            address_credentials(&entry).unwrap().signature_expiration_ledger,
            202
        );
    }

    #[rstest]
    fn mixed_signers(mut entry: SorobanAuthorizationEntry) {
        let policy = SignerKey::Policy(ContractAddress([0xbb; 32]));
        let ed25519 = SignerKey::Ed25519([0xee; 32]);

        add_signature(&mut entry, &ed25519, Some(&Signature::Ed25519([7; 64])), 10).unwrap();
        add_signature(&mut entry, &policy, None, 10).unwrap();

        assert_eq!(
            signatures(&entry).unwrap(),
            [
                (ed25519, Some(Signature::Ed25519([7; 64]))),
                (policy, None),
            ]
        );
    }

    #[rstest]
    fn duplicates_are_kept(mut entry: SorobanAuthorizationEntry) {
        let (key, signature) = passkey(1);
        add_signature(&mut entry, &key, Some(&signature), 1).unwrap();
        add_signature(&mut entry, &key, Some(&signature), 1).unwrap();
        assert_eq!(signatures(&entry).unwrap().len(), 2);
    }

    #[rstest]
    fn with_signature_returns_updated_entry(entry: SorobanAuthorizationEntry) {
        let (key, signature) = passkey(4);
        let signed = with_signature(entry.clone(), &key, Some(&signature), 9).unwrap();
        assert_ne!(signed, entry);
        assert_eq!(signatures(&signed).unwrap().len(), 1);
    }

    #[rstest]
    fn unsupported_container_leaves_entry_untouched(mut entry: SorobanAuthorizationEntry) {
        address_credentials_mut(&mut entry).unwrap().signature = ScVal::U32(1);
        let before = entry.clone();

        let (key, signature) = passkey(1);
        assert!(matches!(
            add_signature(&mut entry, &key, Some(&signature), 77),
            Err(Error::UnsupportedSignatureContainer("U32"))
        ));
        assert_eq!(entry, before);
    }

    #[rstest]
    fn source_account_is_unsupported(mut entry: SorobanAuthorizationEntry) {
        entry.credentials = SorobanCredentials::SourceAccount;
        let (key, signature) = passkey(1);
        assert!(matches!(
            add_signature(&mut entry, &key, Some(&signature), 77),
            Err(Error::UnsupportedCredentials(_))
        ));
        assert!(signatures(&entry).is_err());
    }
}
