use passkey_crypto::{
    CryptoHash, Curve, P256, P256PublicKey, P256Signature, SignatureParseError,
    compact_der_signature, sha256,
};
use thiserror::Error as ThisError;

use crate::{
    AssertionResponse, ClientDataType, CollectedClientData, UserVerificationRequirement,
    authenticator_data::{
        AUTH_DATA_FLAGS_BE, AUTH_DATA_FLAGS_BS, AUTH_DATA_FLAGS_UP, AUTH_DATA_FLAGS_UV,
        FLAGS_OFFSET,
    },
};

/// WebAuthn assertion over a Soroban authorization payload, with the
/// signature in compact low-S form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secp256r1Signature {
    pub authenticator_data: Vec<u8>,
    pub client_data_json: Vec<u8>,
    pub signature: P256Signature,
}

/// Reason an assertion would be refused by the wallet's `__check_auth`
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AssertionError {
    #[error("authenticator data ends before the flags byte")]
    MissingFlags,
    #[error("user presence flag is not set")]
    UserNotPresent,
    #[error("user verification flag is not set")]
    UserNotVerified,
    #[error("backup state flag set on a credential that is not backup eligible")]
    InconsistentBackupState,
    #[error("client data: {0}")]
    ClientData(String),
    #[error("client data is not from a webauthn.get ceremony")]
    WrongCeremony,
    #[error("challenge is not the authorization payload")]
    ChallengeMismatch,
    #[error("signature does not match the public key")]
    InvalidSignature,
}

impl Secp256r1Signature {
    pub fn from_assertion(response: AssertionResponse) -> Result<Self, SignatureParseError> {
        let signature = compact_der_signature(&response.signature)?;
        Ok(Self {
            authenticator_data: response.authenticator_data,
            client_data_json: response.client_data_json,
            signature: P256Signature(signature),
        })
    }

    /// Checks the assertion the way the wallet contract does before it
    /// accepts a `Secp256r1` signer: flags, ceremony type, challenge and
    /// finally the signature over `authenticatorData || SHA-256(clientDataJSON)`.
    ///
    /// The RP id hash and origin are left to the relying party.
    pub fn check(
        &self,
        payload: &CryptoHash,
        public_key: &P256PublicKey,
        user_verification: UserVerificationRequirement,
    ) -> Result<(), AssertionError> {
        let flags = *self
            .authenticator_data
            .get(FLAGS_OFFSET)
            .ok_or(AssertionError::MissingFlags)?;
        check_flags(flags, user_verification)?;

        let client_data: CollectedClientData = serde_json::from_slice(&self.client_data_json)
            .map_err(|err| AssertionError::ClientData(err.to_string()))?;
        if client_data.typ != ClientDataType::Get {
            return Err(AssertionError::WrongCeremony);
        }
        if client_data.challenge != payload.as_slice() {
            return Err(AssertionError::ChallengeMismatch);
        }

        let message = sha256(
            [
                self.authenticator_data.as_slice(),
                sha256(&self.client_data_json).as_slice(),
            ]
            .concat(),
        );
        if P256::verify(&self.signature.0, &message, &public_key.0).is_none() {
            return Err(AssertionError::InvalidSignature);
        }
        Ok(())
    }
}

const fn has(flags: u8, flag: u8) -> bool {
    flags & flag == flag
}

const fn check_flags(
    flags: u8,
    user_verification: UserVerificationRequirement,
) -> Result<(), AssertionError> {
    if !has(flags, AUTH_DATA_FLAGS_UP) {
        return Err(AssertionError::UserNotPresent);
    }
    if matches!(user_verification, UserVerificationRequirement::Required)
        && !has(flags, AUTH_DATA_FLAGS_UV)
    {
        return Err(AssertionError::UserNotVerified);
    }
    if has(flags, AUTH_DATA_FLAGS_BS) && !has(flags, AUTH_DATA_FLAGS_BE) {
        return Err(AssertionError::InconsistentBackupState);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use p256::ecdsa::{Signature, SigningKey, signature::Signer};
    use rstest::rstest;

    use super::*;
    use crate::base64url;

    struct Fixture {
        key: SigningKey,
        public_key: P256PublicKey,
        challenge: CryptoHash,
    }

    impl Fixture {
        fn new() -> Self {
            let key = SigningKey::from_bytes(&[3u8; 32].into()).unwrap();
            let public_key = P256PublicKey::from_sec1(
                key.verifying_key().to_encoded_point(false).as_bytes(),
            )
            .unwrap();
            Self {
                key,
                public_key,
                challenge: sha256(b"authorization preimage"),
            }
        }

        fn assertion(&self, typ: &str, challenge: &[u8], flags: u8) -> AssertionResponse {
            let mut authenticator_data = vec![0x11; 32];
            authenticator_data.push(flags);
            authenticator_data.extend_from_slice(&[0, 0, 0, 9]);

            let client_data_json = format!(
                r#"{{"type":"{typ}","challenge":"{}","origin":"https://passkey.example","crossOrigin":false}}"#,
                base64url::encode(challenge),
            )
            .into_bytes();

            let signed = [
                authenticator_data.as_slice(),
                sha256(&client_data_json).as_slice(),
            ]
            .concat();
            let signature: Signature = self.key.sign(&signed);

            AssertionResponse {
                authenticator_data,
                client_data_json,
                signature: signature.to_der().as_bytes().to_vec(),
                user_handle: None,
            }
        }
    }

    #[test]
    fn accepts_normalized_assertion() {
        let f = Fixture::new();
        let assertion = f.assertion("webauthn.get", &f.challenge, AUTH_DATA_FLAGS_UP);
        let signature = Secp256r1Signature::from_assertion(assertion).unwrap();

        assert!(P256::is_low_s(&signature.signature.0));
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Preferred),
            Ok(())
        );
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Required),
            Err(AssertionError::UserNotVerified)
        );
    }

    #[rstest]
    #[case::wrong_type("webauthn.create", AUTH_DATA_FLAGS_UP, AssertionError::WrongCeremony)]
    #[case::user_not_present("webauthn.get", AUTH_DATA_FLAGS_UV, AssertionError::UserNotPresent)]
    #[case::backup_state_without_eligibility(
        "webauthn.get",
        AUTH_DATA_FLAGS_UP | AUTH_DATA_FLAGS_BS,
        AssertionError::InconsistentBackupState
    )]
    fn rejects(#[case] typ: &str, #[case] flags: u8, #[case] expected: AssertionError) {
        let f = Fixture::new();
        let signature =
            Secp256r1Signature::from_assertion(f.assertion(typ, &f.challenge, flags)).unwrap();
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Discouraged),
            Err(expected)
        );
    }

    #[test]
    fn rejects_other_challenge() {
        let f = Fixture::new();
        let signature =
            Secp256r1Signature::from_assertion(f.assertion("webauthn.get", b"other", 0x05))
                .unwrap();
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Required),
            Err(AssertionError::ChallengeMismatch)
        );
    }

    #[test]
    fn rejects_tampered_authenticator_data() {
        let f = Fixture::new();
        let mut signature = Secp256r1Signature::from_assertion(f.assertion(
            "webauthn.get",
            &f.challenge,
            AUTH_DATA_FLAGS_UP,
        ))
        .unwrap();
        signature.authenticator_data[36] ^= 1;
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Preferred),
            Err(AssertionError::InvalidSignature)
        );
    }

    #[test]
    fn rejects_unreadable_inputs() {
        let f = Fixture::new();
        let mut signature = Secp256r1Signature::from_assertion(f.assertion(
            "webauthn.get",
            &f.challenge,
            AUTH_DATA_FLAGS_UP,
        ))
        .unwrap();

        signature.client_data_json = b"not json".to_vec();
        assert!(matches!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Preferred),
            Err(AssertionError::ClientData(_))
        ));

        signature.authenticator_data.truncate(FLAGS_OFFSET);
        assert_eq!(
            signature.check(&f.challenge, &f.public_key, UserVerificationRequirement::Preferred),
            Err(AssertionError::MissingFlags)
        );
    }

    #[test]
    fn malformed_der() {
        let f = Fixture::new();
        let mut assertion = f.assertion("webauthn.get", &f.challenge, AUTH_DATA_FLAGS_UP);
        assertion.signature[0] = 0x31;
        assert_eq!(
            Secp256r1Signature::from_assertion(assertion).unwrap_err(),
            SignatureParseError::NotASequence(0x31)
        );
    }
}
