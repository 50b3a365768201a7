use std::sync::Mutex;

use hex_literal::hex;
use p256::ecdsa::{Signature, SigningKey, signature::Signer};
use passkey_crypto::{P256PublicKey, sha256};
use passkey_webauthn::{
    AssertionResponse, AttestationResponse, AuthenticationOptions, AuthenticationResponse,
    Authenticator, AuthenticatorError, COSE_ALG_ES256, ClientDataType, CollectedClientData,
    PublicKeyCredentialType, RegistrationOptions, RegistrationResponse,
    authenticator_data::{AUTH_DATA_FLAGS_AT, AUTH_DATA_FLAGS_UP, AUTH_DATA_FLAGS_UV},
    base64url,
};

/// DER prefix of a P-256 `SubjectPublicKeyInfo`
pub const SPKI_P256_PREFIX: [u8; 26] =
    hex!("3059301306072a8648ce3d020106082a8648ce3d030107034200");

/// CBOR map of three entries up to the `authData` byte string header
const ATTESTATION_OBJECT_HEADER: [u8; 28] =
    hex!("a3" "63666d74" "646e6f6e65" "6761747453746d74" "a0" "68" "6175746844617461");

/// Key material a registration response carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttestationFormat {
    /// `publicKey`, `authenticatorData` and `attestationObject`
    #[default]
    Full,
    AuthenticatorData,
    /// Only the CBOR attestation object, as older browsers report
    AttestationObject,
}

/// In-memory platform authenticator holding a single P-256 credential
#[derive(Debug)]
pub struct SoftwareAuthenticator {
    signing_key: SigningKey,
    credential_id: Vec<u8>,
    rp_id: String,
    origin: String,
    format: AttestationFormat,
    high_s: bool,
    cancelled: bool,
    registrations: Mutex<Vec<RegistrationOptions>>,
    authentications: Mutex<Vec<AuthenticationOptions>>,
}

impl SoftwareAuthenticator {
    pub fn new(seed: [u8; 32], credential_id: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(&seed.into()).unwrap(),
            credential_id: credential_id.into(),
            rp_id: "localhost".to_owned(),
            origin: "http://localhost:5173".to_owned(),
            format: AttestationFormat::default(),
            high_s: false,
            cancelled: false,
            registrations: Mutex::default(),
            authentications: Mutex::default(),
        }
    }

    #[must_use]
    pub const fn with_format(mut self, format: AttestationFormat) -> Self {
        self.format = format;
        self
    }

    /// Emits signatures with `S > n/2`, as some authenticators do
    #[must_use]
    pub const fn with_high_s(mut self) -> Self {
        self.high_s = true;
        self
    }

    /// Every ceremony fails as if the user dismissed the prompt
    #[must_use]
    pub const fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }

    pub fn credential_id(&self) -> &[u8] {
        &self.credential_id
    }

    pub fn public_key(&self) -> P256PublicKey {
        P256PublicKey(
            self.signing_key
                .verifying_key()
                .to_encoded_point(false)
                .as_bytes()
                .try_into()
                .unwrap(),
        )
    }

    pub fn registrations(&self) -> Vec<RegistrationOptions> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn authentications(&self) -> Vec<AuthenticationOptions> {
        self.authentications.lock().unwrap().clone()
    }

    pub fn spki(&self) -> Vec<u8> {
        [SPKI_P256_PREFIX.as_slice(), self.public_key().as_bytes()].concat()
    }

    pub fn authenticator_data(&self, attested: bool) -> Vec<u8> {
        let mut flags = AUTH_DATA_FLAGS_UP | AUTH_DATA_FLAGS_UV;
        if attested {
            flags |= AUTH_DATA_FLAGS_AT;
        }

        let mut data = sha256(&self.rp_id).to_vec();
        data.push(flags);
        data.extend_from_slice(&1u32.to_be_bytes());
        if attested {
            let public_key = self.public_key();
            let (x, y) = public_key.as_bytes()[1..].split_at(32);

            data.extend_from_slice(&[0; 16]);
            let len = u16::try_from(self.credential_id.len()).unwrap();
            data.extend_from_slice(&len.to_be_bytes());
            data.extend_from_slice(&self.credential_id);
            data.extend_from_slice(&passkey_webauthn::COSE_EC2_P256_HEADER);
            data.extend_from_slice(x);
            data.extend_from_slice(&hex!("225820"));
            data.extend_from_slice(y);
        }
        data
    }

    /// `{"fmt": "none", "attStmt": {}, "authData": <bytes>}` in CBOR
    pub fn attestation_object(authenticator_data: &[u8]) -> Vec<u8> {
        let mut object = ATTESTATION_OBJECT_HEADER.to_vec();
        let len = authenticator_data.len();
        match u8::try_from(len) {
            Ok(len) => object.extend_from_slice(&[0x58, len]),
            Err(_) => {
                object.push(0x59);
                object.extend_from_slice(&u16::try_from(len).unwrap().to_be_bytes());
            }
        }
        object.extend_from_slice(authenticator_data);
        object
    }

    pub fn client_data_json(&self, typ: ClientDataType, challenge: &[u8]) -> Vec<u8> {
        serde_json::to_vec(&CollectedClientData {
            typ,
            challenge: challenge.to_vec(),
            origin: self.origin.clone(),
        })
        .unwrap()
    }

    /// DER signature over `authenticator_data || SHA-256(client_data_json)`
    pub fn sign(&self, authenticator_data: &[u8], client_data_json: &[u8]) -> Vec<u8> {
        let message = [authenticator_data, sha256(client_data_json).as_slice()].concat();
        let signature: Signature = self.signing_key.sign(&message);
        let low = signature.normalize_s().unwrap_or(signature);
        let signature = if self.high_s {
            Signature::from_scalars(low.r(), -*low.s()).unwrap()
        } else {
            low
        };
        signature.to_der().as_bytes().to_vec()
    }
}

impl Authenticator for SoftwareAuthenticator {
    async fn start_registration(
        &self,
        options: RegistrationOptions,
    ) -> Result<RegistrationResponse, AuthenticatorError> {
        self.registrations.lock().unwrap().push(options.clone());
        if self.cancelled {
            return Err(AuthenticatorError::Cancelled);
        }
        if !options
            .pub_key_cred_params
            .iter()
            .any(|param| param.alg == COSE_ALG_ES256)
        {
            return Err(AuthenticatorError::Platform(
                "no supported algorithm".to_owned(),
            ));
        }

        let authenticator_data = self.authenticator_data(true);
        let client_data_json = self.client_data_json(ClientDataType::Create, &options.challenge);
        let attestation_object = Self::attestation_object(&authenticator_data);

        let (public_key, authenticator_data) = match self.format {
            AttestationFormat::Full => (
                Some(base64url::encode(self.spki())),
                Some(base64url::encode(&authenticator_data)),
            ),
            AttestationFormat::AuthenticatorData => {
                (None, Some(base64url::encode(&authenticator_data)))
            }
            AttestationFormat::AttestationObject => (None, None),
        };

        Ok(RegistrationResponse {
            id: base64url::encode(&self.credential_id),
            raw_id: self.credential_id.clone(),
            response: AttestationResponse {
                client_data_json: base64url::encode(client_data_json),
                attestation_object: base64url::encode(attestation_object),
                authenticator_data,
                public_key,
                public_key_algorithm: Some(COSE_ALG_ES256),
                transports: vec!["internal".to_owned()],
            },
            typ: PublicKeyCredentialType::PublicKey,
        })
    }

    async fn start_authentication(
        &self,
        options: AuthenticationOptions,
    ) -> Result<AuthenticationResponse, AuthenticatorError> {
        self.authentications.lock().unwrap().push(options.clone());
        if self.cancelled {
            return Err(AuthenticatorError::Cancelled);
        }
        if !options.allow_credentials.is_empty()
            && !options
                .allow_credentials
                .iter()
                .any(|credential| credential.id == self.credential_id)
        {
            return Err(AuthenticatorError::Platform(
                "no matching credential".to_owned(),
            ));
        }

        let authenticator_data = self.authenticator_data(false);
        let client_data_json = self.client_data_json(ClientDataType::Get, &options.challenge);
        let signature = self.sign(&authenticator_data, &client_data_json);

        Ok(AuthenticationResponse {
            id: base64url::encode(&self.credential_id),
            raw_id: self.credential_id.clone(),
            response: AssertionResponse {
                authenticator_data,
                client_data_json,
                signature,
                user_handle: None,
            },
            typ: PublicKeyCredentialType::PublicKey,
        })
    }
}
