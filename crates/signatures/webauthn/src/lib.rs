//! WebAuthn (passkey) support for Soroban smart wallets: public key
//! extraction at registration, assertion signatures at authentication and
//! the [`Authenticator`] seam to the platform API.

mod assertion;
pub mod authenticator_data;
pub mod base64url;
mod ceremony;
mod public_key;

pub use self::{
    assertion::{AssertionError, Secp256r1Signature},
    authenticator_data::{AttestedCredentialData, AuthenticatorData, parse_authenticator_data},
    ceremony::*,
    public_key::{
        COSE_EC2_P256_HEADER, extract_public_key, from_attestation_object,
        from_authenticator_data, from_spki_tail,
    },
};

use passkey_crypto::cursor::Truncated;
use serde::{Deserialize, Serialize};
use serde_with::{
    base64::{Base64, UrlSafe},
    formats::Unpadded,
    serde_as,
};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PublicKeyError {
    #[error("public key decode: {0}")]
    Decode(&'static str),
    #[error("attested credential data flag is not set")]
    MissingAttestedCredentialData,
    #[error("public key decode: {0}")]
    Truncated(#[from] Truncated),
    #[error("base64url: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// For more details, refer to [WebAuthn specification](https://w3c.github.io/webauthn/#dictdef-collectedclientdata).
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectedClientData {
    #[serde(rename = "type")]
    pub typ: ClientDataType,

    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub challenge: Vec<u8>,

    pub origin: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientDataType {
    /// Serializes to the string `"webauthn.create"`
    #[serde(rename = "webauthn.create")]
    Create,

    /// Serializes to the string `"webauthn.get"`
    #[serde(rename = "webauthn.get")]
    Get,
}
