//! WebAuthn ceremony options and responses in their JSON form, as exchanged
//! with `@simplewebauthn/browser`.

use serde::{Deserialize, Serialize};
use serde_with::{
    base64::{Base64, UrlSafe},
    formats::Unpadded,
    serde_as,
};
use thiserror::Error as ThisError;

/// COSE algorithm identifier of ES256 (ECDSA w/ SHA-256 over P-256)
pub const COSE_ALG_ES256: i64 = -7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PublicKeyCredentialType {
    #[default]
    #[serde(rename = "public-key")]
    PublicKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserVerificationRequirement {
    Required,
    #[default]
    Preferred,
    Discouraged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidentKeyRequirement {
    Discouraged,
    Preferred,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttestationConveyancePreference {
    #[default]
    None,
    Indirect,
    Direct,
    Enterprise,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyCredentialDescriptor {
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub id: Vec<u8>,
    #[serde(rename = "type", default)]
    pub typ: PublicKeyCredentialType,
}

impl PublicKeyCredentialDescriptor {
    #[inline]
    pub fn new(id: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            typ: PublicKeyCredentialType::PublicKey,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelyingParty {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub id: Vec<u8>,
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyCredentialParameters {
    pub alg: i64,
    #[serde(rename = "type", default)]
    pub typ: PublicKeyCredentialType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatorSelection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resident_key: Option<ResidentKeyRequirement>,
    #[serde(default)]
    pub require_resident_key: bool,
    #[serde(default)]
    pub user_verification: UserVerificationRequirement,
}

/// `PublicKeyCredentialCreationOptionsJSON`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationOptions {
    pub rp: RelyingParty,
    pub user: UserEntity,
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub challenge: Vec<u8>,
    pub pub_key_cred_params: Vec<PublicKeyCredentialParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_selection: Option<AuthenticatorSelection>,
    #[serde(default)]
    pub attestation: AttestationConveyancePreference,
}

/// `PublicKeyCredentialRequestOptionsJSON`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationOptions {
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub challenge: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rp_id: Option<String>,
    /// Empty for discoverable (resident) credentials
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow_credentials: Vec<PublicKeyCredentialDescriptor>,
    #[serde(default)]
    pub user_verification: UserVerificationRequirement,
}

/// `AuthenticatorAttestationResponseJSON`
///
/// Binary fields are kept base64url encoded: which of them a browser fills
/// in varies, and malformed optional ones are skipped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    #[serde(rename = "clientDataJSON")]
    pub client_data_json: String,
    pub attestation_object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticator_data: Option<String>,
    /// DER SubjectPublicKeyInfo
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_algorithm: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transports: Vec<String>,
}

/// `RegistrationResponseJSON`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub raw_id: Vec<u8>,
    pub response: AttestationResponse,
    #[serde(rename = "type", default)]
    pub typ: PublicKeyCredentialType,
}

/// `AuthenticatorAssertionResponseJSON`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssertionResponse {
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub authenticator_data: Vec<u8>,
    #[serde(rename = "clientDataJSON")]
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub client_data_json: Vec<u8>,
    /// ASN.1 DER encoded ECDSA signature
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub signature: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_handle: Option<String>,
}

/// `AuthenticationResponseJSON`
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub id: String,
    #[serde_as(as = "Base64<UrlSafe, Unpadded>")]
    pub raw_id: Vec<u8>,
    pub response: AssertionResponse,
    #[serde(rename = "type", default)]
    pub typ: PublicKeyCredentialType,
}

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum AuthenticatorError {
    #[error("ceremony cancelled by the user")]
    Cancelled,
    #[error("authenticator: {0}")]
    Platform(String),
}

/// Platform WebAuthn API, i.e. `navigator.credentials`
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn start_registration(
        &self,
        options: RegistrationOptions,
    ) -> Result<RegistrationResponse, AuthenticatorError>;

    async fn start_authentication(
        &self,
        options: AuthenticationOptions,
    ) -> Result<AuthenticationResponse, AuthenticatorError>;
}

#[allow(clippy::future_not_send)]
impl<T> Authenticator for &T
where
    T: Authenticator + ?Sized,
{
    #[inline]
    async fn start_registration(
        &self,
        options: RegistrationOptions,
    ) -> Result<RegistrationResponse, AuthenticatorError> {
        (**self).start_registration(options).await
    }

    #[inline]
    async fn start_authentication(
        &self,
        options: AuthenticationOptions,
    ) -> Result<AuthenticationResponse, AuthenticatorError> {
        (**self).start_authentication(options).await
    }
}
