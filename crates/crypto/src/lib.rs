//! Cryptographic primitives shared by the passkey signing pipeline.
//!
//! The [`Curve`] trait lets callers verify signatures from different
//! schemes uniformly, while [`compact_der_signature`] turns the ASN.1 DER
//! signatures produced by WebAuthn authenticators into the fixed-width,
//! low-S form expected by Soroban's `secp256r1_verify` host function.

pub mod cursor;
mod hash;
mod parse;

pub use self::{
    hash::{CryptoHash, sha256},
    parse::ParseCurveError,
};

#[cfg(feature = "ed25519")]
mod ed25519;
#[cfg(feature = "ed25519")]
pub use self::ed25519::*;

#[cfg(feature = "p256")]
mod p256;
#[cfg(feature = "p256")]
pub use self::p256::*;

#[cfg(feature = "p256")]
mod der;
#[cfg(feature = "p256")]
pub use self::der::{SignatureParseError, compact_der_signature, normalize_compact};

pub trait Curve {
    type PublicKey;
    type Signature;

    /// Message that can be signed by this curve
    type Message: AsRef<[u8]> + ?Sized;

    /// Public key that should be known prior to verification
    type VerifyingKey;

    fn verify(
        signature: &Self::Signature,
        message: &Self::Message,
        verifying_key: &Self::VerifyingKey,
    ) -> Option<Self::PublicKey>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CurveType {
    Ed25519,
    P256,
}

pub trait TypedCurve: Curve {
    const CURVE_TYPE: CurveType;

    #[inline]
    fn to_hex(bytes: impl AsRef<[u8]>) -> String {
        format!("{}:{}", Self::CURVE_TYPE, hex::encode(bytes))
    }

    /// Parses `<curve>:<hex>` or bare hex into a fixed-size array
    fn parse_hex<const N: usize>(s: impl AsRef<str>) -> Result<[u8; N], ParseCurveError> {
        let s = s.as_ref();
        let data = if let Some((curve, data)) = s.split_once(':') {
            if !curve.eq_ignore_ascii_case(Self::CURVE_TYPE.into()) {
                return Err(ParseCurveError::WrongCurveType);
            }
            data
        } else {
            s
        };
        parse::checked_hex_decode_array(data)
    }
}
