use core::fmt::{self, Debug, Display};
use std::str::FromStr;

use p256::{
    EncodedPoint,
    ecdsa::{Signature, VerifyingKey, signature::hazmat::PrehashVerifier},
    elliptic_curve::scalar::IsHigh,
};

use crate::{CryptoHash, Curve, CurveType, ParseCurveError, SignatureParseError, TypedCurve};

/// SEC1 tag of an uncompressed point
pub const SEC1_UNCOMPRESSED_TAG: u8 = 0x04;

pub struct P256;

impl Curve for P256 {
    /// Uncompressed SEC1 encoded point, i.e. `0x04 || x || y`
    type PublicKey = [u8; 65];

    /// Concatenated `r || s` coordinates
    type Signature = [u8; 64];

    // Output of cryptographic hash function
    type Message = CryptoHash;

    type VerifyingKey = Self::PublicKey;

    fn verify(
        signature: &Self::Signature,
        prehashed: &Self::Message,
        public_key: &Self::VerifyingKey,
    ) -> Option<Self::PublicKey> {
        let signature = Signature::from_slice(signature).ok()?;

        if signature.s().is_high().into() {
            // Soroban rejects malleable signatures
            return None;
        }

        let verifying_key = VerifyingKey::from_sec1_bytes(public_key).ok()?;

        verifying_key
            .verify_prehash(prehashed, &signature)
            .is_ok()
            .then_some(public_key)
            .copied()
    }
}

impl TypedCurve for P256 {
    const CURVE_TYPE: CurveType = CurveType::P256;
}

impl P256 {
    /// Replaces `s` with `n - s` when `s` lies in the upper half of the
    /// group order. Canonical input is returned unchanged.
    pub fn normalize_s(signature: &[u8; 64]) -> Result<[u8; 64], SignatureParseError> {
        let (r, s) = signature.split_at(32);
        let mut r_bytes = [0u8; 32];
        r_bytes.copy_from_slice(r);
        let mut s_bytes = [0u8; 32];
        s_bytes.copy_from_slice(s);

        let signature = Signature::from_scalars(r_bytes, s_bytes)
            .map_err(|_| SignatureParseError::InvalidScalar)?;
        let normalized = signature.normalize_s().unwrap_or(signature);

        let mut out = [0u8; 64];
        out.copy_from_slice(&normalized.to_bytes());
        Ok(out)
    }

    /// Whether `s` is at most half the group order
    pub fn is_low_s(signature: &[u8; 64]) -> bool {
        Signature::from_slice(signature).is_ok_and(|sig| !bool::from(sig.s().is_high()))
    }
}

/// Uncompressed public key with leading SEC1 tag byte
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct P256PublicKey(pub <P256 as Curve>::PublicKey);

impl P256PublicKey {
    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Self {
        let mut point = [0u8; 65];
        point[0] = SEC1_UNCOMPRESSED_TAG;
        point[1..33].copy_from_slice(x);
        point[33..].copy_from_slice(y);
        Self(point)
    }

    /// Accepts exactly 65 bytes starting with the uncompressed tag
    pub fn from_sec1(bytes: &[u8]) -> Option<Self> {
        let point: [u8; 65] = bytes.try_into().ok()?;
        (point[0] == SEC1_UNCOMPRESSED_TAG).then_some(Self(point))
    }

    /// Whether the coordinates describe a point on the curve
    pub fn is_on_curve(&self) -> bool {
        EncodedPoint::from_bytes(self.0)
            .ok()
            .and_then(|point| VerifyingKey::from_encoded_point(&point).ok())
            .is_some()
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }
}

impl Debug for P256PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for P256PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&<P256 as TypedCurve>::to_hex(self.0))
    }
}

impl FromStr for P256PublicKey {
    type Err = ParseCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        P256::parse_hex(s).map(Self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct P256Signature(pub <P256 as Curve>::Signature);

impl Debug for P256Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for P256Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&<P256 as TypedCurve>::to_hex(self.0))
    }
}

impl FromStr for P256Signature {
    type Err = ParseCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        P256::parse_hex(s).map(Self)
    }
}
