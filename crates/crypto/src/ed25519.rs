use core::fmt::{self, Debug, Display};
use std::str::FromStr;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

use crate::{Curve, CurveType, ParseCurveError, TypedCurve};

pub struct Ed25519;

impl Curve for Ed25519 {
    type PublicKey = [u8; ed25519_dalek::PUBLIC_KEY_LENGTH];
    type Signature = [u8; ed25519_dalek::SIGNATURE_LENGTH];

    type Message = [u8];
    type VerifyingKey = Self::PublicKey;

    #[inline]
    fn verify(
        signature: &Self::Signature,
        message: &Self::Message,
        public_key: &Self::VerifyingKey,
    ) -> Option<Self::PublicKey> {
        let verifying_key = VerifyingKey::from_bytes(public_key).ok()?;
        if verifying_key.is_weak() {
            // prevent using weak (i.e. low order) public keys, see
            // https://github.com/dalek-cryptography/ed25519-dalek#weak-key-forgery-and-verify_strict
            return None;
        }

        verifying_key
            .verify_strict(message, &ed25519_dalek::Signature::from_bytes(signature))
            .is_ok()
            .then_some(public_key)
            .copied()
    }
}

impl TypedCurve for Ed25519 {
    const CURVE_TYPE: CurveType = CurveType::Ed25519;
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ed25519PublicKey(pub <Ed25519 as Curve>::PublicKey);

impl Ed25519PublicKey {
    /// Stellar account address, i.e. `G...`
    pub fn to_strkey(&self) -> String {
        stellar_strkey::ed25519::PublicKey(self.0).to_string()
    }
}

impl Debug for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Ed25519PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&<Ed25519 as TypedCurve>::to_hex(self.0))
    }
}

impl FromStr for Ed25519PublicKey {
    type Err = ParseCurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.starts_with('G') {
            return Ok(Self(stellar_strkey::ed25519::PublicKey::from_string(s)?.0));
        }
        Ed25519::parse_hex(s).map(Self)
    }
}

/// Ed25519 signing key of a classic Stellar account
#[derive(Clone)]
pub struct Ed25519Keypair(SigningKey);

impl Ed25519Keypair {
    #[inline]
    pub fn from_seed(seed: &[u8; ed25519_dalek::SECRET_KEY_LENGTH]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Parses a Stellar secret seed, i.e. `S...`
    pub fn from_secret(secret: &str) -> Result<Self, ParseCurveError> {
        let seed = stellar_strkey::ed25519::PrivateKey::from_string(secret)?;
        Ok(Self::from_seed(&seed.0))
    }

    #[inline]
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.0.verifying_key().to_bytes())
    }

    #[inline]
    pub fn sign(&self, message: &[u8]) -> <Ed25519 as Curve>::Signature {
        self.0.sign(message).to_bytes()
    }
}

impl Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ed25519Keypair")
            .field(&self.public_key())
            .finish()
    }
}
