use sha2::{Digest, Sha256};

/// Output of SHA-256
pub type CryptoHash = [u8; 32];

#[inline]
pub fn sha256(data: impl AsRef<[u8]>) -> CryptoHash {
    Sha256::digest(data).into()
}
