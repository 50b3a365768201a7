use thiserror::Error as ThisError;

use crate::{
    P256,
    cursor::{Cursor, Truncated},
};

const SEQUENCE: u8 = 0x30;
const INTEGER: u8 = 0x02;
const SCALAR_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum SignatureParseError {
    #[error("expected DER SEQUENCE tag 0x30, found {0:#04x}")]
    NotASequence(u8),
    #[error("expected DER INTEGER tag 0x02, found {0:#04x}")]
    NotAnInteger(u8),
    #[error("invalid DER INTEGER length {0}")]
    InvalidIntegerLength(u8),
    #[error(transparent)]
    Truncated(#[from] Truncated),
    #[error("signature scalar out of range")]
    InvalidScalar,
}

/// Converts an ASN.1 DER encoded ECDSA signature
/// (`SEQUENCE { r INTEGER, s INTEGER }`) into concatenated `r || s` with
/// `s` normalized to the lower half of the P-256 group order.
pub fn compact_der_signature(der: &[u8]) -> Result<[u8; 64], SignatureParseError> {
    let mut cursor = Cursor::new(der);

    let tag = cursor.read_u8()?;
    if tag != SEQUENCE {
        return Err(SignatureParseError::NotASequence(tag));
    }
    // sequence length, always short form for P-256
    cursor.skip(1)?;

    let r = read_integer(&mut cursor)?;
    let s = read_integer(&mut cursor)?;

    let mut compact = [0u8; 64];
    compact[..SCALAR_LEN].copy_from_slice(&r);
    compact[SCALAR_LEN..].copy_from_slice(&s);

    normalize_compact(&compact)
}

/// Low-S form of a compact `r || s` signature
#[inline]
pub fn normalize_compact(signature: &[u8; 64]) -> Result<[u8; 64], SignatureParseError> {
    P256::normalize_s(signature)
}

fn read_integer(cursor: &mut Cursor<'_>) -> Result<[u8; SCALAR_LEN], SignatureParseError> {
    let tag = cursor.read_u8()?;
    if tag != INTEGER {
        return Err(SignatureParseError::NotAnInteger(tag));
    }

    let len = cursor.read_u8()?;
    let mut value = cursor.read(len.into())?;
    match value.len() {
        0 => return Err(SignatureParseError::InvalidIntegerLength(len)),
        // positive integers with the high bit set carry a leading zero
        33 if value[0] == 0 => value = &value[1..],
        n if n > SCALAR_LEN => return Err(SignatureParseError::InvalidIntegerLength(len)),
        _ => {}
    }

    let mut scalar = [0u8; SCALAR_LEN];
    scalar[SCALAR_LEN - value.len()..].copy_from_slice(value);
    Ok(scalar)
}
