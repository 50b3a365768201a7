//! [Authenticator data](https://w3c.github.io/webauthn/#sctn-authenticator-data)

use passkey_crypto::cursor::{Cursor, Truncated};

use crate::PublicKeyError;

#[allow(clippy::identity_op)]
pub const AUTH_DATA_FLAGS_UP: u8 = 1 << 0;
pub const AUTH_DATA_FLAGS_UV: u8 = 1 << 2;
pub const AUTH_DATA_FLAGS_BE: u8 = 1 << 3;
pub const AUTH_DATA_FLAGS_BS: u8 = 1 << 4;
/// Attested credential data included
pub const AUTH_DATA_FLAGS_AT: u8 = 1 << 6;
/// Extension data included
pub const AUTH_DATA_FLAGS_ED: u8 = 1 << 7;

pub const RP_ID_HASH_LEN: usize = 32;
pub const AAGUID_LEN: usize = 16;

/// Offset of the flags byte
pub const FLAGS_OFFSET: usize = RP_ID_HASH_LEN;
/// Offset of the big-endian credential id length
pub const CREDENTIAL_ID_LEN_OFFSET: usize = FLAGS_OFFSET + 1 + 4 + AAGUID_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatorData<'a> {
    pub rp_id_hash: [u8; RP_ID_HASH_LEN],
    pub flags: u8,
    pub sign_count: u32,
    pub attested_credential: Option<AttestedCredentialData<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttestedCredentialData<'a> {
    pub aaguid: [u8; AAGUID_LEN],
    pub credential_id: &'a [u8],
    /// CBOR encoded COSE key, followed by extensions if any
    pub credential_public_key: &'a [u8],
}

impl AuthenticatorData<'_> {
    #[inline]
    pub const fn has_flags(&self, flags: u8) -> bool {
        self.flags & flags == flags
    }
}

pub fn parse_authenticator_data(data: &[u8]) -> Result<AuthenticatorData<'_>, Truncated> {
    let mut cursor = Cursor::new(data);

    let rp_id_hash = cursor.read_array()?;
    let flags = cursor.read_u8()?;
    let sign_count = cursor.read_u32_be()?;

    let attested_credential = if flags & AUTH_DATA_FLAGS_AT == AUTH_DATA_FLAGS_AT {
        let aaguid = cursor.read_array()?;
        let len = cursor.read_u16_be()?;
        let credential_id = cursor.read(len.into())?;
        Some(AttestedCredentialData {
            aaguid,
            credential_id,
            credential_public_key: cursor.remaining(),
        })
    } else {
        None
    };

    Ok(AuthenticatorData {
        rp_id_hash,
        flags,
        sign_count,
        attested_credential,
    })
}

/// Reads the P-256 coordinates of the attested credential at the fixed
/// offsets of a COSE EC2 key: `x` 10 bytes and `y` 45 bytes into the key.
pub(crate) fn attested_coordinates(data: &[u8]) -> Result<([u8; 32], [u8; 32]), PublicKeyError> {
    let cursor = Cursor::new(data);

    let flags = cursor.peek_at(FLAGS_OFFSET, 1)?[0];
    if flags & AUTH_DATA_FLAGS_AT != AUTH_DATA_FLAGS_AT {
        return Err(PublicKeyError::MissingAttestedCredentialData);
    }

    let len_bytes = cursor.peek_at(CREDENTIAL_ID_LEN_OFFSET, 2)?;
    let len = usize::from(u16::from_be_bytes([len_bytes[0], len_bytes[1]]));

    let mut x = [0u8; 32];
    x.copy_from_slice(cursor.peek_at(65 + len, 32)?);
    let mut y = [0u8; 32];
    y.copy_from_slice(cursor.peek_at(100 + len, 32)?);
    Ok((x, y))
}
