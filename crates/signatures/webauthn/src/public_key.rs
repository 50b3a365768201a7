use passkey_crypto::{P256PublicKey, cursor::Cursor};

use crate::{
    PublicKeyError, RegistrationResponse, authenticator_data::attested_coordinates, base64url,
};

/// COSE_Key map header of an EC2 P-256 ES256 key up to the `x` coordinate:
/// `{1: 2, 3: -7, -1: 1, -2: bstr(32)`
pub const COSE_EC2_P256_HEADER: [u8; 10] = [
    0xa5, 0x01, 0x02, 0x03, 0x26, 0x20, 0x01, 0x21, 0x58, 0x20,
];
/// `-3: bstr(32)` preceding the `y` coordinate
const COSE_Y_HEADER_LEN: usize = 3;

const SEC1_UNCOMPRESSED_LEN: usize = 65;

/// Extracts the credential's uncompressed P-256 public key from a
/// registration response.
///
/// The `publicKey` field (DER SubjectPublicKeyInfo) is preferred. Browsers
/// that omit it or return something else fall back to the attested
/// credential in `authenticatorData`, and finally to scanning the raw
/// `attestationObject` for the COSE key.
pub fn extract_public_key(
    response: &RegistrationResponse,
) -> Result<P256PublicKey, PublicKeyError> {
    let response = &response.response;

    if let Some(public_key) = response
        .public_key
        .as_deref()
        .and_then(|pk| base64url::decode(pk).ok())
        .and_then(|spki| from_spki_tail(&spki))
    {
        return Ok(public_key);
    }

    if let Some(authenticator_data) = response.authenticator_data.as_deref() {
        return from_authenticator_data(&base64url::decode(authenticator_data)?);
    }

    from_attestation_object(&base64url::decode(&response.attestation_object)?)
}

/// Last 65 bytes of a SubjectPublicKeyInfo, which end with the SEC1 point
pub fn from_spki_tail(spki: &[u8]) -> Option<P256PublicKey> {
    let start = spki.len().checked_sub(SEC1_UNCOMPRESSED_LEN)?;
    P256PublicKey::from_sec1(&spki[start..])
}

pub fn from_authenticator_data(data: &[u8]) -> Result<P256PublicKey, PublicKeyError> {
    let (x, y) = attested_coordinates(data)?;
    Ok(P256PublicKey::from_coordinates(&x, &y))
}

pub fn from_attestation_object(attestation: &[u8]) -> Result<P256PublicKey, PublicKeyError> {
    let header = attestation
        .windows(COSE_EC2_P256_HEADER.len())
        .position(|w| w == COSE_EC2_P256_HEADER)
        .ok_or(PublicKeyError::Decode("COSE P-256 key not found"))?;

    let mut cursor = Cursor::new(attestation);
    cursor.seek(header + COSE_EC2_P256_HEADER.len())?;
    let x = cursor.read_array()?;
    cursor.skip(COSE_Y_HEADER_LEN)?;
    let y = cursor.read_array()?;

    Ok(P256PublicKey::from_coordinates(&x, &y))
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::{AttestationResponse, authenticator_data::AUTH_DATA_FLAGS_AT};

    const X: [u8; 32] = hex!("91610ab866a7448b71a73e61344e72af9229abad5480f3839f69a6337b862af5");
    const Y: [u8; 32] = hex!("226a34d02d1bd2e0d8aff28377876e41d482aad7d51464791f6c8c9a0d73c6b8");
    const CREDENTIAL_ID: [u8; 20] = hex!("7db07573390caca2ae5e5defdffb701f4fd5a895");

    fn expected() -> P256PublicKey {
        P256PublicKey::from_coordinates(&X, &Y)
    }

    fn cose_key() -> Vec<u8> {
        [
            COSE_EC2_P256_HEADER.as_slice(),
            X.as_slice(),
            hex!("225820").as_slice(),
            Y.as_slice(),
        ]
        .concat()
    }

    fn authenticator_data() -> Vec<u8> {
        [
            [0x49; 32].as_slice(),
            [0x45].as_slice(),
            hex!("00000001").as_slice(),
            [0u8; 16].as_slice(),
            hex!("0014").as_slice(),
            CREDENTIAL_ID.as_slice(),
            cose_key().as_slice(),
        ]
        .concat()
    }

    fn response(
        public_key: Option<&[u8]>,
        authenticator_data: Option<&[u8]>,
        attestation_object: &[u8],
    ) -> RegistrationResponse {
        RegistrationResponse {
            id: base64url::encode(CREDENTIAL_ID),
            raw_id: CREDENTIAL_ID.to_vec(),
            response: AttestationResponse {
                client_data_json: base64url::encode(b"{}"),
                attestation_object: base64url::encode(attestation_object),
                authenticator_data: authenticator_data.map(base64url::encode),
                public_key: public_key.map(base64url::encode),
                public_key_algorithm: Some(-7),
                transports: Vec::new(),
            },
            typ: crate::PublicKeyCredentialType::PublicKey,
        }
    }

    #[test]
    fn credential_id_length_at_fixed_offset() {
        let data = authenticator_data();
        assert_eq!(data[32] & AUTH_DATA_FLAGS_AT, AUTH_DATA_FLAGS_AT);
        assert_eq!(&data[53..55], &hex!("0014"));
        assert_eq!(&data[65 + 20..97 + 20], &X);
        assert_eq!(&data[100 + 20..132 + 20], &Y);
    }

    #[test]
    fn prefers_spki() {
        let mut spki = hex!("3059301306072a8648ce3d020106082a8648ce3d030107034200").to_vec();
        spki.extend_from_slice(&expected().0);

        let pk = extract_public_key(&response(Some(spki.as_slice()), None, &[])).unwrap();
        assert_eq!(pk, expected());
    }

    #[test]
    fn falls_back_to_authenticator_data() {
        let data = authenticator_data();
        let pk = extract_public_key(&response(None, Some(data.as_slice()), &[])).unwrap();

        assert_eq!(pk, expected());
        assert_eq!(pk.0.len(), 65);
        assert_eq!(pk.0[0], 0x04);
    }

    #[test]
    fn malformed_spki_falls_back() {
        let pk = extract_public_key(&response(
            Some([0x05; 70].as_slice()),
            Some(authenticator_data().as_slice()),
            &[],
        ))
        .unwrap();
        assert_eq!(pk, expected());
    }

    #[test]
    fn falls_back_to_attestation_object() {
        let auth_data = authenticator_data();
        let mut attestation =
            hex!("a363666d74646e6f6e656761747453746d74a068617574684461746158").to_vec();
        attestation.push(u8::try_from(auth_data.len()).unwrap());
        attestation.extend_from_slice(&auth_data);

        let pk = extract_public_key(&response(None, None, &attestation)).unwrap();
        assert_eq!(pk, expected());
    }

    #[test]
    fn missing_attested_credential_data() {
        let mut data = authenticator_data();
        data[32] = 0x05;

        assert!(matches!(
            extract_public_key(&response(None, Some(data.as_slice()), &[])),
            Err(PublicKeyError::MissingAttestedCredentialData)
        ));
    }

    #[test]
    fn no_key_material() {
        assert!(matches!(
            extract_public_key(&response(None, None, b"garbage")),
            Err(PublicKeyError::Decode(_))
        ));
    }

    #[test]
    fn truncated_cose_key() {
        let key = cose_key();
        assert!(matches!(
            from_attestation_object(&key[..key.len() - 1]),
            Err(PublicKeyError::Truncated(_))
        ));
    }
}
