use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ParseCurveError {
    #[error("wrong curve type")]
    WrongCurveType,
    #[error("hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid length")]
    InvalidLength,
    #[cfg(feature = "ed25519")]
    #[error("strkey: {0}")]
    Strkey(#[from] stellar_strkey::DecodeError),
}

/// Decodes input as hex into array and checks for its length
pub fn checked_hex_decode_array<const N: usize>(
    input: impl AsRef<[u8]>,
) -> Result<[u8; N], ParseCurveError> {
    let input = input.as_ref();
    if input.len() != N * 2 {
        return Err(ParseCurveError::InvalidLength);
    }
    let mut output = [0u8; N];
    hex::decode_to_slice(input, &mut output)?;
    Ok(output)
}
