use thiserror::Error as ThisError;

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("unsupported credentials: {0}")]
    UnsupportedCredentials(&'static str),

    #[error("unsupported signature container: {0}")]
    UnsupportedSignatureContainer(&'static str),

    #[error("unsupported authorization context: {0}")]
    UnsupportedContext(&'static str),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("unsupported envelope: {0}")]
    UnsupportedEnvelope(&'static str),

    #[error("transaction must include exactly one operation, got {0}")]
    TooManyOperations(usize),

    #[error("authorization entry #{0} not found")]
    AuthEntryNotFound(usize),

    #[error("authorization entry must be signed before a policy is attached")]
    UnsignedEntry,

    #[error("invalid {0} ScVal")]
    InvalidScVal(&'static str),

    #[error("xdr: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    #[error("strkey: {0}")]
    Strkey(#[from] stellar_strkey::DecodeError),
}
