use passkey_auth::ContractAddress;
use passkey_crypto::SignatureParseError;
use passkey_webauthn::{AuthenticatorError, PublicKeyError};
use thiserror::Error as ThisError;

use crate::{ConfigError, RpcError};

pub type Result<T, E = Error> = ::core::result::Result<T, E>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Auth(#[from] passkey_auth::Error),

    #[error(transparent)]
    PublicKey(#[from] PublicKeyError),

    #[error("signature: {0}")]
    Signature(#[from] SignatureParseError),

    #[error("rpc: {0}")]
    Rpc(#[from] RpcError),

    #[error(transparent)]
    Authenticator(#[from] AuthenticatorError),

    #[error("wallet is not connected")]
    WalletNotConnected,

    #[error("no wallet found for the key, derived address {0} does not exist")]
    ContractNotFound(ContractAddress),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}
