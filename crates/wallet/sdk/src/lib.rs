//! Passkey smart wallet kit for Soroban.
//!
//! [`PasskeyKit`] drives the WebAuthn [`Authenticator`](passkey_webauthn::Authenticator)
//! and a [`LedgerRpc`] to create and connect passkeys and to sign the
//! authorization entries of transactions on behalf of a smart wallet.

mod config;
mod error;
mod kit;
mod rpc;

pub use passkey_auth as auth;
pub use passkey_crypto as crypto;
pub use passkey_webauthn as webauthn;

pub use self::{
    config::{ConfigError, DEFAULT_TIMEOUT_SECS, KitConfig, LEDGER_CLOSE_SECS, Network},
    error::{Error, Result},
    kit::{
        ConnectOptions, ConnectedWallet, CreatedKey, IDENTIFY_CHALLENGE, KeyIdPin, PasskeyKit,
        SignMethod, SignOptions,
    },
    rpc::{LedgerRpc, RpcError},
};
