mod address;
mod contract_id;
mod entry;
mod envelope;
mod error;
mod policy;
mod preimage;
pub mod scval;
mod signer;

pub use stellar_xdr::curr as xdr;

pub use self::{
    address::ContractAddress,
    contract_id::{derive_contract_id, derive_wallet_address},
    entry::{
        add_signature, address_credentials, address_credentials_mut, signatures, with_signature,
    },
    envelope::{NormalizedTransaction, OperationKind, TransactionInput},
    error::{Error, Result},
    policy::{CHECK_AUTH, attach_policy, auth_context, check_auth_target, policy_entry},
    preimage::{authorization_payload, authorization_preimage, entry_payload, network_id},
    signer::{Signature, SignerKey, SignerLimits, SignerStorage},
};
