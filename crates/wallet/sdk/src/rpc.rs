use passkey_auth::{
    ContractAddress,
    xdr::{ContractDataDurability, ScVal},
};
use thiserror::Error as ThisError;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("{0}")]
pub struct RpcError(pub String);

/// Soroban RPC server, limited to what signing needs
///
/// Timeouts and retries are up to the implementation.
#[allow(async_fn_in_trait)]
pub trait LedgerRpc {
    /// Sequence number of the latest closed ledger
    async fn latest_ledger(&self) -> Result<u32, RpcError>;

    /// Whether contract data `key` of `contract` is live
    async fn contract_data_exists(
        &self,
        contract: ContractAddress,
        key: &ScVal,
        durability: ContractDataDurability,
    ) -> Result<bool, RpcError>;
}

#[allow(clippy::future_not_send)]
impl<T> LedgerRpc for &T
where
    T: LedgerRpc + ?Sized,
{
    #[inline]
    async fn latest_ledger(&self) -> Result<u32, RpcError> {
        (**self).latest_ledger().await
    }

    #[inline]
    async fn contract_data_exists(
        &self,
        contract: ContractAddress,
        key: &ScVal,
        durability: ContractDataDurability,
    ) -> Result<bool, RpcError> {
        (**self)
            .contract_data_exists(contract, key, durability)
            .await
    }
}
