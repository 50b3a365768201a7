use std::sync::atomic::{AtomicUsize, Ordering};

use passkey_auth::{
    ContractAddress, SignerKey,
    xdr::{ContractDataDurability, ScVal},
};
use passkey_wallet_sdk::{LedgerRpc, RpcError};

/// Ledger RPC backed by a fixed set of live contract data entries
#[derive(Debug, Default)]
pub struct MockLedger {
    latest_ledger: u32,
    entries: Vec<(ContractAddress, ScVal, ContractDataDurability)>,
    unavailable: bool,
    latest_ledger_calls: AtomicUsize,
}

impl MockLedger {
    pub fn new(latest_ledger: u32) -> Self {
        Self {
            latest_ledger,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_contract_data(
        mut self,
        contract: ContractAddress,
        key: ScVal,
        durability: ContractDataDurability,
    ) -> Self {
        self.entries.push((contract, key, durability));
        self
    }

    /// Marks `contract` as deployed
    #[must_use]
    pub fn with_contract_instance(self, contract: ContractAddress) -> Self {
        self.with_contract_data(
            contract,
            ScVal::LedgerKeyContractInstance,
            ContractDataDurability::Persistent,
        )
    }

    #[must_use]
    pub fn with_signer(
        self,
        contract: ContractAddress,
        signer: &SignerKey,
        durability: ContractDataDurability,
    ) -> Self {
        self.with_contract_data(contract, signer.to_sc_val().unwrap(), durability)
    }

    /// Every request fails
    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    pub fn latest_ledger_calls(&self) -> usize {
        self.latest_ledger_calls.load(Ordering::Relaxed)
    }

    fn check_available(&self) -> Result<(), RpcError> {
        if self.unavailable {
            return Err(RpcError("service unavailable".to_owned()));
        }
        Ok(())
    }
}

impl LedgerRpc for MockLedger {
    async fn latest_ledger(&self) -> Result<u32, RpcError> {
        self.latest_ledger_calls.fetch_add(1, Ordering::Relaxed);
        self.check_available()?;
        Ok(self.latest_ledger)
    }

    async fn contract_data_exists(
        &self,
        contract: ContractAddress,
        key: &ScVal,
        durability: ContractDataDurability,
    ) -> Result<bool, RpcError> {
        self.check_available()?;
        Ok(self
            .entries
            .iter()
            .any(|(c, k, d)| *c == contract && k == key && *d == durability))
    }
}
